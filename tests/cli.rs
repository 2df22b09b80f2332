//! Binary-level tests for the `clinic-agent` CLI.

#![allow(clippy::panic)]

use assert_cmd::Command;
use predicates::prelude::*;

fn clinic_agent(dir: &tempfile::TempDir) -> Command {
    let mut cmd =
        Command::cargo_bin("clinic-agent").unwrap_or_else(|e| panic!("binary not built: {e}"));
    cmd.env_clear().current_dir(dir.path());
    cmd
}

fn workdir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"))
}

#[test]
fn test_help_lists_commands() {
    let dir = workdir();
    clinic_agent(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("tools"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_ask_without_api_key_fails() {
    let dir = workdir();
    clinic_agent(&dir)
        .args(["ask", "¿Qué especialidades hay?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GOOGLE_API_KEY"));
}

#[test]
fn test_ask_without_backend_endpoint_fails() {
    let dir = workdir();
    clinic_agent(&dir)
        .env("GOOGLE_API_KEY", "test-key")
        .args(["ask", "hola"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GRAPHQL_ENDPOINT"));
}

#[test]
fn test_tools_needs_no_configuration() {
    let dir = workdir();
    clinic_agent(&dir)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("get_especialidades"))
        .stdout(predicate::str::contains("generar_reporte_excel"))
        .stdout(predicate::str::contains("execute_graphql_query").not());
}

#[test]
fn test_tools_json_with_raw_queries() {
    let dir = workdir();
    clinic_agent(&dir)
        .env("CLINIC_AGENT_ALLOW_RAW_QUERIES", "true")
        .args(["--format", "json", "tools"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"execute_graphql_query\""));
}

#[test]
fn test_check_without_endpoint_fails() {
    let dir = workdir();
    clinic_agent(&dir)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GRAPHQL_ENDPOINT"));
}

#[test]
fn test_env_file_is_loaded() {
    let dir = workdir();
    std::fs::write(
        dir.path().join(".env"),
        "CLINIC_AGENT_ALLOW_RAW_QUERIES=true\n",
    )
    .unwrap_or_else(|e| panic!("write .env: {e}"));
    clinic_agent(&dir)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("execute_graphql_query"));
}
