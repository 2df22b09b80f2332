//! CLI command implementations.
//!
//! Each command returns its output as a string; `main` prints it. Async work
//! runs on a runtime created per command.

use std::fmt::Write as FmtWrite;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::agent::catalog::catalog;
use crate::agent::config::AgentConfig;
use crate::agent::{AgentResponse, Orchestrator};
use crate::cli::parser::{Cli, Commands, OutputFormat};
use crate::error::{CommandError, ConfigError, Result};
use crate::gateway::GraphqlGateway;
use crate::server::{self, AppState};

/// Timeout for the connectivity check.
const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Executes the CLI command.
///
/// # Errors
///
/// Returns an error if configuration is incomplete or the command fails.
pub fn execute(cli: &Cli) -> Result<String> {
    match &cli.command {
        Commands::Serve { host, port } => cmd_serve(host, *port),
        Commands::Ask {
            prompt,
            model,
            max_rounds,
        } => cmd_ask(prompt, model.as_deref(), *max_rounds, cli.format),
        Commands::Tools { allow_raw_queries } => cmd_tools(*allow_raw_queries, cli.format),
        Commands::Check { endpoint, token } => {
            cmd_check(endpoint.as_deref(), token.clone(), cli.format)
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}")).into()
    })
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|e| CommandError::OutputFormat(e.to_string()).into())
}

fn cmd_serve(host: &str, port: u16) -> Result<String> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| ConfigError::Invalid {
            var: "CLINIC_AGENT_HOST",
            message: format!("{host}:{port} is not a socket address: {e}"),
        })?;
    let config = AgentConfig::from_env()?;
    let orchestrator = Arc::new(Orchestrator::from_config(config)?);

    runtime()?
        .block_on(server::serve(addr, AppState::new(orchestrator)))
        .map_err(|e| CommandError::ExecutionFailed(format!("HTTP server error: {e:#}")))?;
    Ok(String::new())
}

fn cmd_ask(
    prompt: &str,
    model: Option<&str>,
    max_rounds: Option<usize>,
    format: OutputFormat,
) -> Result<String> {
    let mut builder = AgentConfig::builder();
    if let Some(model) = model {
        builder = builder.model(model);
    }
    if let Some(n) = max_rounds {
        builder = builder.max_rounds(n);
    }
    let config = builder.from_env().build()?;
    let reports_dir = config.reports_dir.clone();
    let orchestrator = Orchestrator::from_config(config)?;

    let response = runtime()?.block_on(orchestrator.ask(prompt))?;
    format_response(&response, format, &reports_dir)
}

/// Text output names the file where it was written on disk, under
/// `reports_dir`; JSON output keeps the envelope served over HTTP.
fn format_response(
    response: &AgentResponse,
    format: OutputFormat,
    reports_dir: &Path,
) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(&response.shape()),
        OutputFormat::Text => Ok(match response {
            AgentResponse::Text { body } => format!("{body}\n"),
            AgentResponse::Report {
                path,
                format,
                message,
            } => {
                let mut out = String::new();
                if !message.is_empty() {
                    let _ = writeln!(out, "{message}");
                }
                let file_name = path.rsplit('/').next().unwrap_or(path);
                let _ = writeln!(
                    out,
                    "Report ({format}): {}",
                    reports_dir.join(file_name).display()
                );
                out
            }
        }),
    }
}

fn cmd_tools(allow_raw_queries: bool, format: OutputFormat) -> Result<String> {
    let specs = catalog(allow_raw_queries);
    match format {
        OutputFormat::Json => {
            let definitions: Vec<_> = specs.iter().map(|s| s.definition()).collect();
            to_json(&definitions)
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for spec in &specs {
                let params = spec
                    .params
                    .iter()
                    .map(|p| {
                        if p.required {
                            p.name.to_string()
                        } else {
                            format!("{}?", p.name)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = writeln!(out, "{}({params})", spec.name);
                let _ = writeln!(out, "    {}", spec.description);
            }
            Ok(out)
        }
    }
}

fn cmd_check(endpoint: Option<&str>, token: Option<String>, format: OutputFormat) -> Result<String> {
    let endpoint = endpoint.ok_or(ConfigError::Missing {
        var: "GRAPHQL_ENDPOINT",
    })?;
    let gateway = GraphqlGateway::new(endpoint, token, CHECK_TIMEOUT)?;

    let count = runtime()?
        .block_on(gateway.check_connection())
        .map_err(|e| CommandError::ExecutionFailed(format!("Backend check failed: {e}")))?;

    match format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "endpoint": gateway.endpoint(),
            "reachable": true,
            "especialidades": count,
        })),
        OutputFormat::Text => Ok(format!(
            "Backend reachable at {} ({count} specialties)\n",
            gateway.endpoint()
        )),
    }
}
