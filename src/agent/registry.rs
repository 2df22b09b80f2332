//! Tool registry: validates tool calls and dispatches them to the backend
//! gateway or the report renderer.
//!
//! Every call produces a [`ToolResult`]. Unknown names, bad arguments,
//! backend failures and render failures all become failure results that are
//! fed back to the engine; nothing raised here aborts the agent loop.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value, json};
use tracing::{debug, error, warn};

use super::catalog::catalog;
use super::config::AgentConfig;
use super::tool::{Binding, ParamKind, ParamSpec, ToolCall, ToolDefinition, ToolResult, ToolSpec};
use crate::error::{ConfigError, RenderError, ToolError};
use crate::gateway::{GraphqlGateway, QueryGateway};
use crate::report::{self, ReportFormat};

/// Maximum raw byte length of tool argument JSON from the LLM.
const MAX_TOOL_ARGS_LEN: usize = 1_000_000;

/// Characters not allowed in report file names.
static UNSAFE_FILE_CHARS: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]"));

/// Strict calendar date shape; `NaiveDate` parsing alone accepts `2024-5-1`.
static DATE_SHAPE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$"));

/// Fixed catalog of callable tools bound to a gateway and a reports directory.
pub struct ToolRegistry {
    specs: Vec<ToolSpec>,
    index: HashMap<&'static str, usize>,
    gateway: Arc<dyn QueryGateway>,
    reports_dir: PathBuf,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.specs.len())
            .field("reports_dir", &self.reports_dir)
            .finish_non_exhaustive()
    }
}

impl ToolRegistry {
    /// Creates a registry over the standard catalog.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn QueryGateway>,
        reports_dir: impl Into<PathBuf>,
        allow_raw_queries: bool,
    ) -> Self {
        let specs = catalog(allow_raw_queries);
        let index = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.name, i))
            .collect();
        Self {
            specs,
            index,
            gateway,
            reports_dir: reports_dir.into(),
        }
    }

    /// Creates a registry with a [`GraphqlGateway`] built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the backend endpoint is missing or invalid.
    pub fn from_config(config: &AgentConfig) -> Result<Self, ConfigError> {
        let gateway = GraphqlGateway::new(
            &config.graphql_endpoint,
            config.graphql_token.clone(),
            config.backend_timeout,
        )?;
        Ok(Self::new(
            Arc::new(gateway),
            config.reports_dir.clone(),
            config.allow_raw_queries,
        ))
    }

    /// Looks up a tool by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ToolSpec> {
        self.index.get(name).map(|&i| &self.specs[i])
    }

    /// All registered specs in catalog order.
    #[must_use]
    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    /// Tool definitions in catalog order, as sent to the engine.
    #[must_use]
    pub fn describe_all(&self) -> Vec<ToolDefinition> {
        self.specs.iter().map(ToolSpec::definition).collect()
    }

    /// Directory where export tools write their files.
    #[must_use]
    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Validates and executes one tool call.
    ///
    /// Never fails: every error is folded into the returned [`ToolResult`].
    pub async fn invoke(&self, call: &ToolCall) -> ToolResult {
        let raw_args = parse_arguments(&call.name, &call.arguments);
        let echo = raw_args
            .as_ref()
            .map_or_else(|_| Value::String(call.arguments.clone()), Clone::clone);

        let outcome = match self.lookup(&call.name) {
            None => Err(ToolError::UnknownTool {
                name: call.name.clone(),
            }),
            Some(spec) => match raw_args.and_then(|args| validate(spec, &args)) {
                Ok(args) => self.dispatch(spec, args).await,
                Err(e) => Err(e),
            },
        };

        match outcome {
            Ok(payload) => {
                debug!(tool = %call.name, call_id = %call.id, "tool call succeeded");
                ToolResult::success(call, echo, payload)
            }
            Err(e) => {
                warn!(tool = %call.name, call_id = %call.id, error = %e, "tool call failed");
                ToolResult::failure(call, echo, &e)
            }
        }
    }

    async fn dispatch(&self, spec: &ToolSpec, args: Map<String, Value>) -> Result<Value, ToolError> {
        match spec.binding {
            Binding::Query {
                template,
                root_field,
                extract,
            } => {
                let variables = query_variables(spec, &args);
                let body = self.gateway.execute(template, variables).await?;
                let data = response_data(&body)?;
                extract(data, root_field)
            }
            Binding::RawQuery => {
                let query = args
                    .get("query")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let variables = args.get("variables").and_then(Value::as_object).cloned();
                let body = self.gateway.execute(query, variables).await?;
                response_data(&body)?;
                Ok(body)
            }
            Binding::Export(format) => self.export(spec.name, &args, format).await,
        }
    }

    async fn export(
        &self,
        name: &str,
        args: &Map<String, Value>,
        format: ReportFormat,
    ) -> Result<Value, ToolError> {
        let rows: Vec<Map<String, Value>> = args
            .get("rows")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_object).cloned().collect())
            .unwrap_or_default();

        if rows.is_empty() {
            return Ok(json!({"generated": false, "rows": 0}));
        }

        let requested = args.get("nombre_archivo").and_then(Value::as_str);
        let file_name = report_file_name(name, requested, format)?;
        let path = self.reports_dir.join(&file_name);
        let row_count = rows.len();

        let target = path.clone();
        join_render(tokio::task::spawn_blocking(move || {
            report::render(&rows, &target, format)
        }))
        .await?;

        debug!(tool = name, path = %path.display(), rows = row_count, "report exported");
        Ok(json!({
            "generated": true,
            "path": format!("reports/{file_name}"),
            "format": format,
            "rows": row_count,
        }))
    }
}

/// Waits for a blocking render. A panicking renderer is logged and surfaces
/// as [`RenderError::Task`].
async fn join_render(
    task: tokio::task::JoinHandle<Result<(), RenderError>>,
) -> Result<(), RenderError> {
    match task.await {
        Ok(result) => result,
        Err(e) => {
            if e.is_panic() {
                error!(error = %e, "report renderer panicked");
            }
            Err(RenderError::Task(e))
        }
    }
}

/// Parses the raw argument string; an empty string means no arguments.
fn parse_arguments(name: &str, raw: &str) -> Result<Value, ToolError> {
    if raw.len() > MAX_TOOL_ARGS_LEN {
        return Err(ToolError::InvalidArguments {
            name: name.to_string(),
            message: format!("arguments too large ({} bytes)", raw.len()),
        });
    }
    if raw.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(raw).map_err(|e| ToolError::InvalidArguments {
        name: name.to_string(),
        message: format!("arguments are not valid JSON: {e}"),
    })
}

/// Checks `args` against the spec's parameters and normalizes their values.
fn validate(spec: &ToolSpec, args: &Value) -> Result<Map<String, Value>, ToolError> {
    let invalid = |message: String| ToolError::InvalidArguments {
        name: spec.name.to_string(),
        message,
    };

    let Some(object) = args.as_object() else {
        return Err(invalid("arguments must be a JSON object".to_string()));
    };

    let mut normalized = Map::new();
    for param in &spec.params {
        match object.get(param.name) {
            None | Some(Value::Null) => {
                if param.required {
                    return Err(invalid(format!("missing required argument '{}'", param.name)));
                }
            }
            Some(value) => {
                let value = normalize(param, value).map_err(invalid)?;
                normalized.insert(param.name.to_string(), value);
            }
        }
    }

    for key in object.keys() {
        if !spec.params.iter().any(|p| p.name == key) {
            debug!(tool = spec.name, argument = %key, "ignoring undeclared argument");
        }
    }

    Ok(normalized)
}

fn normalize(param: &ParamSpec, value: &Value) -> Result<Value, String> {
    let name = param.name;
    match param.kind {
        ParamKind::Id => match value {
            Value::String(s) if !s.trim().is_empty() => Ok(Value::String(s.trim().to_string())),
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Value::String(n.to_string())),
            _ => Err(format!("'{name}' must be a non-empty string or integer id")),
        },
        ParamKind::Date => {
            let text = value
                .as_str()
                .map(str::trim)
                .ok_or_else(|| format!("'{name}' must be a date string (YYYY-MM-DD)"))?;
            let shaped = DATE_SHAPE
                .as_ref()
                .map_err(ToString::to_string)?
                .is_match(text);
            if !shaped || NaiveDate::parse_from_str(text, "%Y-%m-%d").is_err() {
                return Err(format!("'{name}' must be a valid date (YYYY-MM-DD), got '{text}'"));
            }
            Ok(Value::String(text.to_string()))
        }
        ParamKind::Text => match value {
            Value::String(s) => Ok(Value::String(s.clone())),
            _ => Err(format!("'{name}' must be a string")),
        },
        ParamKind::Object => match value {
            Value::Object(_) => Ok(value.clone()),
            _ => Err(format!("'{name}' must be a JSON object")),
        },
        ParamKind::Rows => match value {
            Value::Array(items) => {
                if let Some(pos) = items.iter().position(|v| !v.is_object()) {
                    return Err(format!("'{name}' item {pos} is not an object"));
                }
                Ok(value.clone())
            }
            _ => Err(format!("'{name}' must be an array of objects")),
        },
    }
}

/// Maps normalized arguments to GraphQL variables by declared name.
fn query_variables(spec: &ToolSpec, args: &Map<String, Value>) -> Option<Map<String, Value>> {
    if spec.params.is_empty() {
        return None;
    }
    let vars: Map<String, Value> = spec
        .params
        .iter()
        .filter_map(|p| args.get(p.name).map(|v| (p.variable.to_string(), v.clone())))
        .collect();
    Some(vars)
}

/// Returns `data` of a backend response, or a backend failure when the
/// response carries only `errors`.
fn response_data(body: &Value) -> Result<&Value, ToolError> {
    let errors = body
        .get("errors")
        .and_then(Value::as_array)
        .filter(|e| !e.is_empty());

    match (body.get("data").filter(|d| !d.is_null()), errors) {
        (Some(data), Some(errors)) => {
            warn!(count = errors.len(), "backend returned partial data with errors");
            Ok(data)
        }
        (Some(data), None) => Ok(data),
        (None, Some(errors)) => Err(ToolError::Backend {
            messages: errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(Value::as_str)
                        .map_or_else(|| e.to_string(), str::to_string)
                })
                .collect::<Vec<_>>()
                .join("; "),
        }),
        (None, None) => Err(ToolError::Backend {
            messages: "response has neither data nor errors".to_string(),
        }),
    }
}

/// Resolves the on-disk file name for an export.
///
/// A requested name is cut to its last path component, stripped of unsafe
/// characters, collapsed to single dots and given the format extension.
/// Anything that still fails [`report::is_plain_file_name`] gets the
/// timestamped default.
fn report_file_name(
    tool: &str,
    requested: Option<&str>,
    format: ReportFormat,
) -> Result<String, ToolError> {
    let ext = format.extension();
    let fallback = || format!("reporte_{}.{ext}", chrono::Local::now().format("%Y%m%d_%H%M%S"));

    let Some(requested) = requested else {
        return Ok(fallback());
    };

    let last = requested
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let pattern = UNSAFE_FILE_CHARS
        .as_ref()
        .map_err(|e| ToolError::InvalidArguments {
            name: tool.to_string(),
            message: e.to_string(),
        })?;
    let mut cleaned = pattern.replace_all(last, "_").into_owned();
    while cleaned.contains("..") {
        cleaned = cleaned.replace("..", ".");
    }
    let cleaned = cleaned.trim_matches('.');

    if cleaned.trim_matches(['_', '.']).is_empty() {
        return Ok(fallback());
    }

    let dotted = format!(".{ext}");
    let name = if cleaned.to_ascii_lowercase().ends_with(&dotted) {
        cleaned.to_string()
    } else {
        format!("{cleaned}{dotted}")
    };
    Ok(if report::is_plain_file_name(&name) {
        name
    } else {
        fallback()
    })
}
