//! Tool type definitions for function-calling.
//!
//! [`ToolDefinition`], [`ToolCall`] and [`ToolResult`] are the provider-agnostic
//! wire types exchanged with the reasoning engine. [`ToolSpec`] is the
//! registry's own description of a tool: its typed parameters and what it is
//! bound to (a backend query or a report export).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::ToolError;
use crate::gateway::model::Extractor;
use crate::report::ReportFormat;

/// A tool definition that can be sent to an LLM for function-calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match a registry entry).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: Value,
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (assigned by the provider).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments for the tool.
    pub arguments: String,
}

/// Category of a failed tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No such tool.
    UnknownTool,
    /// Arguments missing, malformed or ill-typed.
    InvalidArguments,
    /// Backend unreachable or answered with a bad status/body.
    Transport,
    /// Backend answered with GraphQL errors and no data.
    Backend,
    /// Backend data did not match the expected shape.
    Extraction,
    /// Report rendering failed.
    Render,
}

impl From<&ToolError> for FailureKind {
    fn from(err: &ToolError) -> Self {
        match err {
            ToolError::UnknownTool { .. } => Self::UnknownTool,
            ToolError::InvalidArguments { .. } => Self::InvalidArguments,
            ToolError::Gateway(_) => Self::Transport,
            ToolError::Backend { .. } => Self::Backend,
            ToolError::Extraction { .. } => Self::Extraction,
            ToolError::Render(_) => Self::Render,
        }
    }
}

/// Outcome of one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    /// The call succeeded; `payload` is handed to the engine.
    Success {
        /// Tool-specific JSON payload.
        payload: Value,
    },
    /// The call failed; the engine sees the kind and message.
    Failure {
        /// Failure category.
        kind: FailureKind,
        /// Human-readable cause.
        message: String,
    },
}

/// The result of executing a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this result corresponds to.
    #[serde(skip)]
    pub tool_call_id: String,
    /// Tool name.
    #[serde(rename = "tool")]
    pub name: String,
    /// Arguments as received (echoed back to the engine).
    pub arguments: Value,
    /// Success payload or failure.
    #[serde(flatten)]
    pub outcome: ToolOutcome,
}

impl ToolResult {
    /// Builds a failure result from a [`ToolError`].
    #[must_use]
    pub fn failure(call: &ToolCall, arguments: Value, err: &ToolError) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            arguments,
            outcome: ToolOutcome::Failure {
                kind: FailureKind::from(err),
                message: err.to_string(),
            },
        }
    }

    /// Builds a success result.
    #[must_use]
    pub fn success(call: &ToolCall, arguments: Value, payload: Value) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            arguments,
            outcome: ToolOutcome::Success { payload },
        }
    }

    /// Whether this result represents an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Failure { .. })
    }

    /// Returns the success payload, if any.
    #[must_use]
    pub const fn payload(&self) -> Option<&Value> {
        match &self.outcome {
            ToolOutcome::Success { payload } => Some(payload),
            ToolOutcome::Failure { .. } => None,
        }
    }

    /// JSON text sent back to the engine as the tool turn.
    #[must_use]
    pub fn content(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            json!({"tool": self.name, "status": "failure", "message": e.to_string()}).to_string()
        })
    }
}

/// Kind of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Identifier given as string or integer; normalized to string.
    Id,
    /// Calendar date `YYYY-MM-DD`.
    Date,
    /// Free text.
    Text,
    /// JSON mapping.
    Object,
    /// Array of JSON objects (report rows).
    Rows,
}

impl ParamKind {
    /// JSON Schema fragment for this kind.
    fn schema(self, description: &str) -> Value {
        match self {
            Self::Id | Self::Text => json!({"type": "string", "description": description}),
            Self::Date => json!({
                "type": "string",
                "description": format!("{description} Formato YYYY-MM-DD."),
            }),
            Self::Object => json!({"type": "object", "description": description}),
            Self::Rows => json!({
                "type": "array",
                "items": {"type": "object"},
                "description": description,
            }),
        }
    }
}

/// One declared parameter of a tool.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    /// Argument name as the engine sends it.
    pub name: &'static str,
    /// Expected kind.
    pub kind: ParamKind,
    /// Whether the argument must be present.
    pub required: bool,
    /// Description shown to the engine.
    pub description: &'static str,
    /// GraphQL variable name the argument maps to (query tools only).
    pub variable: &'static str,
}

/// What a tool does when invoked.
#[derive(Clone, Copy)]
pub enum Binding {
    /// Static GraphQL document; `extract` types `data.<root_field>`.
    Query {
        /// GraphQL document.
        template: &'static str,
        /// Root field of `data` holding the result.
        root_field: &'static str,
        /// Typed extractor for the root field.
        extract: Extractor,
    },
    /// Caller-supplied GraphQL document (`query` + optional `variables`).
    RawQuery,
    /// Report export in the given format.
    Export(ReportFormat),
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Query { root_field, .. } => f
                .debug_struct("Query")
                .field("root_field", root_field)
                .finish_non_exhaustive(),
            Self::RawQuery => f.write_str("RawQuery"),
            Self::Export(format) => f.debug_tuple("Export").field(format).finish(),
        }
    }
}

/// Registry entry for one tool.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    /// Unique tool name.
    pub name: &'static str,
    /// Description shown to the engine.
    pub description: &'static str,
    /// Ordered parameters.
    pub params: Vec<ParamSpec>,
    /// What the tool is bound to.
    pub binding: Binding,
}

impl ToolSpec {
    /// Renders this spec as a [`ToolDefinition`] for the engine.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.params {
            properties.insert(param.name.to_string(), param.kind.schema(param.description));
            if param.required {
                required.push(Value::String(param.name.to_string()));
            }
        }

        let mut parameters = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            parameters["required"] = Value::Array(required);
        }

        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            parameters,
        }
    }
}
