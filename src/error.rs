//! Error types for clinic-agent.
//!
//! Errors are layered the same way the request flows: configuration problems
//! are fatal at startup, gateway/tool/render errors are recovered into tool
//! results inside the registry, and only [`AgentError`] escapes a request.

use thiserror::Error;

/// Result alias for the CLI layer.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for CLI commands.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Agent request failed.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Command-level failure.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Configuration errors. Always fatal at process start.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting was not provided.
    #[error("missing configuration: {var} is not set")]
    Missing {
        /// Environment variable (or setting name) that is missing.
        var: &'static str,
    },

    /// A setting was provided but cannot be used.
    #[error("invalid configuration for {var}: {message}")]
    Invalid {
        /// Environment variable (or setting name) that is invalid.
        var: &'static str,
        /// What is wrong with the value.
        message: String,
    },
}

/// Failures of a single backend GraphQL exchange.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request could not be sent or the connection failed.
    #[error("backend transport failure: {message}")]
    Transport {
        /// Underlying network error text.
        message: String,
    },

    /// The backend answered with a non-success HTTP status.
    #[error("backend returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        body: String,
    },

    /// The backend answered 2xx but the body is not valid JSON.
    #[error("backend response is not valid JSON: {message}")]
    Decode {
        /// Decoder error text.
        message: String,
    },
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            Self::Status {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else if e.is_decode() {
            Self::Decode {
                message: e.to_string(),
            }
        } else {
            Self::Transport {
                message: e.to_string(),
            }
        }
    }
}

/// Report rendering failures.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Filesystem failure while creating the directory or writing the file.
    #[error("report I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PDF assembly failure.
    #[error("PDF generation failed: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Excel workbook failure.
    #[error("Excel generation failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// The blocking render task panicked or was cancelled.
    #[error("report rendering task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The rows value is not an array of objects.
    #[error("invalid rows: {0}")]
    InvalidRows(String),
}

/// Errors raised while executing one tool call.
///
/// These never leave the registry: each variant maps to a failure kind in
/// the [`ToolResult`](crate::agent::tool::ToolResult) fed back to the engine.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool with this name is registered.
    #[error("unknown tool '{name}'")]
    UnknownTool {
        /// Requested tool name.
        name: String,
    },

    /// Arguments are malformed, missing or of the wrong type.
    #[error("invalid arguments for '{name}': {message}")]
    InvalidArguments {
        /// Tool name.
        name: String,
        /// What is wrong.
        message: String,
    },

    /// The backend call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The backend answered with GraphQL errors and no data.
    #[error("backend reported errors: {messages}")]
    Backend {
        /// Joined error messages.
        messages: String,
    },

    /// The backend data does not have the shape the tool expects.
    #[error("unexpected backend data for '{field}': {message}")]
    Extraction {
        /// Root field that was extracted.
        field: String,
        /// Deserializer message.
        message: String,
    },

    /// Report export failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Fatal errors for a single agent request.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The reasoning engine could not be reached or rejected the request.
    #[error("reasoning engine request failed: {message}")]
    ApiRequest {
        /// Error text from the provider.
        message: String,
        /// HTTP status, when known.
        status: Option<u16>,
    },

    /// The engine answered with neither text nor tool calls.
    #[error("reasoning engine returned an empty response")]
    EmptyResponse,

    /// The engine kept proposing tool calls past the round limit.
    #[error("tool-calling loop exceeded {max_rounds} rounds")]
    RoundLimitExceeded {
        /// Configured maximum.
        max_rounds: usize,
    },

    /// The whole request exceeded the configured timeout.
    #[error("agent request timed out after {seconds}s")]
    Timeout {
        /// Timeout in seconds.
        seconds: u64,
    },

    /// The prompt is empty or too long.
    #[error("invalid prompt: {message}")]
    InvalidPrompt {
        /// What is wrong with the prompt.
        message: String,
    },

    /// The configured provider name is not supported.
    #[error("unsupported provider '{name}'")]
    UnsupportedProvider {
        /// Provider name.
        name: String,
    },

    /// Configuration problem detected while building the agent.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// CLI command errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command failed.
    #[error("{0}")]
    ExecutionFailed(String),

    /// Output could not be formatted.
    #[error("output formatting failed: {0}")]
    OutputFormat(String),
}
