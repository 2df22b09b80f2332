//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand, ValueEnum};

/// clinic-agent: natural-language access to the clinic backend.
///
/// Answers free-text questions about specialties, users, doctors,
/// appointments, diagnoses, triages and available slots, and exports
/// results to PDF or Excel.
#[derive(Parser, Debug)]
#[command(name = "clinic-agent")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// JSON.
    Json,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server.
    #[command(after_help = r#"Examples:
  clinic-agent serve                       # Listen on 127.0.0.1:8000
  clinic-agent serve --host 0.0.0.0 -p 80  # Listen on all interfaces
"#)]
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1", env = "CLINIC_AGENT_HOST")]
        host: String,

        /// Port to listen on.
        #[arg(short, long, default_value_t = 8000, env = "CLINIC_AGENT_PORT")]
        port: u16,
    },

    /// Ask the agent a single question.
    #[command(after_help = r#"Examples:
  clinic-agent ask "¿Qué especialidades hay?"
  clinic-agent ask "Genera un PDF con las citas de mañana"
  clinic-agent --format json ask "Lista los médicos" | jq .content
"#)]
    Ask {
        /// Natural-language request.
        prompt: String,

        /// Override the model identifier.
        #[arg(long)]
        model: Option<String>,

        /// Override the maximum number of engine rounds.
        #[arg(long)]
        max_rounds: Option<usize>,
    },

    /// List the tools exposed to the reasoning engine.
    Tools {
        /// Include the raw GraphQL query tool.
        #[arg(long, env = "CLINIC_AGENT_ALLOW_RAW_QUERIES")]
        allow_raw_queries: bool,
    },

    /// Check that the GraphQL backend is reachable.
    Check {
        /// Backend endpoint.
        #[arg(long, env = "GRAPHQL_ENDPOINT")]
        endpoint: Option<String>,

        /// Bearer token for the backend.
        #[arg(long, env = "GRAPHQL_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
}
