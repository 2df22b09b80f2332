//! CLI layer for clinic-agent.
//!
//! Provides the command-line interface using clap, with commands for
//! serving the HTTP front end, asking one-off questions and inspecting the
//! tool catalog and backend.

pub mod commands;
pub mod parser;

pub use commands::execute;
pub use parser::{Cli, Commands, OutputFormat};
