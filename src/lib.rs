//! # clinic-agent
//!
//! Natural-language agent over a medical-clinic GraphQL backend.
//!
//! A free-text request is handed to an LLM that may call a fixed catalog of
//! tools. Each tool is either a typed backend query or a PDF/Excel report
//! export. The agent loop runs the calls, feeds the results back to the
//! model and returns either a synthesized answer or a generated file.
//!
//! ```text
//! prompt → Orchestrator → agentic_loop ⇄ LlmProvider
//!                              │
//!                              └─ ToolRegistry ─┬─ QueryGateway (GraphQL)
//!                                               └─ report::render (PDF/XLSX)
//! ```
//!
//! The crate ships a CLI (`clinic-agent`) and an axum HTTP front end.

pub mod agent;
pub mod cli;
pub mod error;
pub mod gateway;
pub mod report;
pub mod server;

pub use agent::{AgentConfig, AgentResponse, Orchestrator, ResponseEnvelope, ToolRegistry};
pub use error::{AgentError, ConfigError, Error, GatewayError, RenderError, Result, ToolError};
pub use gateway::{GraphqlGateway, QueryGateway};
pub use report::{ReportFormat, render};
