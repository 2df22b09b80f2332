//! Agent layer: reasoning-engine loop over the clinic tool catalog.
//!
//! Provides an LLM-powered workflow that answers a natural-language request
//! by calling backend query tools and report exporters. Uses a pluggable
//! provider abstraction backed by OpenAI-compatible APIs.
//!
//! # Architecture
//!
//! ```text
//! User prompt → Orchestrator
//!   ├── fresh ChatRequest (system prompt + user message + catalog)
//!   ├── agentic_loop ⇄ LlmProvider
//!   │   └── ToolRegistry::invoke for every proposed call, in order
//!   └── AgentResponse → ResponseEnvelope (text | report)
//! ```

pub mod agentic_loop;
pub mod catalog;
pub mod client;
pub mod config;
pub mod message;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod response;
pub mod tool;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types
pub use agentic_loop::{LoopOutcome, agentic_loop};
pub use config::AgentConfig;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use orchestrator::Orchestrator;
pub use provider::LlmProvider;
pub use registry::ToolRegistry;
pub use response::{AgentResponse, ResponseEnvelope};
pub use tool::{ToolCall, ToolDefinition, ToolOutcome, ToolResult, ToolSpec};
