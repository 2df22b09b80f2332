//! Test doubles shared by the agent, server and CLI unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::message::{ChatRequest, ChatResponse, TokenUsage};
use super::provider::LlmProvider;
use super::tool::ToolCall;
use crate::error::{AgentError, GatewayError};
use crate::gateway::QueryGateway;

/// One recorded backend call: query text and variables.
pub type RecordedCall = (String, Option<Map<String, Value>>);

/// Gateway that answers every query with a fixed body and records calls.
pub struct RecordingGateway {
    body: Option<Value>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingGateway {
    /// Answers every query with `body`.
    pub fn new(body: Value) -> Self {
        Self {
            body: Some(body),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every query with a transport error.
    pub fn unreachable() -> Self {
        Self {
            body: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl QueryGateway for RecordingGateway {
    async fn execute(
        &self,
        query: &str,
        variables: Option<Map<String, Value>>,
    ) -> Result<Value, GatewayError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((query.to_string(), variables));
        }
        self.body.clone().ok_or_else(|| GatewayError::Transport {
            message: "connection refused".to_string(),
        })
    }
}

/// Provider that replays a fixed script of responses.
///
/// Once the script is exhausted the `fallback` response is repeated; without
/// a fallback the provider fails.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<ChatResponse, AgentError>>>,
    fallback: Option<ChatResponse>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    /// Replays `script` in order.
    pub fn new(script: Vec<Result<ChatResponse, AgentError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers every round with `response`.
    pub fn repeating(response: ChatResponse) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match (next, &self.fallback) {
            (Some(step), _) => step,
            (None, Some(fallback)) => Ok(fallback.clone()),
            (None, None) => Err(AgentError::ApiRequest {
                message: "script exhausted".to_string(),
                status: None,
            }),
        }
    }
}

/// Engine response with final text.
pub fn text_response(text: &str) -> ChatResponse {
    ChatResponse {
        text_parts: vec![text.to_string()],
        usage: TokenUsage {
            prompt_tokens: 100,
            completion_tokens: 20,
            total_tokens: 120,
        },
        tool_calls: Vec::new(),
        finish_reason: Some("stop".to_string()),
    }
}

/// Engine response proposing the given `(id, name, arguments)` calls.
pub fn tool_response(calls: &[(&str, &str, &str)]) -> ChatResponse {
    ChatResponse {
        text_parts: Vec::new(),
        usage: TokenUsage {
            prompt_tokens: 80,
            completion_tokens: 10,
            total_tokens: 90,
        },
        tool_calls: calls
            .iter()
            .map(|(id, name, arguments)| ToolCall {
                id: (*id).to_string(),
                name: (*name).to_string(),
                arguments: (*arguments).to_string(),
            })
            .collect(),
        finish_reason: Some("tool_calls".to_string()),
    }
}
