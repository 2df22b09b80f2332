//! Agentic tool-calling loop.
//!
//! Drives the engine ↔ tool round-trip as an explicit state machine:
//!
//! ```text
//! AwaitingEngine ──(tool calls)──▶ HasToolCalls ──(results appended)──▶ AwaitingEngine
//!       │
//!       └──(text only)──▶ HasFinalAnswer
//! ```
//!
//! Any engine error, an empty response or a round limit hit aborts the loop
//! with an [`AgentError`]. Tool failures never abort: they are fed back to
//! the engine as tool results.

use tracing::debug;

use super::message::{ChatRequest, TokenUsage, assistant_tool_calls_message, tool_message};
use super::provider::LlmProvider;
use super::registry::ToolRegistry;
use super::tool::{ToolCall, ToolResult};
use crate::error::AgentError;

/// Result of a completed loop run.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    /// Final answer text (all fragments of the last response, concatenated).
    pub answer: String,
    /// Number of engine exchanges performed.
    pub rounds: usize,
    /// Every tool result in execution order.
    pub tool_results: Vec<ToolResult>,
    /// Token usage summed over all rounds.
    pub usage: TokenUsage,
}

/// Loop state between engine exchanges.
#[derive(Debug)]
enum LoopState {
    AwaitingEngine,
    HasToolCalls {
        text: String,
        calls: Vec<ToolCall>,
    },
    HasFinalAnswer(String),
}

/// Assigns `call_<round>_<index>` to calls the engine left without an id.
fn backfill_ids(calls: &mut [ToolCall], round: usize) {
    for (index, call) in calls.iter_mut().enumerate() {
        if call.id.trim().is_empty() {
            call.id = format!("call_{round}_{index}");
        }
    }
}

/// Runs an agentic loop: engine → tool calls → tool results → engine → …
///
/// Continues until the engine responds without tool calls. Tool calls are
/// executed sequentially in the order proposed; none is reordered or
/// dropped.
///
/// # Arguments
///
/// * `provider` - Reasoning engine.
/// * `request` - Initial chat request (mutated in-place with assistant and
///   tool messages; it is the conversation state of this run).
/// * `registry` - Validates and executes tool calls.
/// * `max_rounds` - Maximum number of engine exchanges.
///
/// # Errors
///
/// Returns [`AgentError::RoundLimitExceeded`] if the engine still proposes
/// tool calls in round `max_rounds` (those calls are not executed),
/// [`AgentError::EmptyResponse`] if a response carries neither text nor
/// calls, and propagates provider errors.
pub async fn agentic_loop(
    provider: &dyn LlmProvider,
    request: &mut ChatRequest,
    registry: &ToolRegistry,
    max_rounds: usize,
) -> Result<LoopOutcome, AgentError> {
    let mut state = LoopState::AwaitingEngine;
    let mut rounds = 0;
    let mut usage = TokenUsage::default();
    let mut tool_results = Vec::new();

    loop {
        state = match state {
            LoopState::AwaitingEngine => {
                rounds += 1;
                let mut response = provider.chat(request).await?;
                usage.accumulate(response.usage);

                if response.tool_calls.is_empty() {
                    if !response.has_text() {
                        return Err(AgentError::EmptyResponse);
                    }
                    debug!(round = rounds, "agentic loop completed with final text response");
                    LoopState::HasFinalAnswer(response.text())
                } else if rounds >= max_rounds {
                    debug!(
                        round = rounds,
                        pending = response.tool_calls.len(),
                        "round limit reached with pending tool calls"
                    );
                    return Err(AgentError::RoundLimitExceeded { max_rounds });
                } else {
                    backfill_ids(&mut response.tool_calls, rounds);
                    LoopState::HasToolCalls {
                        text: response.text(),
                        calls: response.tool_calls,
                    }
                }
            }
            LoopState::HasToolCalls { text, calls } => {
                debug!(round = rounds, tool_count = calls.len(), "executing tool calls");

                request
                    .messages
                    .push(assistant_tool_calls_message(text, calls.clone()));

                for call in &calls {
                    let result = registry.invoke(call).await;
                    debug!(
                        round = rounds,
                        tool = call.name,
                        call_id = call.id,
                        is_error = result.is_error(),
                        "tool execution complete"
                    );
                    request
                        .messages
                        .push(tool_message(&result.tool_call_id, &result.content()));
                    tool_results.push(result);
                }
                LoopState::AwaitingEngine
            }
            LoopState::HasFinalAnswer(answer) => {
                return Ok(LoopOutcome {
                    answer,
                    rounds,
                    tool_results,
                    usage,
                });
            }
        };
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::agent::message::{ChatResponse, Role, system_message, user_message};
    use crate::agent::testing::{RecordingGateway, ScriptedProvider, text_response, tool_response};
    use crate::agent::tool::{FailureKind, ToolOutcome};
    use crate::gateway::QueryGateway;

    fn request() -> ChatRequest {
        ChatRequest {
            model: "test".to_string(),
            messages: vec![
                system_message("Eres un asistente de clínica."),
                user_message("consulta"),
            ],
            temperature: Some(0.0),
            max_tokens: Some(1024),
            tools: Vec::new(),
        }
    }

    fn registry(gateway: &Arc<RecordingGateway>) -> ToolRegistry {
        ToolRegistry::new(
            Arc::clone(gateway) as Arc<dyn QueryGateway>,
            Path::new("reports"),
            false,
        )
    }

    #[tokio::test]
    async fn test_list_specialties_scenario() {
        let gw = Arc::new(RecordingGateway::new(json!({"data": {"especialidades": [
            {"id": "1", "nombre": "Cardiología"},
            {"id": "2", "nombre": "Pediatría"}
        ]}})));
        let provider = ScriptedProvider::new(vec![
            Ok(tool_response(&[("call_a", "get_especialidades", "{}")])),
            Ok(text_response("Hay 2 especialidades: Cardiología y Pediatría.")),
        ]);
        let mut req = request();

        let outcome = agentic_loop(&provider, &mut req, &registry(&gw), 8)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));

        assert_eq!(outcome.answer, "Hay 2 especialidades: Cardiología y Pediatría.");
        assert_eq!(outcome.rounds, 2);
        assert_eq!(outcome.tool_results.len(), 1);
        assert!(!outcome.tool_results[0].is_error());
        assert_eq!(outcome.usage.total_tokens, 210);
        // system + user + assistant(tool_calls) + tool(result)
        assert_eq!(req.messages.len(), 4);
        assert_eq!(req.messages[3].role, Role::Tool);
        assert_eq!(req.messages[3].tool_call_id.as_deref(), Some("call_a"));
        assert!(req.messages[3].content.contains("Pediatría"));

        let seen = provider.requests();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].messages.len(), 4);
    }

    #[tokio::test]
    async fn test_empty_appointments_scenario() {
        let gw = Arc::new(RecordingGateway::new(json!({"data": {"citasPorUsuario": []}})));
        let provider = ScriptedProvider::new(vec![
            Ok(tool_response(&[(
                "call_1",
                "get_citas_por_usuario",
                r#"{"usuario_id": "42"}"#,
            )])),
            Ok(text_response("No tienes citas registradas.")),
        ]);
        let mut req = request();

        let outcome = agentic_loop(&provider, &mut req, &registry(&gw), 8)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));

        assert_eq!(outcome.answer, "No tienes citas registradas.");
        assert_eq!(outcome.tool_results[0].payload(), Some(&json!([])));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_reported_not_fatal() {
        let gw = Arc::new(RecordingGateway::unreachable());
        let provider = ScriptedProvider::new(vec![
            Ok(tool_response(&[("call_1", "get_medicos", "{}")])),
            Ok(text_response("No pude conectar con el sistema de la clínica.")),
        ]);
        let mut req = request();

        let outcome = agentic_loop(&provider, &mut req, &registry(&gw), 8)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));

        assert!(outcome.tool_results[0].is_error());
        assert!(matches!(
            outcome.tool_results[0].outcome,
            ToolOutcome::Failure {
                kind: FailureKind::Transport,
                ..
            }
        ));
        assert!(req.messages[3].content.contains("transport"));
        assert_eq!(outcome.answer, "No pude conectar con el sistema de la clínica.");
    }

    #[tokio::test]
    async fn test_round_limit_aborts_without_executing_last_calls() {
        let gw = Arc::new(RecordingGateway::new(json!({"data": {"citas": []}})));
        let provider =
            ScriptedProvider::repeating(tool_response(&[("call_x", "get_citas", "{}")]));
        let mut req = request();

        let result = agentic_loop(&provider, &mut req, &registry(&gw), 3).await;

        assert!(
            matches!(result, Err(AgentError::RoundLimitExceeded { max_rounds: 3 })),
            "expected RoundLimitExceeded, got: {result:?}"
        );
        assert_eq!(provider.requests().len(), 3);
        assert_eq!(gw.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_no_tools_returns_immediately() {
        let gw = Arc::new(RecordingGateway::new(json!({"data": {}})));
        let provider = ScriptedProvider::new(vec![Ok(text_response("Hola."))]);
        let mut req = request();

        let outcome = agentic_loop(&provider, &mut req, &registry(&gw), 8)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));

        assert_eq!(outcome.rounds, 1);
        assert!(outcome.tool_results.is_empty());
        assert_eq!(req.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_response_is_protocol_error() {
        let gw = Arc::new(RecordingGateway::new(json!({"data": {}})));
        let provider = ScriptedProvider::new(vec![Ok(ChatResponse::default())]);
        let mut req = request();

        let result = agentic_loop(&provider, &mut req, &registry(&gw), 8).await;
        assert!(matches!(result, Err(AgentError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_engine_error_propagates() {
        let gw = Arc::new(RecordingGateway::new(json!({"data": {}})));
        let provider = ScriptedProvider::new(vec![Err(AgentError::ApiRequest {
            message: "quota exceeded".to_string(),
            status: Some(429),
        })]);
        let mut req = request();

        let result = agentic_loop(&provider, &mut req, &registry(&gw), 8).await;
        assert!(matches!(
            result,
            Err(AgentError::ApiRequest {
                status: Some(429),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_calls_execute_in_proposal_order_and_fragments_concatenate() {
        let gw = Arc::new(RecordingGateway::new(json!({"data": {
            "citasPorMedico": [],
            "medicos": []
        }})));
        let final_response = ChatResponse {
            text_parts: vec!["El médico ".to_string(), "no tiene citas.".to_string()],
            ..ChatResponse::default()
        };
        let provider = ScriptedProvider::new(vec![
            Ok(tool_response(&[
                ("", "get_medicos", "{}"),
                ("", "get_citas_por_medico", r#"{"medico_id": 7}"#),
                ("", "tool_inexistente", "{}"),
            ])),
            Ok(final_response),
        ]);
        let mut req = request();

        let outcome = agentic_loop(&provider, &mut req, &registry(&gw), 8)
            .await
            .unwrap_or_else(|e| panic!("agentic_loop failed: {e}"));

        assert_eq!(outcome.answer, "El médico no tiene citas.");
        let ids: Vec<&str> = outcome
            .tool_results
            .iter()
            .map(|r| r.tool_call_id.as_str())
            .collect();
        assert_eq!(ids, vec!["call_1_0", "call_1_1", "call_1_2"]);
        let names: Vec<&str> = outcome.tool_results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["get_medicos", "get_citas_por_medico", "tool_inexistente"]);
        assert!(outcome.tool_results[2].is_error());

        let calls = gw.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].0.contains("medicos"));
        assert!(calls[1].0.contains("citasPorMedico"));
        // assistant turn + three tool turns
        assert_eq!(req.messages.len(), 6);
        assert_eq!(req.messages[2].tool_calls[0].id, "call_1_0");
    }
}
