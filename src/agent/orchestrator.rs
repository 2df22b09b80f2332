//! Per-request entry point of the agent.
//!
//! Each call to [`Orchestrator::ask`] starts a fresh conversation: rendered
//! system prompt, user message and the full tool catalog. Nothing is carried
//! over between requests.

use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use tracing::{debug, info, warn};

use super::agentic_loop::agentic_loop;
use super::client::create_provider;
use super::config::AgentConfig;
use super::message::{ChatRequest, system_message, user_message};
use super::prompt::{load_system_prompt, render_system_prompt};
use super::provider::LlmProvider;
use super::registry::ToolRegistry;
use super::response::AgentResponse;
use crate::error::AgentError;

/// Maximum accepted prompt length in characters.
const MAX_PROMPT_LEN: usize = 10_000;

/// Runs agent requests against a provider and a tool registry.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    registry: Arc<ToolRegistry>,
    config: AgentConfig,
    system_prompt: String,
}

impl Orchestrator {
    /// Creates an orchestrator from explicit parts.
    ///
    /// The system prompt template is loaded once from
    /// [`AgentConfig::system_prompt_file`], falling back to the compiled-in
    /// default.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        registry: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        let system_prompt = load_system_prompt(config.system_prompt_file.as_deref());
        Self {
            provider,
            registry,
            config,
            system_prompt,
        }
    }

    /// Builds the provider and the GraphQL-backed registry from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] for an unknown provider or an invalid backend
    /// endpoint.
    pub fn from_config(config: AgentConfig) -> Result<Self, AgentError> {
        let provider = create_provider(&config)?;
        let registry = Arc::new(ToolRegistry::from_config(&config)?);
        Ok(Self::new(provider, registry, config))
    }

    /// Tool registry used by this orchestrator.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Answers one natural-language request.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidPrompt`] for an empty or oversized
    /// prompt, [`AgentError::Timeout`] when the request exceeds
    /// [`AgentConfig::request_timeout`], and any error of the loop itself.
    pub async fn ask(&self, prompt: &str) -> Result<AgentResponse, AgentError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(AgentError::InvalidPrompt {
                message: "prompt must not be empty".to_string(),
            });
        }
        if prompt.chars().count() > MAX_PROMPT_LEN {
            return Err(AgentError::InvalidPrompt {
                message: format!("prompt exceeds {MAX_PROMPT_LEN} characters"),
            });
        }

        let start = Instant::now();
        let system = render_system_prompt(&self.system_prompt, Local::now().date_naive());
        let mut request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![system_message(&system), user_message(prompt)],
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
            tools: self.registry.describe_all(),
        };
        debug!(
            provider = self.provider.name(),
            model = self.config.model,
            tools = request.tools.len(),
            "starting agent request"
        );

        let run = agentic_loop(
            self.provider.as_ref(),
            &mut request,
            &self.registry,
            self.config.max_rounds,
        );
        let outcome = match tokio::time::timeout(self.config.request_timeout, run).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    timeout_secs = self.config.request_timeout.as_secs(),
                    "agent request timed out"
                );
                return Err(AgentError::Timeout {
                    seconds: self.config.request_timeout.as_secs(),
                });
            }
        };

        let response = AgentResponse::from_outcome(&outcome);
        info!(
            rounds = outcome.rounds,
            tool_calls = outcome.tool_results.len(),
            total_tokens = outcome.usage.total_tokens,
            elapsed_ms = start.elapsed().as_millis(),
            report = matches!(response, AgentResponse::Report { .. }),
            "agent request complete"
        );
        Ok(response)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::agent::message::{ChatResponse, Role};
    use crate::agent::testing::{RecordingGateway, ScriptedProvider, text_response, tool_response};
    use crate::report::ReportFormat;

    fn config(dir: &std::path::Path) -> AgentConfig {
        AgentConfig::builder()
            .api_key("test")
            .graphql_endpoint("http://localhost:4000/graphql")
            .reports_dir(dir)
            .max_rounds(4)
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    fn orchestrator(
        provider: Arc<ScriptedProvider>,
        gateway: RecordingGateway,
        config: AgentConfig,
    ) -> Orchestrator {
        let registry = ToolRegistry::new(Arc::new(gateway), config.reports_dir.clone(), false);
        Orchestrator::new(provider, Arc::new(registry), config)
    }

    #[tokio::test]
    async fn test_empty_prompt_is_rejected() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let agent = orchestrator(
            Arc::clone(&provider),
            RecordingGateway::new(json!({})),
            config(dir.path()),
        );

        let result = agent.ask("   ").await;
        assert!(matches!(result, Err(AgentError::InvalidPrompt { .. })));
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_request_carries_prompt_and_catalog() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(text_response("Hola."))]));
        let agent = orchestrator(
            Arc::clone(&provider),
            RecordingGateway::new(json!({})),
            config(dir.path()),
        );

        let response = agent
            .ask("¿Qué puedes hacer?")
            .await
            .unwrap_or_else(|e| panic!("ask: {e}"));
        assert_eq!(
            response,
            AgentResponse::Text {
                body: "Hola.".to_string()
            }
        );

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let first = &requests[0];
        assert_eq!(first.messages.len(), 2);
        assert_eq!(first.messages[0].role, Role::System);
        assert!(!first.messages[0].content.contains("{fecha_actual}"));
        assert_eq!(first.messages[1].role, Role::User);
        assert_eq!(first.messages[1].content, "¿Qué puedes hacer?");
        assert_eq!(first.tools.len(), agent.registry().specs().len());
    }

    #[tokio::test]
    async fn test_requests_are_independent() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let provider = Arc::new(ScriptedProvider::repeating(text_response("Ok.")));
        let agent = orchestrator(
            Arc::clone(&provider),
            RecordingGateway::new(json!({})),
            config(dir.path()),
        );

        for prompt in ["uno", "dos"] {
            agent
                .ask(prompt)
                .await
                .unwrap_or_else(|e| panic!("ask: {e}"));
        }
        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].messages.len(), 2);
        assert_eq!(requests[1].messages[1].content, "dos");
    }

    #[tokio::test]
    async fn test_export_request_yields_report() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let rows = json!({
            "rows": [
                {"id": "1", "fecha": "2025-03-14", "estado": "pendiente"},
                {"id": "2", "fecha": "2025-03-15", "estado": "confirmada"}
            ],
            "nombre_archivo": "citas"
        })
        .to_string();
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(tool_response(&[("c1", "generar_reporte_pdf", &rows)])),
            Ok(text_response("Reporte de citas generado.")),
        ]));
        let agent = orchestrator(provider, RecordingGateway::new(json!({})), config(dir.path()));

        let response = agent
            .ask("Genera un PDF con las citas")
            .await
            .unwrap_or_else(|e| panic!("ask: {e}"));
        assert_eq!(
            response,
            AgentResponse::Report {
                path: "reports/citas.pdf".to_string(),
                format: ReportFormat::Pdf,
                message: "Reporte de citas generado.".to_string(),
            }
        );
        assert!(dir.path().join("citas.pdf").is_file());
    }

    struct StalledProvider;

    #[async_trait]
    impl LlmProvider for StalledProvider {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, AgentError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(ChatResponse::default())
        }
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let mut config = config(dir.path());
        config.request_timeout = Duration::from_millis(50);
        let registry = ToolRegistry::new(
            Arc::new(RecordingGateway::new(json!({}))),
            dir.path(),
            false,
        );
        let agent = Orchestrator::new(Arc::new(StalledProvider), Arc::new(registry), config);

        let result = agent.ask("hola").await;
        assert!(matches!(result, Err(AgentError::Timeout { .. })));
    }
}
