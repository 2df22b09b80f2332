//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.
//! It is built once at process start and passed by reference afterwards; nothing
//! re-reads the environment while a request is running.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default reasoning-engine base URL (Gemini's OpenAI-compatible endpoint).
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
/// Default reasoning-engine model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Default maximum engine rounds per request.
const DEFAULT_MAX_ROUNDS: usize = 8;
/// Default maximum tokens per engine response.
const DEFAULT_MAX_TOKENS: u32 = 2048;
/// Default whole-request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
/// Default backend call timeout in seconds.
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;
/// Default directory for generated reports.
const DEFAULT_REPORTS_DIR: &str = "reports";
/// Default public URL used to build report download links.
const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:8000";

/// Configuration for the clinic agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// LLM provider name (e.g., "openai" for any OpenAI-compatible API).
    pub provider: String,
    /// API key for the reasoning engine.
    pub api_key: String,
    /// Base URL of the reasoning engine API.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens per engine response.
    pub max_tokens: u32,
    /// Maximum engine rounds before the loop aborts.
    pub max_rounds: usize,
    /// Timeout wrapped around a whole request.
    pub request_timeout: Duration,
    /// GraphQL backend endpoint.
    pub graphql_endpoint: String,
    /// Optional bearer token for the backend.
    pub graphql_token: Option<String>,
    /// Timeout for a single backend call.
    pub backend_timeout: Duration,
    /// Directory where reports are written.
    pub reports_dir: PathBuf,
    /// Expose the raw `execute_graphql_query` tool to the engine.
    pub allow_raw_queries: bool,
    /// Optional file overriding the compiled-in system prompt.
    pub system_prompt_file: Option<PathBuf>,
    /// Public base URL of the HTTP front end, used for download links.
    pub public_base_url: String,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if the API key or backend endpoint
    /// is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    max_rounds: Option<usize>,
    request_timeout: Option<Duration>,
    graphql_endpoint: Option<String>,
    graphql_token: Option<String>,
    backend_timeout: Option<Duration>,
    reports_dir: Option<PathBuf>,
    allow_raw_queries: Option<bool>,
    system_prompt_file: Option<PathBuf>,
    public_base_url: Option<String>,
}

/// Reads a non-empty environment variable.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = env_var("CLINIC_AGENT_PROVIDER");
        }
        if self.api_key.is_none() {
            self.api_key = env_var("GOOGLE_API_KEY").or_else(|| env_var("CLINIC_AGENT_API_KEY"));
        }
        if self.base_url.is_none() {
            self.base_url = env_var("CLINIC_AGENT_BASE_URL");
        }
        if self.model.is_none() {
            self.model = env_var("CLINIC_AGENT_MODEL");
        }
        if self.max_rounds.is_none() {
            self.max_rounds = env_var("CLINIC_AGENT_MAX_ROUNDS").and_then(|v| v.parse().ok());
        }
        if self.request_timeout.is_none() {
            self.request_timeout = env_var("CLINIC_AGENT_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs);
        }
        if self.graphql_endpoint.is_none() {
            self.graphql_endpoint = env_var("GRAPHQL_ENDPOINT");
        }
        if self.graphql_token.is_none() {
            self.graphql_token = env_var("GRAPHQL_TOKEN");
        }
        if self.reports_dir.is_none() {
            self.reports_dir = env_var("CLINIC_AGENT_REPORTS_DIR").map(PathBuf::from);
        }
        if self.allow_raw_queries.is_none() {
            self.allow_raw_queries = env_var("CLINIC_AGENT_ALLOW_RAW_QUERIES")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));
        }
        if self.system_prompt_file.is_none() {
            self.system_prompt_file = env_var("CLINIC_AGENT_PROMPT_FILE").map(PathBuf::from);
        }
        if self.public_base_url.is_none() {
            self.public_base_url = env_var("CLINIC_AGENT_PUBLIC_URL");
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the reasoning-engine base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }

    /// Sets the max tokens per response.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Sets the maximum engine rounds.
    #[must_use]
    pub const fn max_rounds(mut self, n: usize) -> Self {
        self.max_rounds = Some(n);
        self
    }

    /// Sets the whole-request timeout.
    #[must_use]
    pub const fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Sets the GraphQL endpoint.
    #[must_use]
    pub fn graphql_endpoint(mut self, url: impl Into<String>) -> Self {
        self.graphql_endpoint = Some(url.into());
        self
    }

    /// Sets the backend bearer token.
    #[must_use]
    pub fn graphql_token(mut self, token: impl Into<String>) -> Self {
        self.graphql_token = Some(token.into());
        self
    }

    /// Sets the backend call timeout.
    #[must_use]
    pub const fn backend_timeout(mut self, duration: Duration) -> Self {
        self.backend_timeout = Some(duration);
        self
    }

    /// Sets the reports directory.
    #[must_use]
    pub fn reports_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reports_dir = Some(dir.into());
        self
    }

    /// Enables or disables the raw GraphQL tool.
    #[must_use]
    pub const fn allow_raw_queries(mut self, allow: bool) -> Self {
        self.allow_raw_queries = Some(allow);
        self
    }

    /// Sets the system prompt override file.
    #[must_use]
    pub fn system_prompt_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.system_prompt_file = Some(path.into());
        self
    }

    /// Sets the public base URL for download links.
    #[must_use]
    pub fn public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into());
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if the API key or GraphQL endpoint
    /// was not set, and [`ConfigError::Invalid`] for a zero round limit.
    pub fn build(self) -> Result<AgentConfig, ConfigError> {
        let api_key = self.api_key.ok_or(ConfigError::Missing {
            var: "GOOGLE_API_KEY",
        })?;
        let graphql_endpoint = self.graphql_endpoint.ok_or(ConfigError::Missing {
            var: "GRAPHQL_ENDPOINT",
        })?;

        let max_rounds = self.max_rounds.unwrap_or(DEFAULT_MAX_ROUNDS);
        if max_rounds == 0 {
            return Err(ConfigError::Invalid {
                var: "CLINIC_AGENT_MAX_ROUNDS",
                message: "must be at least 1".to_string(),
            });
        }

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: self.temperature.unwrap_or(0.0),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            max_rounds,
            request_timeout: self
                .request_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            graphql_endpoint,
            graphql_token: self.graphql_token,
            backend_timeout: self
                .backend_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS)),
            reports_dir: self
                .reports_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORTS_DIR)),
            allow_raw_queries: self.allow_raw_queries.unwrap_or(false),
            system_prompt_file: self.system_prompt_file,
            public_base_url: self
                .public_base_url
                .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = AgentConfig::builder()
            .api_key("test-key")
            .graphql_endpoint("http://localhost:4000/graphql")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "openai");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_rounds, DEFAULT_MAX_ROUNDS);
        assert_eq!(config.reports_dir, PathBuf::from("reports"));
        assert!(config.graphql_token.is_none());
        assert!(!config.allow_raw_queries);
    }

    #[test]
    fn test_builder_missing_api_key() {
        let result = AgentConfig::builder()
            .graphql_endpoint("http://localhost:4000/graphql")
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::Missing {
                var: "GOOGLE_API_KEY"
            })
        ));
    }

    #[test]
    fn test_builder_missing_endpoint() {
        let result = AgentConfig::builder().api_key("key").build();
        assert!(matches!(
            result,
            Err(ConfigError::Missing {
                var: "GRAPHQL_ENDPOINT"
            })
        ));
    }

    #[test]
    fn test_builder_rejects_zero_rounds() {
        let result = AgentConfig::builder()
            .api_key("key")
            .graphql_endpoint("http://localhost:4000/graphql")
            .max_rounds(0)
            .build();
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AgentConfig::builder()
            .api_key("key")
            .graphql_endpoint("http://backend/graphql")
            .graphql_token("secret")
            .model("gpt-4o-mini")
            .base_url("https://api.openai.com/v1")
            .max_rounds(3)
            .reports_dir("/tmp/out")
            .allow_raw_queries(true)
            .request_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.graphql_token.as_deref(), Some("secret"));
        assert_eq!(config.max_rounds, 3);
        assert_eq!(config.reports_dir, PathBuf::from("/tmp/out"));
        assert!(config.allow_raw_queries);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
