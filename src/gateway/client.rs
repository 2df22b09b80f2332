//! reqwest-backed GraphQL client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::QueryGateway;
use super::queries;
use crate::error::{ConfigError, GatewayError};

/// Maximum number of body characters kept in a status error.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Request body of the backend query protocol.
#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Option<Map<String, Value>>,
}

/// Production [`QueryGateway`] speaking HTTP POST to a GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct GraphqlGateway {
    client: Client,
    endpoint: reqwest::Url,
    token: Option<String>,
}

impl GraphqlGateway {
    /// Creates a gateway for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for an empty endpoint and
    /// [`ConfigError::Invalid`] when it is not an absolute http(s) URL or the
    /// HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::Missing {
                var: "GRAPHQL_ENDPOINT",
            });
        }

        let url = reqwest::Url::parse(endpoint).map_err(|e| ConfigError::Invalid {
            var: "GRAPHQL_ENDPOINT",
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                var: "GRAPHQL_ENDPOINT",
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Invalid {
                var: "GRAPHQL_ENDPOINT",
                message: format!("HTTP client construction failed: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: url,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// Returns the configured endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Runs the specialties query to verify the backend is reachable.
    ///
    /// Returns the number of specialties reported by the backend.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the call fails or the body has no
    /// `especialidades` list.
    pub async fn check_connection(&self) -> Result<usize, GatewayError> {
        let body = self.execute(queries::ESPECIALIDADES, None).await?;
        body.get("data")
            .and_then(|d| d.get("especialidades"))
            .and_then(Value::as_array)
            .map(Vec::len)
            .ok_or_else(|| GatewayError::Decode {
                message: format!("unexpected response: {body}"),
            })
    }
}

#[async_trait]
impl QueryGateway for GraphqlGateway {
    async fn execute(
        &self,
        query: &str,
        variables: Option<Map<String, Value>>,
    ) -> Result<Value, GatewayError> {
        debug!(endpoint = %self.endpoint, has_variables = variables.is_some(), "sending backend query");

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&GraphqlRequest { query, variables });
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| GatewayError::Transport {
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| GatewayError::Decode {
            message: e.to_string(),
        })
    }
}
