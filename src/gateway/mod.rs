//! Backend query gateway.
//!
//! A single seam over the clinic's GraphQL endpoint: send `{query, variables}`
//! and get back the full `{data, errors}` body. Everything above this module
//! works on typed payloads extracted from that body.

pub mod client;
pub mod model;
pub mod queries;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::GatewayError;

pub use client::GraphqlGateway;

/// Executes GraphQL documents against the clinic backend.
///
/// Implementations are stateless between calls and shared across requests.
#[async_trait]
pub trait QueryGateway: Send + Sync {
    /// Sends one query and returns the full response body.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport failure, a non-2xx status or a
    /// body that is not JSON. GraphQL-level `errors` are returned as part of
    /// the body, not as an error.
    async fn execute(
        &self,
        query: &str,
        variables: Option<Map<String, Value>>,
    ) -> Result<Value, GatewayError>;
}
