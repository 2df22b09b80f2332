//! Route handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_util::io::ReaderStream;
use tracing::{error, warn};

use super::AppState;
use crate::agent::ResponseEnvelope;
use crate::error::AgentError;
use crate::report::is_plain_file_name;

/// Body of `POST /ask_agent/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// Natural-language request.
    pub prompt: String,
}

/// Error body, `{detail}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable failure description.
    pub detail: String,
}

/// Handler error mapped to a status code and an [`ErrorBody`].
#[derive(Debug)]
pub(super) enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<AgentError> for ApiError {
    fn from(e: AgentError) -> Self {
        match e {
            AgentError::InvalidPrompt { message } => Self::BadRequest(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Internal(msg) => {
                error!(error = %msg, "agent request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

pub(super) async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Welcome to the Medical Report Agent Backend! Use /ask_agent/ to interact with the agent."
    }))
}

pub(super) async fn ask_agent(
    State(state): State<AppState>,
    Json(body): Json<AskRequest>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let response = state.orchestrator.ask(&body.prompt).await?;
    Ok(Json(
        response
            .shape()
            .with_download_base(&state.public_base_url),
    ))
}

pub(super) async fn download_report(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    if !is_plain_file_name(&filename) {
        warn!(filename, "rejected report path");
        return Err(ApiError::NotFound("Report not found".to_string()));
    }

    let path = state.reports_dir.join(&filename);
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| ApiError::NotFound("Report not found".to_string()))?;

    let disposition = format!("attachment; filename=\"{filename}\"");
    Ok((
        [
            (header::CONTENT_TYPE, content_type(&filename).to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

fn content_type(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        "application/pdf"
    } else if lower.ends_with(".xlsx") {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    } else {
        "application/octet-stream"
    }
}
