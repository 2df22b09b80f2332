//! Shaping of loop outcomes into caller-facing responses.
//!
//! A request ends either with plain text or with a generated report. The
//! report case is detected from the tool trace, not from the answer text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::agentic_loop::LoopOutcome;
use super::tool::ToolOutcome;
use crate::report::ReportFormat;

/// Normalized result of one agent request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentResponse {
    /// Synthesized text answer.
    Text {
        /// Answer body.
        body: String,
    },
    /// A report file was generated.
    Report {
        /// Relative path, `reports/<file>`.
        path: String,
        /// File format.
        format: ReportFormat,
        /// Accompanying answer text.
        message: String,
    },
}

impl AgentResponse {
    /// Classifies a loop outcome.
    ///
    /// The most recent successful export with `generated: true` wins;
    /// otherwise the answer is plain text.
    #[must_use]
    pub fn from_outcome(outcome: &LoopOutcome) -> Self {
        let report = outcome.tool_results.iter().rev().find_map(|result| {
            let ToolOutcome::Success { payload } = &result.outcome else {
                return None;
            };
            if payload.get("generated").and_then(Value::as_bool) != Some(true) {
                return None;
            }
            let path = payload.get("path")?.as_str()?.to_string();
            let format = serde_json::from_value(payload.get("format")?.clone()).ok()?;
            Some((path, format))
        });

        match report {
            Some((path, format)) => Self::Report {
                path,
                format,
                message: outcome.answer.clone(),
            },
            None => Self::Text {
                body: outcome.answer.clone(),
            },
        }
    }

    /// Converts into the caller envelope.
    #[must_use]
    pub fn shape(&self) -> ResponseEnvelope {
        match self {
            Self::Text { body } => ResponseEnvelope::Text {
                content: body.clone(),
            },
            Self::Report {
                path,
                format,
                message,
            } => ResponseEnvelope::Report {
                path: path.clone(),
                format: *format,
                message: Some(message.clone()).filter(|m| !m.is_empty()),
                download_url: None,
            },
        }
    }
}

/// Wire shape returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResponseEnvelope {
    /// `{type: "text", content}`.
    Text {
        /// Answer text.
        content: String,
    },
    /// `{type: "report", path, format, message?, download_url?}`.
    Report {
        /// Relative path, `reports/<file>`.
        path: String,
        /// File format.
        format: ReportFormat,
        /// Accompanying answer text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        /// Absolute download link, set by the HTTP front end.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        download_url: Option<String>,
    },
}

impl ResponseEnvelope {
    /// Fills `download_url` from a public base URL; text envelopes are unchanged.
    #[must_use]
    pub fn with_download_base(self, base: &str) -> Self {
        match self {
            Self::Report {
                path,
                format,
                message,
                ..
            } => {
                let url = format!("{}/{}", base.trim_end_matches('/'), path);
                Self::Report {
                    path,
                    format,
                    message,
                    download_url: Some(url),
                }
            }
            text @ Self::Text { .. } => text,
        }
    }
}
