//! Backend request/response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use venh_models::ProcessingMetadata;

/// JSON body of a `process_video` response.
///
/// Successful indirect responses carry `video_url` and `metadata`; failures
/// carry a `message` (our backend) or a `detail` (framework validation errors).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessResponse {
    #[serde(default)]
    pub video_url: Option<String>,
    /// Kept raw; converted leniently so an odd field never fails the run.
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Interpretation of a JSON `process_video` body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// Result must be fetched from `video_url`.
    Indirect {
        video_url: String,
        metadata: ProcessingMetadata,
    },
    /// Structured error payload.
    Failure { message: String },
    /// Neither of the above.
    Unrecognized,
}

impl ProcessResponse {
    /// Server-provided failure text, if any.
    pub fn error_message(&self) -> Option<String> {
        if let Some(message) = self.message.as_ref().filter(|m| !m.is_empty()) {
            return Some(message.clone());
        }
        if let Some(error) = self.error.as_ref().filter(|m| !m.is_empty()) {
            return Some(error.clone());
        }
        match &self.detail {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }

    pub fn is_error_status(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("error"))
    }

    pub fn into_shape(self) -> ResponseShape {
        if let (Some(video_url), Some(metadata)) = (&self.video_url, &self.metadata) {
            if !video_url.is_empty() {
                return ResponseShape::Indirect {
                    video_url: video_url.clone(),
                    metadata: ProcessingMetadata::from_value(metadata.clone()),
                };
            }
        }

        match self.error_message() {
            Some(message) => ResponseShape::Failure { message },
            None if self.is_error_status() => ResponseShape::Failure {
                message: "Processing failed".to_string(),
            },
            None => ResponseShape::Unrecognized,
        }
    }
}

/// Extract a human-readable message from an error body.
///
/// JSON bodies yield their `message`/`error`/`detail` field; anything else is
/// returned trimmed. Empty bodies yield `None`.
pub fn error_text(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<ProcessResponse>(trimmed) {
        Ok(parsed) => parsed.error_message().or_else(|| Some(trimmed.to_string())),
        Err(_) => Some(trimmed.to_string()),
    }
}

/// Job status returned by `GET /status/{job_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: Option<String>,
}
