//! Client error types.

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// The backend answered with a failure.
    #[error("Processing failed: {} - {message}", fmt_status(.status))]
    BackendError {
        status: Option<u16>,
        message: String,
    },

    /// The backend answered with something we cannot interpret.
    #[error("Invalid response: {0}")]
    MalformedResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "error".to_string(), |s| s.to_string())
}

/// Coarse failure classes surfaced to the run controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UploadFailed,
    BackendError,
    MalformedResponse,
    InvalidRequest,
}

impl ClientError {
    pub fn backend(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::BackendError {
            status,
            message: message.into(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Network(e) if e.is_body() || e.is_decode() => {
                ErrorKind::MalformedResponse
            }
            ClientError::UploadFailed(_) | ClientError::Network(_) => ErrorKind::UploadFailed,
            ClientError::BackendError { .. } => ErrorKind::BackendError,
            ClientError::MalformedResponse(_) | ClientError::Json(_) => {
                ErrorKind::MalformedResponse
            }
            ClientError::InvalidRequest(_) | ClientError::InvalidUrl(_) => {
                ErrorKind::InvalidRequest
            }
        }
    }

    /// Message suitable for showing to the user.
    ///
    /// Backend failures show the server-provided message as is.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::BackendError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::BackendError { status, .. } => *status,
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = ClientError::backend(Some(500), "oom");
        assert_eq!(err.to_string(), "Processing failed: 500 - oom");
        assert_eq!(err.user_message(), "oom");
        assert_eq!(err.kind(), ErrorKind::BackendError);
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            ClientError::UploadFailed("refused".into()).kind(),
            ErrorKind::UploadFailed
        );
        assert_eq!(ClientError::malformed("x").kind(), ErrorKind::MalformedResponse);
        assert_eq!(
            ClientError::malformed("x").user_message(),
            "Invalid response: x"
        );
    }
}
