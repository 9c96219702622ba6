//! Session error types.

use thiserror::Error;
use venh_client::{ClientError, ErrorKind};
use venh_models::RunId;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The run reached the `error` state.
    #[error("{message}")]
    Failed { kind: ErrorKind, message: String },

    /// A newer run replaced this one before it finished.
    #[error("Run {0} was superseded")]
    Superseded(RunId),
}

impl SessionError {
    pub fn is_superseded(&self) -> bool {
        matches!(self, SessionError::Superseded(_))
    }
}

impl From<&ClientError> for SessionError {
    fn from(err: &ClientError) -> Self {
        SessionError::Failed {
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}
