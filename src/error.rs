//! Engine error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by every engine operation
///
/// All of these are local and recoverable. An operation that fails leaves the
/// thread exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Invalid inquiry id: {0:?}")]
    InvalidInquiry(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Wrong party: {0}")]
    WrongParty(String),
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Invalid price: {0}")]
    InvalidPrice(String),
    #[error("Invalid date/time: {0:?}")]
    InvalidDateTime(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidInquiry(_) => ErrorKind::InvalidInquiry,
            EngineError::NotFound(_) => ErrorKind::NotFound,
            EngineError::InvalidTransition(_) => ErrorKind::InvalidTransition,
            EngineError::WrongParty(_) => ErrorKind::WrongParty,
            EngineError::EmptyMessage => ErrorKind::EmptyMessage,
            EngineError::InvalidPrice(_) => ErrorKind::InvalidPrice,
            EngineError::InvalidDateTime(_) => ErrorKind::InvalidDateTime,
        }
    }

    pub(crate) fn message_not_found(inquiry_id: &str, index: usize) -> Self {
        EngineError::NotFound(format!("message {index} in inquiry {inquiry_id}"))
    }
}

/// Error classification for UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInquiry,
    NotFound,
    InvalidTransition,
    WrongParty,
    EmptyMessage,
    InvalidPrice,
    InvalidDateTime,
}

impl ErrorKind {
    /// Input errors the user can fix by editing the form they submitted
    pub fn is_user_input(self) -> bool {
        matches!(
            self,
            Self::EmptyMessage | Self::InvalidPrice | Self::InvalidDateTime
        )
    }
}
