use reelboard_core::CoreError;
use thiserror::Error;

/// Response code the backend uses for an expired or missing login.
pub const UNAUTHORIZED_CODE: i64 = 401;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote rejected update (code {code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("session expired: {message}")]
    Unauthorized { message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("discarded after an earlier change was rolled back")]
    Superseded,

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SyncError {
    /// Map a non-zero response code to an error.
    pub fn from_code(code: i64, message: Option<String>) -> Self {
        let message = message.unwrap_or_default();
        if code == UNAUTHORIZED_CODE {
            SyncError::Unauthorized { message }
        } else {
            SyncError::Rejected { code, message }
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SyncError::Unauthorized { .. })
    }

    pub fn is_invalid_range(&self) -> bool {
        matches!(self, SyncError::Core(e) if e.is_invalid_range())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
