use crate::types::ItemId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Duplicate item id: {0}")]
    DuplicateId(ItemId),

    #[error("Invalid time range: start {start_ms}ms must be before end {end_ms}ms")]
    InvalidRange { start_ms: u64, end_ms: u64 },

    #[error("Time range ends at {end_ms}ms, past the 59:59 limit")]
    RangeTooLong { end_ms: u64 },

    #[error("No time range edit in progress")]
    NoEditSession,

    #[error("Nothing to roll back")]
    NothingToRollback,
}

impl CoreError {
    pub fn is_invalid_range(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidRange { .. } | CoreError::RangeTooLong { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
