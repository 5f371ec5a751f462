//! Wire types and the remote store seam.
//!
//! The backend answers every call with a `{code, message, data}` envelope.
//! Nothing from `data` reaches the core until it has been decoded into typed
//! items here.

use crate::error::{Result, SyncError};
use crate::session::SessionContext;
use async_trait::async_trait;
use reelboard_core::command::Change;
use reelboard_core::types::{Item, ItemId, ItemKind, TimeRange};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Patch {
    Rank { rank: u32 },
    TimeRange { start_ms: u64, end_ms: u64 },
    Remove,
}

impl Patch {
    pub fn time_range(range: &TimeRange) -> Self {
        Patch::TimeRange {
            start_ms: range.start_ms(),
            end_ms: range.end_ms(),
        }
    }

    /// The remote call a local change needs, if any.
    pub fn for_change(change: &Change) -> Option<(ItemId, Patch)> {
        match change {
            Change::Unchanged => None,
            Change::Reranked { id, rank } => Some((id.clone(), Patch::Rank { rank: *rank })),
            Change::Removed { id } => Some((id.clone(), Patch::Remove)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteResponse {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RemoteResponse {
    pub fn ok(data: Option<Value>) -> Self {
        Self {
            code: 0,
            message: None,
            data,
        }
    }

    pub fn failed(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// `code == 0` yields the payload, anything else an error.
    pub fn into_result(self) -> Result<Option<Value>> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(SyncError::from_code(self.code, self.message))
        }
    }
}

/// One entry of a list response.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RemoteItem {
    pub id: ItemId,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub start_ms: Option<u64>,
    #[serde(default)]
    pub end_ms: Option<u64>,
}

impl TryFrom<RemoteItem> for Item {
    type Error = SyncError;

    fn try_from(remote: RemoteItem) -> Result<Self> {
        let time_range = match (remote.start_ms, remote.end_ms) {
            (Some(start), Some(end)) => Some(TimeRange::new(start, end)?),
            (None, None) => None,
            _ => {
                return Err(SyncError::MalformedResponse(format!(
                    "item {} has only one of start_ms/end_ms",
                    remote.id
                )))
            }
        };
        Ok(Item {
            id: remote.id,
            rank: remote.rank,
            title: remote.title,
            time_range,
        })
    }
}

/// Decode the `data` of a list response into items.
pub fn decode_items(data: Option<Value>) -> Result<Vec<Item>> {
    let data = data.ok_or_else(|| SyncError::MalformedResponse("missing data".into()))?;
    let remote: Vec<RemoteItem> = serde_json::from_value(data)
        .map_err(|e| SyncError::MalformedResponse(format!("item list: {e}")))?;
    remote.into_iter().map(Item::try_from).collect()
}

/// Backend persistence for one user's boards.
///
/// Implementations report transport problems as `Err`; a delivered response
/// with a non-zero code is returned as `Ok` and judged by the caller.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn update(
        &self,
        session: &SessionContext,
        kind: ItemKind,
        id: &ItemId,
        patch: &Patch,
    ) -> Result<RemoteResponse>;

    async fn list(&self, session: &SessionContext, kind: ItemKind) -> Result<RemoteResponse>;
}
