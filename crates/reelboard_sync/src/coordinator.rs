use crate::error::{Result, SyncError};
use crate::remote::{decode_items, Patch, RemoteStore};
use crate::session::SessionContext;
use reelboard_core::command::Change;
use reelboard_core::types::{ItemId, ItemKind, OrderedCollection, TimeRange};
use std::sync::Arc;

/// Pushes confirmed local changes to the remote store.
///
/// Holds no board state. A failed write comes back as `Err`; undoing the local
/// change is the caller's job, since only the caller holds the snapshot.
#[derive(Clone)]
pub struct SyncCoordinator {
    store: Arc<dyn RemoteStore>,
    session: SessionContext,
}

impl SyncCoordinator {
    pub fn new(store: Arc<dyn RemoteStore>, session: SessionContext) -> Self {
        Self { store, session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub async fn persist_reorder(&self, kind: ItemKind, item_id: &ItemId, new_rank: u32) -> Result<()> {
        self.push(kind, item_id, Patch::Rank { rank: new_rank }).await
    }

    pub async fn persist_time_range(
        &self,
        kind: ItemKind,
        item_id: &ItemId,
        range: TimeRange,
    ) -> Result<()> {
        self.push(kind, item_id, Patch::time_range(&range)).await
    }

    pub async fn persist_removal(&self, kind: ItemKind, item_id: &ItemId) -> Result<()> {
        self.push(kind, item_id, Patch::Remove).await
    }

    /// Persist whatever a command reported. `Unchanged` makes no call.
    pub async fn persist_change(&self, kind: ItemKind, change: &Change) -> Result<()> {
        match Patch::for_change(change) {
            Some((id, patch)) => self.push(kind, &id, patch).await,
            None => Ok(()),
        }
    }

    /// Load a board from the backend, validated and renumbered.
    pub async fn fetch(&self, kind: ItemKind) -> Result<OrderedCollection> {
        let response = self.store.list(&self.session, kind).await;
        let data = self.check(response.and_then(|r| r.into_result()))?;
        let items = decode_items(data)?;
        tracing::info!("Fetched {} {} items", items.len(), kind);
        Ok(OrderedCollection::from_items(items)?)
    }

    async fn push(&self, kind: ItemKind, item_id: &ItemId, patch: Patch) -> Result<()> {
        if self.session.is_expired() {
            tracing::warn!("Skipping {:?} for {} {}: session expired", patch, kind, item_id);
            return Err(SyncError::Unauthorized {
                message: "session expired".into(),
            });
        }

        tracing::debug!("Persisting {:?} for {} {}", patch, kind, item_id);
        let response = self.store.update(&self.session, kind, item_id, &patch).await;
        self.check(response.and_then(|r| r.into_result()))
            .map(|_| ())
            .map_err(|e| {
                tracing::warn!("Persisting {:?} for {} {} failed: {}", patch, kind, item_id, e);
                e
            })
    }

    fn check<T>(&self, outcome: Result<T>) -> Result<T> {
        if let Err(e) = &outcome {
            if e.is_unauthorized() {
                self.session.expire();
            }
        }
        outcome
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
