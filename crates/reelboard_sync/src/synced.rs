use crate::coordinator::SyncCoordinator;
use crate::error::{Result, SyncError};
use reelboard_core::command::{Change, Command, MoveItemCommand, RankUpdateCommand, RemoveItemCommand};
use reelboard_core::edit::{EditSession, TimeField};
use reelboard_core::types::{Board, Item, ItemId, ItemKind, TimeRange};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A board whose edits are applied locally at once and persisted after.
///
/// Order-changing edits (moves, rank changes, removals) go to the backend one
/// at a time, in the order they were applied. If one fails, the order goes
/// back to the snapshot taken right before it, and any edits queued behind it
/// are dropped with [`SyncError::Superseded`] since their local effect is gone.
/// Time ranges committed and items inserted in the meantime are kept.
pub struct SyncedBoard {
    board: Mutex<Board>,
    coordinator: SyncCoordinator,
    reorder_slot: tokio::sync::Mutex<()>,
    /// Bumped under the board lock whenever the order is replaced wholesale
    /// (rollback, refresh).
    epoch: AtomicU64,
}

impl SyncedBoard {
    pub fn new(board: Board, coordinator: SyncCoordinator) -> Self {
        Self {
            board: Mutex::new(board),
            coordinator,
            reorder_slot: tokio::sync::Mutex::new(()),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn coordinator(&self) -> &SyncCoordinator {
        &self.coordinator
    }

    pub fn kind(&self) -> ItemKind {
        self.lock().kind
    }

    /// Copy of the current local state.
    pub fn board(&self) -> Board {
        self.lock().clone()
    }

    pub fn into_board(self) -> Board {
        self.board.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn items(&self) -> Vec<Item> {
        self.lock().collection.items().to_vec()
    }

    fn lock(&self) -> MutexGuard<'_, Board> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Ordering
    // -----------------------------------------------------------------------

    pub async fn move_item(&self, source_id: &ItemId, target_id: &ItemId) -> Result<Change> {
        self.run_ordered(Box::new(MoveItemCommand::new(
            source_id.clone(),
            target_id.clone(),
        )))
        .await
    }

    pub async fn update_rank(&self, item_id: &ItemId, new_rank: u32) -> Result<Change> {
        self.run_ordered(Box::new(RankUpdateCommand::new(item_id.clone(), new_rank)))
            .await
    }

    /// Delete an item. An edit session open on it is cancelled first.
    pub async fn remove_item(&self, item_id: &ItemId) -> Result<Change> {
        {
            let mut board = self.lock();
            if board.editing_id() == Some(item_id) {
                board.cancel_edit();
            }
        }
        self.run_ordered(Box::new(RemoveItemCommand::new(item_id.clone())))
            .await
    }

    /// Add an item that was generated elsewhere and already exists remotely.
    pub fn insert_generated(&self, item: Item) -> Result<Item> {
        let mut board = self.lock();
        Ok(board.collection.append(item)?.clone())
    }

    async fn run_ordered(&self, cmd: Box<dyn Command>) -> Result<Change> {
        let (kind, change, epoch) = {
            let mut board = self.lock();
            let change = cmd.execute(&mut board.collection)?;
            (board.kind, change, self.epoch.load(Ordering::SeqCst))
        };
        if change == Change::Unchanged {
            return Ok(change);
        }
        tracing::info!("{} applied locally: {:?}", cmd.description(), change);

        let _slot = self.reorder_slot.lock().await;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!("Dropping queued {:?}: board was rolled back", change);
            return Err(SyncError::Superseded);
        }

        match self.coordinator.persist_change(kind, &change).await {
            Ok(()) => Ok(change),
            Err(err) => {
                {
                    let mut board = self.lock();
                    cmd.rollback(&mut board.collection)?;
                    self.epoch.fetch_add(1, Ordering::SeqCst);
                }
                tracing::warn!("{} rolled back: {}", cmd.description(), err);
                Err(err)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Time range editing
    // -----------------------------------------------------------------------

    pub fn editing_id(&self) -> Option<ItemId> {
        self.lock().editing_id().cloned()
    }

    pub fn edit_session(&self) -> Option<EditSession> {
        self.lock().editor.session().cloned()
    }

    pub fn start_edit(&self, item_id: &ItemId) -> Result<EditSession> {
        Ok(self.lock().start_edit(item_id)?.clone())
    }

    pub fn update_component(&self, field: TimeField, value: &str) -> Result<String> {
        Ok(self.lock().update_component(field, value)?.to_string())
    }

    pub fn cancel_edit(&self) {
        self.lock().cancel_edit();
    }

    /// Validate, persist, then store the window on the item.
    ///
    /// An invalid window fails before any remote call and leaves the session
    /// open. A failed write leaves the item as it was; the session is already
    /// closed by then and is not reopened.
    pub async fn commit_edit(&self) -> Result<TimeRange> {
        let (kind, item_id, range) = {
            let mut board = self.lock();
            let (item_id, range) = board.commit_edit()?;
            (board.kind, item_id, range)
        };

        self.coordinator
            .persist_time_range(kind, &item_id, range)
            .await?;

        self.lock().collection.set_time_range(&item_id, range)?;
        tracing::info!("Time range for {} set to {}", item_id, range);
        Ok(range)
    }

    // -----------------------------------------------------------------------
    // Refresh
    // -----------------------------------------------------------------------

    /// Replace local items with the backend's. Waits for in-flight ordering
    /// writes; anything queued behind is dropped as superseded.
    pub async fn refresh(&self) -> Result<()> {
        let kind = self.kind();
        let _slot = self.reorder_slot.lock().await;
        let collection = self.coordinator.fetch(kind).await?;

        let mut board = self.lock();
        let stale_edit = board
            .editing_id()
            .is_some_and(|id| collection.get(id).is_none());
        if stale_edit {
            board.cancel_edit();
        }
        board.collection = collection;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
