use crate::error::{CoreError, Result};
use crate::types::*;
use std::cell::RefCell;

/// What an applied command changed, in the terms the backend understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Unchanged,
    Reranked { id: ItemId, rank: u32 },
    Removed { id: ItemId },
}

/// A local mutation that can be rolled back to the prior order.
///
/// Commands snapshot the whole collection before they run. Rollback puts the
/// snapshot's order and membership back in full, but keeps field values
/// (such as a time range) written to an item after the snapshot was taken.
pub trait Command: std::fmt::Debug + Send {
    fn execute(&self, collection: &mut OrderedCollection) -> Result<Change>;
    fn rollback(&self, collection: &mut OrderedCollection) -> Result<()>;
    fn description(&self) -> &str;
}

fn restore_saved(
    saved: &RefCell<Option<CollectionSnapshot>>,
    collection: &mut OrderedCollection,
) -> Result<()> {
    let snapshot = saved.borrow_mut().take().ok_or(CoreError::NothingToRollback)?;
    collection.restore_order(snapshot);
    Ok(())
}

// ---------------------------------------------------------------------------
// MoveItemCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct MoveItemCommand {
    source_id: ItemId,
    target_id: ItemId,
    before: RefCell<Option<CollectionSnapshot>>,
}

impl MoveItemCommand {
    pub fn new(source_id: ItemId, target_id: ItemId) -> Self {
        Self {
            source_id,
            target_id,
            before: RefCell::new(None),
        }
    }
}

impl Command for MoveItemCommand {
    fn execute(&self, collection: &mut OrderedCollection) -> Result<Change> {
        let snapshot = collection.snapshot();
        let old_pos = collection.position_of(&self.source_id);
        collection.move_item(&self.source_id, &self.target_id);
        let new_pos = collection.position_of(&self.source_id);
        *self.before.borrow_mut() = Some(snapshot);

        match (old_pos, new_pos) {
            (Some(old), Some(new)) if old != new => Ok(Change::Reranked {
                id: self.source_id.clone(),
                rank: new as u32 + 1,
            }),
            _ => Ok(Change::Unchanged),
        }
    }

    fn rollback(&self, collection: &mut OrderedCollection) -> Result<()> {
        restore_saved(&self.before, collection)
    }

    fn description(&self) -> &str {
        "Move item"
    }
}

// ---------------------------------------------------------------------------
// RankUpdateCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct RankUpdateCommand {
    item_id: ItemId,
    new_rank: u32,
    before: RefCell<Option<CollectionSnapshot>>,
}

impl RankUpdateCommand {
    pub fn new(item_id: ItemId, new_rank: u32) -> Self {
        Self {
            item_id,
            new_rank,
            before: RefCell::new(None),
        }
    }
}

impl Command for RankUpdateCommand {
    fn execute(&self, collection: &mut OrderedCollection) -> Result<Change> {
        let snapshot = collection.snapshot();
        let old_pos = collection.position_of(&self.item_id);
        collection.apply_rank_update(&self.item_id, self.new_rank);
        let new_pos = collection.position_of(&self.item_id);
        *self.before.borrow_mut() = Some(snapshot);

        match (old_pos, new_pos) {
            (Some(old), Some(new)) if old != new => Ok(Change::Reranked {
                id: self.item_id.clone(),
                rank: new as u32 + 1,
            }),
            _ => Ok(Change::Unchanged),
        }
    }

    fn rollback(&self, collection: &mut OrderedCollection) -> Result<()> {
        restore_saved(&self.before, collection)
    }

    fn description(&self) -> &str {
        "Change rank"
    }
}

// ---------------------------------------------------------------------------
// RemoveItemCommand
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct RemoveItemCommand {
    item_id: ItemId,
    before: RefCell<Option<CollectionSnapshot>>,
}

impl RemoveItemCommand {
    pub fn new(item_id: ItemId) -> Self {
        Self {
            item_id,
            before: RefCell::new(None),
        }
    }
}

impl Command for RemoveItemCommand {
    fn execute(&self, collection: &mut OrderedCollection) -> Result<Change> {
        let snapshot = collection.snapshot();
        collection.remove_item(&self.item_id)?;
        *self.before.borrow_mut() = Some(snapshot);
        Ok(Change::Removed {
            id: self.item_id.clone(),
        })
    }

    fn rollback(&self, collection: &mut OrderedCollection) -> Result<()> {
        restore_saved(&self.before, collection)
    }

    fn description(&self) -> &str {
        "Remove item"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
