use crate::error::{CoreError, Result};
use crate::types::*;
use std::collections::{HashMap, HashSet};

impl OrderedCollection {
    pub fn new() -> Self {
        Self { items: vec![] }
    }

    /// Build a collection from items in arbitrary order, e.g. a backend listing.
    /// Items are ordered by their incoming rank (stable for ties) and then
    /// renumbered to `1..=N`. Duplicate ids are rejected.
    pub fn from_items(mut items: Vec<Item>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(&item.id) {
                return Err(CoreError::DuplicateId(item.id.clone()));
            }
        }

        items.sort_by_key(|i| i.rank);
        let mut collection = Self { items };
        collection.renumber();
        Ok(collection)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, item_id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|i| &i.id == item_id)
    }

    /// 0-based index of an item.
    pub fn position_of(&self, item_id: &ItemId) -> Option<usize> {
        self.items.iter().position(|i| &i.id == item_id)
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|i| i.id.clone()).collect()
    }

    /// Add a newly generated item at the end. Items without a window get
    /// [`TimeRange::DEFAULT_WINDOW`].
    pub fn append(&mut self, mut item: Item) -> Result<&Item> {
        if self.get(&item.id).is_some() {
            return Err(CoreError::DuplicateId(item.id));
        }
        if item.time_range.is_none() {
            item.time_range = Some(TimeRange::DEFAULT_WINDOW);
        }
        item.rank = self.items.len() as u32 + 1;
        self.items.push(item);
        Ok(&self.items[self.items.len() - 1])
    }

    /// Remove an item by its id. Returns the removed item; later items move up.
    pub fn remove_item(&mut self, item_id: &ItemId) -> Result<Item> {
        let pos = self
            .position_of(item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.clone()))?;
        let removed = self.items.remove(pos);
        self.renumber();
        Ok(removed)
    }

    /// Drag-and-drop move: take `source_id` out and put it where `target_id`
    /// currently sits. Dragging down lands after the target, dragging up lands
    /// before it. Unknown ids or `source_id == target_id` leave the order as is.
    pub fn move_item(&mut self, source_id: &ItemId, target_id: &ItemId) -> &[Item] {
        if source_id == target_id {
            return &self.items;
        }
        let (Some(from), Some(to)) = (self.position_of(source_id), self.position_of(target_id))
        else {
            return &self.items;
        };

        let item = self.items.remove(from);
        self.items.insert(to, item);
        self.renumber();
        &self.items
    }

    /// Put an item at `new_rank` (clamped to `1..=len`) and renumber the rest.
    /// Unknown ids leave the order as is.
    pub fn apply_rank_update(&mut self, item_id: &ItemId, new_rank: u32) -> &[Item] {
        let Some(from) = self.position_of(item_id) else {
            return &self.items;
        };

        let to = (new_rank.max(1) as usize).min(self.items.len()) - 1;
        if from != to {
            let item = self.items.remove(from);
            self.items.insert(to, item);
        }
        self.renumber();
        &self.items
    }

    pub fn set_time_range(&mut self, item_id: &ItemId, range: TimeRange) -> Result<()> {
        let item = self
            .items
            .iter_mut()
            .find(|i| &i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.clone()))?;
        item.time_range = Some(range);
        Ok(())
    }

    pub fn snapshot(&self) -> CollectionSnapshot {
        CollectionSnapshot(self.items.clone())
    }

    /// Replace the current items with a snapshot, ranks included.
    pub fn restore(&mut self, snapshot: CollectionSnapshot) {
        self.items = snapshot.0;
    }

    /// Put back the order and membership a snapshot recorded while keeping
    /// each surviving item's current fields. Items that are not in the
    /// snapshot were added since; they stay, after the restored ones.
    pub fn restore_order(&mut self, snapshot: CollectionSnapshot) {
        let recorded: HashSet<&ItemId> = snapshot.0.iter().map(|i| &i.id).collect();
        let mut surviving = HashMap::new();
        let mut added = Vec::new();
        for item in self.items.drain(..) {
            if recorded.contains(&item.id) {
                surviving.insert(item.id.clone(), item);
            } else {
                added.push(item);
            }
        }

        let mut items: Vec<Item> = snapshot
            .0
            .into_iter()
            .map(|old| surviving.remove(&old.id).unwrap_or(old))
            .collect();
        items.extend(added);
        self.items = items;
        self.renumber();
    }

    pub fn has_contiguous_ranks(&self) -> bool {
        self.items
            .iter()
            .enumerate()
            .all(|(idx, item)| item.rank as usize == idx + 1)
    }

    fn renumber(&mut self) {
        for (idx, item) in self.items.iter_mut().enumerate() {
            item.rank = idx as u32 + 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
