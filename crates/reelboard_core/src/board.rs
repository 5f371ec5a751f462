use crate::edit::{EditSession, TimeField};
use crate::error::{CoreError, Result};
use crate::types::*;
use std::path::Path;
use uuid::Uuid;

const BOARD_EXTENSION: &str = "reelboard";

impl Board {
    /// Create a new empty board of the given kind.
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            collection: OrderedCollection::new(),
            editor: Default::default(),
        }
    }

    pub fn with_collection(mut self, collection: OrderedCollection) -> Self {
        self.collection = collection;
        self
    }

    /// Save board to a file as pretty-printed JSON.
    /// Automatically appends `.reelboard` extension if not present.
    /// Any open edit session is not written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = board_path(path.as_ref());
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a board from a JSON file. Ranks are renumbered on the way in.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let board: Board = serde_json::from_str(&data)?;
        Ok(board)
    }

    /// The item whose window is being edited, if any.
    pub fn editing_id(&self) -> Option<&ItemId> {
        self.editor.editing_id()
    }

    pub fn start_edit(&mut self, item_id: &ItemId) -> Result<&EditSession> {
        let item = self
            .collection
            .get(item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.clone()))?;
        let current = item.time_range;
        Ok(self.editor.start_edit(item_id.clone(), current.as_ref()))
    }

    pub fn update_component(&mut self, field: TimeField, value: &str) -> Result<&str> {
        self.editor.update_component(field, value)
    }

    pub fn cancel_edit(&mut self) {
        self.editor.cancel_edit();
    }

    /// Validate the open session and close it. The item itself is not touched
    /// here; callers store the range once it has been persisted.
    /// A session whose item has gone stays open.
    pub fn commit_edit(&mut self) -> Result<(ItemId, TimeRange)> {
        let item_id = self.editor.editing_id().ok_or(CoreError::NoEditSession)?;
        if self.collection.get(item_id).is_none() {
            return Err(CoreError::ItemNotFound(item_id.clone()));
        }
        self.editor.commit_edit()
    }
}

/// `path` with the `.reelboard` extension, as [`Board::save_to_file`] writes it.
pub fn board_path(path: &Path) -> std::path::PathBuf {
    if path.extension().and_then(|e| e.to_str()) == Some(BOARD_EXTENSION) {
        path.to_path_buf()
    } else {
        let mut p = path.to_path_buf();
        let mut name = p.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(BOARD_EXTENSION);
        p.set_file_name(name);
        p
    }
}
