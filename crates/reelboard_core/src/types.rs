use crate::edit::TimeRangeEditor;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ItemId
// ---------------------------------------------------------------------------

/// Backend-assigned identifier. Some lists are keyed by integers, others by
/// strings, so both are accepted and compared as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(untagged)]
pub enum ItemId {
    Int(i64),
    Text(String),
}

impl ItemId {
    /// Fresh id for a locally generated item.
    pub fn generate() -> Self {
        ItemId::Text(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Int(n) => write!(f, "{}", n),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        ItemId::Int(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::Text(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId::Text(s)
    }
}

impl From<Uuid> for ItemId {
    fn from(id: Uuid) -> Self {
        ItemId::Text(id.to_string())
    }
}

impl FromStr for ItemId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(n) => ItemId::Int(n),
            Err(_) => ItemId::Text(s.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// TimeRange
// ---------------------------------------------------------------------------

/// A validated playback window. `start_ms < end_ms` always holds; the only
/// way to build one is through [`TimeRange::new`] (or deserialization, which
/// goes through the same check).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "RawTimeRange")]
pub struct TimeRange {
    start_ms: u64,
    end_ms: u64,
}

#[derive(Deserialize)]
struct RawTimeRange {
    start_ms: u64,
    end_ms: u64,
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = CoreError;

    fn try_from(raw: RawTimeRange) -> Result<Self, Self::Error> {
        TimeRange::new(raw.start_ms, raw.end_ms)
    }
}

impl TimeRange {
    /// Window given to freshly generated items.
    pub const DEFAULT_WINDOW: Self = Self {
        start_ms: 0,
        end_ms: 5_000,
    };

    /// Last millisecond an `MM:SS` window can reach.
    pub const MAX_MS: u64 = 3_599_999;

    /// `start_ms < end_ms <= MAX_MS`.
    pub fn new(start_ms: u64, end_ms: u64) -> crate::error::Result<Self> {
        if start_ms >= end_ms {
            return Err(CoreError::InvalidRange { start_ms, end_ms });
        }
        if end_ms > Self::MAX_MS {
            return Err(CoreError::RangeTooLong { end_ms });
        }
        Ok(Self { start_ms, end_ms })
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> u64 {
        self.end_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::DEFAULT_WINDOW
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", Clock(self.start_ms), Clock(self.end_ms))
    }
}

/// `MM:SS` rendering of a millisecond offset. Sub-second precision is dropped
/// the same way the editor drops it.
pub struct Clock(pub u64);

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.0 / 1_000;
        write!(f, "{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}

// ---------------------------------------------------------------------------
// ItemKind
// ---------------------------------------------------------------------------

/// Which list a board holds. Also used as the remote path segment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Storyboard,
    Script,
    Image,
    Voice,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Storyboard => "storyboard",
            ItemKind::Script => "script",
            ItemKind::Image => "image",
            ItemKind::Voice => "voice",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "storyboard" => Ok(ItemKind::Storyboard),
            "script" => Ok(ItemKind::Script),
            "image" => Ok(ItemKind::Image),
            "voice" => Ok(ItemKind::Voice),
            other => Err(format!("unknown item kind: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: ItemId,
    /// 1-based position. Owned by the collection; whatever a caller puts here
    /// is overwritten when the item is inserted.
    pub rank: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub time_range: Option<TimeRange>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rank: 0,
            title: title.into(),
            time_range: None,
        }
    }

    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = rank;
        self
    }
}

// ---------------------------------------------------------------------------
// OrderedCollection
// ---------------------------------------------------------------------------

/// Items in display order. Ranks are always exactly `1..=len`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<Item>", into = "Vec<Item>")]
pub struct OrderedCollection {
    pub(crate) items: Vec<Item>,
}

impl TryFrom<Vec<Item>> for OrderedCollection {
    type Error = CoreError;

    fn try_from(items: Vec<Item>) -> Result<Self, Self::Error> {
        OrderedCollection::from_items(items)
    }
}

impl From<OrderedCollection> for Vec<Item> {
    fn from(collection: OrderedCollection) -> Self {
        collection.items
    }
}

/// Full copy of a collection's items, taken before an optimistic mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot(pub(crate) Vec<Item>);

impl CollectionSnapshot {
    pub fn items(&self) -> &[Item] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// One list the user edits: its items plus the transient time-range editor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub kind: ItemKind,
    pub collection: OrderedCollection,
    #[serde(skip)]
    pub editor: TimeRangeEditor,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_range_requires_strict_order() {
        assert!(TimeRange::new(0, 5_000).is_ok());
        assert!(TimeRange::new(5_000, 5_000).unwrap_err().is_invalid_range());
        assert!(TimeRange::new(6_000, 5_000).unwrap_err().is_invalid_range());
    }

    #[test]
    fn time_range_stops_at_59_59() {
        assert!(TimeRange::new(0, TimeRange::MAX_MS).is_ok());
        assert!(matches!(
            TimeRange::new(3_600_000, 3_660_000),
            Err(CoreError::RangeTooLong { end_ms: 3_660_000 })
        ));
        assert!(TimeRange::new(0, 3_700_000).unwrap_err().is_invalid_range());

        let long = serde_json::from_str::<TimeRange>(r#"{"start_ms":0,"end_ms":3600000}"#);
        assert!(long.is_err());
    }

    #[test]
    fn time_range_display() {
        let r = TimeRange::new(65_000, 70_000).unwrap();
        assert_eq!(r.to_string(), "01:05 - 01:10");
        assert_eq!(r.duration_ms(), 5_000);
        assert_eq!(Clock(0).to_string(), "00:00");
        assert_eq!(Clock(3_599_999).to_string(), "59:59");
    }

    #[test]
    fn time_range_deserialize_rejects_inverted_window() {
        let ok: TimeRange = serde_json::from_str(r#"{"start_ms":0,"end_ms":5000}"#).unwrap();
        assert_eq!(ok, TimeRange::DEFAULT_WINDOW);

        let bad = serde_json::from_str::<TimeRange>(r#"{"start_ms":5000,"end_ms":5000}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn item_id_accepts_ints_and_strings() {
        let ids: Vec<ItemId> = serde_json::from_str(r#"[7, "scene-a"]"#).unwrap();
        assert_eq!(ids, vec![ItemId::Int(7), ItemId::from("scene-a")]);
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"[7,"scene-a"]"#);

        assert_eq!("42".parse::<ItemId>().unwrap(), ItemId::Int(42));
        assert_eq!("x1".parse::<ItemId>().unwrap(), ItemId::from("x1"));
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(ItemId::generate(), ItemId::generate());
    }

    #[test]
    fn item_kind_parse_and_display() {
        assert_eq!("Storyboard".parse::<ItemKind>().unwrap(), ItemKind::Storyboard);
        assert_eq!(ItemKind::Voice.to_string(), "voice");
        assert!("video".parse::<ItemKind>().is_err());
        assert_eq!(serde_json::to_string(&ItemKind::Image).unwrap(), r#""image""#);
    }

    #[test]
    fn collection_deserialize_normalizes_ranks() {
        let json = r#"[
            {"id": 3, "rank": 9, "title": "c"},
            {"id": 1, "rank": 2, "title": "a"},
            {"id": 2, "rank": 4, "title": "b"}
        ]"#;
        let collection: OrderedCollection = serde_json::from_str(json).unwrap();
        let ranks: Vec<(ItemId, u32)> = collection
            .items()
            .iter()
            .map(|i| (i.id.clone(), i.rank))
            .collect();
        assert_eq!(
            ranks,
            vec![(ItemId::Int(1), 1), (ItemId::Int(2), 2), (ItemId::Int(3), 3)]
        );
    }

    #[test]
    fn collection_deserialize_rejects_duplicate_ids() {
        let json = r#"[{"id": 1, "rank": 1}, {"id": 1, "rank": 2}]"#;
        assert!(serde_json::from_str::<OrderedCollection>(json).is_err());
    }
}
