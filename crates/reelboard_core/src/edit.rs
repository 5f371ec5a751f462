//! Minute/second editing of an item's time window.
//!
//! The user types into four text fields. Whatever they type is clamped into
//! `[0, 59]` immediately, so the session never holds an unusable value; the
//! only check left for commit time is `start < end`.

use crate::error::{CoreError, Result};
use crate::types::{ItemId, TimeRange};
use serde::{Deserialize, Serialize};

/// Upper bound for each minute/second field.
pub const MAX_COMPONENT: u64 = 59;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimeField {
    StartMinutes,
    StartSeconds,
    EndMinutes,
    EndSeconds,
}

/// Parse a raw text field the way the form does: leading integer or `0`,
/// then clamp into `[0, 59]`.
pub fn clamp_component(raw: &str) -> u64 {
    let trimmed = raw.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];

    if digits.is_empty() || negative {
        return 0;
    }
    // Anything too long for u64 is far above the cap anyway.
    digits
        .parse::<u64>()
        .map(|v| v.min(MAX_COMPONENT))
        .unwrap_or(MAX_COMPONENT)
}

/// Split a millisecond offset into `(minutes, seconds)`, dropping the
/// sub-second remainder.
pub fn decompose_ms(ms: u64) -> (u64, u64) {
    (ms / MS_PER_MINUTE, (ms % MS_PER_MINUTE) / MS_PER_SECOND)
}

fn compose_ms(minutes: u64, seconds: u64) -> u64 {
    (minutes * 60 + seconds) * MS_PER_SECOND
}

// ---------------------------------------------------------------------------
// EditSession
// ---------------------------------------------------------------------------

/// In-progress edit of one item's window. The four components are kept as
/// text because that is what the form binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub target_id: ItemId,
    pub start_minutes: String,
    pub start_seconds: String,
    pub end_minutes: String,
    pub end_seconds: String,
}

impl EditSession {
    pub fn new(target_id: ItemId, current: &TimeRange) -> Self {
        let (start_m, start_s) = decompose_ms(current.start_ms());
        let (end_m, end_s) = decompose_ms(current.end_ms());
        Self {
            target_id,
            start_minutes: start_m.to_string(),
            start_seconds: start_s.to_string(),
            end_minutes: end_m.to_string(),
            end_seconds: end_s.to_string(),
        }
    }

    pub fn component(&self, field: TimeField) -> &str {
        match field {
            TimeField::StartMinutes => &self.start_minutes,
            TimeField::StartSeconds => &self.start_seconds,
            TimeField::EndMinutes => &self.end_minutes,
            TimeField::EndSeconds => &self.end_seconds,
        }
    }

    fn component_mut(&mut self, field: TimeField) -> &mut String {
        match field {
            TimeField::StartMinutes => &mut self.start_minutes,
            TimeField::StartSeconds => &mut self.start_seconds,
            TimeField::EndMinutes => &mut self.end_minutes,
            TimeField::EndSeconds => &mut self.end_seconds,
        }
    }

    pub fn start_ms(&self) -> u64 {
        compose_ms(
            clamp_component(&self.start_minutes),
            clamp_component(&self.start_seconds),
        )
    }

    pub fn end_ms(&self) -> u64 {
        compose_ms(
            clamp_component(&self.end_minutes),
            clamp_component(&self.end_seconds),
        )
    }

    /// Convert the four fields into a range. Fails when start is not
    /// strictly before end.
    pub fn validate(&self) -> Result<TimeRange> {
        TimeRange::new(self.start_ms(), self.end_ms())
    }
}

pub fn validate(session: &EditSession) -> Result<TimeRange> {
    session.validate()
}

// ---------------------------------------------------------------------------
// TimeRangeEditor
// ---------------------------------------------------------------------------

/// Holds at most one open [`EditSession`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeRangeEditor {
    session: Option<EditSession>,
}

impl TimeRangeEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn editing_id(&self) -> Option<&ItemId> {
        self.session.as_ref().map(|s| &s.target_id)
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    /// Open a session for `item_id`. Items without a window start from the
    /// default one. An existing session, for any item, is replaced.
    pub fn start_edit(&mut self, item_id: ItemId, current: Option<&TimeRange>) -> &EditSession {
        if let Some(prev) = &self.session {
            if prev.target_id != item_id {
                tracing::debug!(
                    "Replacing edit session for {} with {}",
                    prev.target_id,
                    item_id
                );
            }
        }
        let current = current.copied().unwrap_or(TimeRange::DEFAULT_WINDOW);
        self.session.insert(EditSession::new(item_id, &current))
    }

    /// Store one typed field, clamped. Returns the stored text.
    pub fn update_component(&mut self, field: TimeField, value: &str) -> Result<&str> {
        let session = self.session.as_mut().ok_or(CoreError::NoEditSession)?;
        let slot = session.component_mut(field);
        *slot = clamp_component(value).to_string();
        Ok(slot.as_str())
    }

    pub fn cancel_edit(&mut self) {
        self.session = None;
    }

    /// Validate and close the session. On an invalid window the session stays
    /// open, untouched, so the user can fix one field instead of retyping all.
    pub fn commit_edit(&mut self) -> Result<(ItemId, TimeRange)> {
        let session = self.session.as_ref().ok_or(CoreError::NoEditSession)?;
        let range = session.validate()?;
        let target = session.target_id.clone();
        self.session = None;
        Ok((target, range))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with(start: (&str, &str), end: (&str, &str)) -> TimeRangeEditor {
        let mut editor = TimeRangeEditor::new();
        editor.start_edit(ItemId::from("shot-1"), None);
        editor.update_component(TimeField::StartMinutes, start.0).unwrap();
        editor.update_component(TimeField::StartSeconds, start.1).unwrap();
        editor.update_component(TimeField::EndMinutes, end.0).unwrap();
        editor.update_component(TimeField::EndSeconds, end.1).unwrap();
        editor
    }

    #[test]
    fn clamp_handles_garbage_input() {
        assert_eq!(clamp_component("-5"), 0);
        assert_eq!(clamp_component("abc"), 0);
        assert_eq!(clamp_component("99"), 59);
        assert_eq!(clamp_component(""), 0);
        assert_eq!(clamp_component(" 7 "), 7);
        assert_eq!(clamp_component("12abc"), 12);
        assert_eq!(clamp_component("+30"), 30);
        assert_eq!(clamp_component("123456789012345678901234567890"), 59);
    }

    #[test]
    fn update_component_stores_clamped_text() {
        let mut editor = TimeRangeEditor::new();
        editor.start_edit(ItemId::Int(1), None);
        assert_eq!(editor.update_component(TimeField::StartMinutes, "-5").unwrap(), "0");
        assert_eq!(editor.update_component(TimeField::StartSeconds, "abc").unwrap(), "0");
        assert_eq!(editor.update_component(TimeField::EndMinutes, "99").unwrap(), "59");
        let session = editor.session().unwrap();
        assert_eq!(session.component(TimeField::EndMinutes), "59");
    }

    #[test]
    fn update_without_session_fails() {
        let mut editor = TimeRangeEditor::new();
        assert!(matches!(
            editor.update_component(TimeField::EndSeconds, "3"),
            Err(CoreError::NoEditSession)
        ));
    }

    #[test]
    fn start_edit_decomposes_current_range() {
        let mut editor = TimeRangeEditor::new();
        let range = TimeRange::new(65_400, 130_999).unwrap();
        let session = editor.start_edit(ItemId::Int(4), Some(&range));
        assert_eq!(session.start_minutes, "1");
        assert_eq!(session.start_seconds, "5");
        assert_eq!(session.end_minutes, "2");
        assert_eq!(session.end_seconds, "10");
    }

    #[test]
    fn longest_range_seeds_in_bounds_and_commits_unchanged() {
        let mut editor = TimeRangeEditor::new();
        let range = TimeRange::new(3_540_000, TimeRange::MAX_MS).unwrap();
        let session = editor.start_edit(ItemId::Int(4), Some(&range));
        assert_eq!(session.start_minutes, "59");
        assert_eq!(session.end_minutes, "59");
        assert_eq!(session.end_seconds, "59");

        let (_, committed) = editor.commit_edit().unwrap();
        assert_eq!((committed.start_ms(), committed.end_ms()), (3_540_000, 3_599_000));
    }

    #[test]
    fn start_edit_without_range_uses_default_window() {
        let mut editor = TimeRangeEditor::new();
        editor.start_edit(ItemId::Int(4), None);
        let (_, range) = editor.commit_edit().unwrap();
        assert_eq!(range, TimeRange::DEFAULT_WINDOW);
    }

    #[test]
    fn start_edit_replaces_previous_session() {
        let mut editor = TimeRangeEditor::new();
        editor.start_edit(ItemId::Int(1), None);
        editor.update_component(TimeField::EndSeconds, "30").unwrap();
        editor.start_edit(ItemId::Int(2), None);
        assert_eq!(editor.editing_id(), Some(&ItemId::Int(2)));
        assert_eq!(editor.session().unwrap().end_seconds, "5");
    }

    #[test]
    fn commit_valid_range() {
        let mut editor = editor_with(("01", "05"), ("01", "10"));
        let (target, range) = editor.commit_edit().unwrap();
        assert_eq!(target, ItemId::from("shot-1"));
        assert_eq!(range.start_ms(), 65_000);
        assert_eq!(range.end_ms(), 70_000);
        assert!(!editor.is_editing());
    }

    #[test]
    fn commit_inverted_range_keeps_session_open() {
        let mut editor = editor_with(("00", "10"), ("00", "05"));
        let before = editor.session().cloned().unwrap();

        let err = editor.commit_edit().unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidRange {
                start_ms: 10_000,
                end_ms: 5_000
            }
        ));
        assert_eq!(editor.session(), Some(&before));
        assert_eq!(before.start_seconds, "10");
        assert_eq!(before.end_seconds, "5");
    }

    #[test]
    fn commit_equal_bounds_is_invalid() {
        let mut editor = editor_with(("2", "0"), ("1", "60"));
        // "60" clamps to 59, so end is 01:59 and start 02:00.
        assert!(editor.commit_edit().unwrap_err().is_invalid_range());

        let mut editor = editor_with(("1", "30"), ("1", "30"));
        assert!(editor.commit_edit().unwrap_err().is_invalid_range());
        assert!(editor.is_editing());
    }

    #[test]
    fn validate_matches_total_seconds_comparison() {
        let samples = [0u64, 1, 29, 30, 58, 59];
        for &sm in &samples {
            for &ss in &samples {
                for &em in &samples {
                    for &es in &samples {
                        let session = EditSession {
                            target_id: ItemId::Int(0),
                            start_minutes: sm.to_string(),
                            start_seconds: ss.to_string(),
                            end_minutes: em.to_string(),
                            end_seconds: es.to_string(),
                        };
                        let expected = sm * 60 + ss < em * 60 + es;
                        assert_eq!(validate(&session).is_ok(), expected);
                    }
                }
            }
        }
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut editor = editor_with(("0", "1"), ("0", "2"));
        editor.cancel_edit();
        editor.cancel_edit();
        assert!(!editor.is_editing());
        assert!(matches!(editor.commit_edit(), Err(CoreError::NoEditSession)));
    }
}
