/*!
 * The ordered collection of labeled marks.
 *
 * Rows live in creation/import order; only the explicit sort reorders
 * them. Each row's time fields keep what the user or the import actually
 * supplied: a parsed millisecond position, an open end (mark-start without
 * a mark-stop yet), or the original malformed text. Malformed text is
 * preserved verbatim so an export reproduces the imported file.
 */

use std::collections::HashMap;

use log::{debug, warn};

use crate::errors::StoreError;
use crate::events::{ChangeHub, ChangeObserver};
use crate::timecode;

/// End-of-interval placeholder shown in tables and CSV files while a mark
/// is still being recorded.
pub const OPEN_END_PLACEHOLDER: &str = "...";

/// One time cell of a mark row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeField {
    /// A parsed millisecond position
    Millis(i64),
    /// End not recorded yet; compares as a sentinel maximum
    Open,
    /// Unparseable source text, kept verbatim (sentinel-invalid)
    Invalid(String),
}

impl TimeField {
    /// Parse a begin cell. Begins are always expected to carry a real
    /// timecode, so anything unparseable is sentinel-invalid.
    pub fn from_begin_text(text: &str) -> Self {
        match timecode::decode(text) {
            ms if ms >= 0 => TimeField::Millis(ms),
            _ => TimeField::Invalid(text.to_string()),
        }
    }

    /// Parse an end cell. An empty cell or the `...` placeholder means
    /// the mark is still open.
    pub fn from_end_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == OPEN_END_PLACEHOLDER {
            return TimeField::Open;
        }
        match timecode::decode(trimmed) {
            ms if ms >= 0 => TimeField::Millis(ms),
            _ => TimeField::Invalid(text.to_string()),
        }
    }

    /// Display/export text for this cell.
    pub fn display_text(&self) -> String {
        match self {
            TimeField::Millis(ms) => timecode::encode(*ms),
            TimeField::Open => OPEN_END_PLACEHOLDER.to_string(),
            TimeField::Invalid(text) => text.clone(),
        }
    }

    /// Millisecond value, if this cell parsed.
    pub fn millis(&self) -> Option<i64> {
        match self {
            TimeField::Millis(ms) => Some(*ms),
            _ => None,
        }
    }

    /// Whether this cell is sentinel-invalid.
    pub fn is_invalid(&self) -> bool {
        matches!(self, TimeField::Invalid(_))
    }

    /// Ordering key for the begin-time sort. Malformed cells take the
    /// decode sentinel and therefore sort before everything; an open cell
    /// sorts last.
    pub fn sort_key(&self) -> i64 {
        match self {
            TimeField::Millis(ms) => *ms,
            TimeField::Open => i64::MAX,
            TimeField::Invalid(_) => timecode::INVALID_MS,
        }
    }
}

// @struct: One labeled mark row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    // @field: Label name
    pub label: String,

    // @field: Begin cell
    pub begin: TimeField,

    // @field: End cell
    pub end: TimeField,
}

impl Interval {
    /// Create a closed interval from parsed positions.
    pub fn closed(label: &str, begin_ms: i64, end_ms: i64) -> Self {
        Interval {
            label: label.to_string(),
            begin: TimeField::Millis(begin_ms),
            end: TimeField::Millis(end_ms),
        }
    }

    /// Create an interval whose end has not been recorded yet.
    pub fn open(label: &str, begin_ms: i64) -> Self {
        Interval {
            label: label.to_string(),
            begin: TimeField::Millis(begin_ms),
            end: TimeField::Open,
        }
    }

    /// Whether the end is still unrecorded.
    pub fn is_open(&self) -> bool {
        matches!(self.end, TimeField::Open)
    }

    /// Whether either time cell is sentinel-invalid. Such rows are
    /// excluded from group checks of other rows and carry their own
    /// invalid-marker state.
    pub fn is_malformed(&self) -> bool {
        self.begin.is_invalid() || self.end.is_invalid()
    }

    /// End position used in overlap comparisons: an open end is a
    /// sentinel maximum, larger than any real timestamp.
    pub fn effective_end_ms(&self) -> i64 {
        match self.end {
            TimeField::Millis(ms) => ms,
            TimeField::Open => i64::MAX,
            TimeField::Invalid(_) => timecode::INVALID_MS,
        }
    }
}

/// What a mark event did to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// A new open row was appended at this index
    Opened(usize),
    /// The open row at this index received its end time
    Closed(usize),
    /// The label was flagged open but its open row no longer exists
    /// (deleted mid-recording); the flag was reset and no row changed
    Unmatched,
}

/// Ordered mark rows plus the per-label open/close toggle state.
#[derive(Default)]
pub struct IntervalStore {
    entries: Vec<Interval>,
    /// Toggle state per label name, initialized closed. Owned here and
    /// mutated only by [`mark`](Self::mark); row order never drives it.
    open_marks: HashMap<String, bool>,
    changed: ChangeHub,
}

impl IntervalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to the "intervals changed" notification, fired after
    /// every mutation.
    pub fn subscribe_changed(&mut self, observer: ChangeObserver) {
        self.changed.subscribe(observer);
    }

    /// All rows, in table order.
    pub fn entries(&self) -> &[Interval] {
        &self.entries
    }

    /// Row at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Interval> {
        self.entries.get(index)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether this label's toggle state is currently open.
    pub fn is_label_open(&self, label: &str) -> bool {
        self.open_marks.get(label).copied().unwrap_or(false)
    }

    /// Record a mark event for `label` at `time_ms`.
    ///
    /// Toggle protocol: a closed label opens a new row (begin = event
    /// time, end open); an open label stamps the end of its most recently
    /// created still-open row and closes. Each label toggles
    /// independently, so interleaved recordings for different labels are
    /// fine — and marks firing out of the expected order can leave several
    /// rows of one label open at once. That permissiveness is intentional.
    pub fn mark(&mut self, label: &str, time_ms: i64) -> MarkOutcome {
        let was_open = self.is_label_open(label);
        let outcome = if !was_open {
            self.entries.push(Interval::open(label, time_ms));
            self.open_marks.insert(label.to_string(), true);
            MarkOutcome::Opened(self.entries.len() - 1)
        } else {
            self.open_marks.insert(label.to_string(), false);
            match self
                .entries
                .iter()
                .rposition(|e| e.label == label && e.is_open())
            {
                Some(index) => {
                    self.entries[index].end = TimeField::Millis(time_ms);
                    MarkOutcome::Closed(index)
                }
                None => {
                    // The open row was deleted mid-recording; dropping
                    // the close keeps the mutation all-or-nothing.
                    warn!("Close mark for {:?} found no open row", label);
                    MarkOutcome::Unmatched
                }
            }
        };
        debug!("Mark {:?} at {}ms -> {:?}", label, time_ms, outcome);
        self.changed.notify();
        outcome
    }

    /// Append a row directly (import path and tests).
    pub fn push(&mut self, interval: Interval) {
        self.entries.push(interval);
        self.changed.notify();
    }

    /// Overwrite the begin cell of a row.
    pub fn set_begin(&mut self, index: usize, begin: TimeField) -> Result<(), StoreError> {
        let entry = self.entry_mut(index)?;
        entry.begin = begin;
        self.changed.notify();
        Ok(())
    }

    /// Overwrite the end cell of a row.
    pub fn set_end(&mut self, index: usize, end: TimeField) -> Result<(), StoreError> {
        let entry = self.entry_mut(index)?;
        entry.end = end;
        self.changed.notify();
        Ok(())
    }

    /// Delete a row by position.
    pub fn remove(&mut self, index: usize) -> Result<Interval, StoreError> {
        if index >= self.entries.len() {
            return Err(StoreError::RowOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        let removed = self.entries.remove(index);
        self.changed.notify();
        Ok(removed)
    }

    /// Remove every row and reset all toggle state.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.open_marks.clear();
        self.changed.notify();
    }

    /// Replace the whole table (bulk import). Toggle state resets to
    /// closed for every label; rows imported with an open end stay open
    /// rows, but the next mark for their label starts a fresh one.
    pub fn replace_all(&mut self, entries: Vec<Interval>) {
        debug!("Replacing mark table: {} rows", entries.len());
        self.entries = entries;
        self.open_marks.clear();
        self.changed.notify();
    }

    /// Stable ascending sort by begin time. Idempotent; row contents are
    /// untouched, only positions change. Malformed begins sort first
    /// (their key is the decode sentinel).
    pub fn sort_by_begin(&mut self) {
        self.entries.sort_by_key(|e| e.begin.sort_key());
        self.changed.notify();
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut Interval, StoreError> {
        let len = self.entries.len();
        self.entries
            .get_mut(index)
            .ok_or(StoreError::RowOutOfRange { index, len })
    }
}

impl std::fmt::Debug for IntervalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalStore")
            .field("entries", &self.entries)
            .field("open_marks", &self.open_marks)
            .finish()
    }
}
