/*!
 * Annotation session orchestration.
 *
 * `AnnotationSession` owns the label registry, the mark table and the
 * latest validation report, and is the single entry point the
 * presentation layer talks to. Every mutating operation runs to
 * completion and ends with a full revalidation, so validity is never
 * observably stale after a call returns. The registry is an explicit
 * member passed to the validator on each pass, never ambient state.
 */

use log::{debug, info};

use crate::errors::{RegistryError, StoreError};
use crate::events::ChangeObserver;
use crate::interchange::{self, IntervalRow, LabelRow};
use crate::interval_store::{Interval, IntervalStore, MarkOutcome, TimeField};
use crate::label_registry::LabelGroupRegistry;
use crate::validator::{IntervalValidator, RowFlag, ValidationReport};

/// One annotation session: label set, mark table and current validity.
pub struct AnnotationSession {
    registry: LabelGroupRegistry,
    /// Ordered label rows as imported/added, kept so the export mirrors
    /// the import shape (ids and shortcuts pass through unparsed).
    label_rows: Vec<LabelRow>,
    store: IntervalStore,
    validator: IntervalValidator,
    report: ValidationReport,
}

impl AnnotationSession {
    /// Create an empty session with the default validator.
    pub fn new() -> Self {
        Self::with_validator(IntervalValidator::new())
    }

    /// Create an empty session with a custom validator.
    pub fn with_validator(validator: IntervalValidator) -> Self {
        Self {
            registry: LabelGroupRegistry::new(),
            label_rows: Vec::new(),
            store: IntervalStore::new(),
            validator,
            report: ValidationReport::default(),
        }
    }

    /// The label registry (read-only; mutate through session calls).
    pub fn registry(&self) -> &LabelGroupRegistry {
        &self.registry
    }

    /// The mark table (read-only; mutate through session calls).
    pub fn store(&self) -> &IntervalStore {
        &self.store
    }

    /// Validation report for the current table state.
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Validity flag of one row under the current report.
    pub fn row_flag(&self, index: usize) -> &RowFlag {
        self.report.flag(index)
    }

    /// Subscribe to "registry changed" notifications.
    pub fn subscribe_registry_changed(&mut self, observer: ChangeObserver) {
        self.registry.subscribe_changed(observer);
    }

    /// Subscribe to "intervals changed" notifications.
    pub fn subscribe_intervals_changed(&mut self, observer: ChangeObserver) {
        self.store.subscribe_changed(observer);
    }

    // ---- label management ------------------------------------------------

    /// Add a label row, or overwrite the row with the same name.
    pub fn add_label(&mut self, row: LabelRow) {
        self.registry.add_label(
            &row.name,
            &row.group,
            &row.predecessor_incompatibilities,
        );
        match self.label_rows.iter_mut().find(|r| r.name == row.name) {
            Some(existing) => *existing = row,
            None => self.label_rows.push(row),
        }
        self.revalidate();
    }

    /// Remove a label by name. Strict like the registry: removing an
    /// unknown name is a `LabelNotFound` error.
    pub fn remove_label(&mut self, name: &str) -> Result<(), RegistryError> {
        self.registry.remove_label(name)?;
        self.label_rows.retain(|r| r.name != name);
        self.revalidate();
        Ok(())
    }

    /// Drop the whole label set. Marks are untouched; their labels simply
    /// become unknown (and therefore unconstrained).
    pub fn clear_labels(&mut self) {
        self.registry.clear();
        self.label_rows.clear();
        self.revalidate();
    }

    /// Replace the label set from imported rows. Later rows win when
    /// names repeat, matching the registry's overwrite semantics.
    pub fn load_label_set(&mut self, rows: Vec<LabelRow>) {
        info!("Loading label set: {} rows", rows.len());
        self.registry.clear();
        for row in &rows {
            self.registry.add_label(
                &row.name,
                &row.group,
                &row.predecessor_incompatibilities,
            );
        }
        self.label_rows = rows;
        self.revalidate();
    }

    /// Export the label set in its import shape.
    pub fn dump_label_set(&self) -> Vec<LabelRow> {
        self.label_rows.clone()
    }

    // ---- mark table ------------------------------------------------------

    /// Record a mark event for `label` at the current playhead position.
    pub fn mark(&mut self, label: &str, time_ms: i64) -> MarkOutcome {
        let outcome = self.store.mark(label, time_ms);
        self.revalidate();
        outcome
    }

    /// Append a row directly (import helpers and tests).
    pub fn push_interval(&mut self, interval: Interval) {
        self.store.push(interval);
        self.revalidate();
    }

    /// Set a row's begin to a parsed millisecond position.
    pub fn set_begin_ms(&mut self, index: usize, ms: i64) -> Result<(), StoreError> {
        self.store.set_begin(index, TimeField::Millis(ms))?;
        self.revalidate();
        Ok(())
    }

    /// Set a row's end to a parsed millisecond position.
    pub fn set_end_ms(&mut self, index: usize, ms: i64) -> Result<(), StoreError> {
        self.store.set_end(index, TimeField::Millis(ms))?;
        self.revalidate();
        Ok(())
    }

    /// Set a row's begin from edited cell text. Unparseable text makes
    /// the row sentinel-invalid rather than failing the edit.
    pub fn set_begin_text(&mut self, index: usize, text: &str) -> Result<(), StoreError> {
        self.store.set_begin(index, TimeField::from_begin_text(text))?;
        self.revalidate();
        Ok(())
    }

    /// Set a row's end from edited cell text (`...` or empty reopens it).
    pub fn set_end_text(&mut self, index: usize, text: &str) -> Result<(), StoreError> {
        self.store.set_end(index, TimeField::from_end_text(text))?;
        self.revalidate();
        Ok(())
    }

    /// Delete a row by position.
    pub fn delete_interval(&mut self, index: usize) -> Result<Interval, StoreError> {
        let removed = self.store.remove(index)?;
        self.revalidate();
        Ok(removed)
    }

    /// Remove every mark row. The label set is untouched.
    pub fn clear_intervals(&mut self) {
        self.store.clear();
        self.revalidate();
    }

    /// Stable ascending sort of the table by begin time.
    pub fn sort_intervals(&mut self) {
        self.store.sort_by_begin();
        self.revalidate();
    }

    /// Replace the mark table from imported rows.
    pub fn load_intervals(&mut self, rows: &[IntervalRow]) {
        info!("Loading marks: {} rows", rows.len());
        let entries = rows.iter().map(interchange::interval_from_row).collect();
        self.store.replace_all(entries);
        self.revalidate();
    }

    /// Export the mark table in its import shape. Re-importing the dump
    /// reproduces identical validity results: parsed cells re-encode
    /// canonically, open ends keep their placeholder and sentinel-invalid
    /// cells keep their original text.
    pub fn dump_intervals(&self) -> Vec<IntervalRow> {
        self.store
            .entries()
            .iter()
            .map(interchange::interval_to_row)
            .collect()
    }

    /// Rows whose span contains the playhead position (open and
    /// malformed ends count as unbounded, as in the original table
    /// highlighting).
    pub fn rows_at_position(&self, position_ms: i64) -> Vec<usize> {
        self.store
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                e.begin
                    .millis()
                    .is_some_and(|beg| beg <= position_ms)
                    && match e.end.millis() {
                        Some(end) => position_ms <= end,
                        None => true,
                    }
            })
            .map(|(index, _)| index)
            .collect()
    }

    fn revalidate(&mut self) {
        self.report = self.validator.validate(self.store.entries(), &self.registry);
        debug!(
            "Revalidated: {} rows, {} conflicts",
            self.report.rows().len(),
            self.report.conflict_count
        );
    }
}

impl Default for AnnotationSession {
    fn default() -> Self {
        Self::new()
    }
}
