/*!
 * Group-consistency validation for mark rows.
 *
 * After every mutation the whole table is re-checked against the label
 * registry. A row is flagged when it overlaps another row of the same
 * group, or when the nearest strictly-prior row of its group carries a
 * label listed as an incompatible predecessor. Ungrouped labels are never
 * constrained. Rows with unparseable time cells are reported separately
 * and take no part in the checks of other rows.
 *
 * The pass is a deterministic O(n²) recomputation over the current table,
 * bucketed by group to cut the constant factor; there is no incremental
 * index to maintain.
 */

use std::collections::HashMap;

use log::debug;

use crate::interval_store::Interval;
use crate::label_registry::LabelGroupRegistry;

/// Validity flag of a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFlag {
    /// No group constraint violated
    Valid,
    /// A time cell failed to parse; the row is structurally broken,
    /// which is distinct from a group violation
    Malformed,
    /// Shares at least one instant with another row of the same group
    GroupOverlap {
        /// Index of the first conflicting row found
        other: usize,
    },
    /// The nearest prior row of the group carries a forbidden label
    IncompatiblePredecessor {
        /// Index of the offending predecessor row
        predecessor: usize,
    },
}

impl std::fmt::Display for RowFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowFlag::Valid => write!(f, "ok"),
            RowFlag::Malformed => write!(f, "malformed time cell"),
            RowFlag::GroupOverlap { other } => {
                write!(f, "overlaps row {} of the same group", other + 1)
            }
            RowFlag::IncompatiblePredecessor { predecessor } => {
                write!(f, "incompatible predecessor at row {}", predecessor + 1)
            }
        }
    }
}

/// Validation result for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowResult {
    /// Row position in the store
    pub index: usize,
    /// What the pass decided for this row
    pub flag: RowFlag,
}

impl RowResult {
    /// Whether the row violates a group constraint. Malformed rows are
    /// never group-invalid; they carry their own marker state.
    pub fn is_group_conflict(&self) -> bool {
        matches!(
            self.flag,
            RowFlag::GroupOverlap { .. } | RowFlag::IncompatiblePredecessor { .. }
        )
    }
}

/// Result of validating the full mark table.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Per-row results, parallel to the store's row order
    rows: Vec<RowResult>,
    /// Rows flagged with a group violation
    pub conflict_count: usize,
    /// Rows with unparseable time cells
    pub malformed_count: usize,
}

impl ValidationReport {
    /// Per-row results, in row order.
    pub fn rows(&self) -> &[RowResult] {
        &self.rows
    }

    /// Flag of a single row; `Valid` for indexes past the table end.
    pub fn flag(&self, index: usize) -> &RowFlag {
        self.rows.get(index).map(|r| &r.flag).unwrap_or(&RowFlag::Valid)
    }

    /// Whether the row at `index` passed every group check.
    pub fn is_row_valid(&self, index: usize) -> bool {
        matches!(self.flag(index), RowFlag::Valid)
    }

    /// All rows that did not come back `Valid`.
    pub fn flagged_rows(&self) -> Vec<&RowResult> {
        self.rows
            .iter()
            .filter(|r| !matches!(r.flag, RowFlag::Valid))
            .collect()
    }

    /// Whether no row violates a group constraint. Malformed rows do not
    /// fail the table; they are surfaced through `malformed_count`.
    pub fn passed(&self) -> bool {
        self.conflict_count == 0
    }
}

/// Configuration for the validation pass.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Whether to flag same-group overlaps
    pub check_overlaps: bool,
    /// Whether to flag incompatible predecessors
    pub check_predecessors: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            check_overlaps: true,
            check_predecessors: true,
        }
    }
}

/// Validator over the full mark table.
pub struct IntervalValidator {
    config: ValidatorConfig,
}

impl IntervalValidator {
    /// Create a validator with default configuration.
    pub fn new() -> Self {
        Self {
            config: ValidatorConfig::default(),
        }
    }

    /// Create a validator with custom configuration.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Run the full pass over `entries` against `registry`.
    pub fn validate(
        &self,
        entries: &[Interval],
        registry: &LabelGroupRegistry,
    ) -> ValidationReport {
        let mut rows: Vec<RowResult> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| RowResult {
                index,
                flag: if entry.is_malformed() {
                    RowFlag::Malformed
                } else {
                    RowFlag::Valid
                },
            })
            .collect();

        // Bucket well-formed rows by group; ungrouped labels are never
        // constrained and unknown labels resolve to the empty group.
        let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            if entry.is_malformed() {
                continue;
            }
            let group = registry.group_name(&entry.label);
            if !group.is_empty() {
                groups.entry(group).or_default().push(index);
            }
        }

        for members in groups.values() {
            for &i in members {
                if self.config.check_overlaps {
                    if let Some(other) = Self::find_overlap(entries, members, i) {
                        rows[i].flag = RowFlag::GroupOverlap { other };
                        continue;
                    }
                }
                if self.config.check_predecessors {
                    if let Some(p) = Self::nearest_predecessor(entries, members, i) {
                        if registry.is_incompatible_predecessor(&entries[i].label, &entries[p].label)
                        {
                            rows[i].flag = RowFlag::IncompatiblePredecessor { predecessor: p };
                        }
                    }
                }
            }
        }

        let conflict_count = rows.iter().filter(|r| r.is_group_conflict()).count();
        let malformed_count = rows
            .iter()
            .filter(|r| matches!(r.flag, RowFlag::Malformed))
            .count();

        debug!(
            "Validation pass: {} rows, {} conflicts, {} malformed",
            rows.len(),
            conflict_count,
            malformed_count
        );

        ValidationReport {
            rows,
            conflict_count,
            malformed_count,
        }
    }

    /// First same-group row sharing at least one instant with row `i`.
    fn find_overlap(entries: &[Interval], members: &[usize], i: usize) -> Option<usize> {
        members
            .iter()
            .copied()
            .find(|&j| j != i && Self::intersects(&entries[i], &entries[j]))
    }

    /// Four-way symmetric interval-overlap test with inclusive bounds.
    /// Open ends compare as a sentinel maximum, so an open mark intersects
    /// every same-group row beginning at or after its own begin.
    fn intersects(a: &Interval, b: &Interval) -> bool {
        let (Some(beg_a), Some(beg_b)) = (a.begin.millis(), b.begin.millis()) else {
            return false;
        };
        let end_a = a.effective_end_ms();
        let end_b = b.effective_end_ms();

        (beg_b <= beg_a && beg_a <= end_b)
            || (beg_b <= end_a && end_a <= end_b)
            || (beg_a <= beg_b && beg_b <= end_a)
            || (beg_a <= end_b && end_b <= end_a)
    }

    /// Nearest strictly-prior same-group row by begin time: the candidate
    /// with the greatest begin below row `i`'s begin. Equal begins keep
    /// the earliest row position (stable original order).
    fn nearest_predecessor(entries: &[Interval], members: &[usize], i: usize) -> Option<usize> {
        let beg_i = entries[i].begin.millis()?;
        let mut best: Option<(i64, usize)> = None;

        for &j in members {
            if j == i {
                continue;
            }
            let Some(beg_j) = entries[j].begin.millis() else {
                continue;
            };
            if beg_j >= beg_i {
                continue;
            }
            // Strict > keeps the earliest index among equal begins,
            // because members are scanned in row order.
            if best.map_or(true, |(beg_best, _)| beg_j > beg_best) {
                best = Some((beg_j, j));
            }
        }

        best.map(|(_, j)| j)
    }
}

impl Default for IntervalValidator {
    fn default() -> Self {
        Self::new()
    }
}
