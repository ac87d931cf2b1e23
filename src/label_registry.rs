/*!
 * Label and group bookkeeping.
 *
 * Labels are grouped by name; labels sharing a non-empty group name are
 * mutually constrained during validation. A group is implicit: it exists
 * exactly as long as at least one label references it. Each label also
 * carries a directional set of predecessor incompatibilities, parsed from
 * the `;`-delimited spec text used by the label table and the CSV
 * boundary.
 */

use std::collections::{HashMap, HashSet};

use log::debug;
use once_cell::sync::Lazy;

use crate::errors::RegistryError;
use crate::events::{ChangeHub, ChangeObserver};

/// Delimiter of the predecessor-incompatibility spec text.
pub const INCOMPATIBILITY_DELIMITER: char = ';';

static EMPTY_SET: Lazy<HashSet<String>> = Lazy::new(HashSet::new);

// @struct: A registered label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    // @field: Unique label name
    pub name: String,

    // @field: Group name, "" = ungrouped
    pub group: String,

    // @field: Labels that must not immediately precede this one
    pub predecessor_incompatibilities: HashSet<String>,
}

/// Parse a `;`-delimited incompatibility spec into a set of label names.
///
/// Whitespace around entries is dropped, empty entries are ignored, so
/// `""` and `";;"` both mean "no incompatibilities".
pub fn parse_incompatibility_spec(spec: &str) -> HashSet<String> {
    spec.split(INCOMPATIBILITY_DELIMITER)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Registry of labels, their group assignment and sequencing rules.
#[derive(Default)]
pub struct LabelGroupRegistry {
    labels: HashMap<String, Label>,
    changed: ChangeHub,
}

impl LabelGroupRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to the "registry changed" notification, fired after
    /// every add, remove and clear.
    pub fn subscribe_changed(&mut self, observer: ChangeObserver) {
        self.changed.subscribe(observer);
    }

    /// Register a label, or overwrite its group and incompatibility set
    /// if the name is already known.
    pub fn add_label(&mut self, name: &str, group: &str, incompatibility_spec: &str) {
        let label = Label {
            name: name.to_string(),
            group: group.to_string(),
            predecessor_incompatibilities: parse_incompatibility_spec(incompatibility_spec),
        };
        debug!(
            "Registering label {:?} (group {:?}, {} incompatibilities)",
            name,
            group,
            label.predecessor_incompatibilities.len()
        );
        self.labels.insert(name.to_string(), label);
        self.changed.notify();
    }

    /// Remove a label. The registry is strict: removing an unknown name
    /// is an error, so callers choose lenient handling explicitly by
    /// checking [`contains`](Self::contains) first.
    ///
    /// Groups are derived from the label map, so the group of the removed
    /// label ceases to exist automatically once its last member is gone.
    pub fn remove_label(&mut self, name: &str) -> Result<(), RegistryError> {
        let removed = self
            .labels
            .remove(name)
            .ok_or_else(|| RegistryError::LabelNotFound(name.to_string()))?;

        if !removed.group.is_empty() && !self.group_exists(&removed.group) {
            debug!("Group {:?} lost its last label", removed.group);
        }
        self.changed.notify();
        Ok(())
    }

    /// Remove every label (and with them, every group).
    pub fn clear(&mut self) {
        self.labels.clear();
        self.changed.notify();
    }

    /// Group name of a label. Returns `""` for unknown or ungrouped
    /// names; the empty string is the load-bearing "no group" value, not
    /// an absence.
    pub fn group_name(&self, label: &str) -> &str {
        self.labels.get(label).map(|l| l.group.as_str()).unwrap_or("")
    }

    /// Predecessor incompatibilities of a label. Ungrouped and unknown
    /// labels are never constrained, so they yield the empty set even if
    /// spec text was supplied for them.
    pub fn predecessor_incompatibilities(&self, label: &str) -> &HashSet<String> {
        match self.labels.get(label) {
            Some(l) if !l.group.is_empty() => &l.predecessor_incompatibilities,
            _ => &EMPTY_SET,
        }
    }

    /// Whether `predecessor` must not immediately precede `label` within
    /// its group. Directional: `(a, b)` and `(b, a)` are independent.
    pub fn is_incompatible_predecessor(&self, label: &str, predecessor: &str) -> bool {
        self.predecessor_incompatibilities(label).contains(predecessor)
    }

    /// Whether a label with this exact name is registered.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains_key(label)
    }

    /// Whether at least one label references this non-empty group name.
    pub fn group_exists(&self, group: &str) -> bool {
        !group.is_empty() && self.labels.values().any(|l| l.group == group)
    }

    /// Number of registered labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the registry has no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl std::fmt::Debug for LabelGroupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelGroupRegistry")
            .field("labels", &self.labels)
            .finish()
    }
}
