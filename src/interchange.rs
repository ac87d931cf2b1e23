/*!
 * CSV-shaped row types for the import/export boundary.
 *
 * The contract is the row shapes, not a file format: a label-set row is
 * `(id, name, shortcut, group?, pred_incompatibilities?)` and a mark row
 * is `(label, begin_text, end_text)`. This module also carries a minimal
 * quote-aware comma-delimited record codec so the CLI can read and write
 * the same files the original tool produced; any serializer emitting
 * equivalent records satisfies the contract.
 */

use serde::{Deserialize, Serialize};

use crate::errors::InterchangeError;
use crate::interval_store::{Interval, TimeField};

/// One row of a label-set file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRow {
    /// Opaque numeric id, passed through unparsed
    pub id: String,
    /// Label name (the registry key)
    pub name: String,
    /// Keyboard shortcut spec, opaque to the core
    pub shortcut: String,
    /// Group name, "" = ungrouped
    #[serde(default)]
    pub group: String,
    /// `;`-delimited predecessor-incompatibility list
    #[serde(default)]
    pub predecessor_incompatibilities: String,
}

impl LabelRow {
    /// Build from delimited fields. Group and incompatibilities are
    /// optional trailing fields defaulting to `""`.
    pub fn from_fields(fields: &[String], record: &str) -> Result<Self, InterchangeError> {
        if fields.len() < 3 {
            return Err(InterchangeError::MissingFields {
                found: fields.len(),
                expected: 3,
                record: record.to_string(),
            });
        }
        Ok(LabelRow {
            id: fields[0].clone(),
            name: fields[1].clone(),
            shortcut: fields[2].clone(),
            group: fields.get(3).cloned().unwrap_or_default(),
            predecessor_incompatibilities: fields.get(4).cloned().unwrap_or_default(),
        })
    }

    /// Delimited fields, mirroring [`from_fields`](Self::from_fields).
    pub fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.shortcut.clone(),
            self.group.clone(),
            self.predecessor_incompatibilities.clone(),
        ]
    }
}

/// One row of a marks file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalRow {
    /// Label name
    pub label: String,
    /// Begin timecode text
    pub begin: String,
    /// End timecode text; `...` or empty while the mark is open
    #[serde(default)]
    pub end: String,
}

impl IntervalRow {
    /// Build from delimited fields. A missing end field means the mark
    /// is still open.
    pub fn from_fields(fields: &[String], record: &str) -> Result<Self, InterchangeError> {
        if fields.len() < 2 {
            return Err(InterchangeError::MissingFields {
                found: fields.len(),
                expected: 2,
                record: record.to_string(),
            });
        }
        Ok(IntervalRow {
            label: fields[0].clone(),
            begin: fields[1].clone(),
            end: fields.get(2).cloned().unwrap_or_default(),
        })
    }

    /// Delimited fields, mirroring [`from_fields`](Self::from_fields).
    pub fn to_fields(&self) -> Vec<String> {
        vec![self.label.clone(), self.begin.clone(), self.end.clone()]
    }
}

/// Build a store row from an interchange row. Unparseable time text is
/// preserved verbatim as sentinel-invalid, so exporting reproduces it.
pub fn interval_from_row(row: &IntervalRow) -> Interval {
    Interval {
        label: row.label.clone(),
        begin: TimeField::from_begin_text(&row.begin),
        end: TimeField::from_end_text(&row.end),
    }
}

/// Render a store row back into its interchange shape.
pub fn interval_to_row(interval: &Interval) -> IntervalRow {
    IntervalRow {
        label: interval.label.clone(),
        begin: interval.begin.display_text(),
        end: interval.end.display_text(),
    }
}

/// Split one comma-delimited record, honoring minimal double-quote
/// quoting (a doubled quote inside a quoted field is a literal quote).
pub fn split_record(record: &str) -> Result<Vec<String>, InterchangeError> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = record.chars().peekable();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
        } else {
            match c {
                '"' if field.is_empty() => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut field)),
                _ => field.push(c),
            }
        }
    }

    if in_quotes {
        return Err(InterchangeError::UnterminatedQuote(record.to_string()));
    }
    fields.push(field);
    Ok(fields)
}

/// Join fields into one record, quoting only fields that need it.
pub fn join_record<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| {
            let f = f.as_ref();
            if f.contains([',', '"', '\n']) {
                format!("\"{}\"", f.replace('"', "\"\""))
            } else {
                f.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a whole label-set document. Blank lines are skipped.
pub fn parse_label_rows(text: &str) -> Result<Vec<LabelRow>, InterchangeError> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| LabelRow::from_fields(&split_record(line)?, line))
        .collect()
}

/// Parse a whole marks document. Blank lines are skipped.
pub fn parse_interval_rows(text: &str) -> Result<Vec<IntervalRow>, InterchangeError> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| IntervalRow::from_fields(&split_record(line)?, line))
        .collect()
}

/// Render label rows as a delimited document.
pub fn render_label_rows(rows: &[LabelRow]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&join_record(&row.to_fields()));
        out.push('\n');
    }
    out
}

/// Render mark rows as a delimited document.
pub fn render_interval_rows(rows: &[IntervalRow]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&join_record(&row.to_fields()));
        out.push('\n');
    }
    out
}
