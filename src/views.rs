// Filter and lookup helpers feeding the table views.
use crate::data::{DataError, WorkoutRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which record field an exact-match filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterField {
    Exercise,
    CoreName,
}

impl FilterField {
    pub fn label(self) -> &'static str {
        match self {
            FilterField::Exercise => "Exercise",
            FilterField::CoreName => "Core name",
        }
    }

    fn value<'a>(self, r: &'a WorkoutRecord) -> &'a str {
        match self {
            FilterField::Exercise => &r.exercise,
            FilterField::CoreName => &r.core_name,
        }
    }
}

/// Rows where `field` equals `value` exactly (case-sensitive), in original
/// relative order.
pub fn filter_by_field(
    records: &[WorkoutRecord],
    field: FilterField,
    value: &str,
) -> Vec<WorkoutRecord> {
    records
        .iter()
        .filter(|r| field.value(r) == value)
        .cloned()
        .collect()
}

/// Last `n` rows of a (possibly filtered) subset, in source order.
pub fn last_n(records: &[WorkoutRecord], n: usize) -> Vec<WorkoutRecord> {
    let start = records.len().saturating_sub(n);
    records[start..].to_vec()
}

/// Rows whose date label is a member of `labels`, in source order.
pub fn filter_by_dates(records: &[WorkoutRecord], labels: &BTreeSet<String>) -> Vec<WorkoutRecord> {
    records
        .iter()
        .filter(|r| labels.contains(&r.date_label()))
        .cloned()
        .collect()
}

/// The last `k` distinct date labels in source order.
///
/// Fails with [`DataError::EmptyTable`] on an empty table, since "most
/// recent dates" is undefined there.
pub fn recent_date_labels(records: &[WorkoutRecord], k: usize) -> Result<BTreeSet<String>, DataError> {
    if records.is_empty() {
        return Err(DataError::EmptyTable);
    }
    let mut seen = Vec::new();
    for r in records {
        let label = r.date_label();
        if !seen.contains(&label) {
            seen.push(label);
        }
    }
    let start = seen.len().saturating_sub(k);
    Ok(seen[start..].iter().cloned().collect())
}

/// The single record at ordinal `i`.
///
/// `i` outside `[0, max(index)]` fails with [`DataError::OutOfBounds`];
/// nothing wraps or clamps.
pub fn row_at_index(records: &[WorkoutRecord], i: usize) -> Result<&WorkoutRecord, DataError> {
    let max = records.len().saturating_sub(1);
    records
        .get(i)
        .ok_or(DataError::OutOfBounds { index: i, max })
}

/// Sorted distinct exercise labels, for the filter combo box.
pub fn unique_exercises(records: &[WorkoutRecord]) -> Vec<String> {
    let set: BTreeSet<&str> = records
        .iter()
        .map(|r| r.exercise.as_str())
        .filter(|e| !e.is_empty())
        .collect();
    set.into_iter().map(str::to_string).collect()
}

/// Sorted distinct core names, for the coarse-grouping filter.
pub fn unique_core_names(records: &[WorkoutRecord]) -> Vec<String> {
    let set: BTreeSet<&str> = records
        .iter()
        .map(|r| r.core_name.as_str())
        .filter(|c| !c.is_empty())
        .collect();
    set.into_iter().map(str::to_string).collect()
}
