// Raw log rows and normalization into workout records.
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timestamp format the sheet writes for form submissions.
pub const SHEET_TIMESTAMP_FMT: &str = "%m/%d/%Y %H:%M:%S";

/// One spreadsheet row as fetched, every field still text.
///
/// `timestamp` and `exercise` are the only columns the pipeline needs;
/// the rest are carried through untouched for display and export.
#[derive(Debug, Deserialize, Clone, Serialize, Default, PartialEq)]
pub struct RawLogRow {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Exercise")]
    pub exercise: String,
    #[serde(rename = "Weight", default)]
    pub weight: Option<String>,
    #[serde(rename = "Sets", default)]
    pub sets: Option<String>,
    #[serde(rename = "Reps", default)]
    pub reps: Option<String>,
    #[serde(rename = "Effort Level", default)]
    pub effort_level: Option<String>,
    #[serde(rename = "Notes", default)]
    pub notes: Option<String>,
}

/// A normalized log row: parsed timestamp, trimmed exercise label,
/// derived core name, plus the raw row it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutRecord {
    pub index: usize,
    pub timestamp: NaiveDateTime,
    pub exercise: String,
    pub core_name: String,
    pub raw: RawLogRow,
}

impl WorkoutRecord {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Display label used by the date-set filter, e.g. `"Jan 05, 2024"`.
    pub fn date_label(&self) -> String {
        self.date().format("%b %d, %Y").to_string()
    }

    /// Serialize back to a raw row with the normalized field values.
    pub fn to_raw(&self) -> RawLogRow {
        RawLogRow {
            timestamp: self.timestamp.format(SHEET_TIMESTAMP_FMT).to_string(),
            exercise: self.exercise.clone(),
            ..self.raw.clone()
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum DataError {
    /// A row's timestamp could not be parsed with any accepted format.
    MalformedTimestamp { row: usize, value: String },
    /// Index lookup outside `[0, max]`.
    OutOfBounds { index: usize, max: usize },
    /// The table has zero rows and the requested view is undefined.
    EmptyTable,
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::MalformedTimestamp { row, value } => {
                write!(f, "row {row}: malformed timestamp {value:?}")
            }
            DataError::OutOfBounds { index, max } => {
                write!(f, "index {index} out of bounds (max {max})")
            }
            DataError::EmptyTable => write!(f, "table has no rows"),
        }
    }
}

impl std::error::Error for DataError {}

/// Parse a timestamp using the accepted fixed formats. No fuzzy inference.
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, SHEET_TIMESTAMP_FMT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Normalize raw rows into [`WorkoutRecord`]s.
///
/// Trims the exercise label, parses the timestamp and derives the core name
/// (first whitespace-delimited token). Row count and order are preserved and
/// `index` is the ordinal position in the input. The first malformed
/// timestamp aborts with [`DataError::MalformedTimestamp`]; the caller
/// decides whether to drop that row and retry or give up.
pub fn normalize(rows: &[RawLogRow]) -> Result<Vec<WorkoutRecord>, DataError> {
    rows.iter()
        .enumerate()
        .map(|(index, raw)| {
            let timestamp =
                parse_timestamp(&raw.timestamp).ok_or_else(|| DataError::MalformedTimestamp {
                    row: index,
                    value: raw.timestamp.clone(),
                })?;
            let exercise = raw.exercise.trim().to_string();
            let core_name = exercise
                .split_whitespace()
                .next()
                .unwrap_or("")
                .to_string();
            Ok(WorkoutRecord {
                index,
                timestamp,
                exercise,
                core_name,
                raw: raw.clone(),
            })
        })
        .collect()
}

/// Read raw rows from a CSV export of the sheet (header row required).
pub fn parse_log_csv<R: std::io::Read>(reader: R) -> Result<Vec<RawLogRow>, csv::Error> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize::<RawLogRow>() {
        rows.push(result?);
    }
    Ok(rows)
}
