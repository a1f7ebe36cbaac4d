// Read-only Google Sheets row source.
use crate::data::RawLogRow;
use serde_json::Value;

const SHEETS_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Sheet range holding the log; the first row is the header.
const LOG_RANGE: &str = "Form%20Responses%201";

/// Determine the API key to use for Sheets requests.
///
/// If the `SHEETS_API_KEY` environment variable is set, its value takes
/// precedence over any key stored in the application settings.
pub fn resolve_api_key(settings_key: Option<&str>) -> Option<String> {
    std::env::var("SHEETS_API_KEY")
        .ok()
        .or_else(|| settings_key.map(|s| s.to_string()))
}

#[derive(Debug)]
pub enum FetchError {
    Unauthorized(String),
    Forbidden(String),
    /// The header row is missing a required column.
    MissingColumn(&'static str),
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Unauthorized(body) => write!(f, "Unauthorized: {body}"),
            FetchError::Forbidden(body) => write!(f, "Forbidden: {body}"),
            FetchError::MissingColumn(name) => write!(f, "Missing column: {name}"),
            FetchError::Other(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Other(e) => Some(&**e),
            _ => None,
        }
    }
}

struct ColumnMap {
    timestamp: usize,
    exercise: usize,
    weight: Option<usize>,
    sets: Option<usize>,
    reps: Option<usize>,
    effort_level: Option<usize>,
    notes: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &[Value]) -> Result<Self, FetchError> {
        let pos = |name: &str| {
            header
                .iter()
                .position(|v| v.as_str() == Some(name))
        };
        Ok(ColumnMap {
            timestamp: pos("Timestamp").ok_or(FetchError::MissingColumn("Timestamp"))?,
            exercise: pos("Exercise").ok_or(FetchError::MissingColumn("Exercise"))?,
            weight: pos("Weight"),
            sets: pos("Sets"),
            reps: pos("Reps"),
            effort_level: pos("Effort Level"),
            notes: pos("Notes"),
        })
    }
}

fn cell(row: &[Value], col: usize) -> String {
    row.get(col)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

fn opt_cell(row: &[Value], col: Option<usize>) -> Option<String> {
    col.map(|c| cell(row, c))
}

fn fetch_rows_with_url(url: &str, api_key: &str) -> Result<Vec<RawLogRow>, FetchError> {
    let response = ureq::get(url)
        .query("key", api_key)
        .set("Accept", "application/json")
        .call();
    let body = match response {
        Ok(r) => r
            .into_string()
            .map_err(|e| FetchError::Other(Box::new(e)))?,
        Err(ureq::Error::Status(401, r)) => {
            let body = r.into_string().unwrap_or_default();
            return Err(FetchError::Unauthorized(body));
        }
        Err(ureq::Error::Status(403, r)) => {
            let body = r.into_string().unwrap_or_default();
            return Err(FetchError::Forbidden(body));
        }
        Err(e) => return Err(FetchError::Other(Box::new(e))),
    };
    let json: Value = serde_json::from_str(&body).map_err(|e| FetchError::Other(Box::new(e)))?;

    let values = match json.get("values").and_then(|v| v.as_array()) {
        Some(v) if !v.is_empty() => v,
        _ => return Ok(Vec::new()),
    };
    let empty = Vec::new();
    let header = values[0].as_array().unwrap_or(&empty);
    let cols = ColumnMap::from_header(header)?;

    let mut rows = Vec::new();
    for value in &values[1..] {
        let row = match value.as_array() {
            Some(r) => r,
            None => continue,
        };
        rows.push(RawLogRow {
            timestamp: cell(row, cols.timestamp),
            exercise: cell(row, cols.exercise),
            weight: opt_cell(row, cols.weight),
            sets: opt_cell(row, cols.sets),
            reps: opt_cell(row, cols.reps),
            effort_level: opt_cell(row, cols.effort_level),
            notes: opt_cell(row, cols.notes),
        });
    }
    Ok(rows)
}

/// Fetch the raw log rows from the spreadsheet in a single read-only call.
///
/// The first row of the range is treated as a header and mapped to columns
/// by exact name; `Timestamp` and `Exercise` are required, the rest are
/// optional. Transient HTTP failures surface as [`FetchError`]; there are no
/// retries here.
pub fn fetch_rows(sheet_id: &str, api_key: &str) -> Result<Vec<RawLogRow>, FetchError> {
    log::info!("Fetching sheet {sheet_id}");
    let url = format!("{SHEETS_URL}/{sheet_id}/values/{LOG_RANGE}");
    fetch_rows_with_url(&url, api_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const SHEET_BODY: &str = r#"{
        "range": "Form Responses 1",
        "values": [
            ["Timestamp", "Exercise", "Weight", "Sets", "Reps", "Effort Level", "Notes"],
            ["1/5/2024 18:30:00", "Bench Press", "135", "3", "10", "7", ""],
            ["2/10/2024 19:00:00", "Squat", "225", "5", "5", "9", "belt on"]
        ]
    }"#;

    #[test]
    fn maps_header_to_rows() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/values").query_param("key", "k");
            then.status(200).body(SHEET_BODY);
        });

        let rows = fetch_rows_with_url(&server.url("/values"), "k").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].timestamp, "1/5/2024 18:30:00");
        assert_eq!(rows[0].exercise, "Bench Press");
        assert_eq!(rows[0].weight.as_deref(), Some("135"));
        assert_eq!(rows[1].notes.as_deref(), Some("belt on"));

        m.assert();
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/values");
            then.status(200)
                .body(r#"{"values": [["Timestamp", "Weight"], ["1/5/2024 18:30:00", "135"]]}"#);
        });

        let err = fetch_rows_with_url(&server.url("/values"), "k").unwrap_err();
        match err {
            FetchError::MissingColumn(name) => assert_eq!(name, "Exercise"),
            e => panic!("unexpected error: {e:?}"),
        }
    }

    #[test]
    fn empty_values_yields_no_rows() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/values");
            then.status(200).body(r#"{"values": []}"#);
        });

        let rows = fetch_rows_with_url(&server.url("/values"), "k").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn maps_401_to_unauthorized() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/values");
            then.status(401).body("unauthorized body");
        });

        let err = fetch_rows_with_url(&server.url("/values"), "k").unwrap_err();
        match err {
            FetchError::Unauthorized(body) => assert_eq!(body, "unauthorized body"),
            e => panic!("unexpected error: {e:?}"),
        }

        m.assert();
    }

    #[test]
    fn maps_403_to_forbidden() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/values");
            then.status(403).body("forbidden body");
        });

        let err = fetch_rows_with_url(&server.url("/values"), "k").unwrap_err();
        match err {
            FetchError::Forbidden(body) => assert_eq!(body, "forbidden body"),
            e => panic!("unexpected error: {e:?}"),
        }

        m.assert();
    }

    #[test]
    fn env_var_overrides_settings_key() {
        unsafe {
            std::env::set_var("SHEETS_API_KEY", "forced");
        }

        let key = resolve_api_key(Some("settings_key"));
        assert_eq!(key.as_deref(), Some("forced"));

        unsafe {
            std::env::remove_var("SHEETS_API_KEY");
        }

        let key = resolve_api_key(Some("settings_key"));
        assert_eq!(key.as_deref(), Some("settings_key"));
    }
}
