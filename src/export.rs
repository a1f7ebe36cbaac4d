use crate::{
    analysis::{CalendarEvent, MonthlyStats},
    data::WorkoutRecord,
};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(
    value: &T,
    path: P,
) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}

pub fn write_csv<T: Serialize>(writer: impl Write, records: &[T]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in records {
        wtr.serialize(r)?;
    }
    wtr.flush().map_err(Into::into)
}

#[derive(Serialize)]
struct RecordRow<'a> {
    index: usize,
    date: String,
    exercise: &'a str,
    core_name: &'a str,
    weight: Option<&'a str>,
    sets: Option<&'a str>,
    reps: Option<&'a str>,
    effort_level: Option<&'a str>,
    notes: Option<&'a str>,
}

impl<'a> From<&'a WorkoutRecord> for RecordRow<'a> {
    fn from(r: &'a WorkoutRecord) -> Self {
        RecordRow {
            index: r.index,
            date: r.date_label(),
            exercise: &r.exercise,
            core_name: &r.core_name,
            weight: r.raw.weight.as_deref(),
            sets: r.raw.sets.as_deref(),
            reps: r.raw.reps.as_deref(),
            effort_level: r.raw.effort_level.as_deref(),
            notes: r.raw.notes.as_deref(),
        }
    }
}

pub fn save_records_csv<P: AsRef<Path>>(path: P, records: &[WorkoutRecord]) -> csv::Result<()> {
    let rows: Vec<RecordRow> = records.iter().map(Into::into).collect();
    write_csv(std::fs::File::create(path)?, &rows)
}

pub fn save_records_json<P: AsRef<Path>>(
    path: P,
    records: &[WorkoutRecord],
) -> std::io::Result<()> {
    write_json(records, path)
}

#[derive(Serialize)]
pub struct StatsExport<'a> {
    pub monthly: &'a MonthlyStats,
    pub calendar: &'a [CalendarEvent],
}

pub fn save_stats_json<P: AsRef<Path>>(
    path: P,
    monthly: &MonthlyStats,
    calendar: &[CalendarEvent],
) -> std::io::Result<()> {
    let export = StatsExport { monthly, calendar };
    write_json(&export, path)
}

pub fn save_stats_csv<P: AsRef<Path>>(
    path: P,
    monthly: &MonthlyStats,
    calendar: &[CalendarEvent],
) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.serialize(monthly)?;
    for event in calendar {
        wtr.serialize(event)?;
    }
    wtr.flush().map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{RawLogRow, normalize};

    fn sample_records() -> Vec<WorkoutRecord> {
        let raw = vec![
            RawLogRow {
                timestamp: "2024-01-05".into(),
                exercise: "Bench Press 1".into(),
                weight: Some("135".into()),
                effort_level: Some("7".into()),
                ..RawLogRow::default()
            },
            RawLogRow {
                timestamp: "2024-02-10".into(),
                exercise: "Squat".into(),
                ..RawLogRow::default()
            },
        ];
        normalize(&raw).unwrap()
    }

    #[test]
    fn records_csv_has_normalized_columns() {
        let mut buf = Vec::new();
        let records = sample_records();
        let rows: Vec<RecordRow> = records.iter().map(Into::into).collect();
        write_csv(&mut buf, &rows).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.starts_with("index,date,exercise,core_name"));
        assert!(out.contains("Jan 05, 2024"));
        assert!(out.contains("Bench Press 1,Bench,135"));
    }

    #[test]
    fn records_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let records = sample_records();
        save_records_json(&path, &records).unwrap();
        let data = std::fs::read_to_string(&path).unwrap();
        let loaded: Vec<WorkoutRecord> = serde_json::from_str(&data).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn stats_json_bundles_monthly_and_calendar() {
        use crate::analysis::{build_calendar_events, build_monthly_stats};
        use chrono::NaiveDate;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let records = sample_records();
        let monthly =
            build_monthly_stats(&records, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
        let calendar = build_calendar_events(&records);
        save_stats_json(&path, &monthly, &calendar).unwrap();
        let data = std::fs::read_to_string(&path).unwrap();
        assert!(data.contains("\"current_month_count\": 1"));
        assert!(data.contains("2024-01-05"));
    }
}
