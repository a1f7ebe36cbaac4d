use crate::analysis::{CalendarEvent, MonthlyStats};
use maud::{Markup, html};
use plotters::prelude::*;
use std::path::Path;

trait FormatOption {
    fn fmt_opt(self) -> String;
}

impl FormatOption for Option<f32> {
    fn fmt_opt(self) -> String {
        self.map(|v| format!("{:.1}", v))
            .unwrap_or_else(|| "-".into())
    }
}

/// Write a standalone HTML report with the monthly summary, the per-day
/// workout counts and a rendered chart next to it.
pub fn export_html_report<P: AsRef<Path>>(
    path: P,
    stats: &MonthlyStats,
    events: &[CalendarEvent],
) -> std::io::Result<()> {
    let path = path.as_ref();
    let chart_path = path.with_extension("png");
    let chart_file = match generate_daily_chart(events, &chart_path) {
        Ok(_) => chart_path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("")),
        Err(e) => {
            log::error!("Failed to generate chart: {e}");
            std::ffi::OsStr::new("")
        }
    };
    let markup = build_html(stats, events, chart_file);
    std::fs::write(path, markup.into_string())
}

fn generate_daily_chart(
    events: &[CalendarEvent],
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (800, 400)).into_drawing_area();
    root.fill(&WHITE)?;
    if events.is_empty() {
        root.present()?;
        return Ok(());
    }
    let max = events.iter().map(|e| e.exercise_count).max().unwrap_or(1) as u32;
    let mut chart = ChartBuilder::on(&root)
        .caption("Exercises per workout day", ("sans-serif", 25))
        .margin(5)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0..events.len(), 0u32..max + 1)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Workout day")
        .y_desc("Exercises")
        .draw()?;
    chart.draw_series(LineSeries::new(
        events
            .iter()
            .enumerate()
            .map(|(i, e)| (i, e.exercise_count as u32)),
        &BLUE,
    ))?;
    root.present()?;
    Ok(())
}

fn build_html(
    stats: &MonthlyStats,
    events: &[CalendarEvent],
    chart_file: &std::ffi::OsStr,
) -> Markup {
    html! {
        html {
            head { meta charset="utf-8"; title { "Workout Site" } }
            body {
                h1 { "Monthly Summary" }
                table border="1" {
                    tr { th { "This Month" } td { (stats.current_month_count) } }
                    tr { th { "Last Month" } td { (stats.previous_month_count) } }
                    tr { th { "Delta" } td { (stats.delta) } }
                    tr { th { "Target" } td { (format!("{:.1}", stats.monthly_target())) } }
                    tr { th { "Avg / Day" } td { (stats.avg_per_day.fmt_opt()) } }
                }
                h1 { "Workout Days" }
                table border="1" {
                    tr { th { "Date" } th { "Exercises" } }
                    @for e in events {
                        tr {
                            td { (e.date.format("%b %d, %Y")) }
                            td { (e.exercise_count) }
                        }
                    }
                }
                h1 { "Exercises per Day" }
                @if chart_file.is_empty() {
                    p { "Chart unavailable" }
                } @else {
                    img src=(chart_file.to_string_lossy());
                }
            }
        }
    }
}
