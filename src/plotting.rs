use chrono::Datelike;
use egui_plot::{Line, PlotPoints};

use crate::analysis::CalendarEvent;

/// Points for the exercises-per-day plot, one per calendar event.
///
/// The x value is the day number from the common era so the plot axis can be
/// formatted back into a date.
pub fn daily_count_points(events: &[CalendarEvent]) -> Vec<[f64; 2]> {
    events
        .iter()
        .map(|e| {
            [
                e.date.num_days_from_ce() as f64,
                e.exercise_count as f64,
            ]
        })
        .collect()
}

/// Line of exercise counts over time.
pub fn daily_count_line(events: &[CalendarEvent]) -> Line {
    Line::new(PlotPoints::from(daily_count_points(events))).name("Exercises per day")
}
