// Month-grid calendar with workout-count highlights.
use crate::analysis::CalendarEvent;
use chrono::{Datelike, Months, NaiveDate};
use std::collections::HashMap;

const WEEKDAY_HEADER: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Lay out a month as rows of seven cells, Sunday first.
///
/// `None` cells pad the leading and trailing partial weeks. The result
/// length is always a multiple of seven.
pub fn month_cells(year: i32, month: u32) -> Vec<Option<u32>> {
    let first = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d,
        None => return Vec::new(),
    };
    let next = first.checked_add_months(Months::new(1)).unwrap_or(first);
    let days = (next - first).num_days() as u32;

    let mut cells: Vec<Option<u32>> = Vec::new();
    for _ in 0..first.weekday().num_days_from_sunday() {
        cells.push(None);
    }
    for day in 1..=days {
        cells.push(Some(day));
    }
    while cells.len() % 7 != 0 {
        cells.push(None);
    }
    cells
}

/// Heading label for a displayed month, e.g. `"February 2024"`.
pub fn month_title(first: NaiveDate) -> String {
    first.format("%B %Y").to_string()
}

/// Draw one month as an egui grid, highlighting days with workouts.
///
/// Highlighted cells show the exercise count for that day. Display color is
/// chosen here; the counts come straight from the events.
pub fn month_grid(ui: &mut egui::Ui, first: NaiveDate, events: &[CalendarEvent]) {
    let counts: HashMap<u32, usize> = events
        .iter()
        .filter(|e| e.date.year() == first.year() && e.date.month() == first.month())
        .map(|e| (e.date.day(), e.exercise_count))
        .collect();

    egui::Grid::new("calendar_grid")
        .num_columns(7)
        .min_col_width(36.0)
        .show(ui, |ui| {
            for name in WEEKDAY_HEADER {
                ui.label(egui::RichText::new(name).strong());
            }
            ui.end_row();

            for week in month_cells(first.year(), first.month()).chunks(7) {
                for cell in week {
                    match cell {
                        Some(day) => match counts.get(day) {
                            Some(count) => {
                                let text = egui::RichText::new(format!("{day}\n{count} ex"))
                                    .color(egui::Color32::BLACK);
                                ui.add(
                                    egui::Button::new(text)
                                        .fill(egui::Color32::from_rgb(0x90, 0xee, 0x90)),
                                )
                                .on_hover_text(format!("{count} exercises"));
                            }
                            None => {
                                ui.label(day.to_string());
                            }
                        },
                        None => {
                            ui.label("");
                        }
                    }
                }
                ui.end_row();
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_full_weeks() {
        for (year, month) in [(2024, 1), (2024, 2), (2023, 12), (2025, 6)] {
            let cells = month_cells(year, month);
            assert_eq!(cells.len() % 7, 0, "{year}-{month}");
        }
    }

    #[test]
    fn february_2024_layout() {
        let cells = month_cells(2024, 2);
        // Feb 1 2024 is a Thursday: four leading blanks, then 29 days.
        assert_eq!(cells[..4], [None, None, None, None]);
        assert_eq!(cells[4], Some(1));
        assert_eq!(cells.iter().filter(|c| c.is_some()).count(), 29);
        assert_eq!(cells.len(), 35);
    }

    #[test]
    fn days_are_in_order() {
        let days: Vec<u32> = month_cells(2024, 1).into_iter().flatten().collect();
        assert_eq!(days, (1..=31).collect::<Vec<u32>>());
    }

    #[test]
    fn month_title_format() {
        let first = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(month_title(first), "February 2024");
    }
}
