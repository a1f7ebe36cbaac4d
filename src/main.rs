//! Main application logic and persistent user settings.

use dirs_next as dirs;
use eframe::{App, Frame, NativeOptions, egui};
use egui_extras::DatePickerButton;
use egui_plot::{Legend, Plot};
use rfd::FileDialog;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Cursor;
use std::time::{Duration, Instant};

use chrono::{Datelike, Local, NaiveDate};
use log::info;

mod analysis;
use analysis::{CalendarEvent, MonthlyStats, build_calendar_events, build_monthly_stats};
mod calendar;
use calendar::{month_grid, month_title};
mod data;
use data::{RawLogRow, WorkoutRecord, normalize, parse_log_csv};
mod export;
use export::{save_records_csv, save_records_json, save_stats_csv, save_stats_json};
mod plotting;
use plotting::daily_count_line;
mod report;
use report::export_html_report;
mod sheets;
use sheets::{fetch_rows, resolve_api_key};
mod views;
use views::{
    FilterField, filter_by_dates, filter_by_field, recent_date_labels, row_at_index,
    unique_core_names, unique_exercises,
};

/// Legend for the 1-10 effort scale shown behind the toggle.
const EFFORT_KEY: [(&str, &str); 5] = [
    ("1-2", "Warmup, no strain"),
    ("3-4", "Light working sets"),
    ("5-6", "Moderate, several reps left"),
    ("7-8", "Hard, one or two reps left"),
    ("9-10", "Max effort, nothing left"),
];

/// Persistent configuration for user preferences.
///
/// Serialized to a JSON file in the platform config directory so choices
/// like the effort-key toggle survive across restarts. Newer fields carry
/// `#[serde(default)]` so older files still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Settings {
    /// Controls visibility of the effort-level key legend.
    #[serde(default)]
    show_effort_key: bool,
    #[serde(default)]
    show_plot: bool,
    show_calendar: bool,
    filter_field: FilterField,
    filter_value: Option<String>,
    auto_load_last: bool,
    last_file: Option<String>,
    sheet_id: Option<String>,
    api_key: Option<String>,
}

impl Settings {
    const FILE: &'static str = "workout_site_settings.json";

    fn path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|p| p.join(Self::FILE))
    }

    fn load() -> Self {
        if let Some(path) = Self::path() {
            if let Ok(data) = std::fs::read_to_string(&path) {
                if let Ok(cfg) = serde_json::from_str(&data) {
                    return cfg;
                }
            }
        }
        Self::default()
    }

    fn save(&self) {
        if let Some(path) = Self::path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(data) = serde_json::to_string_pretty(self) {
                let _ = std::fs::write(path, data);
            }
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_effort_key: false,
            show_plot: false,
            show_calendar: true,
            filter_field: FilterField::Exercise,
            filter_value: None,
            auto_load_last: true,
            last_file: None,
            sheet_id: None,
            api_key: None,
        }
    }
}

struct DashboardApp {
    records: Vec<WorkoutRecord>,
    events: Vec<CalendarEvent>,
    stats: MonthlyStats,
    filter_field: FilterField,
    filter_value: Option<String>,
    index_query: String,
    lookup_message: Option<String>,
    calendar_first: NaiveDate,
    calendar_pick: NaiveDate,
    last_loaded: Option<String>,
    load_error: Option<String>,
    toast_start: Option<Instant>,
    settings: Settings,
    show_settings: bool,
    settings_dirty: bool,
}

impl Default for DashboardApp {
    fn default() -> Self {
        let settings = Settings::load();
        let today = Local::now().date_naive();
        let month_first = today.with_day(1).unwrap_or(today);
        let mut app = Self {
            records: Vec::new(),
            events: Vec::new(),
            stats: MonthlyStats::default(),
            filter_field: settings.filter_field,
            filter_value: settings.filter_value.clone(),
            index_query: String::new(),
            lookup_message: None,
            calendar_first: month_first,
            calendar_pick: today,
            last_loaded: None,
            load_error: None,
            toast_start: None,
            settings,
            show_settings: false,
            settings_dirty: false,
        };

        if app.settings.auto_load_last {
            if let Some(path) = app.settings.last_file.clone() {
                let p = std::path::Path::new(&path);
                if p.exists() {
                    if let Ok(file) = File::open(p) {
                        if let Ok(rows) = parse_log_csv(file) {
                            let name = p
                                .file_name()
                                .map(|f| f.to_string_lossy().to_string())
                                .unwrap_or(path.clone());
                            app.set_rows(rows, name);
                        }
                    }
                }
            }
        }

        app
    }
}

impl DashboardApp {
    /// Run the full pipeline on freshly fetched rows.
    fn set_rows(&mut self, rows: Vec<RawLogRow>, name: String) {
        match normalize(&rows) {
            Ok(records) => {
                info!("Loaded {} rows from {}", records.len(), name);
                self.events = build_calendar_events(&records);
                self.stats = build_monthly_stats(&records, Local::now().date_naive());
                self.records = records;
                self.load_error = None;
                self.last_loaded = Some(name);
                self.toast_start = Some(Instant::now());
            }
            Err(e) => {
                log::error!("Failed to normalize rows from {name}: {e}");
                self.records.clear();
                self.events.clear();
                self.stats = MonthlyStats::default();
                self.load_error = Some(e.to_string());
            }
        }
        self.lookup_message = None;
    }

    fn load_csv_path(&mut self, path: &std::path::Path) {
        let name = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        match File::open(path)
            .map_err(csv::Error::from)
            .and_then(parse_log_csv)
        {
            Ok(rows) => {
                self.set_rows(rows, name);
                self.settings.last_file = Some(path.display().to_string());
                self.settings_dirty = true;
            }
            Err(e) => {
                log::error!("Failed to read {name}: {e}");
                self.load_error = Some(e.to_string());
            }
        }
    }

    fn fetch_sheet(&mut self) {
        let Some(sheet_id) = self.settings.sheet_id.clone() else {
            self.load_error = Some("No sheet id configured".into());
            return;
        };
        let Some(key) = resolve_api_key(self.settings.api_key.as_deref()) else {
            self.load_error = Some("No API key configured".into());
            return;
        };
        match fetch_rows(&sheet_id, &key) {
            Ok(rows) => self.set_rows(rows, format!("sheet {sheet_id}")),
            Err(e) => {
                log::error!("Sheet fetch failed: {e}");
                self.load_error = Some(e.to_string());
            }
        }
    }

    /// Records matching the active filter, in source order.
    fn filtered_records(&self) -> Vec<WorkoutRecord> {
        match self.filter_value.as_deref() {
            Some(value) => filter_by_field(&self.records, self.filter_field, value),
            None => self.records.clone(),
        }
    }

    fn record_table(ui: &mut egui::Ui, id: &str, records: &[WorkoutRecord]) {
        egui::Grid::new(id).striped(true).show(ui, |ui| {
            for header in [
                "Date", "Exercise", "Weight", "Sets", "Reps", "Effort", "Notes",
            ] {
                ui.label(egui::RichText::new(header).strong());
            }
            ui.end_row();
            for r in records {
                ui.label(r.date_label());
                ui.label(&r.exercise);
                ui.label(r.raw.weight.as_deref().unwrap_or(""));
                ui.label(r.raw.sets.as_deref().unwrap_or(""));
                ui.label(r.raw.reps.as_deref().unwrap_or(""));
                ui.label(r.raw.effort_level.as_deref().unwrap_or(""));
                ui.label(r.raw.notes.as_deref().unwrap_or(""));
                ui.end_row();
            }
        });
    }

    fn metric_strip(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(format!("This month: {}", self.stats.current_month_count));
            ui.separator();
            ui.label(format!("Last month: {}", self.stats.previous_month_count));
            ui.separator();
            ui.label(format!("Delta: {:+}", self.stats.delta));
            ui.separator();
            ui.label(format!("Target: {:.1}", self.stats.monthly_target()));
            ui.separator();
            match self.stats.avg_per_day {
                Some(avg) => ui.label(format!("Avg/day: {avg:.1}")),
                None => ui.label("Avg/day: -"),
            };
        });
    }

    fn lookup_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Row #:");
            ui.add(egui::TextEdit::singleline(&mut self.index_query).desired_width(60.0));
            if ui.button("Lookup").clicked() {
                self.lookup_message = Some(match self.index_query.trim().parse::<usize>() {
                    Ok(i) => match row_at_index(&self.records, i) {
                        Ok(r) => format!(
                            "#{}: {} on {} ({} sets)",
                            r.index,
                            r.exercise,
                            r.date_label(),
                            r.raw.sets.as_deref().unwrap_or("?"),
                        ),
                        Err(e) => e.to_string(),
                    },
                    Err(_) => "Enter a row number".into(),
                });
            }
        });
        if let Some(msg) = &self.lookup_message {
            ui.label(msg.clone());
        }
    }

    fn effort_key(ui: &mut egui::Ui) {
        egui::Grid::new("effort_key").show(ui, |ui| {
            for (level, meaning) in EFFORT_KEY {
                ui.label(level);
                ui.label(meaning);
                ui.end_row();
            }
        });
    }

    fn sync_settings_from_app(&mut self) {
        self.settings.filter_field = self.filter_field;
        self.settings.filter_value = self.filter_value.clone();
    }
}

impl App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        // Handle CSV drag-and-drop
        for file in ctx.input(|i| i.raw.dropped_files.clone()) {
            let ext_ok = file
                .path
                .as_ref()
                .and_then(|p| p.extension())
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("csv"))
                .unwrap_or_else(|| file.name.to_lowercase().ends_with(".csv"));
            if !ext_ok {
                continue;
            }

            if let Some(path) = file.path.clone() {
                self.load_csv_path(&path);
            } else if let Some(bytes) = file.bytes {
                let name = file.name.clone();
                let reader = Cursor::new(bytes.to_vec());
                match parse_log_csv(reader) {
                    Ok(rows) => self.set_rows(rows, name),
                    Err(e) => {
                        log::error!("Failed to read {name}: {e}");
                        self.load_error = Some(e.to_string());
                    }
                }
            }
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Settings").clicked() {
                        self.show_settings = true;
                        ui.close_menu();
                    }
                    if ui.button("Export Entries").clicked() {
                        if let Some(path) = FileDialog::new()
                            .add_filter("JSON", &["json"])
                            .add_filter("CSV", &["csv"])
                            .save_file()
                        {
                            let result = match path
                                .extension()
                                .and_then(|e| e.to_str())
                                .map(|s| s.to_lowercase())
                            {
                                Some(ext) if ext == "csv" => save_records_csv(&path, &self.records)
                                    .map_err(|e| e.to_string()),
                                _ => save_records_json(&path, &self.records)
                                    .map_err(|e| e.to_string()),
                            };
                            if let Err(e) = result {
                                log::error!("Failed to export entries: {e}");
                            }
                        }
                        ui.close_menu();
                    }
                    if ui.button("Export Stats").clicked() {
                        if let Some(path) = FileDialog::new()
                            .add_filter("JSON", &["json"])
                            .add_filter("CSV", &["csv"])
                            .save_file()
                        {
                            let result = match path
                                .extension()
                                .and_then(|e| e.to_str())
                                .map(|s| s.to_lowercase())
                            {
                                Some(ext) if ext == "csv" => {
                                    save_stats_csv(&path, &self.stats, &self.events)
                                        .map_err(|e| e.to_string())
                                }
                                _ => save_stats_json(&path, &self.stats, &self.events)
                                    .map_err(|e| e.to_string()),
                            };
                            if let Err(e) = result {
                                log::error!("Failed to export stats: {e}");
                            }
                        }
                        ui.close_menu();
                    }
                    if ui.button("HTML Report").clicked() {
                        if let Some(path) =
                            FileDialog::new().add_filter("HTML", &["html"]).save_file()
                        {
                            if let Err(e) = export_html_report(&path, &self.stats, &self.events) {
                                log::error!("Failed to write report: {e}");
                            }
                        }
                        ui.close_menu();
                    }
                });
            });
        });

        egui::TopBottomPanel::top("control_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Load CSV").clicked() {
                    if let Some(path) = FileDialog::new().add_filter("CSV", &["csv"]).pick_file() {
                        self.load_csv_path(&path);
                    }
                }
                if ui.button("Fetch Sheet").clicked() {
                    self.fetch_sheet();
                }

                if !self.records.is_empty() {
                    ui.separator();
                    ui.label("Filter by:");
                    for field in [FilterField::Exercise, FilterField::CoreName] {
                        if ui
                            .selectable_label(self.filter_field == field, field.label())
                            .clicked()
                            && self.filter_field != field
                        {
                            self.filter_field = field;
                            self.filter_value = None;
                            self.settings_dirty = true;
                        }
                    }

                    let options = match self.filter_field {
                        FilterField::Exercise => unique_exercises(&self.records),
                        FilterField::CoreName => unique_core_names(&self.records),
                    };
                    egui::ComboBox::from_id_source("filter_value")
                        .selected_text(
                            self.filter_value
                                .clone()
                                .unwrap_or_else(|| "All".to_string()),
                        )
                        .show_ui(ui, |ui| {
                            if ui
                                .selectable_label(self.filter_value.is_none(), "All")
                                .clicked()
                            {
                                self.filter_value = None;
                                self.settings_dirty = true;
                            }
                            for option in &options {
                                let selected = self.filter_value.as_deref() == Some(option);
                                if ui.selectable_label(selected, option).clicked() {
                                    self.filter_value = Some(option.clone());
                                    self.settings_dirty = true;
                                }
                            }
                        });
                }
            });
        });

        egui::SidePanel::left("info_panel").show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                if self.records.is_empty() {
                    ui.label("No workout log loaded");
                    ui.label("Load a CSV or fetch the sheet");
                } else {
                    ui.label(format!("Loaded {} entries", self.records.len()));
                }
                if let Some(name) = &self.last_loaded {
                    ui.label(format!("Source: {name}"));
                }
                if let Some(err) = self.load_error.clone() {
                    ui.colored_label(egui::Color32::RED, err);
                }

                ui.separator();
                self.lookup_row(ui);

                ui.separator();
                let mut show_key = self.settings.show_effort_key;
                if ui.checkbox(&mut show_key, "Effort level key").changed() {
                    self.settings.show_effort_key = show_key;
                    self.settings_dirty = true;
                }
                if self.settings.show_effort_key {
                    Self::effort_key(ui);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading("Workout Site");
                });
                ui.separator();

                if self.records.is_empty() {
                    return;
                }

                self.metric_strip(ui);
                ui.separator();

                ui.heading("Workout filter");
                Self::record_table(ui, "filtered_table", &self.filtered_records());
                ui.separator();

                ui.heading("Last 3 Workouts");
                match recent_date_labels(&self.records, 3) {
                    Ok(labels) => {
                        let rows = filter_by_dates(&self.records, &labels);
                        Self::record_table(ui, "last_three_table", &rows);
                    }
                    Err(e) => {
                        ui.label(e.to_string());
                    }
                }
                ui.separator();

                if self.settings.show_calendar {
                    ui.horizontal(|ui| {
                        if ui.button("\u{25C0}").clicked() {
                            self.calendar_first = self
                                .calendar_first
                                .checked_sub_months(chrono::Months::new(1))
                                .unwrap_or(self.calendar_first);
                        }
                        ui.label(egui::RichText::new(month_title(self.calendar_first)).strong());
                        if ui.button("\u{25B6}").clicked() {
                            self.calendar_first = self
                                .calendar_first
                                .checked_add_months(chrono::Months::new(1))
                                .unwrap_or(self.calendar_first);
                        }
                        let resp = ui.add(DatePickerButton::new(&mut self.calendar_pick));
                        if resp.changed() {
                            self.calendar_first = self
                                .calendar_pick
                                .with_day(1)
                                .unwrap_or(self.calendar_pick);
                        }
                    });
                    month_grid(ui, self.calendar_first, &self.events);
                    ui.separator();
                }

                if self.settings.show_plot {
                    let line = daily_count_line(&self.events);
                    Plot::new("daily_count_plot")
                        .height(200.0)
                        .x_axis_formatter(|mark, _chars, _| {
                            NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
                                .map(|d| d.format("%Y-%m-%d").to_string())
                                .unwrap_or_else(|| format!("{:.0}", mark.value))
                        })
                        .legend(Legend::default())
                        .show(ui, |plot_ui| {
                            plot_ui.line(line);
                        });
                }
            });
        });

        if self.show_settings {
            let mut open = true;
            egui::Window::new("Settings")
                .open(&mut open)
                .show(ctx, |ui| {
                    if ui
                        .checkbox(&mut self.settings.show_calendar, "Show calendar")
                        .changed()
                    {
                        self.settings_dirty = true;
                    }
                    if ui
                        .checkbox(&mut self.settings.show_plot, "Show daily plot")
                        .changed()
                    {
                        self.settings_dirty = true;
                    }
                    if ui
                        .checkbox(&mut self.settings.auto_load_last, "Auto-load last file")
                        .changed()
                    {
                        self.settings_dirty = true;
                    }

                    let mut sheet_id = self.settings.sheet_id.clone().unwrap_or_default();
                    ui.horizontal(|ui| {
                        ui.label("Sheet id:");
                        if ui.text_edit_singleline(&mut sheet_id).changed() {
                            self.settings.sheet_id = (!sheet_id.is_empty()).then(|| sheet_id.clone());
                            self.settings_dirty = true;
                        }
                    });
                    let mut api_key = self.settings.api_key.clone().unwrap_or_default();
                    ui.horizontal(|ui| {
                        ui.label("API key:");
                        if ui.text_edit_singleline(&mut api_key).changed() {
                            self.settings.api_key = (!api_key.is_empty()).then(|| api_key.clone());
                            self.settings_dirty = true;
                        }
                    });
                });
            if !open {
                self.show_settings = false;
            }
        }

        if let Some(start) = self.toast_start {
            if start.elapsed() < Duration::from_secs(3) {
                if let Some(name) = self.last_loaded.clone() {
                    egui::TopBottomPanel::bottom("toast").show(ctx, |ui| {
                        ui.label(format!("Loaded {name}"));
                    });
                }
            } else {
                self.toast_start = None;
            }
        }

        if self.settings_dirty {
            self.sync_settings_from_app();
            self.settings.save();
            self.settings_dirty = false;
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.sync_settings_from_app();
        self.settings.save();
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let options = NativeOptions::default();
    eframe::run_native(
        "Workout Site",
        options,
        Box::new(|_cc| Box::new(DashboardApp::default())),
    )
}
