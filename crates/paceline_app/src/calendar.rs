//! Month grid and navigation.

use std::collections::HashMap;

use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use egui::{Color32, RichText, Vec2};
use paceline::CalendarEvent;

const CELL_MIN_HEIGHT: f32 = 90.0;
const MAX_ROWS_PER_DAY: usize = 3;

/// Month-grid state. Navigation goes through the public methods so the
/// nav buttons and the startup date flag drive it the same way.
pub struct Calendar {
    focus: NaiveDate,
}

impl Calendar {
    pub fn new(focus: NaiveDate) -> Self {
        Self { focus }
    }

    pub fn focus(&self) -> NaiveDate {
        self.focus
    }

    pub fn go_to_date(&mut self, date: NaiveDate) {
        self.focus = date;
    }

    pub fn previous_month(&mut self) {
        self.focus = self
            .focus
            .checked_sub_months(Months::new(1))
            .unwrap_or(self.focus);
    }

    pub fn next_month(&mut self) {
        self.focus = self
            .focus
            .checked_add_months(Months::new(1))
            .unwrap_or(self.focus);
    }

    pub fn today(&mut self) {
        self.focus = Local::now().date_naive();
    }

    fn month_start(&self) -> NaiveDate {
        self.focus.with_day(1).unwrap_or(self.focus)
    }

    /// The six-week grid around the focused month, Monday first.
    pub fn grid_range(&self) -> (NaiveDate, NaiveDate) {
        let first_day = self.month_start();
        let start_offset = first_day.weekday().num_days_from_monday() as i64;
        let grid_start = first_day - Duration::days(start_offset);
        (grid_start, grid_start + Duration::days(6 * 7 - 1))
    }

    /// Render the nav bar and the grid. Returns the clicked event id, if
    /// any.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        events: &[CalendarEvent],
        selected: Option<u64>,
        loading: bool,
    ) -> Option<u64> {
        let mut clicked = None;

        ui.horizontal(|ui| {
            let nav_size = Vec2::new(32.0, 32.0);
            if ui
                .add_sized(nav_size, egui::Button::new("<"))
                .on_hover_text("Previous month")
                .clicked()
            {
                self.previous_month();
            }
            if ui
                .add_sized(Vec2::new(60.0, 32.0), egui::Button::new("Today"))
                .clicked()
            {
                self.today();
            }
            if ui
                .add_sized(nav_size, egui::Button::new(">"))
                .on_hover_text("Next month")
                .clicked()
            {
                self.next_month();
            }

            ui.add_space(8.0);
            ui.heading(self.focus.format("%B %Y").to_string());
            if loading {
                ui.add_space(8.0);
                ui.spinner();
            }
        });

        ui.add_space(4.0);
        ui.columns(7, |cols| {
            for (idx, col) in cols.iter_mut().enumerate() {
                col.label(weekday_label(idx));
            }
        });
        ui.separator();

        let (grid_start, _) = self.grid_range();
        let first_day = self.month_start();
        let month = first_day.month();
        let last_day = first_day
            .checked_add_months(Months::new(1))
            .map(|d| d - Duration::days(1))
            .unwrap_or(first_day);
        let today = Local::now().date_naive();
        let events_by_day = events_by_day(events);

        for week in 0..6 {
            ui.columns(7, |cols| {
                for (col_idx, col) in cols.iter_mut().enumerate() {
                    let date = grid_start + Duration::days((week * 7 + col_idx) as i64);
                    let mut frame =
                        egui::Frame::new().inner_margin(egui::Margin::symmetric(4, 4));
                    if date == today {
                        frame = frame.fill(Color32::from_rgba_unmultiplied(0, 91, 187, 18));
                    }
                    frame.show(col, |ui| {
                        ui.set_min_height(CELL_MIN_HEIGHT);
                        if date.month() != month {
                            ui.allocate_space(egui::vec2(ui.available_width(), CELL_MIN_HEIGHT));
                            return;
                        }

                        ui.label(RichText::new(date.day().to_string()).strong());
                        if let Some(day_events) = events_by_day.get(&date) {
                            for event in day_events.iter().take(MAX_ROWS_PER_DAY) {
                                let is_selected = selected == Some(event.id);
                                if ui.selectable_label(is_selected, &event.title).clicked() {
                                    clicked = Some(event.id);
                                }
                            }
                            let more = day_events.len().saturating_sub(MAX_ROWS_PER_DAY);
                            if more > 0 {
                                ui.weak(format!("+{more} more"));
                            }
                        }
                    });
                }
            });

            // trailing weeks wholly outside the month are not drawn
            let next_week_start = grid_start + Duration::days(((week + 1) * 7) as i64);
            if next_week_start.month() != month && next_week_start > last_day {
                break;
            }
        }

        clicked
    }
}

fn weekday_label(idx: usize) -> &'static str {
    ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"][idx.min(6)]
}

fn events_by_day(events: &[CalendarEvent]) -> HashMap<NaiveDate, Vec<&CalendarEvent>> {
    let mut map: HashMap<NaiveDate, Vec<&CalendarEvent>> = HashMap::new();
    for event in events {
        map.entry(event.date).or_default().push(event);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn grid_starts_on_monday_and_spans_six_weeks() {
        let calendar = Calendar::new(d(2020, 10, 31));
        let (start, end) = calendar.grid_range();
        assert_eq!(start, d(2020, 9, 28));
        assert_eq!(start.weekday(), Weekday::Mon);
        assert_eq!((end - start).num_days(), 41);
        assert!(start <= d(2020, 10, 1));
        assert!(end >= d(2020, 10, 31));
    }

    #[test]
    fn navigation_moves_one_month() {
        let mut calendar = Calendar::new(d(2020, 12, 15));
        calendar.next_month();
        assert_eq!(calendar.focus().month(), 1);
        assert_eq!(calendar.focus().year(), 2021);
        calendar.previous_month();
        assert_eq!(calendar.focus(), d(2020, 12, 15));
    }

    #[test]
    fn go_to_date_moves_the_grid() {
        let mut calendar = Calendar::new(d(2020, 10, 31));
        calendar.go_to_date(d(2019, 2, 1));
        let (start, end) = calendar.grid_range();
        assert!(start <= d(2019, 2, 1) && end >= d(2019, 2, 28));
    }

    #[test]
    fn events_group_by_day() {
        let events = vec![
            CalendarEvent {
                id: 1,
                title: "Running".to_owned(),
                date: d(2020, 10, 31),
            },
            CalendarEvent {
                id: 2,
                title: "Hiking".to_owned(),
                date: d(2020, 10, 31),
            },
            CalendarEvent {
                id: 3,
                title: "Running".to_owned(),
                date: d(2020, 10, 30),
            },
        ];
        let by_day = events_by_day(&events);
        assert_eq!(by_day[&d(2020, 10, 31)].len(), 2);
        assert_eq!(by_day[&d(2020, 10, 30)].len(), 1);
    }
}
