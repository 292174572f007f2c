use iced::task;
use iced::widget::{canvas, column, row, text, Column};
use iced::{Element, Length};

use crate::state::data::{local_time, AttendanceRecord};
use crate::state::stats::StatsCache;
use crate::Message;
use super::rate_gauge::RateGauge;
use super::{empty_hint, stat_card, status_cell, table_header, table_row, AMBER, GREEN, INDIGO, RED};

/// Dashboard surface state
///
/// Owns the recent-activity poll: dropping the dashboard (navigating
/// away) drops the handle and aborts the poll stream.
pub struct Dashboard {
    recent: Vec<AttendanceRecord>,
    _poll: task::Handle,
}

impl Dashboard {
    pub fn new(poll: task::Handle) -> Self {
        Self {
            recent: Vec::new(),
            _poll: poll,
        }
    }

    /// Replace the held list with the latest tick's result
    pub fn recent_loaded(&mut self, records: Vec<AttendanceRecord>) {
        self.recent = records;
    }

    pub fn recent(&self) -> &[AttendanceRecord] {
        &self.recent
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        log::info!("Recent-activity polling stopped");
    }
}

const RECENT_COLUMNS: [(&str, u16); 4] = [("Student ID", 2), ("Name", 3), ("Time", 2), ("Status", 1)];

pub fn view<'a>(dashboard: &'a Dashboard, stats: &'a StatsCache) -> Element<'a, Message> {
    let snapshot = stats.snapshot();

    let cards = row![
        stat_card("Total Students", snapshot.total_students.to_string(), INDIGO),
        stat_card("Present Today", snapshot.present.to_string(), GREEN),
        stat_card("Absent Today", snapshot.absent.to_string(), RED),
        stat_card(
            "Attendance Rate",
            if stats.is_loaded() { format!("{:.1}%", stats.attendance_rate()) } else { "...".to_string() },
            AMBER,
        ),
    ]
    .spacing(16);

    let gauge = canvas(RateGauge::from(snapshot))
        .width(Length::Fill)
        .height(Length::Fixed(12.0));

    let recent: Element<Message> = if dashboard.recent().is_empty() {
        empty_hint("No attendance records yet")
    } else {
        dashboard
            .recent()
            .iter()
            .fold(Column::new().push(table_header(&RECENT_COLUMNS)), |table, record| {
                table.push(
                    table_row(vec![
                        (record.student_id.clone(), 2),
                        (record.student_name.clone(), 3),
                        (local_time(&record.timestamp), 2),
                    ])
                    .push(status_cell(&record.status, 1)),
                )
            })
            .spacing(10)
            .into()
    };

    column![
        text("Dashboard").size(32),
        cards,
        gauge,
        text("Recent Attendance").size(22),
        recent,
    ]
    .spacing(20)
    .into()
}
