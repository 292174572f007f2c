use chrono::NaiveDate;
use iced::widget::{button, row, scrollable, text, text_input, Column};
use iced::{Element, Length};

use crate::api::ApiError;
use crate::state::banner::BannerSlot;
use crate::state::data::{format_confidence, local_time, AttendanceRecord};
use crate::state::records::{self, Roster, RecordsView, Ticket};
use crate::state::surface::SurfaceId;
use crate::Message;
use super::{banner, empty_hint, status_cell, table_header, table_row, MUTED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordsTab {
    Attendance,
    Students,
}

/// View-records surface state
#[derive(Debug)]
pub struct RecordsScreen {
    pub tab: RecordsTab,
    pub view: RecordsView,
    pub roster: Roster,
    /// Raw text of the date field; may be mid-edit and unparsable
    pub date_input: String,
    /// Student awaiting delete confirmation
    pub pending_delete: Option<String>,
    pub banner: BannerSlot,
}

impl RecordsScreen {
    /// Open the screen on `today`, returning the ticket for its first fetch
    pub fn open(surface: SurfaceId, today: NaiveDate) -> (Self, Ticket) {
        let (view, ticket) = RecordsView::new(surface, today).reload();
        let screen = Self {
            tab: RecordsTab::Attendance,
            view,
            roster: Roster::default(),
            date_input: today.format("%Y-%m-%d").to_string(),
            pending_delete: None,
            banner: BannerSlot::default(),
        };
        (screen, ticket)
    }

    /// Keystroke in the date field. The text is kept as typed; a fetch is
    /// issued only once it reads as a complete date.
    pub fn date_typed(&mut self, value: String, today: NaiveDate) -> Option<Ticket> {
        let parsed = records::parse_date(&value);
        self.date_input = value;
        let date = parsed?;
        self.with_view(|view| view.select_date(date, today))
    }

    /// Date chosen with the step or today buttons; the field follows the
    /// selection.
    pub fn date_picked(&mut self, date: NaiveDate, today: NaiveDate) -> Option<Ticket> {
        let ticket = self.with_view(|view| view.select_date(date, today));
        self.date_input = self.view.selected_date().format("%Y-%m-%d").to_string();
        ticket
    }

    pub fn records_loaded(&mut self, ticket: Ticket, result: Result<Vec<AttendanceRecord>, ApiError>) {
        self.with_view(|view| (view.loaded(ticket, result), ()))
    }

    fn with_view<T>(&mut self, f: impl FnOnce(RecordsView) -> (RecordsView, T)) -> T {
        let placeholder = RecordsView::new(self.view.surface(), self.view.selected_date());
        let (view, out) = f(std::mem::replace(&mut self.view, placeholder));
        self.view = view;
        out
    }
}

const ATTENDANCE_COLUMNS: [(&str, u16); 6] = [
    ("Student ID", 2),
    ("Name", 3),
    ("Time", 2),
    ("Confidence", 2),
    ("Class", 3),
    ("Status", 1),
];

const STUDENT_COLUMNS: [(&str, u16); 4] = [("Student ID", 2), ("Name", 3), ("Email", 3), ("Registered On", 2)];

pub fn view(screen: &RecordsScreen) -> Element<Message> {
    let tab_button = |label: &'static str, tab: RecordsTab| {
        button(text(label))
            .on_press(Message::RecordsTabSelected(tab))
            .style(if screen.tab == tab { button::primary } else { button::secondary })
    };

    let mut content = Column::new()
        .spacing(16)
        .push(text("View Records").size(32))
        .push(
            row![
                tab_button("Attendance Records", RecordsTab::Attendance),
                tab_button("Registered Students", RecordsTab::Students),
            ]
            .spacing(12),
        );

    if let Some(banner) = banner(&screen.banner) {
        content = content.push(banner);
    }

    let body = match screen.tab {
        RecordsTab::Attendance => attendance(screen),
        RecordsTab::Students => students(screen),
    };

    content.push(body).into()
}

fn attendance(screen: &RecordsScreen) -> Element<Message> {
    let records = screen.view.records();

    let controls = row![
        button(text("◀")).on_press(Message::ShiftDate(-1)).style(button::secondary),
        text_input("YYYY-MM-DD", &screen.date_input)
            .on_input(Message::DateInputChanged)
            .padding(8)
            .width(Length::Fixed(140.0)),
        button(text("▶")).on_press(Message::ShiftDate(1)).style(button::secondary),
        button(text("Today")).on_press(Message::JumpToToday).style(button::secondary),
        iced::widget::horizontal_space(),
        button(text("Export CSV"))
            .on_press_maybe((!records.is_empty()).then_some(Message::ExportCsv))
            .style(button::secondary),
    ]
    .spacing(8);

    let table: Element<Message> = if screen.view.is_loading() {
        empty_hint("Loading...")
    } else if records.is_empty() {
        empty_hint("No attendance records for this date")
    } else {
        let rows = records.iter().fold(
            Column::new().spacing(10).push(table_header(&ATTENDANCE_COLUMNS)),
            |table, record| {
                table.push(table_row(vec![
                    (record.student_id.clone(), 2),
                    (record.student_name.clone(), 3),
                    (local_time(&record.timestamp), 2),
                    (
                        record.confidence.map(format_confidence).unwrap_or_else(|| "N/A".into()),
                        2,
                    ),
                    (record.class_name.clone().unwrap_or_else(|| "N/A".into()), 3),
                ])
                .push(status_cell(&record.status, 1)))
            },
        );
        scrollable(rows).height(Length::Fill).into()
    };

    Column::new()
        .spacing(16)
        .push(controls)
        .push(table)
        .into()
}

fn students(screen: &RecordsScreen) -> Element<Message> {
    let students = screen.roster.students();
    let heading = text(format!("Registered Students ({})", students.len())).size(22);

    if students.is_empty() {
        return Column::new()
            .spacing(16)
            .push(heading)
            .push(empty_hint("No students registered yet"))
            .into();
    }

    let rows = students.iter().fold(
        Column::new().spacing(10).push(table_header(&STUDENT_COLUMNS)),
        |table, student| {
            let actions: Element<Message> = if screen.pending_delete.as_deref() == Some(student.student_id.as_str()) {
                row![
                    button(text("Confirm"))
                        .on_press(Message::ConfirmDelete(student.student_id.clone()))
                        .style(button::danger),
                    button(text("Cancel"))
                        .on_press(Message::CancelDelete)
                        .style(button::secondary),
                ]
                .spacing(6)
                .into()
            } else {
                button(text("Delete"))
                    .on_press(Message::RequestDelete(student.student_id.clone()))
                    .style(button::secondary)
                    .into()
            };

            table.push(
                table_row(vec![
                    (student.student_id.clone(), 2),
                    (student.name.clone(), 3),
                    (student.email.clone().unwrap_or_else(|| "N/A".into()), 3),
                    (
                        student
                            .created_at
                            .with_timezone(&chrono::Local)
                            .format("%Y-%m-%d")
                            .to_string(),
                        2,
                    ),
                ])
                .push(actions),
            )
        },
    );

    Column::new()
        .spacing(16)
        .push(heading)
        .push(text("Deleting a student is immediate and cannot be undone.").size(13).color(MUTED))
        .push(scrollable(rows).height(Length::Fill))
        .into()
}
