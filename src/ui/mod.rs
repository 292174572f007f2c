/// UI surfaces
///
/// One module per surface, plus shared widgets:
/// - `dashboard.rs` - counters, rate gauge, recent activity
/// - `mark.rs` - frame capture and recognition
/// - `register.rs` - new student form
/// - `records.rs` - date-filtered records, roster, CSV export
/// - `rate_gauge.rs` - present/absent bar drawn on a canvas

pub mod dashboard;
pub mod mark;
pub mod rate_gauge;
pub mod records;
pub mod register;

use iced::widget::{container, row, text, Row};
use iced::{Background, Border, Color, Element, Length};

use crate::state::banner::{BannerKind, BannerSlot};
use crate::state::data::{AttendanceStatus, StatusKind};
use crate::Message;

pub const GREEN: Color = Color { r: 0.063, g: 0.725, b: 0.506, a: 1.0 };
pub const RED: Color = Color { r: 0.937, g: 0.267, b: 0.267, a: 1.0 };
pub const AMBER: Color = Color { r: 0.961, g: 0.620, b: 0.043, a: 1.0 };
pub const INDIGO: Color = Color { r: 0.400, g: 0.494, b: 0.918, a: 1.0 };
pub const MUTED: Color = Color { r: 0.420, g: 0.447, b: 0.502, a: 1.0 };

/// Solid rounded box, used for cards and banners
pub fn filled(color: Color) -> impl Fn(&iced::Theme) -> container::Style {
    move |_theme| container::Style {
        background: Some(Background::Color(color)),
        text_color: Some(Color::WHITE),
        border: Border {
            radius: 8.0.into(),
            ..Border::default()
        },
        ..container::Style::default()
    }
}

/// Headline counter card
pub fn stat_card<'a>(label: &'a str, value: String, color: Color) -> Element<'a, Message> {
    container(
        iced::widget::column![text(label).size(14), text(value).size(32)].spacing(6),
    )
    .padding(16)
    .width(Length::Fill)
    .style(filled(color))
    .into()
}

/// The surface's current banner, if any
pub fn banner(slot: &BannerSlot) -> Option<Element<'_, Message>> {
    slot.current().map(|banner| {
        let color = match banner.kind {
            BannerKind::Success => GREEN,
            BannerKind::Error => RED,
        };
        container(text(&banner.text))
            .padding(12)
            .width(Length::Fill)
            .style(filled(color))
            .into()
    })
}

/// Fixed-proportion table row built from plain strings
pub fn table_row<'a>(cells: Vec<(String, u16)>) -> Row<'a, Message> {
    cells
        .into_iter()
        .fold(row![].spacing(8), |row, (value, portion)| {
            row.push(text(value).size(14).width(Length::FillPortion(portion)))
        })
}

/// Status text tinted by its kind
pub fn status_cell<'a>(status: &AttendanceStatus, portion: u16) -> Element<'a, Message> {
    let color = match status.kind() {
        StatusKind::Present => GREEN,
        StatusKind::Absent => RED,
        StatusKind::Late => AMBER,
        StatusKind::Other => MUTED,
    };
    text(status.to_string())
        .size(14)
        .color(color)
        .width(Length::FillPortion(portion))
        .into()
}

pub fn table_header<'a>(cells: &[(&'a str, u16)]) -> Row<'a, Message> {
    cells.iter().fold(row![].spacing(8), |row, (label, portion)| {
        row.push(
            text(*label)
                .size(14)
                .color(MUTED)
                .width(Length::FillPortion(*portion)),
        )
    })
}

/// Centered hint shown instead of an empty table
pub fn empty_hint(message: &str) -> Element<'_, Message> {
    container(text(message).color(MUTED))
        .padding(32)
        .width(Length::Fill)
        .center_x(Length::Fill)
        .into()
}
