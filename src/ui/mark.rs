use iced::widget::{button, column, container, image, row, text, text_input, Column};
use iced::{Element, Length};

use crate::state::banner::BannerSlot;
use crate::state::forms::MarkForm;
use crate::Message;
use super::{banner, filled, GREEN, MUTED};

/// Mark-attendance surface state
#[derive(Debug, Default)]
pub struct MarkScreen {
    pub form: MarkForm,
    pub banner: BannerSlot,
}

pub fn view(screen: &MarkScreen) -> Element<Message> {
    let form = &screen.form;
    let mut content = Column::new().spacing(20).push(text("Mark Attendance").size(32));

    if let Some(banner) = banner(&screen.banner) {
        content = content.push(banner);
    }

    if let Some(student) = &form.recognized {
        content = content.push(
            container(
                column![
                    text("Attendance Marked!").size(22),
                    text(format!("{} ({})", student.name, student.student_id)).size(18),
                ]
                .spacing(6),
            )
            .padding(16)
            .width(Length::Fill)
            .style(filled(GREEN)),
        );
    }

    let preview: Element<Message> = match &form.frame {
        Some(frame) => image(image::Handle::from_bytes(frame.jpeg.clone()))
            .width(Length::Fixed(320.0))
            .into(),
        None => text("No frame captured").color(MUTED).into(),
    };

    let mark = button(text(if form.processing { "Processing..." } else { "Mark Attendance" }))
        .on_press_maybe((!form.processing && form.frame.is_some()).then_some(Message::MarkAttendance))
        .padding(10);

    let capture = button(text(if form.frame.is_some() { "Retake Frame" } else { "Capture Frame" }))
        .on_press_maybe((!form.processing).then_some(Message::CaptureFrame))
        .style(button::secondary)
        .padding(10);

    content
        .push(text("Class/Subject Name (Optional)").size(14))
        .push(
            text_input("e.g., Mathematics 101", &form.class_name)
                .on_input(Message::ClassNameChanged)
                .padding(8),
        )
        .push(preview)
        .push(row![mark, capture].spacing(16))
        .push(
            text("Use a well-lit, front-facing snapshot. One face per frame.")
                .size(13)
                .color(MUTED),
        )
        .into()
}
