use iced::widget::{button, image, row, text, text_input, Column};
use iced::{Element, Length};

use crate::state::banner::BannerSlot;
use crate::state::forms::RegisterForm;
use crate::Message;
use super::{banner, MUTED};

/// Register-student surface state
#[derive(Debug, Default)]
pub struct RegisterScreen {
    pub form: RegisterForm,
    pub banner: BannerSlot,
}

pub fn view(screen: &RegisterScreen) -> Element<Message> {
    let form = &screen.form;
    let mut content = Column::new()
        .spacing(16)
        .push(text("Register New Student").size(32));

    if let Some(banner) = banner(&screen.banner) {
        content = content.push(banner);
    }

    let photo: Element<Message> = match &form.photo {
        Some(frame) => Column::new()
            .spacing(8)
            .push(image(image::Handle::from_bytes(frame.jpeg.clone())).width(Length::Fixed(240.0)))
            .push(
                button(text("Retake Photo"))
                    .on_press_maybe((!form.submitting).then_some(Message::RetakePhoto))
                    .style(button::secondary),
            )
            .into(),
        None => row![
            button(text("Capture Photo"))
                .on_press(Message::CapturePhoto)
                .style(button::secondary),
            text("No photo yet").color(MUTED),
        ]
        .spacing(12)
        .into(),
    };

    let submit = button(text(if form.submitting { "Registering..." } else { "Register Student" }))
        .on_press_maybe((!form.submitting).then_some(Message::SubmitRegistration))
        .padding(10);

    content
        .push(text("Student ID").size(14))
        .push(
            text_input("e.g., STU2024001", &form.student_id)
                .on_input(Message::StudentIdChanged)
                .padding(8),
        )
        .push(text("Full Name").size(14))
        .push(
            text_input("Enter student name", &form.name)
                .on_input(Message::NameChanged)
                .padding(8),
        )
        .push(text("Email Address").size(14))
        .push(
            text_input("student@example.com", &form.email)
                .on_input(Message::EmailChanged)
                .padding(8),
        )
        .push(text("Photo").size(14))
        .push(photo)
        .push(submit)
        .into()
}
