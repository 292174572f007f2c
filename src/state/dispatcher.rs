/// Action dispatcher
///
/// Runs the three mutating actions against the backend. Every outcome is
/// reduced to `Result<T, String>`, where the error is already fit to show
/// the operator. Each success publishes a [`MutationEvent`].

use crate::api::{ApiError, Backend, MarkRequest, RegisterRequest};
use crate::capture::CapturedFrame;
use super::data::MarkOutcome;
use super::events::{EventBus, MutationEvent};
use super::forms::RegistrationDraft;

pub const MISSING_PHOTO: &str = "Please capture a photo first!";
pub const MISSING_FRAME: &str = "Please capture a frame first!";
pub const REGISTER_FAILED: &str = "Registration failed";
pub const MARK_FAILED: &str = "Failed to mark attendance";
pub const DELETE_FAILED: &str = "Unknown error";

pub const DEFAULT_CLASS_NAME: &str = "Default Class";

#[derive(Debug, Clone)]
pub struct ActionDispatcher<B> {
    backend: B,
    events: EventBus,
    default_class: String,
}

impl<B: Backend> ActionDispatcher<B> {
    pub fn new(backend: B, events: EventBus) -> Self {
        Self {
            backend,
            events,
            default_class: DEFAULT_CLASS_NAME.to_string(),
        }
    }

    /// Override the label used when no class name is given
    pub fn with_default_class(mut self, default_class: impl Into<String>) -> Self {
        self.default_class = default_class.into();
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Register a student with their captured photo.
    ///
    /// Returns the backend's confirmation message.
    pub async fn register(
        &self,
        draft: RegistrationDraft,
        photo: Option<CapturedFrame>,
    ) -> Result<String, String> {
        let result = self.try_register(draft, photo).await;
        if let Err(e) = &result {
            log::warn!("Registration failed: {}", e);
        }
        result.map_err(|e| e.user_message(REGISTER_FAILED))
    }

    async fn try_register(
        &self,
        draft: RegistrationDraft,
        photo: Option<CapturedFrame>,
    ) -> Result<String, ApiError> {
        let photo = photo.ok_or_else(|| ApiError::Validation(MISSING_PHOTO.to_string()))?;
        if draft.student_id.is_empty() || draft.name.is_empty() {
            return Err(ApiError::Validation(
                "Student ID and name are required".to_string(),
            ));
        }

        let student_id = draft.student_id.clone();
        let message = self
            .backend
            .register_student(RegisterRequest {
                student_id: draft.student_id,
                name: draft.name,
                email: draft.email,
                image: photo.data_url,
            })
            .await?;

        log::info!("✅ Registered student {}", student_id);
        self.events.publish(MutationEvent::StudentRegistered { student_id });
        Ok(message)
    }

    /// Submit one frame for recognition
    pub async fn mark_attendance(
        &self,
        frame: Option<CapturedFrame>,
        class_name: Option<String>,
    ) -> Result<MarkOutcome, String> {
        let result = self.try_mark(frame, class_name).await;
        if let Err(e) = &result {
            log::warn!("Mark attendance failed: {}", e);
        }
        result.map_err(|e| e.user_message(MARK_FAILED))
    }

    async fn try_mark(
        &self,
        frame: Option<CapturedFrame>,
        class_name: Option<String>,
    ) -> Result<MarkOutcome, ApiError> {
        let frame = frame.ok_or_else(|| ApiError::Validation(MISSING_FRAME.to_string()))?;
        let class_name = class_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.default_class.clone());

        let outcome = self
            .backend
            .mark_attendance(MarkRequest {
                image: frame.data_url,
                class_name,
            })
            .await?;

        log::info!(
            "✅ Attendance marked for {} ({})",
            outcome.student.name,
            outcome.student.student_id
        );
        self.events.publish(MutationEvent::AttendanceMarked {
            student_id: outcome.student.student_id.clone(),
        });
        Ok(outcome)
    }

    /// Delete a student. Confirmation happens in the UI before this call.
    pub async fn delete_student(&self, student_id: String) -> Result<String, String> {
        match self.backend.delete_student(student_id.clone()).await {
            Ok(message) => {
                log::info!("🗑️  Deleted student {}", student_id);
                self.events.publish(MutationEvent::StudentDeleted { student_id });
                Ok(message)
            }
            Err(e) => {
                log::warn!("Delete of {} failed: {}", student_id, e);
                Err(e.user_message(DELETE_FAILED))
            }
        }
    }
}

/// Banner text for a successful mark
pub fn mark_success_text(outcome: &MarkOutcome) -> String {
    match outcome.confidence {
        Some(confidence) => format!(
            "Attendance marked for {} with {} confidence",
            outcome.student.name,
            super::data::format_confidence(confidence)
        ),
        None => format!(
            "{} for {}",
            outcome.message.as_deref().unwrap_or("Attendance recorded"),
            outcome.student.name
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use crate::capture::frame_from_bytes;
    use crate::state::data::StudentRef;
    use crate::state::forms::RegisterForm;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use tokio::sync::broadcast::error::TryRecvError;

    fn frame() -> CapturedFrame {
        let mut bytes = Vec::new();
        RgbImage::from_pixel(16, 16, Rgb([90, 90, 90]))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        frame_from_bytes(&bytes).unwrap()
    }

    fn draft() -> RegistrationDraft {
        RegistrationDraft {
            student_id: "STU1".into(),
            name: "Alice".into(),
            email: Some("alice@example.com".into()),
        }
    }

    fn dispatcher(backend: &FakeBackend) -> ActionDispatcher<FakeBackend> {
        ActionDispatcher::new(backend.clone(), EventBus::new())
    }

    #[tokio::test]
    async fn test_register_success_clears_form_and_publishes_once() {
        let backend = FakeBackend::default();
        let dispatcher = dispatcher(&backend);
        let mut events = dispatcher.events().subscribe();

        let form = RegisterForm {
            student_id: "STU1".into(),
            name: "Alice".into(),
            ..Default::default()
        }
        .with_photo(frame());

        let result = dispatcher.register(form.draft(), form.photo.clone()).await;
        let form = form.submitted(&result);

        assert_eq!(result, Ok("Student registered successfully".to_string()));
        assert_eq!(form, RegisterForm::default());
        assert_eq!(
            events.try_recv(),
            Ok(MutationEvent::StudentRegistered { student_id: "STU1".into() })
        );
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));

        let sent = backend.last_register().unwrap();
        assert!(sent.image.starts_with("data:image/jpeg;base64,"));
        assert_eq!(sent.email.as_deref(), Some("alice@example.com"));
    }

    #[tokio::test]
    async fn test_register_without_photo_never_calls_backend() {
        let backend = FakeBackend::default();
        let dispatcher = dispatcher(&backend);
        let mut events = dispatcher.events().subscribe();

        let result = dispatcher.register(draft(), None).await;

        assert_eq!(result, Err(MISSING_PHOTO.to_string()));
        assert_eq!(backend.calls("register"), 0);
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_register_duplicate_surfaces_server_text() {
        let backend = FakeBackend::default();
        backend.set_register(Err(ApiError::Server {
            status: 400,
            message: Some("Student ID already exists".into()),
        }));
        let dispatcher = dispatcher(&backend);
        let mut events = dispatcher.events().subscribe();

        let result = dispatcher.register(draft(), Some(frame())).await;

        assert_eq!(result, Err("Student ID already exists".to_string()));
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_mark_error_is_verbatim() {
        let backend = FakeBackend::default();
        backend.set_mark(Err(ApiError::Server {
            status: 400,
            message: Some("No face detected".into()),
        }));

        let result = dispatcher(&backend).mark_attendance(Some(frame()), None).await;

        assert_eq!(result, Err("No face detected".to_string()));
    }

    #[tokio::test]
    async fn test_mark_empty_error_body_uses_fallback() {
        let backend = FakeBackend::default();
        backend.set_mark(Err(ApiError::Server { status: 500, message: None }));

        let result = dispatcher(&backend).mark_attendance(Some(frame()), None).await;

        assert_eq!(result, Err(MARK_FAILED.to_string()));
    }

    #[tokio::test]
    async fn test_mark_defaults_class_and_publishes() {
        let backend = FakeBackend::default();
        let dispatcher = dispatcher(&backend);
        let mut events = dispatcher.events().subscribe();

        let outcome = dispatcher
            .mark_attendance(Some(frame()), Some("   ".into()))
            .await
            .unwrap();

        assert_eq!(backend.last_mark().unwrap().class_name, DEFAULT_CLASS_NAME);
        assert_eq!(mark_success_text(&outcome), "Attendance marked for Alice with 87.0% confidence");
        assert_eq!(
            events.try_recv(),
            Ok(MutationEvent::AttendanceMarked { student_id: "STU1".into() })
        );
    }

    #[tokio::test]
    async fn test_mark_uses_configured_default_class() {
        let backend = FakeBackend::default();
        let dispatcher = dispatcher(&backend).with_default_class("Homeroom");

        dispatcher.mark_attendance(Some(frame()), None).await.unwrap();

        assert_eq!(backend.last_mark().unwrap().class_name, "Homeroom");
    }

    #[tokio::test]
    async fn test_delete_failure_fallback_and_success_event() {
        let backend = FakeBackend::default();
        backend.set_delete(Err(ApiError::Transport("connection reset".into())));
        let dispatcher = dispatcher(&backend);
        let mut events = dispatcher.events().subscribe();

        let result = dispatcher.delete_student("STU1".into()).await;
        assert_eq!(result, Err(DELETE_FAILED.to_string()));
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));

        backend.set_delete(Ok("Student deleted successfully".into()));
        let result = dispatcher.delete_student("STU1".into()).await;
        assert!(result.is_ok());
        assert_eq!(
            events.try_recv(),
            Ok(MutationEvent::StudentDeleted { student_id: "STU1".into() })
        );
    }

    #[test]
    fn test_already_marked_text_has_no_percentage() {
        let outcome = MarkOutcome {
            student: StudentRef { student_id: "STU1".into(), name: "Alice".into() },
            confidence: None,
            message: Some("Attendance already marked today".into()),
        };
        assert_eq!(mark_success_text(&outcome), "Attendance already marked today for Alice");
    }
}
