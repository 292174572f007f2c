/// Ephemeral per-surface form state
///
/// Pure transitions: each takes the previous state plus an action result
/// and returns the next state.

use crate::capture::CapturedFrame;
use super::data::{MarkOutcome, StudentRef};

/// Registration fields as sent to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDraft {
    pub student_id: String,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterForm {
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub photo: Option<CapturedFrame>,
    pub submitting: bool,
}

impl RegisterForm {
    pub fn draft(&self) -> RegistrationDraft {
        let email = self.email.trim();
        RegistrationDraft {
            student_id: self.student_id.trim().to_string(),
            name: self.name.trim().to_string(),
            email: (!email.is_empty()).then(|| email.to_string()),
        }
    }

    #[must_use]
    pub fn with_photo(mut self, photo: CapturedFrame) -> Self {
        self.photo = Some(photo);
        self
    }

    #[must_use]
    pub fn retake(mut self) -> Self {
        self.photo = None;
        self
    }

    #[must_use]
    pub fn begin_submit(mut self) -> Self {
        self.submitting = true;
        self
    }

    /// Success wipes the form and the captured photo; failure keeps the
    /// operator's input for another attempt
    #[must_use]
    pub fn submitted(mut self, result: &Result<String, String>) -> Self {
        match result {
            Ok(_) => Self::default(),
            Err(_) => {
                self.submitting = false;
                self
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkForm {
    pub class_name: String,
    pub frame: Option<CapturedFrame>,
    /// Student shown in the confirmation card until the banner clears
    pub recognized: Option<StudentRef>,
    pub processing: bool,
}

impl MarkForm {
    /// Class label to send; blank means "use the default"
    pub fn class_label(&self) -> Option<String> {
        let label = self.class_name.trim();
        (!label.is_empty()).then(|| label.to_string())
    }

    #[must_use]
    pub fn with_frame(mut self, frame: CapturedFrame) -> Self {
        self.frame = Some(frame);
        self
    }

    #[must_use]
    pub fn begin_mark(mut self) -> Self {
        self.processing = true;
        self.recognized = None;
        self
    }

    #[must_use]
    pub fn marked(mut self, result: &Result<MarkOutcome, String>) -> Self {
        self.processing = false;
        self.recognized = result.as_ref().ok().map(|outcome| outcome.student.clone());
        self
    }

    /// The confirmation card shares the banner's lifetime
    #[must_use]
    pub fn clear_recognized(mut self) -> Self {
        self.recognized = None;
        self
    }
}
