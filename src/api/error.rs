use thiserror::Error;

/// Everything that can go wrong talking to the attendance backend
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Rejected locally before any network call (e.g., no photo captured)
    #[error("{0}")]
    Validation(String),

    /// The call completed but the backend refused it
    #[error("backend rejected request ({status}): {}", message.as_deref().unwrap_or("<no error field>"))]
    Server { status: u16, message: Option<String> },

    /// The call did not complete, or the response could not be read
    #[error("transport failure: {0}")]
    Transport(String),
}

impl ApiError {
    /// Text safe to show to the operator.
    ///
    /// Server messages pass through verbatim; transport details never do.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Validation(text) => text.clone(),
            ApiError::Server { message: Some(text), .. } if !text.trim().is_empty() => text.clone(),
            ApiError::Server { .. } | ApiError::Transport(_) => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_is_verbatim() {
        let err = ApiError::Server { status: 404, message: Some("No face detected".into()) };
        assert_eq!(err.user_message("Failed to mark attendance"), "No face detected");
    }

    #[test]
    fn test_missing_or_blank_message_falls_back() {
        let err = ApiError::Server { status: 500, message: None };
        assert_eq!(err.user_message("Failed to mark attendance"), "Failed to mark attendance");

        let err = ApiError::Server { status: 500, message: Some("  ".into()) };
        assert_eq!(err.user_message("Registration failed"), "Registration failed");
    }

    #[test]
    fn test_transport_details_are_hidden() {
        let err = ApiError::Transport("connection refused (os error 111)".into());
        assert_eq!(err.user_message("Unknown error"), "Unknown error");
    }
}
