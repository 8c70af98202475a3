use thiserror::Error;

use crate::forms::ValidationErrors;
use crate::shell::Route;

/// Error types for Leaply admin operations
#[derive(Debug, Clone, Error)]
pub enum AdminError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("request failed"))]
    Api { status: u16, message: Option<String> },

    #[error("Not authorized (HTTP {status})")]
    Unauthorized { status: u16, message: Option<String> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AdminError {
    /// Create a new Api error
    pub fn api(status: u16, message: Option<String>) -> Self {
        Self::Api { status, message }
    }

    /// Create a new Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// The server-supplied message, if the failure carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } | Self::Unauthorized { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Message to show the user: the server's message verbatim, else `fallback`.
    ///
    /// Validation failures always show their own field messages.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(errors) => errors.to_string(),
            _ => self
                .server_message()
                .map_or_else(|| fallback.to_string(), str::to_string),
        }
    }

    /// Route the host should navigate to after this error, if any.
    pub fn redirect(&self) -> Option<Route> {
        match self {
            Self::Unauthorized { status: 401, .. } => Some(Route::Login),
            _ => None,
        }
    }

    /// Get error category for logging and notification
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Unauthorized { .. } => ErrorCategory::Authorization,
            Self::Api { .. } | Self::Network(_) | Self::Decode(_) => ErrorCategory::Request,
            Self::Storage(_) | Self::Configuration(_) => ErrorCategory::Local,
        }
    }
}

impl From<ValidationErrors> for AdminError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Error categories, matching how each failure reaches the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caught client-side, field-scoped, blocks submission.
    Validation,
    /// Network or server failure, surfaced as a transient notification.
    Request,
    /// Rejected credentials; the session is sent back to login.
    Authorization,
    /// Local storage or configuration problem.
    Local,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Request => write!(f, "request"),
            Self::Authorization => write!(f, "authorization"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Convenience result type for admin operations
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_message() {
        let err = AdminError::api(409, Some("University already exists".into()));
        assert_eq!(err.user_message("Operation failed"), "University already exists");
        assert_eq!(err.category(), ErrorCategory::Request);
    }

    #[test]
    fn test_user_message_falls_back() {
        let err = AdminError::api(500, None);
        assert_eq!(err.user_message("Operation failed"), "Operation failed");

        let err = AdminError::Network("connection refused".into());
        assert_eq!(err.user_message("Login failed"), "Login failed");
    }

    #[test]
    fn test_unauthorized_redirects_to_login() {
        let err = AdminError::Unauthorized {
            status: 401,
            message: None,
        };
        assert_eq!(err.redirect(), Some(Route::Login));
        assert_eq!(err.category(), ErrorCategory::Authorization);

        let forbidden = AdminError::Unauthorized {
            status: 403,
            message: Some("Admin only".into()),
        };
        assert_eq!(forbidden.redirect(), None);
        assert_eq!(forbidden.user_message("Operation failed"), "Admin only");
    }

    #[test]
    fn test_validation_error_message_lists_fields() {
        let mut errors = ValidationErrors::default();
        errors.add("name", "Name is required");
        let err: AdminError = errors.into();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.user_message("Operation failed").contains("Name is required"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err: AdminError = json_err.into();
        assert!(matches!(err, AdminError::Decode(_)));
    }

    #[test]
    fn test_error_categories_display() {
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
        assert_eq!(ErrorCategory::Request.to_string(), "request");
        assert_eq!(ErrorCategory::Authorization.to_string(), "authorization");
        assert_eq!(ErrorCategory::Local.to_string(), "local");
    }
}
