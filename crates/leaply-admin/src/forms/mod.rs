//! Form controllers: hold a working copy as entered text, validate it into a
//! typed payload, submit, and invalidate the affected cache tag.
//!
//! Text fields are kept exactly as typed. Blank input means "unset" and
//! becomes `None` in the payload; it is never coerced to `0` or `""`.

mod login;
mod program;
mod university;

use std::collections::BTreeMap;

use url::Url;

use crate::error::AdminError;

pub use login::{LOGIN_FAILED, LoginForm};
pub use program::{DEFAULT_DEGREE_TYPE, DEFAULT_DELIVERY_MODE, DEFAULT_LANGUAGE, ProgramForm};
pub use university::UniversityForm;

/// Generic failure text when the server gives no message.
pub const OPERATION_FAILED: &str = "Operation failed";

/// Field-scoped validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    /// Record a message; the first message for a field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A transient, user-visible message (a toast in the web panel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    /// Error toast for `err`: the server's message verbatim, else `fallback`.
    pub fn from_error(err: &AdminError, fallback: &str) -> Self {
        Self::error(err.user_message(fallback))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    Create,
    Update,
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOutcome {
    pub mode: SubmitMode,
    pub notification: Notification,
    /// Signal the host view to close the form.
    pub close: bool,
}

impl FormOutcome {
    fn saved(mode: SubmitMode, label: &str) -> Self {
        let verb = match mode {
            SubmitMode::Create => "created",
            SubmitMode::Update => "updated",
        };
        Self {
            mode,
            notification: Notification::success(format!("{label} {verb}")),
            close: true,
        }
    }
}

// --- Field coercion ---

fn optional_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    input: &str,
    message: &str,
) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        errors.add(field, message);
    }
    trimmed.to_string()
}

fn optional_int(errors: &mut ValidationErrors, field: &'static str, input: &str) -> Option<i32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<i32>() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.add(field, "Expected an integer");
            None
        }
    }
}

fn optional_number(errors: &mut ValidationErrors, field: &'static str, input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => {
            errors.add(field, "Expected a number");
            None
        }
    }
}

/// Absolute URL or blank.
fn optional_url(errors: &mut ValidationErrors, field: &'static str, input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    match Url::parse(trimmed) {
        Ok(_) => Some(trimmed.to_string()),
        Err(_) => {
            errors.add(field, "Invalid url");
            None
        }
    }
}

fn text_of(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

fn number_text<N: ToString>(value: Option<N>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}
