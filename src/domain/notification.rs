// Blocking notifications shown by the CRUD views
use super::error::FetchError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub text: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, title, text)
    }

    pub fn info(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, title, text)
    }

    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, title, text)
    }

    fn new(level: NotificationLevel, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            text: text.into(),
        }
    }
}

/// A CRUD action that did not go through. Local view state is untouched.
#[derive(Debug, Clone, Error)]
#[error("{}: {cause}", .notification.text)]
pub struct ActionError {
    pub cause: FetchError,
    pub notification: Notification,
}

impl ActionError {
    pub fn new(cause: FetchError, text: impl Into<String>) -> Self {
        Self {
            cause,
            notification: Notification::error("Error!", text),
        }
    }
}
