//! User-visible notifications
//!
//! The coordinator and the store report outcomes through a [`Notifier`];
//! the UI renders them as transient toasts.

use log::warn;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

pub trait Notifier {
    fn notify(&self, notice: Notice);

    /// A call came back 401: the session is gone and the user must sign in again.
    fn session_expired(&self) {}
}

/// Where a failed operation was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    /// A form that renders field messages next to its inputs.
    Form,
    /// A button or checkbox with nowhere to show field messages.
    Action,
}

/// Route a failure: auth errors end the session, field errors stay on the
/// form that sent them, everything else becomes one error notice.
pub(crate) fn report_failure(notifier: &dyn Notifier, title: &str, err: &ApiError, origin: Origin) {
    warn!("{} failed: {}", title, err);
    if err.is_auth() {
        notifier.session_expired();
    } else if origin == Origin::Action || !err.is_inline() {
        notifier.notify(Notice::error(title, err.user_message()));
    }
}
