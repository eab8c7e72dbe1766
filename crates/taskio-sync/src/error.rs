//! Error types for the Task.io client.
//!
//! Every failure of a gateway call lands in one [`ApiError`] variant. The
//! type is `Clone` because a de-duplicated fetch hands the same outcome to
//! every waiting caller.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Shown when the response body carries no usable message.
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// A message attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors surfaced by gateway calls and client-side validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The request never reached the server.
    #[error("network error: {0}")]
    Network(String),

    /// 4xx other than 401, or a form rejected before sending.
    #[error("{message}")]
    Validation {
        status: Option<u16>,
        message: String,
        fields: Vec<FieldError>,
    },

    /// 401: the session is missing, expired, or the credentials are wrong.
    #[error("{message}")]
    Auth { message: String },

    /// 5xx.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The body did not match the expected schema.
    #[error("unexpected response: {0}")]
    MalformedResponse(String),
}

/// Convenience alias for gateway results.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error body shape: `{ "message": "...", "errors": { "field": ["..."] } }`
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, FieldMessages>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldMessages {
    One(String),
    Many(Vec<String>),
}

impl ApiError {
    /// Build an error from a non-success status and its raw body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_MESSAGE.to_string());

        match status {
            401 => ApiError::Auth { message },
            400..=499 => {
                let fields = parsed
                    .errors
                    .into_iter()
                    .flat_map(|(field, messages)| {
                        let messages = match messages {
                            FieldMessages::One(m) => vec![m],
                            FieldMessages::Many(ms) => ms,
                        };
                        messages.into_iter().map(move |m| FieldError::new(field.clone(), m))
                    })
                    .collect();
                ApiError::Validation {
                    status: Some(status),
                    message,
                    fields,
                }
            }
            _ => ApiError::Server { status, message },
        }
    }

    /// Client-side validation failure (never sent to the server).
    pub fn invalid(fields: Vec<FieldError>) -> Self {
        let message = fields
            .first()
            .map(|f| f.message.clone())
            .unwrap_or_else(|| GENERIC_MESSAGE.to_string());
        ApiError::Validation {
            status: None,
            message,
            fields,
        }
    }

    /// Human-readable text for a notification.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => "Could not reach the server. Check your connection.".to_string(),
            ApiError::MalformedResponse(_) => GENERIC_MESSAGE.to_string(),
            ApiError::Validation { message, .. }
            | ApiError::Auth { message }
            | ApiError::Server { message, .. } => message.clone(),
        }
    }

    /// Field-level messages, empty unless this is a validation error.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ApiError::Validation { fields, .. } => fields,
            _ => &[],
        }
    }

    /// First message for `field`, if any.
    pub fn field_message(&self, field: &str) -> Option<&str> {
        self.field_errors()
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.message.as_str())
    }

    /// Displayed next to a form field rather than as a notification.
    pub fn is_inline(&self) -> bool {
        !self.field_errors().is_empty()
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::MalformedResponse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::MalformedResponse(err.to_string())
    }
}
