//! Error taxonomy for the console core.
//!
//! Transport and backend rejections are kept apart so callers can tell a dead
//! network from a refusal; both carry a message that is safe to show an operator.

use reqwest::StatusCode;
use shared::error::ErrorCode;
use thiserror::Error;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
const SERVICE_TYPE_MISMATCH: &str = "serviceType mismatch";

/// Input rejected on the client before any request leaves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("reason is required")]
    MissingReason,
    #[error("refund amounts cannot be negative")]
    NegativeRefund,
    #[error("refund amount `{0}` is not a whole number")]
    InvalidRefund(String),
    #[error("page must be at least 1")]
    InvalidPage,
    #[error("limit must be greater than zero")]
    InvalidLimit,
    #[error("please select both start and end dates")]
    MissingDate,
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("start date must be before or equal to end date")]
    InvertedRange,
    #[error("date {0} is in the future")]
    FutureDate(String),
    #[error("line {line}: expected signName|description|date|isActive")]
    BulkLineFormat { line: usize },
    #[error("line {line}: invalid date `{value}`")]
    BulkLineDate { line: usize, value: String },
    #[error("no records to upload")]
    EmptyBulkInput,
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    #[error("feedback entries must be JSON objects")]
    FeedbackNotObject,
    #[error("invalid report file name `{0}`")]
    InvalidFileName(String),
    #[error("nothing to update")]
    EmptyUpdate,
    #[error("login token must not be empty")]
    EmptyToken,
    #[error("invalid API base URL `{0}`")]
    InvalidBaseUrl(String),
    #[error("no form is open")]
    FormNotOpen,
    #[error("complaint is already closed")]
    AlreadyClosed,
    #[error("cannot toggle unrecognised {field} `{value}`")]
    UnknownState { field: &'static str, value: String },
}

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("network error: {message}")]
    Transport { message: String },
    #[error("request rejected ({status}): {message}")]
    Rejected {
        status: u16,
        code: ErrorCode,
        message: String,
    },
    #[error("session expired or unauthorized")]
    Unauthorized,
    #[error("login failed: {message}")]
    LoginFailed { message: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("action `{key}` is already in progress")]
    ActionInProgress { key: String },
    #[error("unexpected response body: {message}")]
    Decode { message: String },
    #[error("{message}")]
    Io { message: String },
}

impl ClientError {
    pub fn rejected(status: StatusCode, body_message: Option<&str>) -> Self {
        let message = body_message
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
        Self::Rejected {
            status: status.as_u16(),
            code: ErrorCode::from_status(status.as_u16()),
            message,
        }
    }

    /// Text suitable for an operator-facing notice.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { .. } => {
                "Server unreachable; check the API URL or network and retry.".to_string()
            }
            Self::Rejected { message, .. } if message.is_empty() => GENERIC_FAILURE.to_string(),
            Self::Rejected { message, .. } => message.clone(),
            Self::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            Self::LoginFailed { message } => message.clone(),
            Self::Validation(err) => capitalize(&err.to_string()),
            Self::ActionInProgress { .. } => {
                "That action is already in progress; please wait.".to_string()
            }
            Self::Decode { .. } => GENERIC_FAILURE.to_string(),
            Self::Io { message } => message.clone(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// The detail endpoint refuses orders whose recorded channel disagrees with
    /// the requested one.
    pub fn is_service_type_mismatch(&self) -> bool {
        matches!(self, Self::Rejected { message, .. } if message.contains(SERVICE_TYPE_MISMATCH))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode {
                message: err.to_string(),
            }
        } else {
            Self::Transport {
                message: err.to_string(),
            }
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_falls_back_to_status_message() {
        let err = ClientError::rejected(StatusCode::BAD_REQUEST, Some("   "));
        assert_eq!(err.user_message(), "Request failed with status 400");

        let err = ClientError::rejected(StatusCode::CONFLICT, Some("already closed"));
        assert_eq!(err.user_message(), "already closed");
        assert!(matches!(
            err,
            ClientError::Rejected {
                code: ErrorCode::Conflict,
                ..
            }
        ));
    }

    #[test]
    fn detects_service_type_mismatch() {
        let err = ClientError::rejected(
            StatusCode::BAD_REQUEST,
            Some("order exists but serviceType mismatch"),
        );
        assert!(err.is_service_type_mismatch());
        assert!(!ClientError::Unauthorized.is_service_type_mismatch());
    }

    #[test]
    fn validation_message_is_capitalized() {
        let err = ClientError::from(ValidationError::MissingReason);
        assert_eq!(err.user_message(), "Reason is required");
    }
}
