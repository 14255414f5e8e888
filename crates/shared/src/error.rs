use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::{Notice, NoticeLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Duplicate,
    Unauthorized,
    Disabled,
    NotFound,
    Internal,
}

impl ErrorCode {
    /// How a failure with this code is surfaced to the person who caused it.
    pub fn notice_level(self) -> NoticeLevel {
        match self {
            ErrorCode::Validation | ErrorCode::NotFound => NoticeLevel::Warning,
            ErrorCode::Duplicate | ErrorCode::Disabled => NoticeLevel::Info,
            ErrorCode::Unauthorized | ErrorCode::Internal => NoticeLevel::Error,
        }
    }
}

/// A rejected action. The message is shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<ApiError> for Notice {
    fn from(value: ApiError) -> Self {
        Notice::new(value.code.notice_level(), value.message)
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
