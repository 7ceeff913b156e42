use thiserror::Error;

use crate::storage::SurveyInstanceId;

/// Errors raised by the grouping engine and its stores.
///
/// None of these are retried internally. Caller input problems
/// (`InvalidArgument`, `EmptyInput`, `NotFound`) are distinguished from
/// storage failures and from `InternalInvariantViolation`, which signals a
/// defect in the balancer itself.
#[derive(Debug, Error)]
pub enum GroupingError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No submissions found for survey {survey_id}")]
    EmptyInput { survey_id: SurveyInstanceId },

    #[error("No stored groups found for survey {survey_id}")]
    NotFound { survey_id: SurveyInstanceId },

    #[error("Internal invariant violated: {0}")]
    InternalInvariantViolation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

// Exit codes for the CLI
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_STORAGE: i32 = 1;
pub const EXIT_INVALID_ARGUMENT: i32 = 2;
pub const EXIT_NOT_FOUND: i32 = 3;
pub const EXIT_CONFIG: i32 = 4;
pub const EXIT_INTERNAL: i32 = 5;

impl GroupingError {
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        GroupingError::InvalidArgument(msg.into())
    }

    pub fn storage<S: Into<String>>(msg: S) -> Self {
        GroupingError::Storage(msg.into())
    }

    pub fn invariant<S: Into<String>>(msg: S) -> Self {
        GroupingError::InternalInvariantViolation(msg.into())
    }

    /// Process exit code the CLI reports for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            GroupingError::InvalidArgument(_) => EXIT_INVALID_ARGUMENT,
            GroupingError::EmptyInput { .. } | GroupingError::NotFound { .. } => EXIT_NOT_FOUND,
            GroupingError::InternalInvariantViolation(_) => EXIT_INTERNAL,
            GroupingError::Storage(_) | GroupingError::Serialization(_) => EXIT_STORAGE,
        }
    }
}

impl From<serde_json::Error> for GroupingError {
    fn from(err: serde_json::Error) -> Self {
        GroupingError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for GroupingError {
    fn from(err: std::io::Error) -> Self {
        GroupingError::Storage(err.to_string())
    }
}
