//! # Console Error Type
//!
//! Unified error type for console commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Command Function ── Result<T, ConsoleError>                            │
//! │         │                                                               │
//! │         ├── ClientError (backend, submission) ──┐                       │
//! │         ├── CoreError (validation, fees) ───────┼──► ConsoleError       │
//! │         └── io / JSON (draft file) ─────────────┘        │              │
//! │                                                          ▼              │
//! │                                    stderr: [CODE] operator message      │
//! │                                    exit status 1                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The message is always the operator-facing text from
//! [`ClientError::user_message`]; technical detail goes to the log.

use balcao_api::ClientError;
use balcao_core::{CoreError, ValidationError};
use serde::Serialize;

/// Error returned from console commands.
///
/// ```json
/// { "code": "PARTIAL_SUBMISSION", "message": "Order PV-0007 was saved, but ..." }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record missing locally or on the backend
    NotFound,

    /// Input or draft failed validation
    ValidationError,

    /// Business rule refused the operation
    BusinessLogic,

    /// Missing or rejected credentials
    Unauthorized,

    /// Backend unreachable or failing
    BackendError,

    /// Order created, a follow-up step failed
    PartialSubmission,

    /// Submission already running or done
    Conflict,

    /// Bad configuration or unreadable input file
    Internal,
}

impl ConsoleError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ConsoleError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ConsoleError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ConsoleError::new(ErrorCode::Internal, message)
    }
}

impl From<ClientError> for ConsoleError {
    fn from(err: ClientError) -> Self {
        let code = match &err {
            ClientError::Core(core) => return ConsoleError::from_core(core, err.user_message()),
            ClientError::NotFound(_) => ErrorCode::NotFound,
            ClientError::Validation(_) => ErrorCode::ValidationError,
            ClientError::Unauthorized | ClientError::Forbidden(_) => ErrorCode::Unauthorized,
            ClientError::Http(_) | ClientError::InvalidResponse(_) | ClientError::Internal(_) => {
                ErrorCode::BackendError
            }
            ClientError::Serialization(_) | ClientError::Config(_) => ErrorCode::Internal,
            ClientError::SubmissionInFlight | ClientError::AlreadySubmitted => ErrorCode::Conflict,
            ClientError::PaymentNotRecorded { .. } | ClientError::StatusNotApplied { .. } => {
                ErrorCode::PartialSubmission
            }
        };
        ConsoleError::new(code, err.user_message())
    }
}

impl From<CoreError> for ConsoleError {
    fn from(err: CoreError) -> Self {
        ClientError::Core(err).into()
    }
}

impl From<ValidationError> for ConsoleError {
    fn from(err: ValidationError) -> Self {
        ConsoleError::validation(err.to_string())
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("I/O failure: {}", err);
        ConsoleError::internal(format!("Could not read input: {}", err))
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        ConsoleError::validation(format!("Invalid draft file: {}", err))
    }
}

impl ConsoleError {
    fn from_core(err: &CoreError, message: String) -> Self {
        let code = match err {
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::Validation(_) | CoreError::ItemIndexOutOfRange { .. } => {
                ErrorCode::ValidationError
            }
            CoreError::InvalidInstallmentCount { .. } | CoreError::IllegalTransition { .. } => {
                ErrorCode::BusinessLogic
            }
        };
        ConsoleError::new(code, message)
    }
}

impl std::fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ConsoleError {}
