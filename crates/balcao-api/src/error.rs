//! # Client Error Types
//!
//! Error types for every operation that may touch the backend.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Client Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Local          │  │   Backend       │  │     Submission          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Core           │  │  Http           │  │  SubmissionInFlight     │ │
//! │  │  Config         │  │  Unauthorized   │  │  AlreadySubmitted       │ │
//! │  │  Serialization  │  │  NotFound       │  │  PaymentNotRecorded     │ │
//! │  │                 │  │  Validation     │  │  StatusNotApplied       │ │
//! │  │                 │  │  Internal       │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Local errors never produced a request. Backend errors are surfaced    │
//! │  once and never retried automatically.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use balcao_core::{CoreError, StatusAction, ValidationError};
use thiserror::Error;
use tracing::error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// Request could not be sent or the body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response arrived but is not what the endpoint promises.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend rejected the payload (HTTP 400).
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    // =========================================================================
    // Local Errors
    // =========================================================================
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Business rule failed before any request.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    // =========================================================================
    // Submission Errors
    // =========================================================================
    /// Another submit of the same order is still running.
    #[error("Order submission already in progress")]
    SubmissionInFlight,

    /// The order was already created; start a new one.
    #[error("Order was already submitted")]
    AlreadySubmitted,

    /// The order exists but its payment record was not created.
    #[error("Order {number} was created but its payment was not recorded: {reason}")]
    PaymentNotRecorded { number: String, reason: String },

    /// The order exists but the follow-up status step failed.
    #[error("Order {number} was created but could not {action}: {reason}")]
    StatusNotApplied {
        number: String,
        action: StatusAction,
        reason: String,
    },
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Core(CoreError::Validation(err))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

impl ClientError {
    /// Single notification text for the operator.
    ///
    /// Technical detail of transport and server failures is logged, not shown.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Http(e) => {
                error!("HTTP failure: {}", e);
                if e.is_timeout() {
                    "The server took too long to respond. Try again.".to_string()
                } else {
                    "Could not reach the server. Check the connection and try again.".to_string()
                }
            }
            ClientError::InvalidResponse(detail) | ClientError::Internal(detail) => {
                error!("Backend failure: {}", detail);
                "The server could not complete the operation. Try again.".to_string()
            }
            ClientError::Serialization(e) => {
                error!("Serialization failure: {}", e);
                "The server could not complete the operation. Try again.".to_string()
            }
            ClientError::Unauthorized => "Your session has expired. Sign in again.".to_string(),
            ClientError::Forbidden(_) => "You do not have permission for this operation.".to_string(),
            ClientError::NotFound(_) => {
                "The record no longer exists. Reload and select it again.".to_string()
            }
            ClientError::Validation(detail) => format!("The server rejected the data: {}", detail),
            ClientError::Core(CoreError::Validation(e)) => e.to_string(),
            ClientError::Core(e) => e.to_string(),
            ClientError::Config(detail) => format!("Configuration problem: {}", detail),
            ClientError::SubmissionInFlight => "This order is already being saved.".to_string(),
            ClientError::AlreadySubmitted => {
                "This order was already saved. Start a new one.".to_string()
            }
            ClientError::PaymentNotRecorded { number, .. } => format!(
                "Order {} was saved, but the payment was not recorded. Record it from the order screen.",
                number
            ),
            ClientError::StatusNotApplied { number, action, .. } => format!(
                "Order {} was saved, but could not {}. Retry from the order screen.",
                number, action
            ),
        }
    }

    /// The error was raised locally and no request was made.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::Core(_)
                | ClientError::Config(_)
                | ClientError::SubmissionInFlight
                | ClientError::AlreadySubmitted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_shown_as_is() {
        let err: ClientError = ValidationError::required("customer").into();
        assert_eq!(err.user_message(), "customer is required");
        assert!(err.is_local());
    }

    #[test]
    fn test_installment_message() {
        let err: ClientError = CoreError::InvalidInstallmentCount {
            method_id: 1,
            requested: 13,
            max: 12,
        }
        .into();
        assert!(err.user_message().contains("13 installments"));
    }

    #[test]
    fn test_partial_submission_messages() {
        let err = ClientError::StatusNotApplied {
            number: "PV-0007".to_string(),
            action: StatusAction::Invoice,
            reason: "timeout".to_string(),
        };
        assert_eq!(
            err.user_message(),
            "Order PV-0007 was saved, but could not invoice. Retry from the order screen."
        );
        assert!(!err.is_local());
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = ClientError::Internal("stack trace".to_string());
        assert!(!err.user_message().contains("stack trace"));
    }
}
