//! # Error Types
//!
//! Domain-specific error types for balcao-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  balcao-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Input that blocks submission                   │
//! │                                                                         │
//! │  balcao-api errors (separate crate)                                    │
//! │  └── ClientError      - Backend / network failures                     │
//! │                                                                         │
//! │  console errors (in app)                                               │
//! │  └── ConsoleError     - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → ConsoleError        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed numeric input is NOT an error here: see [`crate::coerce`].

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity does not exist (payment method, catalog entry).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The requested installment count is not offered by the payment method.
    ///
    /// ## When This Occurs
    /// - `installments == 0`
    /// - `installments > 1` on a method without installment support
    /// - `installments > max_installments`
    ///
    /// Always raised before any network call.
    #[error("Payment method {method_id} does not accept {requested} installments (max {max})")]
    InvalidInstallmentCount {
        method_id: i64,
        requested: u32,
        max: u32,
    },

    /// `remove_item` / `update_item` with a position past the end of the list.
    #[error("No line item at position {index} (order has {len} items)")]
    ItemIndexOutOfRange { index: usize, len: usize },

    /// The status workflow does not allow this action from the current status.
    #[error("Cannot {action} a {kind} in status {status}")]
    IllegalTransition {
        kind: String,
        status: String,
        action: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a not found error.
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These block submission and are fully recoverable by correcting input.
/// They never reach the network layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// The order (or receipt) has no lines.
    #[error("Add at least one {what}")]
    Empty { what: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Text that should be a number is not one (strict parsing only).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A goods receipt line would receive more than was ordered.
    #[error("Quantity received for {item} exceeds the quantity ordered")]
    ExceedsOrdered { item: String },
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
