//! # Error Types
//!
//! Domain-specific error types for optika-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  optika-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  optika-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  API errors (in apps/api)                                              │
//! │  └── ApiError         - What the HTTP caller sees (stable codes)       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (store_id, order_id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Business-rule errors are terminal: never retried, never downgraded

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule errors.
///
/// These are terminal rejections reported to the caller; the retry policy
/// in the service layer never touches them.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Attempted to open a till while one is already open for the store.
    ///
    /// ## When This Occurs
    /// - A second `POST /cashier/open` before the first session closed
    /// - Two near-simultaneous opens; the unique index lets exactly one win
    #[error("A cashier session is already open for store {store_id}")]
    SessionAlreadyOpen { store_id: String },

    /// Close or order creation attempted with no open session.
    #[error("No open cashier session for store {store_id}")]
    NoOpenSession { store_id: String },

    /// Finalization attempted against a session that is no longer open.
    ///
    /// ## When This Occurs
    /// - The session closed between the order load and the commit (race)
    /// - An old order is finalized days after its session was reconciled
    #[error("Cashier session {session_id} is closed")]
    SessionClosed { session_id: String },

    /// Order cannot be found (wrong id, or scoped to another store).
    #[error("Sales order not found: {0}")]
    OrderNotFound(String),

    /// The requested status transition is not in the legal table.
    ///
    /// Carries the attempted `(from, to)` pair for diagnostics.
    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when a payload doesn't meet the requirements of the
/// requested operation. Used for early validation before any write runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive (payment amounts, quantities).
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative (counted amounts may be zero).
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Field supplied where the operation forbids it.
    #[error("{field} is not applicable: {reason}")]
    NotApplicable { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::SessionAlreadyOpen {
            store_id: "store-7".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "A cashier session is already open for store store-7"
        );

        let err = CoreError::InvalidStatusTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Completed,
        };
        assert_eq!(
            err.to_string(),
            "Invalid status transition: Pending -> Completed"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "cancellation_reason".to_string(),
        };
        assert_eq!(err.to_string(), "cancellation_reason is required");

        let err = ValidationError::MustBeNonNegative {
            field: "cash_amount".to_string(),
        };
        assert_eq!(err.to_string(), "cash_amount must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "amount_paid".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
