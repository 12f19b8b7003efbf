//! # Validation Module
//!
//! Business rule validation for payloads entering the cashier/order core.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: API DTOs (serde)                                             │
//! │  └── Type validation (deserialization)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │  └── positive amounts, required fields, card-only fields               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL, CHECK, UNIQUE and foreign key constraints               │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{PaymentDetails, PaymentMethod};
use crate::{MAX_AMOUNT_CENTS, MAX_ITEM_QUANTITY, MAX_TEXT_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Money Validators
// =============================================================================

/// Validates an amount that must be strictly positive (payments).
///
/// Also capped at [`MAX_AMOUNT_CENTS`]: every monetary input passes one of
/// these two validators, so derived totals cannot overflow i64.
pub fn validate_positive_amount(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_AMOUNT_CENTS,
        });
    }
    Ok(())
}

/// Validates an amount that may be zero but never negative
/// (initial float, counted drawer amounts, unit prices).
pub fn validate_non_negative_amount(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }
    Ok(())
}

// =============================================================================
// Payment Validators
// =============================================================================

/// Validates the payment details carried by a finalization.
///
/// ## Rules
/// - amount must be strictly positive
/// - installments/interest are only meaningful for card payments
/// - installments, when given, must be between 1 and 48
pub fn validate_payment(payment: &PaymentDetails) -> ValidationResult<()> {
    validate_positive_amount("amount_paid", payment.amount_cents)?;

    if payment.method != PaymentMethod::Card {
        if payment.card_installments.is_some() {
            return Err(ValidationError::NotApplicable {
                field: "card_installments".to_string(),
                reason: "only valid for card payments".to_string(),
            });
        }
        if payment.card_interest_bps.is_some() {
            return Err(ValidationError::NotApplicable {
                field: "card_interest".to_string(),
                reason: "only valid for card payments".to_string(),
            });
        }
    }

    if let Some(installments) = payment.card_installments {
        if !(1..=48).contains(&installments) {
            return Err(ValidationError::OutOfRange {
                field: "card_installments".to_string(),
                min: 1,
                max: 48,
            });
        }
    }

    if let Some(interest) = payment.card_interest_bps {
        if interest < 0 {
            return Err(ValidationError::MustBeNonNegative {
                field: "card_interest".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Text Validators
// =============================================================================

/// Validates a cancellation reason: required and non-blank.
pub fn validate_cancellation_reason(reason: Option<&str>) -> ValidationResult<()> {
    let reason = reason.map(str::trim).unwrap_or("");
    if reason.is_empty() {
        return Err(ValidationError::Required {
            field: "cancellation_reason".to_string(),
        });
    }
    if reason.len() > MAX_TEXT_LENGTH {
        return Err(ValidationError::TooLong {
            field: "cancellation_reason".to_string(),
            max: MAX_TEXT_LENGTH,
        });
    }
    Ok(())
}

/// Validates optional free-text notes (open/close).
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    if let Some(notes) = notes {
        if notes.len() > MAX_TEXT_LENGTH {
            return Err(ValidationError::TooLong {
                field: "notes".to_string(),
                max: MAX_TEXT_LENGTH,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Line Item Validators
// =============================================================================

/// Validates a line item's quantity.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
