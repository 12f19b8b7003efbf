//! # Order State Machine
//!
//! The single source of truth for legal sales-order status transitions.
//!
//! ## Transition Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Sales Order Lifecycle                                │
//! │                                                                         │
//! │                ┌─────────┐                                              │
//! │     create ───►│ Pending │                                              │
//! │                └────┬────┘                                              │
//! │          ┌──────────┴──────────┐                                        │
//! │          ▼                     ▼                                        │
//! │   ┌────────────┐        ┌───────────┐                                   │
//! │   │ InProgress │        │ Cancelled │ (terminal)                        │
//! │   │ (deposit)  │        │ (reason   │                                   │
//! │   └─────┬──────┘        │ required) │                                   │
//! │         ▼               └───────────┘                                   │
//! │   ┌───────────┐                                                         │
//! │   │ Completed │ (terminal, goods delivered)                             │
//! │   └───────────┘                                                         │
//! │                                                                         │
//! │   NOT legal:                                                            │
//! │   • Pending ──► Completed   (must pass through InProgress)              │
//! │   • InProgress ──► Cancelled (once in progress, only completion)        │
//! │   • anything out of Completed or Cancelled                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The two rejected shortcuts are intentional business policy, not an
//! optimization: an order that took a deposit has money on the session and
//! can only be settled, and completion always records the delivery handover.
//!
//! ## Purity
//! `validate_transition` is a pure function. It never touches storage; the
//! atomic apply in optika-db re-checks the `from` status under the
//! transaction so a stale read cannot sneak an illegal write through.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{FinalizePayload, OrderStatus};
use crate::validation::{validate_cancellation_reason, validate_payment};

/// Validates a requested status transition and its payload.
///
/// Exhaustive over all `(from, to)` pairs: anything not explicitly legal
/// is rejected with [`CoreError::InvalidStatusTransition`] carrying the
/// attempted pair.
///
/// ## Payload Requirements
///
/// | From       | To         | Requires                                     |
/// |------------|------------|----------------------------------------------|
/// | Pending    | InProgress | payment (method + positive amount), goods NOT delivered |
/// | Pending    | Cancelled  | non-empty cancellation_reason                |
/// | InProgress | Completed  | product_delivered = true; payment optional   |
///
/// ## Example
/// ```rust
/// use optika_core::state_machine::validate_transition;
/// use optika_core::types::{FinalizePayload, OrderStatus, PaymentDetails, PaymentMethod};
///
/// let payload = FinalizePayload {
///     payment: Some(PaymentDetails {
///         method: PaymentMethod::Cash,
///         amount_cents: 15_000,
///         card_installments: None,
///         card_interest_bps: None,
///     }),
///     product_delivered: false,
///     cancellation_reason: None,
/// };
/// assert!(validate_transition(OrderStatus::Pending, OrderStatus::InProgress, &payload).is_ok());
/// assert!(validate_transition(OrderStatus::Pending, OrderStatus::Completed, &payload).is_err());
/// ```
pub fn validate_transition(
    from: OrderStatus,
    to: OrderStatus,
    payload: &FinalizePayload,
) -> CoreResult<()> {
    use OrderStatus::*;

    match (from, to) {
        // Deposit step: payment is mandatory, goods stay in the store.
        (Pending, InProgress) => {
            let payment = payload
                .payment
                .as_ref()
                .ok_or(ValidationError::Required {
                    field: "payment".to_string(),
                })?;
            validate_payment(payment)?;

            if payload.product_delivered {
                return Err(ValidationError::NotApplicable {
                    field: "product_delivered".to_string(),
                    reason: "goods are only handed over on completion".to_string(),
                }
                .into());
            }
            Ok(())
        }

        // Cancellation is only possible before any payment was taken.
        (Pending, Cancelled) => {
            validate_cancellation_reason(payload.cancellation_reason.as_deref())?;
            Ok(())
        }

        // Settlement: delivery flag is mandatory; a further payment is
        // optional because the deposit may already have covered the total.
        (InProgress, Completed) => {
            if !payload.product_delivered {
                return Err(ValidationError::Required {
                    field: "product_delivered".to_string(),
                }
                .into());
            }
            if let Some(payment) = payload.payment.as_ref() {
                validate_payment(payment)?;
            }
            Ok(())
        }

        // Everything else - including Pending -> Completed, InProgress ->
        // Cancelled, self-transitions and anything out of a terminal state.
        (from, to) => Err(CoreError::InvalidStatusTransition { from, to }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
