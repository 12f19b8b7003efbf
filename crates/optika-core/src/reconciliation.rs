//! # Reconciliation
//!
//! Pure arithmetic for the session close: compares the physically counted
//! drawer against the system-recorded expectation.
//!
//! ```text
//! expected   = initial_amount + total_sales
//! counted    = counted_cash + counted_card + counted_pix
//! difference = counted - expected
//! ```
//!
//! Equality is exact - money is integer cents, so `difference == 0` means
//! balanced, no epsilon involved.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::validate_non_negative_amount;

/// How a counted drawer compares against the expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Counted exactly matches expected.
    Balanced,
    /// Counted more than expected (difference > 0).
    Surplus,
    /// Counted less than expected (difference < 0).
    Shortage,
}

/// Result of reconciling a session at close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reconciliation {
    /// Sum of the three counted channel amounts.
    pub counted_total: Money,
    /// `counted_total - expected_total`, signed.
    pub difference: Money,
    pub classification: Classification,
}

/// Reconciles counted cash/card/pix amounts against the expected total.
///
/// Pure function. The only failure mode is a negative counted input.
///
/// ## Example
/// ```rust
/// use optika_core::money::Money;
/// use optika_core::reconciliation::{reconcile, Classification};
///
/// let result = reconcile(
///     Money::from_cents(10_000),
///     Money::from_cents(6_000),
///     Money::from_cents(3_000),
///     Money::from_cents(1_000),
/// )
/// .unwrap();
/// assert_eq!(result.difference, Money::zero());
/// assert_eq!(result.classification, Classification::Balanced);
/// ```
pub fn reconcile(
    expected_total: Money,
    counted_cash: Money,
    counted_card: Money,
    counted_pix: Money,
) -> Result<Reconciliation, ValidationError> {
    validate_non_negative_amount("cash_amount", counted_cash.cents())?;
    validate_non_negative_amount("card_amount", counted_card.cents())?;
    validate_non_negative_amount("pix_amount", counted_pix.cents())?;

    let counted_total = counted_cash + counted_card + counted_pix;
    let difference = counted_total - expected_total;

    let classification = if difference.is_zero() {
        Classification::Balanced
    } else if difference.is_positive() {
        Classification::Surplus
    } else {
        Classification::Shortage
    };

    Ok(Reconciliation {
        counted_total,
        difference,
        classification,
    })
}
