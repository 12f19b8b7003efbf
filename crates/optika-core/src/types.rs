//! # Domain Types
//!
//! Core domain types for the cashier/order subsystem.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CashierSession  │   │   SalesOrder    │   │ OrderLineItem   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  store_id       │◄──│  session_id     │◄──│  order_id (FK)  │       │
//! │  │  channel totals │   │  status         │   │  line_total     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  SessionStatus  │   │   OrderStatus   │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Open           │   │  Pending        │   │  Cash           │       │
//! │  │  Closed         │   │  InProgress     │   │  Card           │       │
//! │  └─────────────────┘   │  Completed      │   │  Pix            │       │
//! │                        │  Cancelled      │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Multi-Tenancy
//! Every entity carries a `store_id` (the franchise unit). All queries are
//! partitioned by it; the API layer never trusts a client-supplied store id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Session Status
// =============================================================================

/// The status of a cashier session.
///
/// At most one session per store may be `Open` at any time. Once `Closed`,
/// a session is sealed and no field may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// The till is open and accumulating sales.
    Open,
    /// The till was counted and reconciled. Immutable from here on.
    Closed,
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of a sales order.
///
/// The legal transitions between these states live in
/// [`crate::state_machine::validate_transition`] - every status write must
/// go through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created, no payment recorded yet.
    Pending,
    /// Deposit taken, goods not yet handed over.
    InProgress,
    /// Settled and delivered. Terminal.
    Completed,
    /// Cancelled before any payment. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Terminal states accept no further transitions.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// All states, in declaration order. Used by the exhaustive
    /// transition-matrix tests.
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::InProgress,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// A payment channel, tracked independently on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash in the drawer.
    Cash,
    /// Card payment on the store terminal (optionally in installments).
    Card,
    /// Pix instant transfer.
    Pix,
}

// =============================================================================
// Cashier Session
// =============================================================================

/// The record of one till's open period, accumulating sales per payment
/// channel.
///
/// ## Invariants
/// - At most one `Open` session per `store_id` (enforced by a partial
///   unique index in optika-db).
/// - `total_sales_cents` always equals the sum of the three channel totals;
///   both are written by the same finalization transaction.
/// - Channel totals only ever grow, and only through order finalizations.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashierSession {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Franchise store this session belongs to.
    pub store_id: String,

    /// Employee who opened the till.
    pub employee_id: String,

    pub status: SessionStatus,

    /// Float placed in the drawer at open.
    pub initial_amount_cents: i64,

    /// Running total of cash payments folded in by finalizations.
    pub cash_sales_cents: i64,

    /// Running total of card payments.
    pub card_sales_cents: i64,

    /// Running total of pix payments.
    pub pix_sales_cents: i64,

    /// Derived: cash + card + pix. Kept consistent by the finalization
    /// write, never independently settable.
    pub total_sales_cents: i64,

    /// Physically counted total at close (cash + card + pix). Null while open.
    pub counted_amount_cents: Option<i64>,

    /// counted - (initial + total_sales). Null while open.
    pub difference_cents: Option<i64>,

    /// Free-text notes from open and/or close.
    pub notes: Option<String>,

    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CashierSession {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    /// The initial float as Money.
    #[inline]
    pub fn initial_amount(&self) -> Money {
        Money::from_cents(self.initial_amount_cents)
    }

    /// Running total for one payment channel.
    pub fn channel_total(&self, method: PaymentMethod) -> Money {
        let cents = match method {
            PaymentMethod::Cash => self.cash_sales_cents,
            PaymentMethod::Card => self.card_sales_cents,
            PaymentMethod::Pix => self.pix_sales_cents,
        };
        Money::from_cents(cents)
    }

    /// What the drawer should hold across all channels:
    /// `initial_amount + total_sales`.
    #[inline]
    pub fn expected_total(&self) -> Money {
        Money::from_cents(self.initial_amount_cents + self.total_sales_cents)
    }
}

// =============================================================================
// Sales Order
// =============================================================================

/// A sales order, attached to the cashier session that was open when it
/// was created.
///
/// Mutated only through order finalization; `Completed` and `Cancelled`
/// are terminal.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesOrder {
    pub id: String,
    pub store_id: String,

    /// Session that was open when this order was created. Finalizing
    /// against it after it closed is rejected.
    pub session_id: String,

    pub client_id: String,
    pub status: OrderStatus,

    /// Sum of line totals. Immutable after creation.
    pub total_amount_cents: i64,

    /// Payment channel of the most recent payment, if any.
    pub payment_method: Option<PaymentMethod>,

    /// Accumulated payments across the deposit and settlement steps.
    pub amount_paid_cents: i64,

    /// Card only: number of installments (>= 1).
    pub card_installments: Option<i64>,

    /// Card only: interest in basis points (150 = 1.5%).
    pub card_interest_bps: Option<i64>,

    /// Set true only on the transition into Completed.
    pub product_delivered: bool,

    /// Required on the transition into Cancelled.
    pub cancellation_reason: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl SalesOrder {
    /// Returns the order total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    /// Returns the accumulated paid amount as Money.
    #[inline]
    pub fn amount_paid(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }

    /// Outstanding balance (never negative for display purposes).
    pub fn balance_due(&self) -> Money {
        let due = self.total_amount_cents - self.amount_paid_cents;
        Money::from_cents(due.max(0))
    }
}

// =============================================================================
// Order Line Item
// =============================================================================

/// A line item on a sales order.
/// Uses snapshot pattern: product description and price are frozen at
/// order creation so the order history survives catalog edits.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderLineItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product description at time of order (frozen).
    pub description: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Unit price in cents at time of order (frozen).
    pub unit_price_cents: i64,
    /// unit_price × quantity, computed server-side.
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderLineItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Finalization Payload
// =============================================================================

/// Payment details carried by a finalization that records money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    /// Amount paid in this step, in cents.
    pub amount_cents: i64,
    /// Card only.
    pub card_installments: Option<i64>,
    /// Card only, basis points.
    pub card_interest_bps: Option<i64>,
}

/// Everything a status transition may carry.
///
/// Which fields are required depends on the `(from, to)` pair - see
/// [`crate::state_machine::validate_transition`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinalizePayload {
    /// Present when the transition records a payment.
    pub payment: Option<PaymentDetails>,
    /// Whether the goods were handed over in this step.
    pub product_delivered: bool,
    /// Required when cancelling.
    pub cancellation_reason: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_terminal() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::InProgress.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&OrderStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let parsed: PaymentMethod = serde_json::from_str("\"pix\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Pix);
    }

    fn session_fixture() -> CashierSession {
        CashierSession {
            id: "s-1".into(),
            store_id: "store-1".into(),
            employee_id: "emp-1".into(),
            status: SessionStatus::Open,
            initial_amount_cents: 10_000,
            cash_sales_cents: 15_000,
            card_sales_cents: 2_000,
            pix_sales_cents: 500,
            total_sales_cents: 17_500,
            counted_amount_cents: None,
            difference_cents: None,
            notes: None,
            opened_at: Utc::now(),
            closed_at: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_session_expected_total() {
        let session = session_fixture();
        assert_eq!(session.expected_total().cents(), 27_500);
        assert_eq!(session.channel_total(PaymentMethod::Cash).cents(), 15_000);
        assert_eq!(session.channel_total(PaymentMethod::Pix).cents(), 500);
    }

    #[test]
    fn test_order_balance_due() {
        let order = SalesOrder {
            id: "o-1".into(),
            store_id: "store-1".into(),
            session_id: "s-1".into(),
            client_id: "c-1".into(),
            status: OrderStatus::InProgress,
            total_amount_cents: 15_000,
            payment_method: Some(PaymentMethod::Cash),
            amount_paid_cents: 5_000,
            card_installments: None,
            card_interest_bps: None,
            product_delivered: false,
            cancellation_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
        };
        assert_eq!(order.balance_due().cents(), 10_000);
    }
}
