//! # optika-core: Pure Business Logic for Optika Retail
//!
//! This crate is the **heart** of the cashier/order subsystem. It contains
//! the business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Optika Cashier/Order Core                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (REST)                              │   │
//! │  │    /cashier/open ──► /orders ──► /orders/{id}/finalize          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ optika-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐ ┌───────────┐ ┌──────────────┐ ┌────────────┐  │   │
//! │  │   │   types   │ │   money   │ │state_machine │ │reconcilia- │  │   │
//! │  │   │  Session  │ │   Money   │ │  transition  │ │   tion     │  │   │
//! │  │   │   Order   │ │  (cents)  │ │    table     │ │  Balanced/ │  │   │
//! │  │   └───────────┘ └───────────┘ └──────────────┘ │  Surplus/  │  │   │
//! │  │                                                │  Shortage  │  │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK            └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    optika-db (Database Layer)                   │   │
//! │  │              SQLite queries, transactions, repositories         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (CashierSession, SalesOrder, statuses, payloads)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`state_machine`] - The order status transition table
//! - [`reconciliation`] - Session close arithmetic
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod reconciliation;
pub mod state_machine;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use optika_core::Money` instead of
// `use optika_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use reconciliation::{reconcile, Classification, Reconciliation};
pub use state_machine::validate_transition;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed on a single sales order.
///
/// ## Business Reason
/// Prevents runaway orders and ensures reasonable transaction sizes.
/// Can be made configurable per-franchise in future versions.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length for free-text fields (notes, cancellation reason).
pub const MAX_TEXT_LENGTH: usize = 500;

/// Maximum accepted value for any single monetary input, in cents
/// (R$1,000,000,000.00).
///
/// ## Business Reason
/// No single price, payment or counted amount is anywhere near this in a
/// store; with quantity capped at [`MAX_ITEM_QUANTITY`] and items at
/// [`MAX_ORDER_ITEMS`], every derived total stays far inside i64 range.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;
