//! # Service Layer
//!
//! One service per use-case family. Services validate input through
//! `optika-core`, call repositories, and own the retry policy for
//! transient store errors. Handlers stay one-call thin.

pub mod cashier;
pub mod finalization;
pub mod orders;
pub(crate) mod retry;

pub use cashier::CashierService;
pub use finalization::FinalizationService;
pub use orders::{NewLineItem, OrderService};
