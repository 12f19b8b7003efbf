//! # Repository Modules
//!
//! One repository per aggregate. Repositories own the SQL and the
//! transaction boundaries; business validation lives in `optika-core`
//! and is invoked by the service layer before writes reach here.

pub mod order;
pub mod session;

pub use order::{FinalizationWrite, SalesOrderRepository};
pub use session::CashierSessionRepository;
