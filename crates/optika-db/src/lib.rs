//! # Optika Database Layer
//!
//! SQLite persistence for the per-store Optika service.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         optika-db                                       │
//! │                                                                         │
//! │  ┌───────────────┐   ┌──────────────────────────────────────────────┐  │
//! │  │   Database    │──▶│  Repositories                                │  │
//! │  │  (pool + cfg) │   │  - CashierSessionRepository (open/close/pay) │  │
//! │  └───────────────┘   │  - SalesOrderRepository (create/finalize)    │  │
//! │          │           └──────────────────────────────────────────────┘  │
//! │          ▼                                                              │
//! │  ┌───────────────┐   SQLite (WAL mode, foreign keys, busy timeout)     │
//! │  │  Migrations   │   Single writer serializes the atomic updates       │
//! │  └───────────────┘                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! - Repositories own SQL and transaction boundaries
//! - Domain types come from `optika-core`; this crate adds no business rules
//!   beyond the guards that make the core's invariants hold under concurrency
//! - Guarded writes (`WHERE status = ...`) instead of read-then-write

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{CashierSessionRepository, FinalizationWrite, SalesOrderRepository};
