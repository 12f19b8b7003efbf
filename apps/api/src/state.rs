//! Shared application state.

use optika_db::Database;

use crate::services::{CashierService, FinalizationService, OrderService};

/// State handed to every handler via axum's `State` extractor.
///
/// Cloning is cheap: services share the underlying pool handle.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub cashier: CashierService,
    pub orders: OrderService,
    pub finalization: FinalizationService,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState {
            cashier: CashierService::new(db.clone()),
            orders: OrderService::new(db.clone()),
            finalization: FinalizationService::new(db.clone()),
            db,
        }
    }
}
