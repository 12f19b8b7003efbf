//! # HTTP Routes
//!
//! Router assembly. Handlers stay thin: extract, call a service, map the
//! result to a status code. All domain decisions live below this layer.

pub mod cashier;
pub mod health;
pub mod orders;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/cashier/open", post(cashier::open_session))
        .route("/cashier/open-session", get(cashier::get_open_session))
        .route("/cashier/close", post(cashier::close_session))
        .route("/orders", post(orders::create_order))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}/finalize", post(orders::finalize_order))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
