//! # Optika API
//!
//! Axum REST service exposing the cashier-session lifecycle and sales-order
//! finalization for a single store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          optika-api                                     │
//! │                                                                         │
//! │  Gateway ───► routes ───► services ───► optika-db ───► SQLite          │
//! │  (verified        │            │                                        │
//! │   headers)        │            └── validation + retry policy            │
//! │                   └── DTOs, status codes                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The library crate exists so integration tests can build the router
//! without binding a socket.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use routes::build_router;
pub use state::AppState;
