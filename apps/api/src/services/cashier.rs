//! # Cashier Session Service
//!
//! Orchestrates the session lifecycle: validate input in `optika-core`,
//! then hand the write to the repository. The repository's guards (partial
//! unique index, status-guarded UPDATE) enforce the invariants; this layer
//! never does read-then-write checks of its own.

use tracing::{debug, info};

use optika_core::{validation, CashierSession};
use optika_db::Database;

use crate::error::ApiResult;
use crate::services::retry::retry_transient;

/// Service for opening, inspecting and closing cashier sessions.
#[derive(Clone)]
pub struct CashierService {
    db: Database,
}

impl CashierService {
    pub fn new(db: Database) -> Self {
        CashierService { db }
    }

    /// Opens a session with the counted opening float.
    pub async fn open(
        &self,
        store_id: &str,
        employee_id: &str,
        initial_amount_cents: i64,
        notes: Option<&str>,
    ) -> ApiResult<CashierSession> {
        validation::validate_non_negative_amount("initial_amount", initial_amount_cents)?;
        validation::validate_notes(notes)?;

        debug!(store_id, employee_id, "Opening cashier session");

        let sessions = self.db.sessions();
        let session = retry_transient("cashier_open", || {
            sessions.open(store_id, employee_id, initial_amount_cents, notes)
        })
        .await?;

        info!(
            session_id = %session.id,
            store_id,
            initial = %session.initial_amount(),
            "Cashier session opened"
        );
        Ok(session)
    }

    /// Returns the store's open session, if any.
    ///
    /// "None" is a normal answer here (the store-front polls this to decide
    /// whether to show the open-till screen), so it is not an error.
    pub async fn current(&self, store_id: &str) -> ApiResult<Option<CashierSession>> {
        let session = self.db.sessions().get_open(store_id).await?;
        Ok(session)
    }

    /// Closes the open session against the counted amounts.
    ///
    /// Reconciliation (expected vs counted, surplus/shortage) happens inside
    /// the close transaction so the sealed row can never disagree with the
    /// totals it was computed from.
    pub async fn close(
        &self,
        store_id: &str,
        counted_cash_cents: i64,
        counted_card_cents: i64,
        counted_pix_cents: i64,
        notes: Option<&str>,
    ) -> ApiResult<CashierSession> {
        validation::validate_non_negative_amount("cash_amount", counted_cash_cents)?;
        validation::validate_non_negative_amount("card_amount", counted_card_cents)?;
        validation::validate_non_negative_amount("pix_amount", counted_pix_cents)?;
        validation::validate_notes(notes)?;

        debug!(store_id, "Closing cashier session");

        let sessions = self.db.sessions();
        let session = retry_transient("cashier_close", || {
            sessions.close(
                store_id,
                counted_cash_cents,
                counted_card_cents,
                counted_pix_cents,
                notes,
            )
        })
        .await?;

        info!(
            session_id = %session.id,
            store_id,
            difference_cents = session.difference_cents.unwrap_or(0),
            "Cashier session closed"
        );
        Ok(session)
    }
}
