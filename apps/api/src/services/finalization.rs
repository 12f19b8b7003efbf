//! # Order Finalization Service
//!
//! The single entry point for moving an order through its state machine.
//!
//! ## Flow Per Attempt
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  finalize(store_id, order_id, requested_status, payload)                │
//! │                                                                         │
//! │  1. Load order (store-scoped)        ──► ORDER_NOT_FOUND                │
//! │  2. Precheck session is open         ──► SESSION_CLOSED                 │
//! │  3. validate_transition (pure core)  ──► INVALID_STATUS_TRANSITION     │
//! │  4. apply_finalization (one tx)      ──► order + session, atomic        │
//! │                                                                         │
//! │  Retry (≤ 3 attempts total):                                            │
//! │    - transient store error ──► retry the WHOLE step                     │
//! │    - Conflict (order moved) ──► reload, RE-VALIDATE, then retry         │
//! │    - anything else          ──► terminal, surface immediately           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The precheck in step 2 only exists for a friendly early error; the
//! transaction in step 4 re-checks both guards, so correctness never
//! depends on it.

use tracing::{debug, info, warn};

use optika_core::{
    validate_transition, validation, CoreError, FinalizePayload, OrderStatus, SalesOrder,
    SessionStatus,
};
use optika_db::{Database, DbError, FinalizationWrite};

use crate::error::ApiResult;
use crate::services::retry::MAX_ATTEMPTS;

/// Service orchestrating order status transitions.
#[derive(Clone)]
pub struct FinalizationService {
    db: Database,
}

impl FinalizationService {
    pub fn new(db: Database) -> Self {
        FinalizationService { db }
    }

    /// Finalizes an order: validates the requested transition and applies
    /// it atomically together with the session totals update.
    pub async fn finalize(
        &self,
        store_id: &str,
        order_id: &str,
        requested_status: OrderStatus,
        payload: FinalizePayload,
    ) -> ApiResult<SalesOrder> {
        if let Some(payment) = &payload.payment {
            validation::validate_payment(payment)?;
        }

        let mut attempt = 1;
        loop {
            match self
                .try_finalize(store_id, order_id, requested_status, &payload)
                .await
            {
                Ok(order) => {
                    info!(
                        order_id,
                        store_id,
                        status = ?order.status,
                        attempt,
                        "Order finalized"
                    );
                    return Ok(order);
                }

                // A concurrent finalization moved the order first. Reloading
                // happens at the top of try_finalize; re-validation decides
                // whether the request is still legal from the new status.
                Err(DbError::Conflict { .. }) if attempt < MAX_ATTEMPTS => {
                    warn!(order_id, attempt, "Finalization lost a race, re-validating");
                }

                Err(err) if err.is_transient() && attempt < MAX_ATTEMPTS => {
                    warn!(order_id, attempt, error = %err, "Transient store error, retrying");
                }

                Err(err) => return Err(err.into()),
            }
            attempt += 1;
        }
    }

    /// One whole atomic attempt. Retried as a unit, never a sub-step.
    async fn try_finalize(
        &self,
        store_id: &str,
        order_id: &str,
        requested_status: OrderStatus,
        payload: &FinalizePayload,
    ) -> Result<SalesOrder, DbError> {
        let order = self
            .db
            .orders()
            .get_by_id(store_id, order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        debug!(
            order_id,
            from = ?order.status,
            to = ?requested_status,
            "Validating transition"
        );

        if let Some(session) = self.db.sessions().get_by_id(&order.session_id).await? {
            if session.status != SessionStatus::Open {
                return Err(CoreError::SessionClosed {
                    session_id: session.id,
                }
                .into());
            }
        }

        validate_transition(order.status, requested_status, payload)?;

        let write = FinalizationWrite {
            order_id: order.id.clone(),
            session_id: order.session_id.clone(),
            expected_from: order.status,
            new_status: requested_status,
            payment: payload.payment.clone(),
            product_delivered: payload.product_delivered,
            cancellation_reason: payload.cancellation_reason.clone(),
        };

        self.db.orders().apply_finalization(&write).await
    }
}
