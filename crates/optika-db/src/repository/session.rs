//! # Cashier Session Repository
//!
//! Database operations for cashier sessions.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Cashier Session Lifecycle                           │
//! │                                                                         │
//! │  1. OPEN                                                                │
//! │     └── open() → CashierSession { status: Open }                        │
//! │         (partial unique index: at most one open row per store;          │
//! │          a concurrent second open loses the insert race)                │
//! │                                                                         │
//! │  2. ACCUMULATE                                                          │
//! │     └── apply_payment() → channel total += amount, total += amount      │
//! │         (normally invoked inside the order finalization transaction)    │
//! │                                                                         │
//! │  3. CLOSE                                                               │
//! │     └── close() → reconcile counted vs expected, seal the row           │
//! │         (single transaction; the row never changes again)               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use optika_core::{
    reconcile, CashierSession, CoreError, Money, PaymentMethod, SessionStatus,
};

/// Column list shared by every session SELECT, so FromRow always sees the
/// full shape.
const SESSION_COLUMNS: &str = "id, store_id, employee_id, status, \
     initial_amount_cents, cash_sales_cents, card_sales_cents, pix_sales_cents, \
     total_sales_cents, counted_amount_cents, difference_cents, notes, \
     opened_at, closed_at, updated_at";

/// Repository for cashier session database operations.
#[derive(Debug, Clone)]
pub struct CashierSessionRepository {
    pool: SqlitePool,
}

impl CashierSessionRepository {
    /// Creates a new CashierSessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashierSessionRepository { pool }
    }

    /// Opens a new cashier session for a store.
    ///
    /// ## Atomicity
    /// The "at most one open session per store" check is NOT a read-then-
    /// insert: it is the partial unique index on `(store_id) WHERE status =
    /// 'open'`. Two concurrent opens both insert; exactly one commits, the
    /// other gets the constraint violation translated to
    /// [`CoreError::SessionAlreadyOpen`].
    pub async fn open(
        &self,
        store_id: &str,
        employee_id: &str,
        initial_amount_cents: i64,
        notes: Option<&str>,
    ) -> DbResult<CashierSession> {
        let now = Utc::now();
        let session = CashierSession {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.to_string(),
            employee_id: employee_id.to_string(),
            status: SessionStatus::Open,
            initial_amount_cents,
            cash_sales_cents: 0,
            card_sales_cents: 0,
            pix_sales_cents: 0,
            total_sales_cents: 0,
            counted_amount_cents: None,
            difference_cents: None,
            notes: notes.map(str::to_string),
            opened_at: now,
            closed_at: None,
            updated_at: now,
        };

        debug!(id = %session.id, store_id, "Opening cashier session");

        let result = sqlx::query(
            r#"
            INSERT INTO cashier_sessions (
                id, store_id, employee_id, status,
                initial_amount_cents, cash_sales_cents, card_sales_cents,
                pix_sales_cents, total_sales_cents,
                counted_amount_cents, difference_cents, notes,
                opened_at, closed_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(&session.store_id)
        .bind(&session.employee_id)
        .bind(session.status)
        .bind(session.initial_amount_cents)
        .bind(session.cash_sales_cents)
        .bind(session.card_sales_cents)
        .bind(session.pix_sales_cents)
        .bind(session.total_sales_cents)
        .bind(session.counted_amount_cents)
        .bind(session.difference_cents)
        .bind(&session.notes)
        .bind(session.opened_at)
        .bind(session.closed_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!(
                    session_id = %session.id,
                    store_id,
                    initial_amount = %session.initial_amount(),
                    "Cashier session opened"
                );
                Ok(session)
            }
            Err(err) => {
                let err = DbError::from(err);
                if matches!(&err, DbError::UniqueViolation { field }
                    if field.contains("cashier_sessions.store_id"))
                {
                    return Err(CoreError::SessionAlreadyOpen {
                        store_id: store_id.to_string(),
                    }
                    .into());
                }
                Err(err)
            }
        }
    }

    /// Gets the currently open session for a store, if any. Side-effect free.
    pub async fn get_open(&self, store_id: &str) -> DbResult<Option<CashierSession>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM cashier_sessions \
             WHERE store_id = ? AND status = 'open'"
        );
        let session: Option<CashierSession> = sqlx::query_as(&sql)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    /// Gets a session by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CashierSession>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM cashier_sessions WHERE id = ?");
        let session: Option<CashierSession> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    /// Adds a payment to the session's channel total (standalone variant).
    ///
    /// Order finalization does NOT call this: it uses [`apply_payment_tx`]
    /// inside the same transaction as the order status write, so the two
    /// succeed or fail together.
    pub async fn apply_payment(
        &self,
        session_id: &str,
        method: PaymentMethod,
        amount_cents: i64,
    ) -> DbResult<CashierSession> {
        let mut tx = self.pool.begin().await?;

        apply_payment_tx(&mut tx, session_id, method, amount_cents).await?;

        let session = fetch_session_tx(&mut tx, session_id)
            .await?
            .ok_or_else(|| DbError::not_found("CashierSession", session_id))?;

        tx.commit().await?;
        Ok(session)
    }

    /// Closes the store's open session, reconciling counted against expected.
    ///
    /// ## What This Does (one transaction)
    /// 1. Loads the open session (fails `NoOpenSession` if none)
    /// 2. `expected = initial_amount + total_sales`
    /// 3. Reconciles counted cash/card/pix against expected
    /// 4. Seals the row: status='closed', counted, difference, closed_at
    ///
    /// The UPDATE is guarded by `status = 'open'`, so a concurrent payment
    /// or close that slipped in causes this close to lose cleanly.
    /// Irreversible: closed rows are never written again.
    pub async fn close(
        &self,
        store_id: &str,
        counted_cash_cents: i64,
        counted_card_cents: i64,
        counted_pix_cents: i64,
        notes: Option<&str>,
    ) -> DbResult<CashierSession> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM cashier_sessions \
             WHERE store_id = ? AND status = 'open'"
        );
        let session: Option<CashierSession> = sqlx::query_as(&sql)
            .bind(store_id)
            .fetch_optional(&mut *tx)
            .await?;

        let mut session = session.ok_or_else(|| CoreError::NoOpenSession {
            store_id: store_id.to_string(),
        })?;

        let reconciliation = reconcile(
            session.expected_total(),
            Money::from_cents(counted_cash_cents),
            Money::from_cents(counted_card_cents),
            Money::from_cents(counted_pix_cents),
        )
        .map_err(CoreError::from)?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE cashier_sessions SET
                status = 'closed',
                counted_amount_cents = ?,
                difference_cents = ?,
                notes = COALESCE(?, notes),
                closed_at = ?,
                updated_at = ?
            WHERE id = ? AND status = 'open'
            "#,
        )
        .bind(reconciliation.counted_total.cents())
        .bind(reconciliation.difference.cents())
        .bind(notes)
        .bind(now)
        .bind(now)
        .bind(&session.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Lost a race with another close between our read and write.
            return Err(CoreError::NoOpenSession {
                store_id: store_id.to_string(),
            }
            .into());
        }

        tx.commit().await?;

        info!(
            session_id = %session.id,
            store_id,
            counted = %reconciliation.counted_total,
            difference = %reconciliation.difference,
            classification = ?reconciliation.classification,
            "Cashier session closed"
        );

        session.status = SessionStatus::Closed;
        session.counted_amount_cents = Some(reconciliation.counted_total.cents());
        session.difference_cents = Some(reconciliation.difference.cents());
        session.closed_at = Some(now);
        session.updated_at = now;
        if let Some(notes) = notes {
            session.notes = Some(notes.to_string());
        }
        Ok(session)
    }
}

// =============================================================================
// Transaction-Scoped Helpers
// =============================================================================
// Used by SalesOrderRepository so the session write shares the order
// transaction (the totals-consistency invariant depends on this).

/// Folds a payment into the session's channel totals, inside `tx`.
///
/// Guarded by `status = 'open'`: a payment against a session that closed
/// mid-flight rolls the whole transaction back with `SessionClosed`.
pub(crate) async fn apply_payment_tx(
    tx: &mut Transaction<'_, Sqlite>,
    session_id: &str,
    method: PaymentMethod,
    amount_cents: i64,
) -> DbResult<()> {
    let column = match method {
        PaymentMethod::Cash => "cash_sales_cents",
        PaymentMethod::Card => "card_sales_cents",
        PaymentMethod::Pix => "pix_sales_cents",
    };

    // Column name comes from the match above, never from input.
    let sql = format!(
        "UPDATE cashier_sessions SET \
             {column} = {column} + ?, \
             total_sales_cents = total_sales_cents + ?, \
             updated_at = ? \
         WHERE id = ? AND status = 'open'"
    );

    let now = Utc::now();
    let result = sqlx::query(&sql)
        .bind(amount_cents)
        .bind(amount_cents)
        .bind(now)
        .bind(session_id)
        .execute(&mut **tx)
        .await?;

    if result.rows_affected() == 0 {
        // Missed the guard: distinguish "never existed" from "closed".
        ensure_open_tx(tx, session_id).await?;
        // The guard missed but the row reads open - another writer in this
        // transaction's way; report as a conflict.
        return Err(DbError::conflict("CashierSession", session_id));
    }

    debug!(
        session_id,
        method = ?method,
        amount_cents,
        "Payment folded into session totals"
    );
    Ok(())
}

/// Verifies the session exists and is open, inside `tx`.
///
/// Used by transitions that carry no payment (cancellation) - the session
/// must still be open at the time of any transition.
pub(crate) async fn ensure_open_tx(
    tx: &mut Transaction<'_, Sqlite>,
    session_id: &str,
) -> DbResult<()> {
    let status: Option<SessionStatus> =
        sqlx::query_scalar("SELECT status FROM cashier_sessions WHERE id = ?")
            .bind(session_id)
            .fetch_optional(&mut **tx)
            .await?;

    match status {
        None => Err(DbError::not_found("CashierSession", session_id)),
        Some(SessionStatus::Closed) => Err(CoreError::SessionClosed {
            session_id: session_id.to_string(),
        }
        .into()),
        Some(SessionStatus::Open) => Ok(()),
    }
}

/// Fetches a session by id inside `tx`.
pub(crate) async fn fetch_session_tx(
    tx: &mut Transaction<'_, Sqlite>,
    session_id: &str,
) -> DbResult<Option<CashierSession>> {
    let sql = format!("SELECT {SESSION_COLUMNS} FROM cashier_sessions WHERE id = ?");
    let session: Option<CashierSession> = sqlx::query_as(&sql)
        .bind(session_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(session)
}

// =============================================================================
// Unit Tests
// =============================================================================
