//! # Sales Order Repository
//!
//! Database operations for sales orders and their line items.
//!
//! ## The Atomic Finalization Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                apply_finalization (ONE transaction)                     │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    1. UPDATE sales_orders SET status = <new>, ...                       │
//! │       WHERE id = ? AND status = <expected from>   ◄── CAS guard         │
//! │       (0 rows → order vanished or moved: rollback, Conflict)            │
//! │                                                                         │
//! │    2a. payment present:                                                 │
//! │        UPDATE cashier_sessions SET <channel> += amount, total += amount │
//! │        WHERE id = ? AND status = 'open'           ◄── open guard        │
//! │        (0 rows → session closed mid-flight: rollback, SessionClosed)    │
//! │    2b. no payment (cancellation):                                       │
//! │        verify session still open                                        │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Either BOTH writes land or NEITHER does. A payment folded into the     │
//! │  session without a durable order status change (or the reverse) is      │
//! │  structurally impossible, not merely unlikely.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::session::{apply_payment_tx, ensure_open_tx};
use optika_core::{OrderLineItem, OrderStatus, PaymentDetails, SalesOrder};

/// Column list shared by every order SELECT.
const ORDER_COLUMNS: &str = "id, store_id, session_id, client_id, status, \
     total_amount_cents, payment_method, amount_paid_cents, \
     card_installments, card_interest_bps, product_delivered, \
     cancellation_reason, created_at, updated_at, completed_at";

/// Everything the finalization transaction writes.
///
/// Built by the service layer after `validate_transition` passed against
/// `expected_from`; the UPDATE re-checks that status under the transaction
/// so a stale read can never smuggle an illegal transition through.
#[derive(Debug, Clone)]
pub struct FinalizationWrite {
    pub order_id: String,
    pub session_id: String,
    /// The status the caller validated against.
    pub expected_from: OrderStatus,
    pub new_status: OrderStatus,
    /// Folded into the session's channel totals when present.
    pub payment: Option<PaymentDetails>,
    pub product_delivered: bool,
    pub cancellation_reason: Option<String>,
}

/// Repository for sales order database operations.
#[derive(Debug, Clone)]
pub struct SalesOrderRepository {
    pool: SqlitePool,
}

impl SalesOrderRepository {
    /// Creates a new SalesOrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SalesOrderRepository { pool }
    }

    /// Inserts an order and its line items in one transaction.
    ///
    /// The referenced session must still be open; orders can only be
    /// created against the till that will take their money.
    pub async fn create(&self, order: &SalesOrder, items: &[OrderLineItem]) -> DbResult<()> {
        debug!(id = %order.id, session_id = %order.session_id, "Creating sales order");

        let mut tx = self.pool.begin().await?;

        ensure_open_tx(&mut tx, &order.session_id).await?;

        sqlx::query(
            r#"
            INSERT INTO sales_orders (
                id, store_id, session_id, client_id, status,
                total_amount_cents, payment_method, amount_paid_cents,
                card_installments, card_interest_bps, product_delivered,
                cancellation_reason, created_at, updated_at, completed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&order.id)
        .bind(&order.store_id)
        .bind(&order.session_id)
        .bind(&order.client_id)
        .bind(order.status)
        .bind(order.total_amount_cents)
        .bind(order.payment_method)
        .bind(order.amount_paid_cents)
        .bind(order.card_installments)
        .bind(order.card_interest_bps)
        .bind(order.product_delivered)
        .bind(&order.cancellation_reason)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.completed_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO order_line_items (
                    id, order_id, product_id, description,
                    quantity, unit_price_cents, line_total_cents, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.line_total_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            order_id = %order.id,
            store_id = %order.store_id,
            total = %order.total_amount(),
            items = items.len(),
            "Sales order created"
        );
        Ok(())
    }

    /// Gets an order by ID, scoped to a store.
    ///
    /// Store scoping means an order id leaked across franchises reads as
    /// "not found", never as someone else's data.
    pub async fn get_by_id(&self, store_id: &str, id: &str) -> DbResult<Option<SalesOrder>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM sales_orders WHERE id = ? AND store_id = ?"
        );
        let order: Option<SalesOrder> = sqlx::query_as(&sql)
            .bind(id)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Gets all line items for an order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderLineItem>> {
        let items: Vec<OrderLineItem> = sqlx::query_as(
            r#"
            SELECT id, order_id, product_id, description,
                   quantity, unit_price_cents, line_total_cents, created_at
            FROM order_line_items
            WHERE order_id = ?
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets all orders attached to a session.
    pub async fn list_by_session(&self, session_id: &str) -> DbResult<Vec<SalesOrder>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM sales_orders \
             WHERE session_id = ? ORDER BY created_at"
        );
        let orders: Vec<SalesOrder> = sqlx::query_as(&sql)
            .bind(session_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Applies a validated finalization: order status write + session
    /// totals write, all-or-nothing.
    ///
    /// See the module docs for the transaction shape. Returns the updated
    /// order as committed.
    pub async fn apply_finalization(&self, write: &FinalizationWrite) -> DbResult<SalesOrder> {
        let now = Utc::now();
        let completed_at = (write.new_status == OrderStatus::Completed).then_some(now);

        let (method, amount_cents, installments, interest_bps) = match &write.payment {
            Some(p) => (
                Some(p.method),
                p.amount_cents,
                p.card_installments,
                p.card_interest_bps,
            ),
            None => (None, 0, None, None),
        };

        let mut tx = self.pool.begin().await?;

        // Compare-and-set on the status the caller validated against.
        let result = sqlx::query(
            r#"
            UPDATE sales_orders SET
                status = ?,
                payment_method = COALESCE(?, payment_method),
                amount_paid_cents = amount_paid_cents + ?,
                card_installments = COALESCE(?, card_installments),
                card_interest_bps = COALESCE(?, card_interest_bps),
                product_delivered = ?,
                cancellation_reason = COALESCE(?, cancellation_reason),
                completed_at = COALESCE(?, completed_at),
                updated_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(write.new_status)
        .bind(method)
        .bind(amount_cents)
        .bind(installments)
        .bind(interest_bps)
        .bind(write.product_delivered)
        .bind(&write.cancellation_reason)
        .bind(completed_at)
        .bind(now)
        .bind(&write.order_id)
        .bind(write.expected_from)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<i64> =
                sqlx::query_scalar("SELECT 1 FROM sales_orders WHERE id = ?")
                    .bind(&write.order_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            return Err(match exists {
                None => DbError::not_found("SalesOrder", &write.order_id),
                // Status moved between the caller's read and this write;
                // the caller reloads and re-validates.
                Some(_) => DbError::conflict("SalesOrder", &write.order_id),
            });
        }

        // Session side of the same transaction. Every transition requires
        // the session to still be open, payment or not.
        match &write.payment {
            Some(payment) => {
                apply_payment_tx(&mut tx, &write.session_id, payment.method, payment.amount_cents)
                    .await?
            }
            None => ensure_open_tx(&mut tx, &write.session_id).await?,
        }

        let sql = format!("SELECT {ORDER_COLUMNS} FROM sales_orders WHERE id = ?");
        let order: SalesOrder = sqlx::query_as(&sql)
            .bind(&write.order_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            from = ?write.expected_from,
            to = ?write.new_status,
            amount_paid_cents = amount_cents,
            "Order finalization applied"
        );
        Ok(order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use optika_core::{CashierSession, PaymentMethod};
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_order(session: &CashierSession, total_cents: i64) -> SalesOrder {
        let now = Utc::now();
        SalesOrder {
            id: Uuid::new_v4().to_string(),
            store_id: session.store_id.clone(),
            session_id: session.id.clone(),
            client_id: "client-1".to_string(),
            status: OrderStatus::Pending,
            total_amount_cents: total_cents,
            payment_method: None,
            amount_paid_cents: 0,
            card_installments: None,
            card_interest_bps: None,
            product_delivered: false,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    fn new_item(order: &SalesOrder, unit_price_cents: i64, quantity: i64) -> OrderLineItem {
        OrderLineItem {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            product_id: "lens-std".to_string(),
            description: "Single-vision lens".to_string(),
            quantity,
            unit_price_cents,
            line_total_cents: unit_price_cents * quantity,
            created_at: Utc::now(),
        }
    }

    fn cash_payment(amount_cents: i64) -> PaymentDetails {
        PaymentDetails {
            method: PaymentMethod::Cash,
            amount_cents,
            card_installments: None,
            card_interest_bps: None,
        }
    }

    fn deposit_write(order: &SalesOrder, payment: PaymentDetails) -> FinalizationWrite {
        FinalizationWrite {
            order_id: order.id.clone(),
            session_id: order.session_id.clone(),
            expected_from: OrderStatus::Pending,
            new_status: OrderStatus::InProgress,
            payment: Some(payment),
            product_delivered: false,
            cancellation_reason: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let db = test_db().await;
        let session = db.sessions().open("store-1", "emp-1", 0, None).await.unwrap();
        let order = new_order(&session, 30_000);
        let items = vec![new_item(&order, 15_000, 2)];

        db.orders().create(&order, &items).await.unwrap();

        let stored = db
            .orders()
            .get_by_id("store-1", &order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(stored.total_amount_cents, 30_000);

        let stored_items = db.orders().get_items(&order.id).await.unwrap();
        assert_eq!(stored_items.len(), 1);
        assert_eq!(stored_items[0].line_total_cents, 30_000);

        // Wrong store reads as not found.
        assert!(db
            .orders()
            .get_by_id("store-2", &order.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_against_closed_session_is_rejected() {
        let db = test_db().await;
        let session = db.sessions().open("store-1", "emp-1", 0, None).await.unwrap();
        db.sessions().close("store-1", 0, 0, 0, None).await.unwrap();

        let order = new_order(&session, 10_000);
        let err = db.orders().create(&order, &[]).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(optika_core::CoreError::SessionClosed { .. })
        ));
    }

    #[tokio::test]
    async fn test_finalization_updates_order_and_session_together() {
        let db = test_db().await;
        let session = db.sessions().open("store-1", "emp-1", 10_000, None).await.unwrap();
        let order = new_order(&session, 15_000);
        db.orders().create(&order, &[new_item(&order, 15_000, 1)]).await.unwrap();

        let updated = db
            .orders()
            .apply_finalization(&deposit_write(&order, cash_payment(15_000)))
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::InProgress);
        assert_eq!(updated.amount_paid_cents, 15_000);
        assert_eq!(updated.payment_method, Some(PaymentMethod::Cash));

        let session = db.sessions().get_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(session.cash_sales_cents, 15_000);
        assert_eq!(session.total_sales_cents, 15_000);
    }

    #[tokio::test]
    async fn test_channel_totals_match_orders() {
        // Totals-consistency invariant: per channel, the session total
        // equals the sum of amount_paid over its paying orders.
        let db = test_db().await;
        let session = db.sessions().open("store-1", "emp-1", 0, None).await.unwrap();

        let cash_order = new_order(&session, 12_000);
        let pix_order = new_order(&session, 8_000);
        db.orders().create(&cash_order, &[]).await.unwrap();
        db.orders().create(&pix_order, &[]).await.unwrap();

        db.orders()
            .apply_finalization(&deposit_write(&cash_order, cash_payment(12_000)))
            .await
            .unwrap();
        db.orders()
            .apply_finalization(&deposit_write(
                &pix_order,
                PaymentDetails {
                    method: PaymentMethod::Pix,
                    amount_cents: 8_000,
                    card_installments: None,
                    card_interest_bps: None,
                },
            ))
            .await
            .unwrap();

        let stored = db.sessions().get_by_id(&session.id).await.unwrap().unwrap();
        let orders = db.orders().list_by_session(&session.id).await.unwrap();

        let sum_by = |method: PaymentMethod| -> i64 {
            orders
                .iter()
                .filter(|o| o.payment_method == Some(method) && o.status != OrderStatus::Pending)
                .map(|o| o.amount_paid_cents)
                .sum()
        };

        assert_eq!(stored.cash_sales_cents, sum_by(PaymentMethod::Cash));
        assert_eq!(stored.pix_sales_cents, sum_by(PaymentMethod::Pix));
        assert_eq!(stored.card_sales_cents, 0);
        assert_eq!(stored.total_sales_cents, 20_000);
    }

    #[tokio::test]
    async fn test_stale_status_is_a_conflict_and_changes_nothing() {
        let db = test_db().await;
        let session = db.sessions().open("store-1", "emp-1", 0, None).await.unwrap();
        let order = new_order(&session, 10_000);
        db.orders().create(&order, &[]).await.unwrap();

        // Move to InProgress for real.
        db.orders()
            .apply_finalization(&deposit_write(&order, cash_payment(10_000)))
            .await
            .unwrap();

        // A second deposit still expecting Pending misses the CAS guard.
        let err = db
            .orders()
            .apply_finalization(&deposit_write(&order, cash_payment(10_000)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        // Neither the order nor the session absorbed the duplicate.
        let stored = db.orders().get_by_id("store-1", &order.id).await.unwrap().unwrap();
        assert_eq!(stored.amount_paid_cents, 10_000);
        let stored_session = db.sessions().get_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(stored_session.cash_sales_cents, 10_000);
    }

    #[tokio::test]
    async fn test_payment_against_closed_session_rolls_back_order() {
        let db = test_db().await;
        let session = db.sessions().open("store-1", "emp-1", 0, None).await.unwrap();
        let order = new_order(&session, 10_000);
        db.orders().create(&order, &[]).await.unwrap();

        db.sessions().close("store-1", 0, 0, 0, None).await.unwrap();

        let err = db
            .orders()
            .apply_finalization(&deposit_write(&order, cash_payment(10_000)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(optika_core::CoreError::SessionClosed { .. })
        ));

        // The order status write was rolled back with the payment.
        let stored = db.orders().get_by_id("store-1", &order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(stored.amount_paid_cents, 0);
    }

    #[tokio::test]
    async fn test_cancellation_carries_no_payment() {
        let db = test_db().await;
        let session = db.sessions().open("store-1", "emp-1", 0, None).await.unwrap();
        let order = new_order(&session, 10_000);
        db.orders().create(&order, &[]).await.unwrap();

        let write = FinalizationWrite {
            order_id: order.id.clone(),
            session_id: order.session_id.clone(),
            expected_from: OrderStatus::Pending,
            new_status: OrderStatus::Cancelled,
            payment: None,
            product_delivered: false,
            cancellation_reason: Some("client gave up".to_string()),
        };
        let cancelled = db.orders().apply_finalization(&write).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("client gave up"));

        let stored_session = db.sessions().get_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(stored_session.total_sales_cents, 0);
    }

    #[tokio::test]
    async fn test_completion_sets_delivery_and_timestamp() {
        let db = test_db().await;
        let session = db.sessions().open("store-1", "emp-1", 0, None).await.unwrap();
        let order = new_order(&session, 15_000);
        db.orders().create(&order, &[]).await.unwrap();

        db.orders()
            .apply_finalization(&deposit_write(&order, cash_payment(15_000)))
            .await
            .unwrap();

        let write = FinalizationWrite {
            order_id: order.id.clone(),
            session_id: order.session_id.clone(),
            expected_from: OrderStatus::InProgress,
            new_status: OrderStatus::Completed,
            payment: None,
            product_delivered: true,
            cancellation_reason: None,
        };
        let completed = db.orders().apply_finalization(&write).await.unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);
        assert!(completed.product_delivered);
        assert!(completed.completed_at.is_some());
        assert_eq!(completed.amount_paid_cents, 15_000);
    }
}
