//! # Order Service
//!
//! Creation and lookup of sales orders. Orders are born `Pending` against
//! the store's currently open cashier session; everything after that goes
//! through the finalization service.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use optika_core::{
    validation, CoreError, OrderLineItem, OrderStatus, SalesOrder, ValidationError,
    MAX_ORDER_ITEMS,
};
use optika_db::Database;

use crate::error::{ApiError, ApiResult};
use crate::services::retry::retry_transient;

/// Input for a new line item. Prices come in as unit price; the line total
/// is computed server-side so a client can never make them disagree.
#[derive(Debug, Clone)]
pub struct NewLineItem {
    pub product_id: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// Service for creating and reading sales orders.
#[derive(Clone)]
pub struct OrderService {
    db: Database,
}

impl OrderService {
    pub fn new(db: Database) -> Self {
        OrderService { db }
    }

    /// Creates a Pending order with its line items against the store's
    /// open session.
    pub async fn create(
        &self,
        store_id: &str,
        client_id: &str,
        items: &[NewLineItem],
    ) -> ApiResult<(SalesOrder, Vec<OrderLineItem>)> {
        if items.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            }
            .into());
        }
        if items.len() > MAX_ORDER_ITEMS {
            return Err(ApiError::bad_request(
                "VALIDATION_ERROR",
                format!("Order exceeds the {MAX_ORDER_ITEMS} line item limit"),
            ));
        }
        for item in items {
            validation::validate_quantity(item.quantity)?;
            validation::validate_non_negative_amount("unit_price", item.unit_price_cents)?;
        }

        // The open session is the one orders must attach to (I3 starts here).
        let session = self
            .db
            .sessions()
            .get_open(store_id)
            .await?
            .ok_or_else(|| CoreError::NoOpenSession {
                store_id: store_id.to_string(),
            })
            .map_err(ApiError::from)?;

        let now = Utc::now();
        let order_id = Uuid::new_v4().to_string();

        let line_items: Vec<OrderLineItem> = items
            .iter()
            .map(|item| OrderLineItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                product_id: item.product_id.clone(),
                description: item.description.clone(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
                // Cannot overflow: unit price is capped at MAX_AMOUNT_CENTS
                // and quantity at MAX_ITEM_QUANTITY by the validators above.
                line_total_cents: item.unit_price_cents * item.quantity,
                created_at: now,
            })
            .collect();

        let total_amount_cents: i64 = line_items.iter().map(|i| i.line_total_cents).sum();

        let order = SalesOrder {
            id: order_id,
            store_id: store_id.to_string(),
            session_id: session.id.clone(),
            client_id: client_id.to_string(),
            status: OrderStatus::Pending,
            total_amount_cents,
            payment_method: None,
            amount_paid_cents: 0,
            card_installments: None,
            card_interest_bps: None,
            product_delivered: false,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };

        debug!(order_id = %order.id, store_id, items = line_items.len(), "Creating order");
        let orders = self.db.orders();
        retry_transient("order_create", || orders.create(&order, &line_items)).await?;

        info!(
            order_id = %order.id,
            store_id,
            session_id = %session.id,
            total = %order.total_amount(),
            "Order created"
        );
        Ok((order, line_items))
    }

    /// Fetches an order with its line items, scoped to the caller's store.
    pub async fn get(
        &self,
        store_id: &str,
        order_id: &str,
    ) -> ApiResult<(SalesOrder, Vec<OrderLineItem>)> {
        let order = self
            .db
            .orders()
            .get_by_id(store_id, order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))
            .map_err(ApiError::from)?;

        let items = self.db.orders().get_items(&order.id).await?;
        Ok((order, items))
    }
}
