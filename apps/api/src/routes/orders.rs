//! # Order Routes
//!
//! `/orders/*` endpoints. Creation bodies are snake_case like the cashier
//! surface; the finalize body is camelCase to match the store-front's
//! existing contract. Amounts are integer cents either way.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use optika_core::{
    FinalizePayload, OrderLineItem, OrderStatus, PaymentDetails, PaymentMethod, SalesOrder,
    ValidationError,
};

use crate::auth::StoreContext;
use crate::error::ApiResult;
use crate::services::NewLineItem;
use crate::state::AppState;

/// `POST /orders` request body.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub client_id: String,
    pub items: Vec<CreateOrderItem>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderItem {
    pub product_id: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: i64,
}

/// Order responses carry the line items alongside the order.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order: SalesOrder,
    pub items: Vec<OrderLineItem>,
}

/// `POST /orders/{id}/finalize` request body (camelCase contract).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeOrderRequest {
    pub status: OrderStatus,
    pub payment_method: Option<PaymentMethod>,
    pub total_paid: Option<i64>,
    #[serde(default)]
    pub product_delivered: bool,
    pub cancellation_reason: Option<String>,
    pub card_installments: Option<i64>,
    /// Interest in basis points (1.99% = 199).
    pub card_interest: Option<i64>,
}

impl FinalizeOrderRequest {
    /// Folds the flat wire fields into the domain payload.
    ///
    /// `paymentMethod` and `totalPaid` travel together: one without the
    /// other is a malformed request, not a missing payment.
    fn into_payload(self) -> Result<(OrderStatus, FinalizePayload), ValidationError> {
        let payment = match (self.payment_method, self.total_paid) {
            (Some(method), Some(amount_cents)) => Some(PaymentDetails {
                method,
                amount_cents,
                card_installments: self.card_installments,
                card_interest_bps: self.card_interest,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ValidationError::Required {
                    field: "totalPaid".to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(ValidationError::Required {
                    field: "paymentMethod".to_string(),
                })
            }
        };

        Ok((
            self.status,
            FinalizePayload {
                payment,
                product_delivered: self.product_delivered,
                cancellation_reason: self.cancellation_reason,
            },
        ))
    }
}

/// `POST /orders`
pub async fn create_order(
    State(state): State<AppState>,
    ctx: StoreContext,
    Json(body): Json<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<OrderResponse>)> {
    let items: Vec<NewLineItem> = body
        .items
        .into_iter()
        .map(|item| NewLineItem {
            product_id: item.product_id,
            description: item.description,
            quantity: item.quantity,
            unit_price_cents: item.unit_price,
        })
        .collect();

    let (order, items) = state
        .orders
        .create(&ctx.store_id, &body.client_id, &items)
        .await?;

    Ok((StatusCode::CREATED, Json(OrderResponse { order, items })))
}

/// `GET /orders/{id}`
pub async fn get_order(
    State(state): State<AppState>,
    ctx: StoreContext,
    Path(order_id): Path<String>,
) -> ApiResult<Json<OrderResponse>> {
    let (order, items) = state.orders.get(&ctx.store_id, &order_id).await?;
    Ok(Json(OrderResponse { order, items }))
}

/// `POST /orders/{id}/finalize`
pub async fn finalize_order(
    State(state): State<AppState>,
    ctx: StoreContext,
    Path(order_id): Path<String>,
    Json(body): Json<FinalizeOrderRequest>,
) -> ApiResult<Json<SalesOrder>> {
    let (requested_status, payload) = body.into_payload()?;

    let order = state
        .finalization
        .finalize(&ctx.store_id, &order_id, requested_status, payload)
        .await?;

    Ok(Json(order))
}
