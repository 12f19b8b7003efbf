//! # Cashier Routes
//!
//! `/cashier/*` endpoints. Request bodies are snake_case; all amounts are
//! integer cents.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use optika_core::CashierSession;

use crate::auth::StoreContext;
use crate::error::ApiResult;
use crate::state::AppState;

/// `POST /cashier/open` request body.
#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    /// Defaults to the authenticated employee when omitted.
    pub employee_id: Option<String>,
    pub initial_amount: i64,
    pub notes: Option<String>,
}

/// `POST /cashier/close` request body: the physically counted amounts.
#[derive(Debug, Deserialize)]
pub struct CloseSessionRequest {
    pub cash_amount: i64,
    pub card_amount: i64,
    pub pix_amount: i64,
    pub notes: Option<String>,
}

/// `GET /cashier/open-session` response. `session` is null when the till
/// is not open, which the store-front treats as "show the open screen".
#[derive(Debug, Serialize)]
pub struct OpenSessionResponse {
    pub session: Option<CashierSession>,
}

/// `POST /cashier/open`
pub async fn open_session(
    State(state): State<AppState>,
    ctx: StoreContext,
    Json(body): Json<OpenSessionRequest>,
) -> ApiResult<(StatusCode, Json<CashierSession>)> {
    let employee_id = body.employee_id.as_deref().unwrap_or(&ctx.employee_id);

    let session = state
        .cashier
        .open(
            &ctx.store_id,
            employee_id,
            body.initial_amount,
            body.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /cashier/open-session`
pub async fn get_open_session(
    State(state): State<AppState>,
    ctx: StoreContext,
) -> ApiResult<Json<OpenSessionResponse>> {
    let session = state.cashier.current(&ctx.store_id).await?;
    Ok(Json(OpenSessionResponse { session }))
}

/// `POST /cashier/close`
pub async fn close_session(
    State(state): State<AppState>,
    ctx: StoreContext,
    Json(body): Json<CloseSessionRequest>,
) -> ApiResult<Json<CashierSession>> {
    let session = state
        .cashier
        .close(
            &ctx.store_id,
            body.cash_amount,
            body.card_amount,
            body.pix_amount,
            body.notes.as_deref(),
        )
        .await?;

    Ok(Json(session))
}
