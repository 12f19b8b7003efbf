//! # Request Principal
//!
//! Every request arrives behind the franchise gateway, which terminates
//! authentication and forwards the verified principal as headers:
//!
//! - `X-Store-Id`: the store this request is scoped to
//! - `X-Employee-Id`: the employee acting
//!
//! This service trusts those headers; it never sees credentials. A request
//! without them is rejected with 401 before any handler runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

/// The authenticated principal extracted from gateway headers.
#[derive(Debug, Clone)]
pub struct StoreContext {
    pub store_id: String,
    pub employee_id: String,
}

impl<S> FromRequestParts<S> for StoreContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let store_id = header_value(parts, "x-store-id")?;
        let employee_id = header_value(parts, "x-employee-id")?;

        Ok(StoreContext {
            store_id,
            employee_id,
        })
    }
}

fn header_value(parts: &Parts, name: &'static str) -> Result<String, ApiError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::unauthenticated(format!("Missing or empty {name} header")))
}
