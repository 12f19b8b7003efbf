//! # API Error Types
//!
//! Translation of domain and database errors into HTTP responses.
//!
//! ## Stable error codes
//! Clients branch on `error.code`, never on the message text. Codes are
//! part of the API contract:
//!
//! | Code                        | Status | Meaning                           |
//! |-----------------------------|--------|-----------------------------------|
//! | VALIDATION_ERROR            | 400    | Malformed or out-of-range input   |
//! | INVALID_STATUS_TRANSITION   | 400    | Order transition not allowed      |
//! | UNAUTHENTICATED             | 401    | Missing principal headers         |
//! | NO_OPEN_SESSION             | 404    | Store has no open cashier session |
//! | ORDER_NOT_FOUND             | 404    | Order id unknown for this store   |
//! | SESSION_ALREADY_OPEN        | 409    | Store already has an open session |
//! | SESSION_CLOSED              | 409    | Target session has been closed    |
//! | CONFLICT                    | 409    | Concurrent modification detected  |
//! | UNAVAILABLE                 | 503    | Transient storage contention      |
//! | INTERNAL                    | 500    | Unexpected failure                |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use optika_core::CoreError;
use optika_db::DbError;

/// API-level error with a stable code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

/// Wire shape: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL",
            "Internal server error",
        )
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let (status, code) = match &err {
            CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            CoreError::InvalidStatusTransition { .. } => {
                (StatusCode::BAD_REQUEST, "INVALID_STATUS_TRANSITION")
            }
            CoreError::NoOpenSession { .. } => (StatusCode::NOT_FOUND, "NO_OPEN_SESSION"),
            CoreError::OrderNotFound(_) => (StatusCode::NOT_FOUND, "ORDER_NOT_FOUND"),
            CoreError::SessionAlreadyOpen { .. } => (StatusCode::CONFLICT, "SESSION_ALREADY_OPEN"),
            CoreError::SessionClosed { .. } => (StatusCode::CONFLICT, "SESSION_CLOSED"),
        };
        ApiError::new(status, code, err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => core.into(),

            DbError::NotFound { entity, id } if entity == "SalesOrder" => ApiError::new(
                StatusCode::NOT_FOUND,
                "ORDER_NOT_FOUND",
                format!("Sales order not found: {id}"),
            ),
            DbError::NotFound { entity, id } => ApiError::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} not found: {id}"),
            ),

            DbError::Conflict { .. } => ApiError::new(
                StatusCode::CONFLICT,
                "CONFLICT",
                "The record was modified concurrently; reload and retry",
            ),

            // Retries exhausted in the service layer before we get here.
            DbError::Busy(_) | DbError::PoolExhausted | DbError::ConnectionFailed(_) => {
                warn!(error = %err, "Storage contention surfaced to client");
                ApiError::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "UNAVAILABLE",
                    "Storage is busy, retry shortly",
                )
            }

            other => {
                error!(error = %other, "Unexpected database error");
                ApiError::internal()
            }
        }
    }
}

impl From<optika_core::ValidationError> for ApiError {
    fn from(err: optika_core::ValidationError) -> Self {
        ApiError::bad_request("VALIDATION_ERROR", err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use optika_core::OrderStatus;

    #[test]
    fn test_domain_errors_map_to_stable_codes() {
        let err: ApiError = CoreError::SessionAlreadyOpen {
            store_id: "s-1".into(),
        }
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "SESSION_ALREADY_OPEN");

        let err: ApiError = CoreError::InvalidStatusTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Completed,
        }
        .into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "INVALID_STATUS_TRANSITION");
    }

    #[test]
    fn test_transient_db_errors_are_unavailable() {
        let err: ApiError = DbError::PoolExhausted.into();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.code, "UNAVAILABLE");
    }
}
