use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use serde_json::json;

use liftlog::StoreError;

/// Handler-facing error with a fixed HTTP mapping. Store internals are
/// logged and never leaked to clients.
#[derive(Debug)]
pub enum ApiError {
    /// 400 with the full field→message map.
    Validation(BTreeMap<String, String>),
    /// 400 with a single message (bad references, cross-plan writes,
    /// malformed requests).
    BadRequest(String),
    /// 401 from the auth gate.
    Auth(String),
    /// 404, also covering "exists but not yours".
    NotFound(String),
    /// 500 with a generic body.
    Internal,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(errors) => ApiError::Validation(errors),
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            StoreError::InvalidReference(msg) => ApiError::BadRequest(msg),
            StoreError::CrossPlanMismatch => {
                ApiError::BadRequest(StoreError::CrossPlanMismatch.to_string())
            }
            StoreError::EmailTaken => ApiError::BadRequest(StoreError::EmailTaken.to_string()),
            StoreError::Database(e) => {
                error!("store failure: {e}");
                ApiError::Internal
            }
            _ => ApiError::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "status": "error", "errors": errors }),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "message": msg })),
            ApiError::Auth(msg) => (StatusCode::UNAUTHORIZED, json!({ "message": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": "An error occurred while saving the data." }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
