use super::AppState;
use crate::application::coordinator::InitiateRequest;
use crate::domain::callback::acknowledgement;
use crate::domain::payment::PaymentRequest;
use crate::error::PaymentError;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::error;

type ApiError = (StatusCode, Json<Value>);

/// Maps the typed error to a stable status + envelope at the boundary.
fn error_response(err: &PaymentError) -> ApiError {
    let status = match err {
        PaymentError::Validation(_) => StatusCode::BAD_REQUEST,
        PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
        PaymentError::Auth(_) | PaymentError::Gateway(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(json!({ "error": err.to_string(), "code": err.code() })),
    )
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn stk_push(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let request: InitiateRequest = serde_json::from_value(body).map_err(|e| {
        error_response(&PaymentError::Validation(format!("invalid request body: {e}")))
    })?;

    state
        .coordinator
        .initiate(request)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(checkout_request_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .coordinator
        .query_status(&checkout_request_id)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

pub async fn payment(
    State(state): State<Arc<AppState>>,
    Path(checkout_request_id): Path<String>,
) -> Result<Json<PaymentRequest>, ApiError> {
    state
        .coordinator
        .payment(&checkout_request_id)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

/// Gateway-invoked callback delivery.
///
/// Always acknowledges with the fixed success body and HTTP 200, even on
/// malformed payloads or internal failures. Anything else would make the
/// gateway retry the delivery indefinitely.
pub async fn callback(State(state): State<Arc<AppState>>, body: Bytes) -> Json<Value> {
    match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => {
            if let Err(e) = state.coordinator.handle_callback(payload).await {
                error!(error = %e, "callback processing failed");
            }
        }
        Err(e) => {
            error!(error = %e, "callback payload is not valid JSON");
        }
    }
    Json(acknowledgement())
}
