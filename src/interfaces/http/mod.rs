// HTTP surface of the payment coordinator.
//
// Endpoints:
//   POST /api/payment/mpesa/stk-push
//   GET  /api/payment/mpesa/status/{checkout_request_id}
//   POST /api/payment/mpesa/callback                      (gateway-invoked)
//   GET  /api/payment/mpesa/payments/{checkout_request_id}
//   GET  /api/health

pub mod routes;

use crate::application::coordinator::PaymentCoordinator;
use crate::error::Result;
use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub struct AppState {
    pub coordinator: PaymentCoordinator,
}

pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let router = build_router(state);

    info!("payment API listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/payment/mpesa/stk-push", post(routes::stk_push))
        .route(
            "/api/payment/mpesa/status/{checkout_request_id}",
            get(routes::status),
        )
        .route("/api/payment/mpesa/callback", post(routes::callback))
        .route(
            "/api/payment/mpesa/payments/{checkout_request_id}",
            get(routes::payment),
        )
        .with_state(state)
}
