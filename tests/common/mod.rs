use async_trait::async_trait;
use axum::Router;
use hakiyetu_mpesa::application::coordinator::PaymentCoordinator;
use hakiyetu_mpesa::domain::payment::StkPush;
use hakiyetu_mpesa::domain::ports::PaymentGateway;
use hakiyetu_mpesa::error::{PaymentError, Result};
use hakiyetu_mpesa::infrastructure::in_memory::InMemoryPaymentStore;
use hakiyetu_mpesa::interfaces::http::{AppState, build_router};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

/// Canned gateway for driving the HTTP surface without network access.
///
/// `Clone` shares the recorded pushes, so a test can keep one handle for
/// assertions after handing another to the coordinator.
#[derive(Clone)]
pub struct FakeGateway {
    pushes: Arc<Mutex<Vec<StkPush>>>,
    push_response: Arc<Result<Value>>,
    query_response: Value,
}

impl FakeGateway {
    /// Gateway that accepts every push with the given checkout id.
    pub fn accepting(checkout_request_id: &str) -> Self {
        Self::with_push_response(Ok(json!({
            "MerchantRequestID": "29115-34620561-1",
            "CheckoutRequestID": checkout_request_id,
            "ResponseCode": "0",
            "ResponseDescription": "Success. Request accepted for processing",
            "CustomerMessage": "Success. Request accepted for processing"
        })))
    }

    /// Gateway whose transport fails on every push.
    pub fn unreachable() -> Self {
        Self::with_push_response(Err(PaymentError::Gateway(
            "request to /mpesa/stkpush/v1/processrequest failed: connection refused".to_string(),
        )))
    }

    fn with_push_response(push_response: Result<Value>) -> Self {
        Self {
            pushes: Arc::new(Mutex::new(Vec::new())),
            push_response: Arc::new(push_response),
            query_response: json!({
                "ResponseCode": "0",
                "ResultCode": "0",
                "ResultDesc": "The service request is processed successfully."
            }),
        }
    }

    pub fn push_count(&self) -> usize {
        self.pushes.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn stk_push(&self, push: &StkPush) -> Result<Value> {
        self.pushes.lock().unwrap().push(push.clone());
        match self.push_response.as_ref() {
            Ok(value) => Ok(value.clone()),
            Err(PaymentError::Gateway(msg)) => Err(PaymentError::Gateway(msg.clone())),
            Err(other) => Err(PaymentError::Internal(other.to_string().into())),
        }
    }

    async fn query_status(&self, _checkout_request_id: &str) -> Result<Value> {
        Ok(self.query_response.clone())
    }
}

/// Router wired to the fake gateway and a fresh in-memory store.
pub fn router_with(gateway: FakeGateway) -> Router {
    let coordinator = PaymentCoordinator::new(
        Box::new(gateway),
        Box::new(InMemoryPaymentStore::new()),
    );
    build_router(Arc::new(AppState { coordinator }))
}
