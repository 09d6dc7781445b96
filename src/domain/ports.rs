use super::payment::{PaymentRequest, StkPush};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Outbound port to the mobile-money gateway.
///
/// Both operations return the gateway's raw JSON body: result codes are
/// forwarded to the caller, never interpreted here.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Initiates a push prompt on the subscriber's phone.
    async fn stk_push(&self, push: &StkPush) -> Result<Value>;

    /// Queries the status of an in-flight prompt.
    async fn query_status(&self, checkout_request_id: &str) -> Result<Value>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn store(&self, payment: PaymentRequest) -> Result<()>;
    async fn get(&self, checkout_request_id: &str) -> Result<Option<PaymentRequest>>;
    async fn all(&self) -> Result<Vec<PaymentRequest>>;
}

pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;
