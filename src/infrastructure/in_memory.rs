use crate::domain::payment::PaymentRequest;
use crate::domain::ports::PaymentStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for payment records.
///
/// Uses `Arc<RwLock<HashMap<String, PaymentRequest>>>` keyed by
/// `CheckoutRequestID`. Updates for different checkout ids are independent;
/// no cross-id ordering is guaranteed or needed.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<String, PaymentRequest>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn store(&self, payment: PaymentRequest) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.checkout_request_id.clone(), payment);
        Ok(())
    }

    async fn get(&self, checkout_request_id: &str) -> Result<Option<PaymentRequest>> {
        let payments = self.payments.read().await;
        Ok(payments.get(checkout_request_id).cloned())
    }

    async fn all(&self) -> Result<Vec<PaymentRequest>> {
        let payments = self.payments.read().await;
        Ok(payments.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{Amount, StkPush};
    use rust_decimal_macros::dec;

    fn payment(checkout_request_id: &str) -> PaymentRequest {
        let push = StkPush {
            phone_number: "254708374149".to_string(),
            amount: Amount::new(dec!(100)).unwrap(),
            account_reference: "HakiYetu".to_string(),
            transaction_desc: "Consultation Payment".to_string(),
        };
        PaymentRequest::pending(
            checkout_request_id.to_string(),
            Some("29115-34620561-1".to_string()),
            "42".to_string(),
            &push,
        )
    }

    #[tokio::test]
    async fn test_store_and_get() {
        let store = InMemoryPaymentStore::new();
        let record = payment("ws_CO_1");

        store.store(record.clone()).await.unwrap();
        let retrieved = store.get("ws_CO_1").await.unwrap().unwrap();
        assert_eq!(retrieved, record);

        assert!(store.get("ws_CO_2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_overwrites_by_checkout_id() {
        let store = InMemoryPaymentStore::new();
        store.store(payment("ws_CO_1")).await.unwrap();

        let mut updated = payment("ws_CO_1");
        updated.complete(Some("NLJ7RT61SV".to_string())).unwrap();
        store.store(updated.clone()).await.unwrap();

        let retrieved = store.get("ws_CO_1").await.unwrap().unwrap();
        assert_eq!(retrieved.status, updated.status);
        assert_eq!(store.all().await.unwrap().len(), 1);
    }
}
