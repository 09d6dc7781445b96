use crate::config::MpesaConfig;
use crate::domain::payment::StkPush;
use crate::domain::ports::PaymentGateway;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const OAUTH_PATH: &str = "/oauth/v1/generate?grant_type=client_credentials";
const STK_PUSH_PATH: &str = "/mpesa/stkpush/v1/processrequest";
const STK_QUERY_PATH: &str = "/mpesa/stkpushquery/v1/query";

const TRANSACTION_TYPE: &str = "CustomerPayBillOnline";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Derives the STK-push password: `base64(shortCode + passkey + timestamp)`.
///
/// Pure function of its inputs; the timestamp passed in must be the one
/// sent in the request payload.
pub fn derive_password(short_code: &str, passkey: &str, timestamp: &str) -> String {
    BASE64.encode(format!("{short_code}{passkey}{timestamp}"))
}

/// Formats a point in time the way the gateway expects: `YYYYMMDDHHmmss`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

/// Gateway adapter for the Safaricom Daraja API.
///
/// Every operation fetches a fresh OAuth token; tokens are intentionally
/// not cached (no expiry tracking). All outbound calls go through one
/// `reqwest::Client` with a bounded request timeout.
pub struct DarajaGateway {
    config: Arc<MpesaConfig>,
    http: reqwest::Client,
}

impl DarajaGateway {
    pub fn new(config: Arc<MpesaConfig>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PaymentError::Internal(Box::new(e)))?;
        Ok(Self { config, http })
    }

    /// Fetches a bearer token via the client-credentials exchange.
    async fn access_token(&self) -> Result<String> {
        let url = format!("{}{}", self.config.base_url(), OAUTH_PATH);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.config.consumer_key, Some(&self.config.consumer_secret))
            .send()
            .await
            .map_err(|e| PaymentError::Auth(format!("token request failed: {e}")))?
            .error_for_status()
            .map_err(|e| PaymentError::Auth(format!("token request rejected: {e}")))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| PaymentError::Auth(format!("malformed token response: {e}")))?;

        body.get("access_token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                PaymentError::Auth("token response missing 'access_token'".to_string())
            })
    }

    /// Password and the timestamp it was derived from, for the current time.
    ///
    /// The pair must travel together: regenerating the timestamp after
    /// deriving the password would desynchronize the two payload fields.
    fn password_now(&self) -> (String, String) {
        let timestamp = format_timestamp(Utc::now());
        let password = derive_password(&self.config.short_code, &self.config.passkey, &timestamp);
        (password, timestamp)
    }

    async fn post_json(&self, path: &str, token: &str, payload: Value) -> Result<Value> {
        let url = format!("{}{}", self.config.base_url(), path);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| PaymentError::Gateway(format!("request to {path} failed: {e}")))?;

        // Rejections arrive as an error body with a non-2xx status; the
        // body is forwarded to the caller either way.
        response
            .json()
            .await
            .map_err(|e| PaymentError::Gateway(format!("malformed response from {path}: {e}")))
    }
}

#[async_trait]
impl PaymentGateway for DarajaGateway {
    async fn stk_push(&self, push: &StkPush) -> Result<Value> {
        let token = self.access_token().await?;
        let (password, timestamp) = self.password_now();

        let payload = json!({
            "BusinessShortCode": self.config.short_code,
            "Password": password,
            "Timestamp": timestamp,
            "TransactionType": TRANSACTION_TYPE,
            "Amount": push.amount.whole(),
            "PartyA": push.phone_number,
            "PartyB": self.config.short_code,
            "PhoneNumber": push.phone_number,
            "CallBackURL": self.config.callback_url,
            "AccountReference": push.account_reference,
            "TransactionDesc": push.transaction_desc,
        });

        debug!(phone = %push.phone_number, amount = push.amount.whole(), "sending STK push");
        self.post_json(STK_PUSH_PATH, &token, payload).await
    }

    async fn query_status(&self, checkout_request_id: &str) -> Result<Value> {
        let token = self.access_token().await?;
        let (password, timestamp) = self.password_now();

        let payload = json!({
            "BusinessShortCode": self.config.short_code,
            "Password": password,
            "Timestamp": timestamp,
            "CheckoutRequestID": checkout_request_id,
        });

        debug!(checkout_request_id, "querying STK push status");
        self.post_json(STK_QUERY_PATH, &token, payload).await
    }
}
