use crate::domain::callback::CallbackEnvelope;
use crate::domain::payment::{Amount, PaymentRequest, StkPush};
use crate::domain::ports::{PaymentGatewayBox, PaymentStoreBox};
use crate::error::{PaymentError, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{info, warn};

pub const DEFAULT_ACCOUNT_REFERENCE: &str = "HakiYetu";
pub const DEFAULT_TRANSACTION_DESC: &str = "Consultation Payment";

/// An STK-push initiation request as received from the caller.
///
/// All fields are optional at the wire level; `initiate` rejects missing
/// required fields before anything leaves the process.
#[derive(Debug, Deserialize, Default)]
pub struct InitiateRequest {
    pub phone_number: Option<String>,
    pub amount: Option<Amount>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub booking_id: Option<String>,
    pub account_reference: Option<String>,
    pub transaction_desc: Option<String>,
}

/// Booking ids arrive as either a JSON string or an integer.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// The main entry point for the payment flow.
///
/// `PaymentCoordinator` owns the gateway and store ports. It initiates
/// push prompts, forwards status queries, and resolves payment records
/// when the gateway's asynchronous callback arrives.
pub struct PaymentCoordinator {
    gateway: PaymentGatewayBox,
    store: PaymentStoreBox,
}

impl PaymentCoordinator {
    pub fn new(gateway: PaymentGatewayBox, store: PaymentStoreBox) -> Self {
        Self { gateway, store }
    }

    /// Initiates a push prompt on the subscriber's phone.
    ///
    /// Validates the required fields, sends the push, and records a
    /// `Pending` payment when the gateway hands back a `CheckoutRequestID`.
    /// The gateway's raw JSON response is returned either way, including
    /// gateway-side rejections.
    pub async fn initiate(&self, request: InitiateRequest) -> Result<Value> {
        let phone_number = required(request.phone_number, "phone_number")?;
        let amount = request
            .amount
            .ok_or_else(|| PaymentError::Validation("missing field 'amount'".to_string()))?;
        let booking_id = required(request.booking_id, "booking_id")?;

        let push = StkPush {
            phone_number,
            amount,
            account_reference: request
                .account_reference
                .unwrap_or_else(|| DEFAULT_ACCOUNT_REFERENCE.to_string()),
            transaction_desc: request
                .transaction_desc
                .unwrap_or_else(|| DEFAULT_TRANSACTION_DESC.to_string()),
        };

        let response = self.gateway.stk_push(&push).await?;

        if let Some(checkout_request_id) = response.get("CheckoutRequestID").and_then(Value::as_str)
        {
            let merchant_request_id = response
                .get("MerchantRequestID")
                .and_then(Value::as_str)
                .map(str::to_string);
            let payment = PaymentRequest::pending(
                checkout_request_id.to_string(),
                merchant_request_id,
                booking_id,
                &push,
            );
            info!(checkout_request_id, booking_id = %payment.booking_id, "STK push accepted");
            self.store.store(payment).await?;
        } else {
            warn!("gateway response carried no CheckoutRequestID");
        }

        Ok(response)
    }

    /// Forwards a status query for an in-flight prompt to the gateway.
    pub async fn query_status(&self, checkout_request_id: &str) -> Result<Value> {
        self.gateway.query_status(checkout_request_id).await
    }

    /// Fetches the stored record for a checkout id.
    pub async fn payment(&self, checkout_request_id: &str) -> Result<PaymentRequest> {
        self.store
            .get(checkout_request_id)
            .await?
            .ok_or_else(|| PaymentError::NotFound(checkout_request_id.to_string()))
    }

    /// Resolves a payment record from a gateway callback delivery.
    ///
    /// ResultCode 0 completes the record with the extracted receipt
    /// number; anything else fails it with the result description.
    /// Callbacks for unknown checkout ids and replays for already-resolved
    /// records are logged and ignored. Errors from this method must never
    /// reach the gateway as a non-2xx response; the HTTP layer always
    /// acknowledges.
    pub async fn handle_callback(&self, payload: Value) -> Result<Option<PaymentRequest>> {
        let envelope: CallbackEnvelope = serde_json::from_value(payload)
            .map_err(|e| PaymentError::Validation(format!("malformed callback payload: {e}")))?;
        let callback = envelope.body.stk_callback;

        let Some(mut payment) = self.store.get(&callback.checkout_request_id).await? else {
            warn!(
                checkout_request_id = %callback.checkout_request_id,
                "callback for unknown checkout id"
            );
            return Ok(None);
        };

        if payment.status.is_terminal() {
            warn!(
                checkout_request_id = %callback.checkout_request_id,
                status = ?payment.status,
                "callback replay for resolved payment, ignoring"
            );
            return Ok(Some(payment));
        }

        if callback.is_success() {
            let receipt_number = callback.receipt_number();
            payment.complete(receipt_number.clone())?;
            info!(
                checkout_request_id = %callback.checkout_request_id,
                receipt = receipt_number.as_deref().unwrap_or("-"),
                "payment completed"
            );
        } else {
            payment.fail(callback.result_desc.clone())?;
            warn!(
                checkout_request_id = %callback.checkout_request_id,
                result_code = callback.result_code,
                result_desc = %callback.result_desc,
                "payment failed"
            );
        }

        self.store.store(payment.clone()).await?;
        Ok(Some(payment))
    }
}

fn required(field: Option<String>, name: &str) -> Result<String> {
    field
        .filter(|value| !value.is_empty())
        .ok_or_else(|| PaymentError::Validation(format!("missing field '{name}'")))
}
