use serde::Deserialize;
use serde_json::{Value, json};

pub const RECEIPT_ITEM_NAME: &str = "MpesaReceiptNumber";

/// The fixed acknowledgment body the gateway expects from every callback
/// delivery. Anything else makes the gateway retry the callback.
pub fn acknowledgement() -> Value {
    json!({ "ResultCode": 0, "ResultDesc": "Success" })
}

/// Top-level callback payload: `Body.stkCallback.{...}`.
#[derive(Debug, Deserialize, Clone)]
pub struct CallbackEnvelope {
    #[serde(rename = "Body")]
    pub body: CallbackBody,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CallbackBody {
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallback,
}

/// The asynchronous result of one push prompt.
#[derive(Debug, Deserialize, Clone)]
pub struct StkCallback {
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: Option<String>,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    #[serde(rename = "ResultCode")]
    pub result_code: i64,
    #[serde(rename = "ResultDesc")]
    pub result_desc: String,
    /// Only present when the prompt succeeded.
    #[serde(rename = "CallbackMetadata")]
    pub callback_metadata: Option<CallbackMetadata>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CallbackMetadata {
    #[serde(rename = "Item", default)]
    pub item: Vec<MetadataItem>,
}

/// One name/value entry of the callback metadata list. Values are mixed
/// types on the wire (receipt is a string, amount a number).
#[derive(Debug, Deserialize, Clone)]
pub struct MetadataItem {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: Option<Value>,
}

impl StkCallback {
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }

    /// Extracts the M-Pesa receipt number from the metadata items.
    ///
    /// Returns `None` for failed prompts without looking at the metadata.
    pub fn receipt_number(&self) -> Option<String> {
        if !self.is_success() {
            return None;
        }
        self.callback_metadata
            .as_ref()?
            .item
            .iter()
            .find(|item| item.name == RECEIPT_ITEM_NAME)
            .and_then(|item| item.value.as_ref())
            .map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    }
}
