use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A positive payment amount.
///
/// Wraps `rust_decimal::Decimal` to enforce positivity at construction.
/// Deserializes from either a JSON number or a numeric string, since
/// clients send both (`500`, `500.99`, `"500.99"`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value <= Decimal::ZERO {
            return Err(PaymentError::Validation(
                "amount must be positive".to_string(),
            ));
        }
        if value.trunc().to_u64().is_none() {
            return Err(PaymentError::Validation("amount out of range".to_string()));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Whole-shilling value sent to the gateway.
    ///
    /// The gateway's `Amount` field is an integer; fractional amounts are
    /// truncated, not rejected (`500.99` is charged as `500`).
    pub fn whole(&self) -> u64 {
        // Range is guarded in `new`.
        self.0.trunc().to_u64().unwrap_or(0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AmountVisitor;

        impl Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a positive number or numeric string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Amount, E> {
                Amount::new(Decimal::from(v)).map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Amount, E> {
                Amount::new(Decimal::from(v)).map_err(E::custom)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Amount, E> {
                let value = Decimal::try_from(v)
                    .map_err(|e| E::custom(format!("invalid amount: {e}")))?;
                Amount::new(value).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Amount, E> {
                let value = Decimal::from_str(v)
                    .map_err(|e| E::custom(format!("invalid amount '{v}': {e}")))?;
                Amount::new(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Lifecycle of an STK-push payment record.
///
/// `Pending` is set when the gateway accepts the push; the asynchronous
/// callback moves the record to exactly one of the terminal states.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Failed)
    }
}

/// The payment intent handed to the gateway port.
#[derive(Debug, Clone, PartialEq)]
pub struct StkPush {
    pub phone_number: String,
    pub amount: Amount,
    pub account_reference: String,
    pub transaction_desc: String,
}

/// One STK-push payment, keyed by the gateway-issued `CheckoutRequestID`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentRequest {
    pub checkout_request_id: String,
    pub merchant_request_id: Option<String>,
    pub booking_id: String,
    pub phone_number: String,
    pub amount: Amount,
    pub account_reference: String,
    pub transaction_desc: String,
    pub status: PaymentStatus,
    pub receipt_number: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentRequest {
    /// Creates a `Pending` record for a push the gateway just accepted.
    pub fn pending(
        checkout_request_id: String,
        merchant_request_id: Option<String>,
        booking_id: String,
        push: &StkPush,
    ) -> Self {
        let now = Utc::now();
        Self {
            checkout_request_id,
            merchant_request_id,
            booking_id,
            phone_number: push.phone_number.clone(),
            amount: push.amount,
            account_reference: push.account_reference.clone(),
            transaction_desc: push.transaction_desc.clone(),
            status: PaymentStatus::Pending,
            receipt_number: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the payment completed with the gateway receipt.
    ///
    /// A record in a terminal state stays as-is: the callback resolves a
    /// checkout id exactly once, replays are rejected.
    pub fn complete(&mut self, receipt_number: Option<String>) -> Result<()> {
        self.transition(PaymentStatus::Completed)?;
        self.receipt_number = receipt_number;
        Ok(())
    }

    /// Marks the payment failed with the gateway's result description.
    pub fn fail(&mut self, reason: String) -> Result<()> {
        self.transition(PaymentStatus::Failed)?;
        self.failure_reason = Some(reason);
        Ok(())
    }

    fn transition(&mut self, to: PaymentStatus) -> Result<()> {
        if self.status.is_terminal() {
            return Err(PaymentError::Validation(format!(
                "payment {} already resolved as {:?}",
                self.checkout_request_id, self.status
            )));
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }
}
