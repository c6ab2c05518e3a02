//! Payment types and data structures

use crate::error::{PaymentError, PaymentResult};
use crate::money::{Currency, Money};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Order creation request as submitted by the storefront.
///
/// `amount` is in major currency units. Absent, `null`, `false`, `0` and
/// empty-string amounts all deserialize to `None` and are rejected by
/// [`CreateOrderRequest::into_new_order`] before the provider is contacted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrderRequest {
    /// Amount in major units
    #[serde(default, deserialize_with = "amount::deserialize")]
    pub amount: Option<Decimal>,
    /// Currency code (defaults to INR)
    #[serde(default)]
    pub currency: Option<String>,
    /// Receipt label (defaults to a timestamp-derived label)
    #[serde(default)]
    pub receipt: Option<String>,
    /// Free-form notes forwarded to the provider
    #[serde(default)]
    pub notes: Option<HashMap<String, String>>,
}

impl CreateOrderRequest {
    /// Create a request for the given major-unit amount
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount: Some(amount),
            ..Default::default()
        }
    }

    /// With currency
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// With receipt
    pub fn receipt(mut self, receipt: impl Into<String>) -> Self {
        self.receipt = Some(receipt.into());
        self
    }

    /// With a note
    pub fn note(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.notes
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Validate and fill defaults, producing the provider-facing order.
    pub fn into_new_order(self) -> PaymentResult<NewOrder> {
        let amount = match self.amount {
            Some(amount) if !amount.is_zero() => amount,
            _ => return Err(PaymentError::MissingField("amount")),
        };
        if amount.is_sign_negative() {
            return Err(PaymentError::InvalidAmount(format!(
                "{amount} must be greater than zero"
            )));
        }

        let currency = self
            .currency
            .filter(|c| !c.trim().is_empty())
            .map(Currency::new)
            .unwrap_or_default();

        let money = Money::from_major(amount, currency)?;
        if money.is_zero() {
            return Err(PaymentError::InvalidAmount(format!(
                "{amount} is below the smallest currency unit"
            )));
        }

        Ok(NewOrder {
            amount: money,
            receipt: self
                .receipt
                .filter(|r| !r.is_empty())
                .unwrap_or_else(default_receipt),
            notes: self.notes.unwrap_or_default(),
        })
    }
}

/// Receipt label used when the caller does not supply one
pub fn default_receipt() -> String {
    format!("receipt_{}", Utc::now().timestamp_millis())
}

/// Validated order ready to send to a provider
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// Amount in minor units
    pub amount: Money,
    /// Receipt label
    pub receipt: String,
    /// Notes
    pub notes: HashMap<String, String>,
}

/// Provider order record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Provider order identifier
    pub id: String,
    /// Order amount
    pub amount: Money,
    /// Amount paid so far (minor units)
    pub amount_paid: i64,
    /// Amount still due (minor units)
    pub amount_due: i64,
    /// Receipt label
    pub receipt: Option<String>,
    /// Status
    pub status: OrderStatus,
    /// Payment attempts made against this order
    pub attempts: u32,
    /// Notes
    pub notes: HashMap<String, String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// No payment attempted yet
    Created,
    /// At least one payment attempted, none captured
    Attempted,
    /// Fully paid
    Paid,
}

impl OrderStatus {
    /// Is paid
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Paid)
    }
}

/// Checkout callback fields submitted for signature verification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentVerificationRequest {
    /// Provider order ID
    #[serde(rename = "razorpay_order_id", default)]
    pub order_id: Option<String>,
    /// Provider payment ID
    #[serde(rename = "razorpay_payment_id", default)]
    pub payment_id: Option<String>,
    /// Client-submitted signature (hex)
    #[serde(rename = "razorpay_signature", default)]
    pub signature: Option<String>,
}

impl PaymentVerificationRequest {
    /// Create a verification request
    pub fn new(
        order_id: impl Into<String>,
        payment_id: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            order_id: Some(order_id.into()),
            payment_id: Some(payment_id.into()),
            signature: Some(signature.into()),
        }
    }

    /// Borrow all three fields, or fail on the first one that is absent.
    pub fn fields(&self) -> PaymentResult<(&str, &str, &str)> {
        Ok((
            present(&self.order_id, "razorpay_order_id")?,
            present(&self.payment_id, "razorpay_payment_id")?,
            present(&self.signature, "razorpay_signature")?,
        ))
    }
}

fn present<'a>(field: &'a Option<String>, name: &'static str) -> PaymentResult<&'a str> {
    field
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or(PaymentError::MissingField(name))
}

/// Result of a successful verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedPayment {
    /// Provider order ID
    pub order_id: String,
    /// Provider payment ID
    pub payment_id: String,
}

mod amount {
    use rust_decimal::Decimal;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::str::FromStr;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
            Some(Value::Number(n)) => parse(&n.to_string()).map_err(D::Error::custom),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => parse(s.trim()).map_err(D::Error::custom),
            Some(_) => Err(D::Error::custom("amount must be a number")),
        }
    }

    fn parse(raw: &str) -> Result<Option<Decimal>, String> {
        let value = Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .map_err(|_| format!("amount `{raw}` is not a valid number"))?;
        Ok((!value.is_zero()).then_some(value))
    }
}
