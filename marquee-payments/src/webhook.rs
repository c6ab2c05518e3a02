//! Webhook handling for payment events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID, taken from the delivery header when the provider sends one
    pub id: Option<String>,
    /// Event type
    pub event_type: WebhookEventType,
    /// Merchant account the event belongs to
    pub account_id: Option<String>,
    /// Timestamp
    pub created_at: DateTime<Utc>,
    /// Raw entity payload, keyed by entity name (`payment`, `order`, `refund`)
    pub payload: serde_json::Value,
    /// Provider
    pub provider: String,
}

impl WebhookEvent {
    /// Payment ID carried by the event, if any
    pub fn payment_id(&self) -> Option<&str> {
        self.entity_field("payment", "id")
    }

    /// Order ID carried by the event, from the order entity or the payment's order
    pub fn order_id(&self) -> Option<&str> {
        self.entity_field("order", "id")
            .or_else(|| self.entity_field("payment", "order_id"))
    }

    fn entity_field(&self, entity: &str, field: &str) -> Option<&str> {
        self.payload
            .get(entity)?
            .get("entity")?
            .get(field)?
            .as_str()
    }
}

/// Webhook event types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    // Payment events
    PaymentAuthorized,
    PaymentCaptured,
    PaymentFailed,

    // Order events
    OrderPaid,

    // Refund events
    RefundCreated,
    RefundProcessed,
    RefundFailed,

    // Unknown event
    Unknown(String),
}

impl WebhookEventType {
    /// Parse from string
    pub fn parse(s: &str) -> Self {
        match s {
            "payment.authorized" => Self::PaymentAuthorized,
            "payment.captured" => Self::PaymentCaptured,
            "payment.failed" => Self::PaymentFailed,

            "order.paid" => Self::OrderPaid,

            "refund.created" => Self::RefundCreated,
            "refund.processed" => Self::RefundProcessed,
            "refund.failed" => Self::RefundFailed,

            other => Self::Unknown(other.to_string()),
        }
    }

    /// Wire name of the event
    pub fn as_str(&self) -> &str {
        match self {
            Self::PaymentAuthorized => "payment.authorized",
            Self::PaymentCaptured => "payment.captured",
            Self::PaymentFailed => "payment.failed",
            Self::OrderPaid => "order.paid",
            Self::RefundCreated => "refund.created",
            Self::RefundProcessed => "refund.processed",
            Self::RefundFailed => "refund.failed",
            Self::Unknown(name) => name,
        }
    }

    /// Is a payment event
    pub fn is_payment_event(&self) -> bool {
        matches!(
            self,
            Self::PaymentAuthorized | Self::PaymentCaptured | Self::PaymentFailed
        )
    }

    /// Is a refund event
    pub fn is_refund_event(&self) -> bool {
        matches!(
            self,
            Self::RefundCreated | Self::RefundProcessed | Self::RefundFailed
        )
    }

    /// Event confirms money was received
    pub fn is_settlement(&self) -> bool {
        matches!(self, Self::PaymentCaptured | Self::OrderPaid)
    }
}

impl fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
