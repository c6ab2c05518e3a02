//! Razorpay payment provider implementation

use crate::{
    error::{PaymentError, PaymentResult},
    money::{Currency, Money},
    provider::{Credentials, DEFAULT_REQUEST_TIMEOUT, PaymentProvider, ProviderClient},
    signature::PaymentSignature,
    types::{NewOrder, Order, OrderStatus},
    webhook::{WebhookEvent, WebhookEventType},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marquee_log::{debug, warn};
use reqwest::StatusCode;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Production API root
pub const RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

/// Razorpay connection settings
#[derive(Debug)]
pub struct RazorpayConfig {
    /// Public key identifier
    pub key_id: Option<String>,
    /// Private key secret, also the checkout signing secret
    pub key_secret: Option<SecretString>,
    /// Webhook signing secret
    pub webhook_secret: Option<SecretString>,
    /// API root
    pub api_base: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for RazorpayConfig {
    fn default() -> Self {
        Self {
            key_id: None,
            key_secret: None,
            webhook_secret: None,
            api_base: RAZORPAY_API_BASE.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl RazorpayConfig {
    /// Config with API keys
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: Some(key_id.into()),
            key_secret: Some(SecretString::from(key_secret.into())),
            ..Default::default()
        }
    }

    /// Set webhook secret
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(SecretString::from(secret.into()));
        self
    }

    /// Point at a different API root
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Razorpay provider
pub struct RazorpayProvider {
    credentials: Option<Credentials>,
    payment_signer: Option<PaymentSignature>,
    webhook_signer: Option<PaymentSignature>,
    client: ProviderClient,
}

impl RazorpayProvider {
    /// Create a new Razorpay provider.
    ///
    /// Missing keys are not an error here; operations that need them fail
    /// with [`PaymentError::Config`] when called.
    pub fn new(config: RazorpayConfig) -> PaymentResult<Self> {
        let client = ProviderClient::new(config.api_base, config.timeout)?;
        let payment_signer = config.key_secret.as_ref().map(PaymentSignature::from_secret);
        let webhook_signer = config
            .webhook_secret
            .as_ref()
            .map(PaymentSignature::from_secret);

        let credentials = match (config.key_id, config.key_secret) {
            (Some(id), Some(secret)) if !id.is_empty() => Some(Credentials::new(id, secret)),
            _ => None,
        };

        Ok(Self {
            credentials,
            payment_signer,
            webhook_signer,
            client,
        })
    }

    fn credentials(&self) -> PaymentResult<&Credentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| PaymentError::Config("Razorpay API keys not configured".into()))
    }

    async fn decode_order(
        response: reqwest::Response,
        order_id: Option<&str>,
    ) -> PaymentResult<Order> {
        let status = response.status();
        if status.is_success() {
            let order: RazorpayOrder = response.json().await?;
            return order.try_into();
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<RazorpayErrorEnvelope>(&body)
            .map(|envelope| envelope.error)
            .unwrap_or_else(|_| RazorpayErrorDetail {
                code: status.as_u16().to_string(),
                description: body,
            });

        Err(match (status, order_id) {
            (StatusCode::UNAUTHORIZED, _) => PaymentError::Authentication(detail.description),
            (StatusCode::NOT_FOUND, Some(id)) => PaymentError::OrderNotFound(id.to_string()),
            (StatusCode::BAD_REQUEST, Some(id))
                if detail.description.to_lowercase().contains("does not exist") =>
            {
                PaymentError::OrderNotFound(id.to_string())
            }
            _ => PaymentError::Provider {
                code: detail.code,
                description: detail.description,
            },
        })
    }
}

#[async_trait]
impl PaymentProvider for RazorpayProvider {
    fn name(&self) -> &'static str {
        "razorpay"
    }

    async fn create_order(&self, order: &NewOrder) -> PaymentResult<Order> {
        let auth = self.credentials()?;
        let body = RazorpayOrderRequest {
            amount: order.amount.amount,
            currency: order.amount.currency.code(),
            receipt: &order.receipt,
            notes: &order.notes,
        };

        let response = self.client.post(&["orders"], &body, auth).await?;
        let created = Self::decode_order(response, None).await?;
        debug!(
            order_id = %created.id,
            amount = created.amount.amount,
            receipt = %order.receipt,
            "Razorpay order created"
        );
        Ok(created)
    }

    async fn fetch_order(&self, order_id: &str) -> PaymentResult<Order> {
        let auth = self.credentials()?;
        let response = self.client.get(&["orders", order_id], auth).await?;
        Self::decode_order(response, Some(order_id)).await
    }

    fn verify_payment(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> PaymentResult<()> {
        let signer = self
            .payment_signer
            .as_ref()
            .ok_or_else(|| PaymentError::Config("Razorpay key secret not configured".into()))?;

        if signer.verify(order_id, payment_id, signature) {
            Ok(())
        } else {
            warn!(%order_id, %payment_id, "Payment signature mismatch");
            Err(PaymentError::SignatureMismatch)
        }
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> PaymentResult<()> {
        let signer = self
            .webhook_signer
            .as_ref()
            .ok_or_else(|| PaymentError::Config("Webhook secret not configured".into()))?;

        if signature.is_empty() || !signer.verify_payload(payload, signature) {
            return Err(PaymentError::InvalidWebhookSignature);
        }

        Ok(())
    }

    fn parse_webhook(&self, payload: &[u8], event_id: Option<&str>) -> PaymentResult<WebhookEvent> {
        let event: RazorpayWebhookEvent = serde_json::from_slice(payload)?;

        Ok(WebhookEvent {
            id: event_id.map(str::to_string),
            event_type: WebhookEventType::parse(&event.event),
            account_id: event.account_id,
            created_at: timestamp(event.created_at)?,
            payload: event.payload,
            provider: self.name().to_string(),
        })
    }
}

fn timestamp(secs: i64) -> PaymentResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| PaymentError::Serialization(format!("invalid timestamp {secs}")))
}

// Razorpay API types

#[derive(Debug, Serialize)]
struct RazorpayOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    notes: &'a HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorEnvelope {
    error: RazorpayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorDetail {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct RazorpayOrder {
    id: String,
    amount: i64,
    #[serde(default)]
    amount_paid: i64,
    #[serde(default)]
    amount_due: i64,
    currency: String,
    receipt: Option<String>,
    status: String,
    #[serde(default)]
    attempts: u32,
    #[serde(default)]
    notes: RazorpayNotes,
    created_at: i64,
}

/// Razorpay returns an empty JSON array instead of `{}` for orders without notes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RazorpayNotes {
    Map(HashMap<String, serde_json::Value>),
    List(Vec<serde_json::Value>),
}

impl Default for RazorpayNotes {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl From<RazorpayNotes> for HashMap<String, String> {
    fn from(notes: RazorpayNotes) -> Self {
        match notes {
            RazorpayNotes::Map(map) => map
                .into_iter()
                .map(|(key, value)| match value {
                    serde_json::Value::String(s) => (key, s),
                    other => (key, other.to_string()),
                })
                .collect(),
            RazorpayNotes::List(_) => HashMap::new(),
        }
    }
}

impl TryFrom<RazorpayOrder> for Order {
    type Error = PaymentError;

    fn try_from(order: RazorpayOrder) -> PaymentResult<Self> {
        let status = match order.status.as_str() {
            "created" => OrderStatus::Created,
            "attempted" => OrderStatus::Attempted,
            "paid" => OrderStatus::Paid,
            other => {
                return Err(PaymentError::Serialization(format!(
                    "unknown order status `{other}`"
                )));
            }
        };

        Ok(Order {
            id: order.id,
            amount: Money::new(order.amount, Currency::new(&order.currency)),
            amount_paid: order.amount_paid,
            amount_due: order.amount_due,
            receipt: order.receipt,
            status,
            attempts: order.attempts,
            notes: order.notes.into(),
            created_at: timestamp(order.created_at)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RazorpayWebhookEvent {
    event: String,
    account_id: Option<String>,
    #[serde(default)]
    payload: serde_json::Value,
    created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CreateOrderRequest;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{basic_auth, body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> RazorpayProvider {
        RazorpayProvider::new(
            RazorpayConfig::new("rzp_test_key", "s3cr3t")
                .with_webhook_secret("whsec")
                .with_api_base(server.uri()),
        )
        .unwrap()
    }

    fn order_body(id: &str, notes: serde_json::Value) -> serde_json::Value {
        json!({
            "id": id,
            "entity": "order",
            "amount": 2000,
            "amount_paid": 0,
            "amount_due": 2000,
            "currency": "INR",
            "receipt": "receipt_1",
            "offer_id": null,
            "status": "created",
            "attempts": 0,
            "notes": notes,
            "created_at": 1_700_000_000
        })
    }

    #[tokio::test]
    async fn test_create_order_sends_minor_units() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/orders"))
            .and(basic_auth("rzp_test_key", "s3cr3t"))
            .and(body_json(json!({
                "amount": 2000,
                "currency": "INR",
                "receipt": "receipt_1",
                "notes": { "seat": "F7" }
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(order_body("order_abc", json!({ "seat": "F7" }))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let order = CreateOrderRequest::new(dec!(19.999))
            .receipt("receipt_1")
            .note("seat", "F7")
            .into_new_order()
            .unwrap();

        let created = assert_ok!(provider(&server).create_order(&order).await);
        assert_eq!(created.id, "order_abc");
        assert_eq!(created.amount, Money::inr(2000));
        assert_eq!(created.status, OrderStatus::Created);
        assert_eq!(created.notes.get("seat"), Some(&"F7".to_string()));
    }

    #[tokio::test]
    async fn test_empty_notes_array_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orders/order_abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(order_body("order_abc", json!([]))))
            .mount(&server)
            .await;

        let order = assert_ok!(provider(&server).fetch_order("order_abc").await);
        assert!(order.notes.is_empty());
        assert_eq!(order.created_at.timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_provider_error_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": "BAD_REQUEST_ERROR",
                    "description": "Order amount less than minimum amount allowed",
                    "source": "business",
                    "step": "payment_initiation",
                    "reason": "input_validation_failed"
                }
            })))
            .mount(&server)
            .await;

        let order = CreateOrderRequest::new(dec!(0.5)).into_new_order().unwrap();
        let err = assert_err!(provider(&server).create_order(&order).await);

        match err {
            PaymentError::Provider { code, description } => {
                assert_eq!(code, "BAD_REQUEST_ERROR");
                assert!(description.contains("minimum amount"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "code": "BAD_REQUEST_ERROR", "description": "Authentication failed" }
            })))
            .mount(&server)
            .await;

        let order = CreateOrderRequest::new(dec!(100)).into_new_order().unwrap();
        let err = assert_err!(provider(&server).create_order(&order).await);
        assert!(matches!(err, PaymentError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_fetch_unknown_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orders/order_missing"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": "BAD_REQUEST_ERROR", "description": "The id provided does not exist" }
            })))
            .mount(&server)
            .await;

        let err = assert_err!(provider(&server).fetch_order("order_missing").await);
        assert!(matches!(err, PaymentError::OrderNotFound(id) if id == "order_missing"));
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(order_body("order_abc", json!([])))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let provider = RazorpayProvider::new(
            RazorpayConfig::new("rzp_test_key", "s3cr3t")
                .with_api_base(server.uri())
                .with_timeout(Duration::from_millis(50)),
        )
        .unwrap();

        let order = CreateOrderRequest::new(dec!(100)).into_new_order().unwrap();
        let err = assert_err!(provider.create_order(&order).await);
        assert!(matches!(err, PaymentError::Timeout));
    }

    #[tokio::test]
    async fn test_missing_keys_skip_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider =
            RazorpayProvider::new(RazorpayConfig::default().with_api_base(server.uri())).unwrap();
        let order = CreateOrderRequest::new(dec!(100)).into_new_order().unwrap();

        let err = assert_err!(provider.create_order(&order).await);
        assert!(err.is_config_error());
    }

    #[test]
    fn test_verify_payment() {
        let provider = RazorpayProvider::new(RazorpayConfig::new("rzp_test_key", "s3cr3t")).unwrap();
        let signature = PaymentSignature::new("s3cr3t").sign("order_abc", "pay_xyz");

        assert_ok!(provider.verify_payment("order_abc", "pay_xyz", &signature));
        assert!(matches!(
            provider.verify_payment("order_abc", "pay_xyz", &"a".repeat(64)),
            Err(PaymentError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_verify_payment_without_secret_is_config_error() {
        let provider = RazorpayProvider::new(RazorpayConfig {
            key_id: Some("rzp_test_key".into()),
            ..Default::default()
        })
        .unwrap();
        let signature = PaymentSignature::new("s3cr3t").sign("order_abc", "pay_xyz");

        let err = assert_err!(provider.verify_payment("order_abc", "pay_xyz", &signature));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_webhook_roundtrip() {
        let provider = RazorpayProvider::new(
            RazorpayConfig::new("rzp_test_key", "s3cr3t").with_webhook_secret("whsec"),
        )
        .unwrap();
        let body = serde_json::to_vec(&json!({
            "entity": "event",
            "account_id": "acc_BFQ7uQEaa7j2z7",
            "event": "payment.captured",
            "contains": ["payment"],
            "payload": {
                "payment": { "entity": { "id": "pay_xyz", "order_id": "order_abc", "amount": 2000 } }
            },
            "created_at": 1_700_000_100
        }))
        .unwrap();
        let signature = PaymentSignature::new("whsec").sign_payload(&body);

        assert_ok!(provider.verify_webhook(&body, &signature));
        assert!(matches!(
            provider.verify_webhook(&body, ""),
            Err(PaymentError::InvalidWebhookSignature)
        ));

        let event = provider.parse_webhook(&body, Some("evt_1")).unwrap();
        assert_eq!(event.event_type, WebhookEventType::PaymentCaptured);
        assert_eq!(event.id.as_deref(), Some("evt_1"));
        assert_eq!(event.order_id(), Some("order_abc"));
    }
}
