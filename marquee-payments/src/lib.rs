//! Payment processing for the Marquee ticketing backend
//!
//! Two stateless operations back the checkout flow:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     PaymentProcessor                          │
//! │                                                               │
//! │  create_order()                     verify_payment()          │
//! │  ─ validate amount (major units)    ─ all three fields set?   │
//! │  ─ × 100, round half away from 0    ─ signing secret set?     │
//! │  ─ provider order creation          ─ HMAC-SHA256(secret,     │
//! │                                         order_id|payment_id)  │
//! │                │                    ─ constant-time compare   │
//! │                ▼                                              │
//! │         ┌────────────┐                                        │
//! │         │  Razorpay  │  ◄── handle_webhook() (raw-body HMAC)  │
//! │         └────────────┘                                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use marquee_payments::{CreateOrderRequest, PaymentProcessor, PaymentVerificationRequest};
//! use marquee_payments::providers::{RazorpayConfig, RazorpayProvider};
//!
//! let processor = PaymentProcessor::new(RazorpayProvider::new(
//!     RazorpayConfig::new("rzp_test_...", "secret"),
//! )?);
//!
//! let order = processor
//!     .create_order(CreateOrderRequest::new(dec!(349.00)).receipt("booking_42"))
//!     .await?;
//!
//! // later, from the checkout callback
//! processor.verify_payment(&PaymentVerificationRequest::new(
//!     order.id, "pay_...", "hex-signature",
//! ))?;
//! ```

pub mod error;
pub mod money;
pub mod provider;
pub mod signature;
pub mod types;
pub mod webhook;

pub mod providers;

pub use error::*;
pub use money::*;
pub use provider::*;
pub use signature::PaymentSignature;
pub use types::*;
pub use webhook::*;

use marquee_log::info;
use std::sync::Arc;

/// Main payment processor
pub struct PaymentProcessor<P: PaymentProvider> {
    provider: Arc<P>,
}

impl<P: PaymentProvider> PaymentProcessor<P> {
    /// Create a new payment processor
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Get the provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Create a provider order.
    ///
    /// Input is validated first; a missing or zero amount fails with
    /// [`PaymentError::MissingField`] without contacting the provider.
    pub async fn create_order(&self, request: CreateOrderRequest) -> PaymentResult<Order> {
        let new_order = request.into_new_order()?;
        let order = self.provider.create_order(&new_order).await?;

        info!(
            provider = self.provider.name(),
            order_id = %order.id,
            amount = %order.amount,
            "Order created"
        );
        Ok(order)
    }

    /// Fetch an order's current state from the provider.
    ///
    /// Only `[A-Za-z0-9_]` IDs are passed on; anything else is rejected
    /// before a request is built.
    pub async fn fetch_order(&self, order_id: &str) -> PaymentResult<Order> {
        if order_id.is_empty() {
            return Err(PaymentError::MissingField("order_id"));
        }
        if !is_provider_id(order_id) {
            return Err(PaymentError::InvalidOrderId(order_id.to_string()));
        }
        self.provider.fetch_order(order_id).await
    }

    /// Verify a checkout callback.
    ///
    /// Field presence is checked before the secret, and the secret before
    /// any HMAC is computed. Holds no state, so repeated calls with the same
    /// input give the same answer.
    pub fn verify_payment(
        &self,
        request: &PaymentVerificationRequest,
    ) -> PaymentResult<VerifiedPayment> {
        let (order_id, payment_id, signature) = request.fields()?;
        self.provider.verify_payment(order_id, payment_id, signature)?;

        info!(%order_id, %payment_id, "Payment verified");
        Ok(VerifiedPayment {
            order_id: order_id.to_string(),
            payment_id: payment_id.to_string(),
        })
    }

    /// Handle a webhook delivery
    pub fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
        event_id: Option<&str>,
    ) -> PaymentResult<WebhookEvent> {
        self.provider.verify_webhook(payload, signature)?;
        let event = self
            .provider
            .parse_webhook(payload, event_id)
            .map_err(|e| match e {
                PaymentError::Serialization(reason) => PaymentError::InvalidWebhookPayload(reason),
                other => other,
            })?;

        info!(
            event = %event.event_type,
            order_id = event.order_id().unwrap_or("-"),
            payment_id = event.payment_id().unwrap_or("-"),
            "Webhook received"
        );
        Ok(event)
    }
}

fn is_provider_id(id: &str) -> bool {
    id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

impl<P: PaymentProvider> Clone for PaymentProcessor<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingProvider {
        orders_created: AtomicUsize,
        secret: Option<&'static str>,
        webhook_ok: bool,
    }

    #[async_trait]
    impl PaymentProvider for CountingProvider {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn create_order(&self, order: &NewOrder) -> PaymentResult<Order> {
            let n = self.orders_created.fetch_add(1, Ordering::SeqCst);
            Ok(Order {
                id: format!("order_{n}"),
                amount: order.amount.clone(),
                amount_paid: 0,
                amount_due: order.amount.amount,
                receipt: Some(order.receipt.clone()),
                status: OrderStatus::Created,
                attempts: 0,
                notes: HashMap::new(),
                created_at: Utc::now(),
            })
        }

        async fn fetch_order(&self, order_id: &str) -> PaymentResult<Order> {
            Err(PaymentError::OrderNotFound(order_id.to_string()))
        }

        fn verify_payment(
            &self,
            order_id: &str,
            payment_id: &str,
            signature: &str,
        ) -> PaymentResult<()> {
            let secret = self
                .secret
                .ok_or_else(|| PaymentError::Config("no secret".into()))?;
            if PaymentSignature::new(secret).verify(order_id, payment_id, signature) {
                Ok(())
            } else {
                Err(PaymentError::SignatureMismatch)
            }
        }

        fn verify_webhook(&self, _payload: &[u8], _signature: &str) -> PaymentResult<()> {
            if self.webhook_ok {
                Ok(())
            } else {
                Err(PaymentError::InvalidWebhookSignature)
            }
        }

        fn parse_webhook(
            &self,
            payload: &[u8],
            _event_id: Option<&str>,
        ) -> PaymentResult<WebhookEvent> {
            let _: serde_json::Value = serde_json::from_slice(payload)?;
            Err(PaymentError::InvalidWebhookSignature)
        }
    }

    #[tokio::test]
    async fn test_create_order_converts_amount() {
        let processor = PaymentProcessor::new(CountingProvider::default());
        let order = processor
            .create_order(CreateOrderRequest::new(dec!(19.999)))
            .await
            .unwrap();

        assert_eq!(order.amount, Money::inr(2000));
        assert_eq!(processor.provider().orders_created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_amount_never_reaches_provider() {
        let processor = PaymentProcessor::new(CountingProvider::default());

        let err = processor
            .create_order(CreateOrderRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::MissingField("amount")));
        assert_eq!(processor.provider().orders_created.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_verify_payment_is_idempotent() {
        let processor = PaymentProcessor::new(CountingProvider {
            secret: Some("s3cr3t"),
            ..Default::default()
        });
        let signature = PaymentSignature::new("s3cr3t").sign("order_abc", "pay_xyz");
        let request = PaymentVerificationRequest::new("order_abc", "pay_xyz", signature);

        let first = processor.verify_payment(&request).unwrap();
        let second = processor.verify_payment(&request).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.payment_id, "pay_xyz");
    }

    #[test]
    fn test_missing_field_checked_before_secret() {
        let processor = PaymentProcessor::new(CountingProvider::default());
        let request = PaymentVerificationRequest {
            order_id: Some("order_abc".into()),
            payment_id: None,
            signature: Some("00".into()),
        };

        let err = processor.verify_payment(&request).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_missing_secret_is_not_a_mismatch() {
        let processor = PaymentProcessor::new(CountingProvider::default());
        let signature = PaymentSignature::new("s3cr3t").sign("order_abc", "pay_xyz");
        let request = PaymentVerificationRequest::new("order_abc", "pay_xyz", signature);

        let err = processor.verify_payment(&request).unwrap_err();
        assert!(err.is_config_error());
        assert!(!matches!(err, PaymentError::SignatureMismatch));
    }

    #[tokio::test]
    async fn test_fetch_order_requires_id() {
        let processor = PaymentProcessor::new(CountingProvider::default());
        let err = processor.fetch_order("").await.unwrap_err();
        assert!(matches!(err, PaymentError::MissingField("order_id")));
    }

    #[tokio::test]
    async fn test_fetch_order_rejects_path_like_ids() {
        let processor = PaymentProcessor::new(CountingProvider::default());

        for id in ["../payments", "order_abc/payments", "order?x=1", "order#frag", ".."] {
            let err = processor.fetch_order(id).await.unwrap_err();
            assert!(matches!(err, PaymentError::InvalidOrderId(_)), "id {id}");
        }

        // Well-formed IDs reach the provider
        let err = processor.fetch_order("order_Abc123").await.unwrap_err();
        assert!(matches!(err, PaymentError::OrderNotFound(_)));
    }

    #[test]
    fn test_undecodable_webhook_is_client_error() {
        let processor = PaymentProcessor::new(CountingProvider {
            webhook_ok: true,
            ..Default::default()
        });

        let err = processor.handle_webhook(b"{not json", "sig", None).unwrap_err();
        assert!(matches!(err, PaymentError::InvalidWebhookPayload(_)));
        assert!(err.is_client_error());
    }
}
