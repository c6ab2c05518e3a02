//! Payment provider trait and common functionality

use crate::{
    error::{PaymentError, PaymentResult},
    types::{NewOrder, Order},
    webhook::WebhookEvent,
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

/// Default bound on a single provider request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Payment provider trait
///
/// Implement this trait for each payment gateway. Implementations hold only
/// read-only configuration, so one instance is shared by all requests.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Get provider name
    fn name(&self) -> &'static str;

    /// Create an order for a validated amount
    async fn create_order(&self, order: &NewOrder) -> PaymentResult<Order>;

    /// Fetch an order by provider ID
    async fn fetch_order(&self, order_id: &str) -> PaymentResult<Order>;

    /// Verify a checkout signature.
    ///
    /// Returns [`PaymentError::Config`] when the signing secret is not
    /// configured and [`PaymentError::SignatureMismatch`] when it is but the
    /// signature does not match.
    fn verify_payment(&self, order_id: &str, payment_id: &str, signature: &str)
        -> PaymentResult<()>;

    /// Verify webhook signature
    fn verify_webhook(&self, payload: &[u8], signature: &str) -> PaymentResult<()>;

    /// Parse webhook payload
    fn parse_webhook(&self, payload: &[u8], event_id: Option<&str>) -> PaymentResult<WebhookEvent>;
}

/// API credentials sent as HTTP basic auth
#[derive(Debug)]
pub struct Credentials {
    key_id: String,
    key_secret: SecretString,
}

impl Credentials {
    /// Create credentials
    pub fn new(key_id: impl Into<String>, key_secret: SecretString) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret,
        }
    }

    /// Public key identifier
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Private key secret
    pub fn key_secret(&self) -> &SecretString {
        &self.key_secret
    }
}

/// Common HTTP client for providers
///
/// Built once per process; `reqwest::Client` pools connections internally
/// and is safe to share across tasks.
pub struct ProviderClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ProviderClient {
    /// Create a new provider client with a bounded request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> PaymentResult<Self> {
        let raw = base_url.into();
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .map_err(|e| PaymentError::Config(format!("invalid API base `{raw}`: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(PaymentError::Config(format!("invalid API base `{raw}`")));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("marquee-payments/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PaymentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Base URL requests are made against
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Endpoint under the base URL.
    ///
    /// Each segment is percent-encoded on its own, so caller-supplied IDs
    /// cannot add path levels, queries or fragments.
    pub fn endpoint(&self, segments: &[&str]) -> PaymentResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PaymentError::Config(format!("invalid API base `{}`", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET request
    pub async fn get(
        &self,
        segments: &[&str],
        auth: &Credentials,
    ) -> PaymentResult<reqwest::Response> {
        let url = self.endpoint(segments)?;
        Ok(self
            .client
            .get(url)
            .basic_auth(auth.key_id(), Some(auth.key_secret().expose_secret()))
            .send()
            .await?)
    }

    /// POST request with JSON body
    pub async fn post<T: serde::Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &T,
        auth: &Credentials,
    ) -> PaymentResult<reqwest::Response> {
        let url = self.endpoint(segments)?;
        Ok(self
            .client
            .post(url)
            .basic_auth(auth.key_id(), Some(auth.key_secret().expose_secret()))
            .json(body)
            .send()
            .await?)
    }
}
