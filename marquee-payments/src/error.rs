//! Error types for payment processing

use thiserror::Error;

/// Payment error types
#[derive(Error, Debug)]
pub enum PaymentError {
    /// A required request field was absent or empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Invalid amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Order identifier is not a provider-issued token
    #[error("Invalid order id: {0}")]
    InvalidOrderId(String),

    /// Signed webhook body could not be decoded
    #[error("Invalid webhook payload: {0}")]
    InvalidWebhookPayload(String),

    /// Payment signature did not match the recomputed one
    #[error("Invalid payment signature")]
    SignatureMismatch,

    /// Invalid webhook signature
    #[error("Invalid webhook signature")]
    InvalidWebhookSignature,

    /// Order not found at the provider
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Provider rejected the request
    #[error("Provider error: {code}: {description}")]
    Provider { code: String, description: String },

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Request to the provider timed out
    #[error("Provider request timed out")]
    Timeout,

    /// Authentication error
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PaymentError {
    /// Caller supplied bad input; never retried and never logged as a fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::InvalidAmount(_)
                | Self::InvalidOrderId(_)
                | Self::InvalidWebhookPayload(_)
                | Self::SignatureMismatch
                | Self::InvalidWebhookSignature
        )
    }

    /// Server-side configuration is incomplete
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Failure talking to or reported by the upstream provider
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            Self::Provider { .. }
                | Self::Network(_)
                | Self::Timeout
                | Self::Authentication(_)
                | Self::Serialization(_)
                | Self::OrderNotFound(_)
        )
    }
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PaymentError::Timeout
        } else if err.is_decode() {
            PaymentError::Serialization(err.to_string())
        } else {
            PaymentError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        PaymentError::Serialization(err.to_string())
    }
}

/// Result type for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
