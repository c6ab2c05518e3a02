//! HTTP error mapping
//!
//! Every failure leaves the service as `{"error": "..."}`. Status codes:
//! client input and signature mismatches are 400, missing configuration
//! and upstream failures are 500 with a generic message. Underlying
//! causes of 500s are logged here and never sent to the caller.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use marquee_config::ConfigError;
use marquee_log::{debug, error, warn};
use marquee_payments::PaymentError;
use serde::Serialize;
use thiserror::Error;

/// Errors returned by route handlers
#[derive(Error, Debug)]
pub enum ApiError {
    /// Required input missing or malformed
    #[error("{0}")]
    BadRequest(String),

    /// Signature did not match
    #[error("Invalid payment signature")]
    VerificationFailed,

    /// Webhook signature missing or wrong
    #[error("Invalid webhook signature")]
    InvalidWebhook,

    /// Order unknown to the provider
    #[error("Order not found")]
    NotFound,

    /// Server is missing a secret or key
    #[error("Server configuration error")]
    Configuration,

    /// Body over the configured limit
    #[error("Request body too large")]
    PayloadTooLarge,

    /// Provider or network failure; the message is what the caller sees
    #[error("{0}")]
    Upstream(&'static str),
}

impl ApiError {
    /// Classify a payment failure, logging server-side causes.
    ///
    /// `upstream_message` is the generic text returned for provider failures.
    pub fn from_payment(err: PaymentError, upstream_message: &'static str) -> Self {
        match err {
            PaymentError::MissingField("amount") => Self::BadRequest("Amount is required".into()),
            PaymentError::MissingField(field) if field.starts_with("razorpay_") => {
                debug!(field, "Verification request missing required field");
                Self::BadRequest("Missing required payment verification fields".into())
            }
            PaymentError::MissingField(field) => {
                debug!(field, "Request missing required field");
                Self::BadRequest(format!("Missing required field: {field}"))
            }
            PaymentError::InvalidOrderId(_) => Self::BadRequest("Invalid order id".into()),
            PaymentError::InvalidWebhookPayload(reason) => {
                warn!(%reason, "Signed webhook payload could not be decoded");
                Self::BadRequest("Invalid webhook payload".into())
            }
            PaymentError::InvalidAmount(reason) => {
                Self::BadRequest(format!("Invalid amount: {reason}"))
            }
            PaymentError::SignatureMismatch => Self::VerificationFailed,
            PaymentError::InvalidWebhookSignature => Self::InvalidWebhook,
            PaymentError::OrderNotFound(_) => Self::NotFound,
            PaymentError::Config(reason) => {
                error!(%reason, "Payment configuration error");
                Self::Configuration
            }
            other => {
                error!(error = %other, "{upstream_message}");
                Self::Upstream(upstream_message)
            }
        }
    }

    /// Status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::VerificationFailed | Self::InvalidWebhook => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Configuration | Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::PayloadTooLarge;
        }
        warn!(reason = %rejection.body_text(), "Rejected request body");
        Self::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Errors that stop the server from starting or running
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Payment provider setup failed: {0}")]
    Payment(#[from] PaymentError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
