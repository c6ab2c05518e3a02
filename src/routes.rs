//! Payment routes
//!
//! | Method | Path                          | Handler            |
//! |--------|-------------------------------|--------------------|
//! | POST   | `/api/payments/orders`        | [`create_order`]   |
//! | GET    | `/api/payments/orders/:id`    | [`fetch_order`]    |
//! | POST   | `/api/payments/verify`        | [`verify_payment`] |
//! | POST   | `/api/payments/webhook`       | [`webhook`]        |
//! | GET    | `/health`                     | [`health`]         |

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use marquee_payments::{
    CreateOrderRequest, Order, OrderStatus, PaymentProvider, PaymentVerificationRequest,
    signature::headers,
};
use serde::Serialize;

/// Order handed back to the storefront checkout widget
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: String,
    /// Minor units
    pub amount: i64,
    pub currency: String,
}

impl From<Order> for CreateOrderResponse {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.id,
            amount: order.amount.amount,
            currency: order.amount.currency.code().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: &'static str,
    pub payment_id: String,
    pub order_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusResponse {
    pub order_id: String,
    pub amount: i64,
    pub amount_paid: i64,
    pub amount_due: i64,
    pub currency: String,
    pub status: OrderStatus,
    pub attempts: u32,
    pub receipt: Option<String>,
}

impl From<Order> for OrderStatusResponse {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.id,
            amount: order.amount.amount,
            amount_paid: order.amount_paid,
            amount_due: order.amount_due,
            currency: order.amount.currency.code().to_string(),
            status: order.status,
            attempts: order.attempts,
            receipt: order.receipt,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    pub event: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub provider: &'static str,
}

/// `POST /api/payments/orders`
pub async fn create_order<P: PaymentProvider + 'static>(
    State(state): State<AppState<P>>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    let Json(request) = body?;

    let order = state
        .processor
        .create_order(request)
        .await
        .map_err(|e| ApiError::from_payment(e, "Failed to create order"))?;

    Ok(Json(order.into()))
}

/// `GET /api/payments/orders/:order_id`
pub async fn fetch_order<P: PaymentProvider + 'static>(
    State(state): State<AppState<P>>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderStatusResponse>, ApiError> {
    let order = state
        .processor
        .fetch_order(&order_id)
        .await
        .map_err(|e| ApiError::from_payment(e, "Failed to fetch order"))?;

    Ok(Json(order.into()))
}

/// `POST /api/payments/verify`
pub async fn verify_payment<P: PaymentProvider + 'static>(
    State(state): State<AppState<P>>,
    body: Result<Json<PaymentVerificationRequest>, JsonRejection>,
) -> Result<Json<VerifyPaymentResponse>, ApiError> {
    let Json(request) = body?;

    let verified = state
        .processor
        .verify_payment(&request)
        .map_err(|e| ApiError::from_payment(e, "Failed to verify payment"))?;

    Ok(Json(VerifyPaymentResponse {
        success: true,
        message: "Payment verified successfully",
        payment_id: verified.payment_id,
        order_id: verified.order_id,
    }))
}

/// `POST /api/payments/webhook`
///
/// The raw body is verified before it is parsed.
pub async fn webhook<P: PaymentProvider + 'static>(
    State(state): State<AppState<P>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<WebhookAck>), ApiError> {
    let signature = header_str(&headers, headers::WEBHOOK_SIGNATURE).unwrap_or_default();
    let event_id = header_str(&headers, headers::WEBHOOK_EVENT_ID);

    let event = state
        .processor
        .handle_webhook(&body, signature, event_id)
        .map_err(|e| ApiError::from_payment(e, "Failed to process webhook"))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(WebhookAck {
            received: true,
            event: event.event_type.to_string(),
        }),
    ))
}

/// `GET /health`
pub async fn health<P: PaymentProvider + 'static>(
    State(state): State<AppState<P>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        provider: state.processor.provider().name(),
    })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
