// Marquee - payment backend for the movie-ticket storefront
//
// Exposes order creation and checkout signature verification over HTTP.
// Payment logic lives in `marquee-payments`; this crate wires it to axum
// routes, configuration and logging.

pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ServerError};
pub use server::{cors_layer, razorpay_provider, router, serve};
pub use state::AppState;

// Re-export workspace crates
pub use marquee_config;
pub use marquee_log;
pub use marquee_payments;

// Prelude for common imports
pub mod prelude {
    pub use crate::{ApiError, AppState, router, serve};
    pub use marquee_config::{AppConfig, ServerConfig};
    pub use marquee_payments::{
        CreateOrderRequest, PaymentError, PaymentProcessor, PaymentProvider,
        PaymentVerificationRequest,
    };
}
