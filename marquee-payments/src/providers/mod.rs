//! Payment provider implementations

#[cfg(feature = "razorpay")]
pub mod razorpay;

#[cfg(feature = "razorpay")]
pub use razorpay::{RazorpayConfig, RazorpayProvider};
