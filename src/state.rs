//! Shared handler state

use marquee_payments::{PaymentProcessor, PaymentProvider};

/// State handed to every route
///
/// Holds no per-request data. Cloning copies an `Arc`.
pub struct AppState<P: PaymentProvider> {
    pub processor: PaymentProcessor<P>,
}

impl<P: PaymentProvider> AppState<P> {
    pub fn new(provider: P) -> Self {
        Self {
            processor: PaymentProcessor::new(provider),
        }
    }
}

impl<P: PaymentProvider> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            processor: self.processor.clone(),
        }
    }
}
