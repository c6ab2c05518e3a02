//! Router assembly and server lifecycle

use crate::error::ServerError;
use crate::routes;
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use marquee_config::{AppConfig, GatewayConfig, ServerConfig};
use marquee_log::{info, warn};
use marquee_payments::PaymentProvider;
use marquee_payments::providers::{RazorpayConfig, RazorpayProvider};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the application router over any payment provider.
pub fn router<P: PaymentProvider + 'static>(state: AppState<P>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(routes::health::<P>))
        .route("/api/payments/orders", post(routes::create_order::<P>))
        .route("/api/payments/orders/:order_id", get(routes::fetch_order::<P>))
        .route("/api/payments/verify", post(routes::verify_payment::<P>))
        .route("/api/payments/webhook", post(routes::webhook::<P>))
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins))
        .with_state(state)
}

/// CORS for the storefront; no configured origins means any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Razorpay provider from gateway settings
pub fn razorpay_provider(gateway: GatewayConfig) -> Result<RazorpayProvider, ServerError> {
    let config = RazorpayConfig {
        key_id: gateway.key_id,
        key_secret: gateway.key_secret,
        webhook_secret: gateway.webhook_secret,
        api_base: gateway.api_base,
        timeout: gateway.timeout,
    };
    Ok(RazorpayProvider::new(config)?)
}

/// Bind and serve until Ctrl-C or SIGTERM.
pub async fn serve(config: AppConfig) -> Result<(), ServerError> {
    config.report_missing_secrets();

    let AppConfig { server, gateway } = config;
    let provider = razorpay_provider(gateway)?;
    let app = router(AppState::new(provider), &server);

    let listener = TcpListener::bind(server.address()).await?;
    info!(address = %listener.local_addr()?, "Marquee payments listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
