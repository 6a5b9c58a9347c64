//! Application startup and lifecycle management.

use crate::config::{Config, CorsConfig};
use crate::handlers;
use crate::services::{pricing::PricingRules, PaymentVerifier, RazorpayClient, ResendClient, ShiprocketClient};
use axum::{
    http::Method,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state. Everything here is immutable configuration or
/// a client handle; requests never share mutable state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pricing: PricingRules,
    pub razorpay: RazorpayClient,
    pub verifier: PaymentVerifier,
    pub shiprocket: ShiprocketClient,
    pub resend: ResendClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let razorpay = RazorpayClient::new(config.razorpay.clone());
        if razorpay.is_configured() {
            tracing::info!("Razorpay client initialized");
        } else {
            tracing::warn!(
                "Razorpay credentials not configured - payment features will be limited"
            );
        }

        let shiprocket = ShiprocketClient::new(config.shiprocket.clone());
        if !shiprocket.is_configured() {
            tracing::warn!("Shiprocket credentials not configured - tracking disabled");
        }

        let resend = ResendClient::new(config.resend.clone());
        if !resend.is_configured() {
            tracing::warn!("Resend API key not configured - newsletter disabled");
        }

        Self {
            pricing: config.pricing,
            verifier: PaymentVerifier::new(config.razorpay.key_secret.clone()),
            razorpay,
            shiprocket,
            resend,
            config,
        }
    }
}

fn cors_layer(cors: &CorsConfig) -> Result<CorsLayer, AppError> {
    let origins = if cors.allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(cors.origin_values()?)
    };

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any))
}

/// Build the HTTP router with all routes and middleware.
pub fn router(state: AppState) -> Result<Router, AppError> {
    let cors = cors_layer(&state.config.cors)?;

    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/api/create-order", post(handlers::orders::create_order))
        .route("/api/calculate-total", post(handlers::orders::calculate_total))
        .route("/api/verify-payment", post(handlers::payments::verify_payment))
        .route("/api/track/:awb", get(handlers::shipments::track_shipment))
        .route(
            "/api/newsletter/subscribe",
            post(handlers::newsletter::subscribe),
        )
        .route("/webhooks/razorpay", post(handlers::payments::webhook))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(cors)
        .with_state(state);

    Ok(router)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: Config) -> Result<Self, AppError> {
        let state = AppState::new(config.clone());
        let router = router(state)?;

        // Port 0 = random port for testing
        let host: std::net::IpAddr = config.server.host.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Invalid host '{}': {}",
                config.server.host,
                e
            ))
        })?;
        let addr = SocketAddr::new(host, config.server.port);
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Checkout service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }
}
