use axum::Router;
use axum::http::Method;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors;

use crate::config::Config;
use crate::handlers;
use crate::responder::OfferResponder;
use crate::util::{SigDown, Telemetry};

/// Initializes the x402 AAR resource server.
///
/// - Loads `.env` variables.
/// - Initializes logging, and OpenTelemetry export if configured.
/// - Builds the offer responder from the merchant configuration.
/// - Starts an Axum HTTP server and shuts down gracefully on SIGTERM or SIGINT.
///
/// Binds to the address from the config file, or the `HOST` and `PORT` env vars.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let telemetry = Telemetry::new()
        .with_name(env!("CARGO_PKG_NAME"))
        .with_version(env!("CARGO_PKG_VERSION"))
        .register();

    let config = Config::load()?;

    let responder = OfferResponder::new(config.merchant().clone(), config.verifier());
    tracing::info!(
        offer_id = responder.offer_id(),
        accepted_assets = responder.aar_offer().accepted_assets.len(),
        enforce_pay_to_match = config.verifier().enforce_pay_to_match,
        "Merchant offer loaded"
    );
    let axum_state = Arc::new(responder);

    let http_endpoints = Router::new()
        .merge(handlers::routes().with_state(axum_state))
        .layer(telemetry.http_tracing())
        .layer(
            cors::CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods([Method::GET])
                .allow_headers(cors::Any)
                .expose_headers(cors::Any),
        );

    let addr = SocketAddr::new(config.host(), config.port());
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .inspect_err(|e| tracing::error!("Failed to bind to {}: {}", addr, e))?;
    tracing::info!("x402 AAR server listening on http://{}", addr);

    let sig_down = SigDown::try_new()?;
    let axum_cancellation_token = sig_down.cancellation_token();
    let axum_graceful_shutdown = async move { axum_cancellation_token.cancelled().await };
    axum::serve(listener, http_endpoints)
        .with_graceful_shutdown(axum_graceful_shutdown)
        .await?;
    sig_down.recv().await;

    Ok(())
}
