//! x402 Accept-Asset-Range (AAR) resource server.
//!
//! A pay-per-request HTTP server built on [`x402_aar_types`]. Unpaid requests to
//! `GET /resource` receive `402 Payment Required` with a standard offer and an AAR
//! offer in response headers; retries carrying an `X-402-PAYMENT` receipt are
//! verified and either served or refused with a machine-readable reason.
//!
//! Receipt verification is a pre-check of the receipt's shape and terms. No
//! transaction is looked up on-chain.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Configuration types and loading |
//! | [`handlers`] | HTTP routes |
//! | [`responder`] | Offer issuing and receipt checking per request |
//! | [`run`] | Server initialization and runtime |
//! | [`util`] | Signal handling and telemetry |
//!
//! # Running the Server
//!
//! ```bash
//! # Serve the built-in demo merchant on port 8787
//! cargo run
//!
//! # Run with a custom merchant config
//! cargo run -- --config /path/to/config.json
//!
//! # Export traces and metrics over OTLP
//! OTEL_EXPORTER_OTLP_ENDPOINT=http://localhost:4318 cargo run --features telemetry
//! ```

pub mod config;
pub mod handlers;
pub mod responder;
pub mod run;
pub mod util;

pub use run::run;
