//! x402 AAR demo server entrypoint.
//!
//! Endpoints:
//! - `GET /resource` – Pay-per-request resource guarded by the x402 AAR flow
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `CONFIG` points at an optional JSON config file
//! - `HOST`, `PORT` control binding address
//! - `RUST_LOG` controls log verbosity
//! - `OTEL_*` variables enable OTLP export when built with `telemetry`

use std::process;

#[tokio::main]
async fn main() {
    let result = x402_aar::run().await;
    if let Err(e) = result {
        eprintln!("{e}");
        process::exit(1)
    }
}
