//! Runtime helpers for the server binary.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`sig_down`] | Graceful shutdown signal handling |
//! | [`telemetry`] | Logging setup and optional OpenTelemetry export |

pub mod sig_down;
pub mod telemetry;

pub use sig_down::*;
pub use telemetry::*;
