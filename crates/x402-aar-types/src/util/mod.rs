//! Helper types for the x402 AAR protocol.
//!
//! - [`b64`] - URL-safe base64 header codec
//! - [`lit_str`] - Types bound to a single protocol string

pub mod b64;
pub mod lit_str;

pub use b64::*;
