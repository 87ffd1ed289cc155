#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the x402 Accept-Asset-Range (AAR) payment flow.
//!
//! A resource server answers unpaid requests with `402 Payment Required` and a
//! machine-readable offer. The client pays in any asset the offer accepts and
//! retries with a receipt, which the server checks before serving the resource.
//!
//! This crate holds everything about that exchange that does not depend on an
//! HTTP stack:
//!
//! - [`util`] - URL-safe base64 codec for header values
//! - [`proto`] - Offers, receipts, header names and error bodies
//! - [`verifier`] - Receipt checks and their machine-readable reject reasons
//! - [`timestamp`] - Millisecond timestamps used as offer nonces
//!
//! # Example
//!
//! ```
//! use x402_aar_types::proto::{AarOffer, PaymentHeader, Receipt, ReceiptTypeV01};
//! use x402_aar_types::verifier::verify_receipt;
//!
//! let offer = AarOffer {
//!     offer_id: Some("0xabc123".to_string()),
//!     ..Default::default()
//! };
//! let token = PaymentHeader::new(Receipt {
//!     receipt_type: ReceiptTypeV01,
//!     offer_id: "0xabc123".to_string(),
//!     quote_id: "q1".to_string(),
//!     chain: "base".to_string(),
//!     asset: "0xaccepted_asset".to_string(),
//!     amount_out: "2500".to_string(),
//!     pay_to: "0xMERCHANT".to_string(),
//!     tx_hash: "0xfeed".to_string(),
//! })
//! .encode()
//! .unwrap();
//!
//! assert!(verify_receipt(&token, &offer).is_ok());
//! ```

pub mod proto;
pub mod timestamp;
pub mod util;
pub mod verifier;
