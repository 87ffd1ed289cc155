//! Wire types for the x402 Accept-Asset-Range (AAR) flow.
//!
//! # Flow
//!
//! 1. A client requests a paid resource without payment. The server answers
//!    `402 Payment Required` with a [`StandardOffer`] in [`X_402_OFFER`] and an
//!    [`AarOffer`] in [`X_402_AAR_OFFER`].
//! 2. The client settles in one of the accepted assets and retries with a
//!    [`PaymentHeader`] in [`X_402_PAYMENT`].
//! 3. The server checks the embedded [`Receipt`] against the offer. On failure it
//!    answers 402 again with an [`AarError`] in [`X_402_AAR_ERROR`].
//!
//! Every header value is JSON encoded with [`crate::util::encode_json`]. Header
//! names are case-insensitive on the wire; the constants use the lowercase form.

use serde::{Deserialize, Serialize};

use crate::lit_str;
use crate::util::encode_json;
use crate::verifier::RejectReason;

mod offer;
mod receipt;

pub use offer::*;
pub use receipt::*;

/// Request header carrying the client's [`PaymentHeader`].
pub const X_402_PAYMENT: &str = "x-402-payment";
/// Response header carrying the [`StandardOffer`].
pub const X_402_OFFER: &str = "x-402-offer";
/// Response header carrying the [`AarOffer`].
pub const X_402_AAR_OFFER: &str = "x-402-aar-offer";
/// Response header carrying an [`AarError`] after a failed verification.
pub const X_402_AAR_ERROR: &str = "x-402-aar-error";

lit_str!(VerifyFailCode, "VERIFY_FAIL");

/// Body of the `X-402-PAYMENT` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentHeader {
    pub receipt: Receipt,
}

impl PaymentHeader {
    pub fn new(receipt: Receipt) -> Self {
        Self { receipt }
    }

    /// Encodes the header into its transport token.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        encode_json(self)
    }
}

/// Body of the `X-402-AAR-ERROR` header.
///
/// ```json
/// { "code": "VERIFY_FAIL", "reason": "WRONG_ASSET_OUT" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AarError {
    pub code: VerifyFailCode,
    pub reason: RejectReason,
}

impl AarError {
    pub fn verify_fail(reason: RejectReason) -> Self {
        Self {
            code: VerifyFailCode,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::decode_json;
    use serde_json::{Value, json};

    #[test]
    fn test_aar_error_wire_format() {
        let error = AarError::verify_fail(RejectReason::WrongAssetOut);
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({"code": "VERIFY_FAIL", "reason": "WRONG_ASSET_OUT"})
        );
        let token = encode_json(&error).unwrap();
        assert_eq!(decode_json::<AarError>(&token), Some(error));
    }

    #[test]
    fn test_payment_header_encodes_receipt() {
        let header = PaymentHeader::new(Receipt {
            receipt_type: ReceiptTypeV01,
            offer_id: "0xabc123".to_string(),
            quote_id: "q1".to_string(),
            chain: "base".to_string(),
            asset: "0xyourtoken".to_string(),
            amount_out: "2500".to_string(),
            pay_to: "0xMERCHANT".to_string(),
            tx_hash: "0xT".to_string(),
        });
        let token = header.encode().unwrap();
        let decoded: Value = decode_json(&token).unwrap();
        assert_eq!(decoded["receipt"]["type"], "x402-aar/v0.1");
        assert_eq!(decoded["receipt"]["amountOut"], "2500");
    }
}
