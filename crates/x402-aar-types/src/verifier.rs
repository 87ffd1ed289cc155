//! Receipt verification.
//!
//! [`ReceiptVerifier`] decodes an `X-402-PAYMENT` token and checks the embedded
//! [`Receipt`] against the [`AarOffer`] it claims to pay. Checks run in a fixed
//! order and the first failure decides the [`RejectReason`]:
//!
//! 1. the token decodes to JSON other than `null`, `false`, `0` or `""`
//!    ([`RejectReason::InvalidPaymentHeaderJson`])
//! 2. it has a `receipt` that is not one of those ([`RejectReason::MissingReceipt`])
//! 3. every [`ReceiptField`] is present ([`RejectReason::Missing`])
//! 4. the version tag is `x402-aar/v0.1` ([`RejectReason::BadType`])
//! 5. the receipt names the offer by the same string ([`RejectReason::OfferIdMismatch`])
//! 6. the asset is accepted by the offer ([`RejectReason::WrongAssetOut`])
//! 7. `amountOut` is all digits ([`RejectReason::BadAmountOut`])
//! 8. `payTo` matches the offer, only when [`VerifierOptions::enforce_pay_to_match`]
//!    is set ([`RejectReason::WrongPayTo`])
//!
//! This is a pre-check on the claim itself. The transaction referenced by
//! `txHash` is not looked up on-chain, and slippage or deadline bounds from the
//! offer policy are not enforced.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::borrow::Cow;
use std::str::FromStr;

use crate::proto::{AarOffer, Receipt, ReceiptField};
use crate::util::decode_json;

/// Machine-readable reason a receipt was rejected.
///
/// Serializes as its wire code, e.g. `"OFFER_ID_MISMATCH"` or `"MISSING_TXHASH"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum RejectReason {
    #[error("Payment header is not base64url-encoded JSON")]
    InvalidPaymentHeaderJson,
    #[error("Payment header has no receipt")]
    MissingReceipt,
    #[error("Receipt field {0} is missing")]
    Missing(ReceiptField),
    #[error("Receipt type is not x402-aar/v0.1")]
    BadType,
    #[error("Receipt is bound to a different offer")]
    OfferIdMismatch,
    #[error("Receipt settles in an asset the offer does not accept")]
    WrongAssetOut,
    #[error("Receipt amountOut is not a decimal integer")]
    BadAmountOut,
    #[error("Receipt pays a different recipient than the offer")]
    WrongPayTo,
}

impl RejectReason {
    /// The wire code for this reason.
    pub fn code(&self) -> Cow<'static, str> {
        match self {
            RejectReason::InvalidPaymentHeaderJson => "INVALID_PAYMENT_HEADER_JSON".into(),
            RejectReason::MissingReceipt => "MISSING_RECEIPT".into(),
            RejectReason::Missing(field) => {
                format!("MISSING_{}", field.as_str().to_uppercase()).into()
            }
            RejectReason::BadType => "BAD_TYPE".into(),
            RejectReason::OfferIdMismatch => "OFFER_ID_MISMATCH".into(),
            RejectReason::WrongAssetOut => "WRONG_ASSET_OUT".into(),
            RejectReason::BadAmountOut => "BAD_AMOUNT_OUT".into(),
            RejectReason::WrongPayTo => "WRONG_PAYTO".into(),
        }
    }
}

impl FromStr for RejectReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reason = match s {
            "INVALID_PAYMENT_HEADER_JSON" => RejectReason::InvalidPaymentHeaderJson,
            "MISSING_RECEIPT" => RejectReason::MissingReceipt,
            "BAD_TYPE" => RejectReason::BadType,
            "OFFER_ID_MISMATCH" => RejectReason::OfferIdMismatch,
            "WRONG_ASSET_OUT" => RejectReason::WrongAssetOut,
            "BAD_AMOUNT_OUT" => RejectReason::BadAmountOut,
            "WRONG_PAYTO" => RejectReason::WrongPayTo,
            other => other
                .strip_prefix("MISSING_")
                .and_then(ReceiptField::from_name)
                .map(RejectReason::Missing)
                .ok_or_else(|| format!("unknown reject reason '{other}'"))?,
        };
        Ok(reason)
    }
}

impl Serialize for RejectReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code())
    }
}

impl<'de> Deserialize<'de> for RejectReason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Outcome of a verification: `{ "ok": true }` or `{ "ok": false, "reason": "..." }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
}

impl Verdict {
    pub fn accepted() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub fn rejected(reason: RejectReason) -> Self {
        Self {
            ok: false,
            reason: Some(reason),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }
}

impl<T> From<Result<T, RejectReason>> for Verdict {
    fn from(result: Result<T, RejectReason>) -> Self {
        match result {
            Ok(_) => Verdict::accepted(),
            Err(reason) => Verdict::rejected(reason),
        }
    }
}

/// Switches for checks that are off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierOptions {
    /// Reject receipts whose `payTo` differs from the offer's (case-insensitive).
    #[serde(default)]
    pub enforce_pay_to_match: bool,
}

/// Checks payment receipts against AAR offers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReceiptVerifier {
    options: VerifierOptions,
}

impl ReceiptVerifier {
    pub fn new(options: VerifierOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> VerifierOptions {
        self.options
    }

    /// Verifies the `X-402-PAYMENT` token against `offer`.
    pub fn verify(&self, payment_header: &str, offer: &AarOffer) -> Verdict {
        let verdict = Verdict::from(self.check(payment_header, offer));
        if let Some(reason) = verdict.reason {
            tracing::debug!(reason = %reason.code(), "Receipt rejected");
        }
        verdict
    }

    /// Same checks as [`ReceiptVerifier::verify`], handing back the accepted receipt.
    pub fn check(&self, payment_header: &str, offer: &AarOffer) -> Result<Receipt, RejectReason> {
        let parsed = decode_json::<Value>(payment_header)
            .filter(|parsed| !is_falsy(parsed))
            .ok_or(RejectReason::InvalidPaymentHeaderJson)?;
        let receipt_json = parsed
            .get("receipt")
            .filter(|receipt| !is_falsy(receipt))
            .ok_or(RejectReason::MissingReceipt)?;
        let receipt = Receipt::from_value(receipt_json)?;

        // The binding compares the raw value: a numeric offerId never matches.
        if let Some(offer_id) = offer.binding_offer_id() {
            if receipt_json.get("offerId").and_then(Value::as_str) != Some(offer_id) {
                return Err(RejectReason::OfferIdMismatch);
            }
        }

        if !offer.accepts_asset(&receipt.asset) {
            return Err(RejectReason::WrongAssetOut);
        }

        if !receipt.has_numeric_amount_out() {
            return Err(RejectReason::BadAmountOut);
        }

        if let Some(pay_to) = offer.pay_to.as_deref().filter(|p| !p.is_empty()) {
            if !receipt.pay_to.is_empty() && !receipt.pay_to.eq_ignore_ascii_case(pay_to) {
                if self.options.enforce_pay_to_match {
                    return Err(RejectReason::WrongPayTo);
                }
                tracing::debug!(
                    expected = pay_to,
                    actual = %receipt.pay_to,
                    "payTo mismatch not enforced"
                );
            }
        }

        Ok(receipt)
    }
}

/// `null`, `false`, zero and the empty string count as absent.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Verifies with default [`VerifierOptions`].
pub fn verify_receipt(payment_header: &str, offer: &AarOffer) -> Verdict {
    ReceiptVerifier::default().verify(payment_header, offer)
}
