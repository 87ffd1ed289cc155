//! Offer Responder: turns a `/resource` request into a 402 offer or a verdict.
//!
//! ## Overview
//!
//! The responder handles:
//! - Returning `402 Payment Required` with `X-402-OFFER` and `X-402-AAR-OFFER`
//!   when the request carries no `X-402-PAYMENT` header
//! - Verifying the receipt in `X-402-PAYMENT` against the merchant's AAR offer
//! - Returning `200` on a verified receipt, or `402` with `X-402-AAR-ERROR` otherwise
//!
//! ## Example
//!
//! ```ignore
//! use x402_aar::config::MerchantConfig;
//! use x402_aar::responder::OfferResponder;
//!
//! let responder = OfferResponder::new(MerchantConfig::default(), Default::default());
//! let response = responder.respond(request.headers());
//! ```

use axum::Json;
use axum::http::header::InvalidHeaderValue;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use x402_aar_types::proto::{
    AarError, AarOffer, X_402_AAR_ERROR, X_402_AAR_OFFER, X_402_OFFER, X_402_PAYMENT,
};
use x402_aar_types::timestamp::UnixMillis;
use x402_aar_types::util::encode_json;
use x402_aar_types::verifier::{ReceiptVerifier, RejectReason, VerifierOptions};

use crate::config::MerchantConfig;

/// Failures while building a response. These never come from client input.
#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    #[error("Failed to encode header: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Invalid header value: {0}")]
    HeaderValue(#[from] InvalidHeaderValue),
}

impl IntoResponse for ResponderError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Failed to build x402 response");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "error": "Internal error" })),
        )
            .into_response()
    }
}

/// Issues offers for one merchant and checks receipts against them.
#[derive(Debug, Clone)]
pub struct OfferResponder {
    merchant: MerchantConfig,
    aar_offer: AarOffer,
    verifier: ReceiptVerifier,
}

impl OfferResponder {
    pub fn new(merchant: MerchantConfig, verifier_options: VerifierOptions) -> Self {
        let aar_offer = merchant.aar_offer();
        Self {
            merchant,
            aar_offer,
            verifier: ReceiptVerifier::new(verifier_options),
        }
    }

    pub fn aar_offer(&self) -> &AarOffer {
        &self.aar_offer
    }

    pub fn offer_id(&self) -> &str {
        &self.merchant.offer_id
    }

    /// Dispatches on the presence of a non-empty `X-402-PAYMENT` header.
    pub fn respond(&self, headers: &HeaderMap) -> Response {
        match extract_payment_header(headers) {
            Some(payment_header) => self.verify_payment(&payment_header),
            None => self.payment_required(),
        }
    }

    /// `402` with freshly encoded offers.
    pub fn payment_required(&self) -> Response {
        self.try_payment_required()
            .unwrap_or_else(IntoResponse::into_response)
    }

    fn try_payment_required(&self) -> Result<Response, ResponderError> {
        let standard_offer = self.merchant.standard_offer(UnixMillis::now());
        let offer_header = header_value(&standard_offer)?;
        let aar_offer_header = header_value(&self.aar_offer)?;

        tracing::info!(offer_id = %self.offer_id(), "Returning 402");
        tracing::info!(
            accepted_assets = ?self.aar_offer.accepted_assets,
            "AAR accepted assets"
        );

        let mut response = (
            StatusCode::PAYMENT_REQUIRED,
            Json(json!({
                "ok": false,
                "message": "Payment Required. Use x402 AAR flow.",
                "offerId": self.offer_id(),
            })),
        )
            .into_response();
        let headers = response.headers_mut();
        headers.insert(X_402_OFFER, offer_header);
        headers.insert(X_402_AAR_OFFER, aar_offer_header);
        Ok(response)
    }

    /// `200` if the receipt in `payment_header` satisfies the offer, `402` otherwise.
    pub fn verify_payment(&self, payment_header: &str) -> Response {
        match self.verifier.check(payment_header, &self.aar_offer) {
            Ok(receipt) => {
                tracing::info!(
                    offer_id = %self.offer_id(),
                    tx_hash = %receipt.tx_hash,
                    asset = %receipt.asset,
                    amount_out = %receipt.amount_out,
                    "Payment verified"
                );
                (
                    StatusCode::OK,
                    Json(json!({
                        "ok": true,
                        "message": "Payment verified (mock). Delivering resource.",
                        "offerId": self.offer_id(),
                    })),
                )
                    .into_response()
            }
            Err(reason) => self
                .verification_failed(reason)
                .unwrap_or_else(IntoResponse::into_response),
        }
    }

    fn verification_failed(&self, reason: RejectReason) -> Result<Response, ResponderError> {
        tracing::warn!(
            offer_id = %self.offer_id(),
            reason = %reason.code(),
            "Payment verification failed"
        );
        let error_header = header_value(&AarError::verify_fail(reason))?;
        let mut response = (
            StatusCode::PAYMENT_REQUIRED,
            Json(json!({
                "ok": false,
                "error": "Payment verification failed",
                "reason": reason,
            })),
        )
            .into_response();
        response.headers_mut().insert(X_402_AAR_ERROR, error_header);
        Ok(response)
    }
}

/// Extracts a non-empty payment header. Non-UTF-8 bytes are kept lossily and fail decoding later.
fn extract_payment_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_402_PAYMENT)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .filter(|value| !value.is_empty())
}

/// Encodes `value` into a header value.
fn header_value<T: serde::Serialize>(value: &T) -> Result<HeaderValue, ResponderError> {
    let token = encode_json(value)?;
    Ok(HeaderValue::from_str(&token)?)
}
