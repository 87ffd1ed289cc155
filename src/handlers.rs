//! HTTP endpoints of the x402 AAR resource server.
//!
//! - `GET /resource` – the paid resource. Without `X-402-PAYMENT` it answers `402`
//!   with the merchant's offers; with it, the receipt is verified and the answer is
//!   `200` or `402` with `X-402-AAR-ERROR`.
//!
//! Every response body is JSON with at least an `ok` field.

use axum::Router;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::get;
use std::sync::Arc;
use tracing::instrument;

use crate::responder::OfferResponder;

/// Shared handler state.
pub type AppState = Arc<OfferResponder>;

pub fn routes() -> Router<AppState> {
    Router::new().route("/resource", get(get_resource))
}

/// `GET /resource`: the pay-per-request resource.
#[instrument(skip_all)]
pub async fn get_resource(State(responder): State<AppState>, headers: HeaderMap) -> Response {
    responder.respond(&headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use x402_aar_types::proto::{
        AarError, AarOffer, StandardOffer, X_402_AAR_ERROR, X_402_AAR_OFFER, X_402_OFFER,
        X_402_PAYMENT,
    };
    use x402_aar_types::util::{decode_json, encode_json};
    use x402_aar_types::verifier::{RejectReason, VerifierOptions};

    use crate::config::MerchantConfig;

    fn app(options: VerifierOptions) -> Router {
        let responder = OfferResponder::new(MerchantConfig::default(), options);
        routes().with_state(Arc::new(responder))
    }

    fn receipt() -> Value {
        json!({
            "type": "x402-aar/v0.1",
            "offerId": "0xabc123",
            "quoteId": "q1",
            "chain": "base",
            "asset": "0xYourToken",
            "amountOut": "1000000",
            "payTo": "0xmerchant",
            "txHash": "0xdeadbeef"
        })
    }

    async fn fetch(app: Router, payment: Option<&str>) -> (StatusCode, HeaderMap, Value) {
        let mut request = Request::builder().uri("/resource");
        if let Some(payment) = payment {
            request = request.header(X_402_PAYMENT, payment);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap();
        (status, headers, body)
    }

    fn header_json<T: serde::de::DeserializeOwned>(headers: &HeaderMap, name: &str) -> T {
        let value = headers.get(name).unwrap().to_str().unwrap();
        decode_json(value).unwrap()
    }

    #[tokio::test]
    async fn test_no_payment_returns_offers() {
        let (status, headers, body) = fetch(app(VerifierOptions::default()), None).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            body,
            json!({
                "ok": false,
                "message": "Payment Required. Use x402 AAR flow.",
                "offerId": "0xabc123"
            })
        );

        let standard: StandardOffer = header_json(&headers, X_402_OFFER);
        assert_eq!(standard.offer_id, "0xabc123");
        assert_eq!(standard.amount, "2500");
        assert_eq!(standard.pay_to, "0xMERCHANT");
        assert!(standard.nonce.as_millis() > 0);

        let aar: AarOffer = header_json(&headers, X_402_AAR_OFFER);
        assert_eq!(aar, MerchantConfig::default().aar_offer());
        assert!(headers.get(X_402_AAR_ERROR).is_none());
    }

    #[tokio::test]
    async fn test_empty_payment_header_counts_as_none() {
        let (status, headers, _) = fetch(app(VerifierOptions::default()), Some("")).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert!(headers.get(X_402_OFFER).is_some());
    }

    #[tokio::test]
    async fn test_valid_receipt_delivers_resource() {
        let token = encode_json(&json!({ "receipt": receipt() })).unwrap();
        let (status, headers, body) = fetch(app(VerifierOptions::default()), Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "ok": true,
                "message": "Payment verified (mock). Delivering resource.",
                "offerId": "0xabc123"
            })
        );
        assert!(headers.get(X_402_AAR_ERROR).is_none());
    }

    #[tokio::test]
    async fn test_malformed_header_is_rejected() {
        let (status, headers, body) =
            fetch(app(VerifierOptions::default()), Some("not-base64!!")).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            body,
            json!({
                "ok": false,
                "error": "Payment verification failed",
                "reason": "INVALID_PAYMENT_HEADER_JSON"
            })
        );
        let error: AarError = header_json(&headers, X_402_AAR_ERROR);
        assert_eq!(error, AarError::verify_fail(RejectReason::InvalidPaymentHeaderJson));
    }

    #[tokio::test]
    async fn test_wrong_asset_is_rejected() {
        let mut receipt = receipt();
        receipt["asset"] = json!("0xnot_accepted");
        let token = encode_json(&json!({ "receipt": receipt })).unwrap();
        let (status, headers, body) = fetch(app(VerifierOptions::default()), Some(&token)).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body["reason"], "WRONG_ASSET_OUT");
        let error: Value = header_json(&headers, X_402_AAR_ERROR);
        assert_eq!(error, json!({"code": "VERIFY_FAIL", "reason": "WRONG_ASSET_OUT"}));
    }

    #[tokio::test]
    async fn test_pay_to_enforcement_is_configurable() {
        let mut receipt = receipt();
        receipt["payTo"] = json!("0xsomeone_else");
        let token = encode_json(&json!({ "receipt": receipt })).unwrap();

        let (status, _, _) = fetch(app(VerifierOptions::default()), Some(&token)).await;
        assert_eq!(status, StatusCode::OK);

        let enforcing = VerifierOptions {
            enforce_pay_to_match: true,
        };
        let (status, _, body) = fetch(app(enforcing), Some(&token)).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body["reason"], "WRONG_PAYTO");
    }
}
