//! Merchant-issued offers.
//!
//! A 402 response carries two offers: the single-price [`StandardOffer`] in
//! `X-402-OFFER`, and the [`AarOffer`] in `X-402-AAR-OFFER`, which lists every
//! settlement asset the merchant accepts along with quoting constraints.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

use crate::timestamp::UnixMillis;

/// A settlement asset the merchant accepts.
///
/// ```json
/// { "chain": "base", "asset": "0xaccepted_asset", "symbol": "USDC", "decimals": 6 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedAsset {
    /// Network name, e.g. `base`.
    pub chain: String,
    /// Token address or identifier. Compared case-insensitively.
    pub asset: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Quoting constraints forwarded to the router.
///
/// Carried in the offer; not enforced by the verifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    #[serde(default)]
    pub deny_assets: Vec<String>,
    #[serde(default)]
    pub max_slippage_bps: u32,
    #[serde(default)]
    pub deadline_ms: u64,
}

/// Accept-Asset-Range offer, sent base64url-encoded in `X-402-AAR-OFFER`.
///
/// Receipts are checked against this offer: the receipt must name the same
/// `offerId` and settle in one of the `acceptedAssets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AarOffer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_id: Option<String>,
    #[serde(default)]
    pub accepted_assets: Vec<AcceptedAsset>,
    #[serde(
        rename = "routeURI",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub route_uri: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_settle_window_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<Policy>,
    /// Merchant treasury, used as a verifier hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_to: Option<String>,
}

impl AarOffer {
    /// The offer id receipts must be bound to, if any. Empty ids bind nothing.
    pub fn binding_offer_id(&self) -> Option<&str> {
        self.offer_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Lower-cased identifiers of all accepted assets.
    pub fn accepted_asset_set(&self) -> HashSet<String> {
        self.accepted_assets
            .iter()
            .map(|accepted| accepted.asset.to_lowercase())
            .collect()
    }

    /// Whether a receipt settling in `asset` is acceptable.
    ///
    /// An offer that lists no assets accepts any asset.
    pub fn accepts_asset(&self, asset: &str) -> bool {
        let accepted = self.accepted_asset_set();
        accepted.is_empty() || accepted.contains(&asset.to_lowercase())
    }
}

/// Single-price offer, sent base64url-encoded in `X-402-OFFER`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardOffer {
    pub offer_id: String,
    pub description: String,
    /// Price in the asset's smallest unit, as a decimal-digit string.
    pub amount: String,
    pub asset: String,
    pub chain: String,
    pub pay_to: String,
    /// Issue time of this offer instance.
    pub nonce: UnixMillis,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn offer() -> AarOffer {
        AarOffer {
            offer_id: Some("0xabc123".to_string()),
            accepted_assets: vec![
                AcceptedAsset {
                    chain: "base".to_string(),
                    asset: "0xAccepted_Asset".to_string(),
                    symbol: "USDC".to_string(),
                    decimals: 6,
                },
                AcceptedAsset {
                    chain: "base".to_string(),
                    asset: "0xyourtoken".to_string(),
                    symbol: "YTK".to_string(),
                    decimals: 18,
                },
            ],
            route_uri: Some("https://router.example/aar/quote".parse().unwrap()),
            min_settle_window_ms: Some(15000),
            policy: Some(Policy {
                deny_assets: vec![],
                max_slippage_bps: 100,
                deadline_ms: 30000,
            }),
            pay_to: Some("0xMERCHANT".to_string()),
        }
    }

    #[test]
    fn test_aar_offer_wire_format() {
        let value = serde_json::to_value(offer()).unwrap();
        assert_eq!(
            value,
            json!({
                "offerId": "0xabc123",
                "acceptedAssets": [
                    {"chain": "base", "asset": "0xAccepted_Asset", "symbol": "USDC", "decimals": 6},
                    {"chain": "base", "asset": "0xyourtoken", "symbol": "YTK", "decimals": 18}
                ],
                "routeURI": "https://router.example/aar/quote",
                "minSettleWindowMs": 15000,
                "policy": {"denyAssets": [], "maxSlippageBps": 100, "deadlineMs": 30000},
                "payTo": "0xMERCHANT"
            })
        );
    }

    #[test]
    fn test_accepts_asset_ignores_case() {
        let offer = offer();
        assert!(offer.accepts_asset("0xaccepted_asset"));
        assert!(offer.accepts_asset("0XYOURTOKEN"));
        assert!(!offer.accepts_asset("0xother"));
    }

    #[test]
    fn test_empty_asset_list_accepts_anything() {
        let offer = AarOffer::default();
        assert!(offer.accepts_asset("0xanything"));
    }

    #[test]
    fn test_empty_offer_id_binds_nothing() {
        let mut offer = offer();
        assert_eq!(offer.binding_offer_id(), Some("0xabc123"));
        offer.offer_id = Some(String::new());
        assert_eq!(offer.binding_offer_id(), None);
    }

    #[test]
    fn test_minimal_aar_offer_decodes() {
        let offer: AarOffer =
            serde_json::from_value(json!({"offerId": "X", "acceptedAssets": [
                {"chain": "base", "asset": "0xA", "symbol": "A", "decimals": 0}
            ]}))
            .unwrap();
        assert_eq!(offer.binding_offer_id(), Some("X"));
        assert!(offer.route_uri.is_none());
        assert!(offer.policy.is_none());
    }
}
