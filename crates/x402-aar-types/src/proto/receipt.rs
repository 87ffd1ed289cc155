//! Client-submitted payment receipts.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt::{Display, Formatter};

use crate::lit_str;
use crate::verifier::RejectReason;

lit_str!(ReceiptTypeV01, "x402-aar/v0.1");

/// A receipt field that must be present before any semantic check runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceiptField {
    Type,
    OfferId,
    QuoteId,
    Chain,
    Asset,
    AmountOut,
    PayTo,
    TxHash,
}

impl ReceiptField {
    /// All required fields, in the order their presence is checked.
    pub const ALL: [ReceiptField; 8] = [
        ReceiptField::Type,
        ReceiptField::OfferId,
        ReceiptField::QuoteId,
        ReceiptField::Chain,
        ReceiptField::Asset,
        ReceiptField::AmountOut,
        ReceiptField::PayTo,
        ReceiptField::TxHash,
    ];

    /// JSON key of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptField::Type => "type",
            ReceiptField::OfferId => "offerId",
            ReceiptField::QuoteId => "quoteId",
            ReceiptField::Chain => "chain",
            ReceiptField::Asset => "asset",
            ReceiptField::AmountOut => "amountOut",
            ReceiptField::PayTo => "payTo",
            ReceiptField::TxHash => "txHash",
        }
    }

    /// Inverse of [`ReceiptField::as_str`], ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(name))
    }
}

impl Display for ReceiptField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proof-of-payment claim embedded in the `X-402-PAYMENT` header.
///
/// ```json
/// {
///   "type": "x402-aar/v0.1",
///   "offerId": "0xabc123",
///   "quoteId": "q1",
///   "chain": "base",
///   "asset": "0xaccepted_asset",
///   "amountOut": "2500",
///   "payTo": "0xMERCHANT",
///   "txHash": "0x..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[serde(rename = "type")]
    pub receipt_type: ReceiptTypeV01,
    pub offer_id: String,
    pub quote_id: String,
    pub chain: String,
    pub asset: String,
    /// Settled amount in the asset's smallest unit.
    pub amount_out: String,
    pub pay_to: String,
    pub tx_hash: String,
}

impl Receipt {
    /// Builds a receipt from loosely-shaped JSON.
    ///
    /// Fields are checked for presence in [`ReceiptField::ALL`] order and the first
    /// null or absent one is reported. The version tag must then be exactly the
    /// string `x402-aar/v0.1`. Other present values that are not strings are
    /// converted with [`loose_text`].
    pub fn from_value(value: &Value) -> Result<Self, RejectReason> {
        let field = |field: ReceiptField| -> Result<String, RejectReason> {
            match value.get(field.as_str()) {
                None | Some(Value::Null) => Err(RejectReason::Missing(field)),
                Some(present) => Ok(loose_text(present)),
            }
        };
        field(ReceiptField::Type)?;
        let offer_id = field(ReceiptField::OfferId)?;
        let quote_id = field(ReceiptField::QuoteId)?;
        let chain = field(ReceiptField::Chain)?;
        let asset = field(ReceiptField::Asset)?;
        let amount_out = field(ReceiptField::AmountOut)?;
        let pay_to = field(ReceiptField::PayTo)?;
        let tx_hash = field(ReceiptField::TxHash)?;

        let receipt_type = value
            .get(ReceiptField::Type.as_str())
            .and_then(Value::as_str)
            .and_then(|tag| tag.parse::<ReceiptTypeV01>().ok())
            .ok_or(RejectReason::BadType)?;

        Ok(Receipt {
            receipt_type,
            offer_id,
            quote_id,
            chain,
            asset,
            amount_out,
            pay_to,
            tx_hash,
        })
    }

    /// Whether `amount_out` consists of ASCII digits only.
    pub fn has_numeric_amount_out(&self) -> bool {
        self.amount_out.chars().all(|c| c.is_ascii_digit())
    }
}

/// Text form of a JSON value as clients written in loosely-typed languages see it.
///
/// Strings are taken as is. Integral numbers below `1e21` print as plain digits
/// (`100.0` and `1e2` both give `"100"`); other numbers keep a fractional or
/// exponent form. Arrays join their elements with `,`, with `null` elements empty,
/// so `["100"]` gives `"100"` and `[]` gives `""`. Objects give `"[object Object]"`.
pub fn loose_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => loose_number_text(n),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => loose_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn loose_number_text(n: &Number) -> String {
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        Some(f) if f.abs() >= 1e21 => format!("{f:e}"),
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn receipt_json() -> Value {
        json!({
            "type": "x402-aar/v0.1",
            "offerId": "X",
            "quoteId": "q1",
            "chain": "base",
            "asset": "0xa",
            "amountOut": "100",
            "payTo": "0xP",
            "txHash": "0xT"
        })
    }

    #[test]
    fn test_from_value_complete() {
        let receipt = Receipt::from_value(&receipt_json()).unwrap();
        assert_eq!(receipt.offer_id, "X");
        assert_eq!(receipt.amount_out, "100");
        assert_eq!(serde_json::to_value(&receipt).unwrap(), receipt_json());
    }

    #[test]
    fn test_each_missing_field_is_named() {
        for field in ReceiptField::ALL {
            let mut value = receipt_json();
            value.as_object_mut().unwrap().remove(field.as_str());
            assert_eq!(
                Receipt::from_value(&value),
                Err(RejectReason::Missing(field)),
                "removing {field}"
            );

            let mut value = receipt_json();
            value[field.as_str()] = Value::Null;
            assert_eq!(
                Receipt::from_value(&value),
                Err(RejectReason::Missing(field)),
                "nulling {field}"
            );
        }
    }

    #[test]
    fn test_first_missing_field_wins() {
        let value = json!({"type": "x402-aar/v0.1", "offerId": "X", "txHash": "0xT"});
        assert_eq!(
            Receipt::from_value(&value),
            Err(RejectReason::Missing(ReceiptField::QuoteId))
        );
        // missing fields are reported before a bad version tag
        let value = json!({"type": "v2", "offerId": "X"});
        assert_eq!(
            Receipt::from_value(&value),
            Err(RejectReason::Missing(ReceiptField::QuoteId))
        );
    }

    #[test]
    fn test_non_object_receipt_misses_type() {
        assert_eq!(
            Receipt::from_value(&json!("receipt")),
            Err(RejectReason::Missing(ReceiptField::Type))
        );
    }

    #[test]
    fn test_bad_type() {
        let mut value = receipt_json();
        value["type"] = json!("x402-aar/v0.2");
        assert_eq!(Receipt::from_value(&value), Err(RejectReason::BadType));
        value["type"] = json!(1);
        assert_eq!(Receipt::from_value(&value), Err(RejectReason::BadType));
        // only the exact string passes, even when the loose text would match
        value["type"] = json!(["x402-aar/v0.1"]);
        assert_eq!(Receipt::from_value(&value), Err(RejectReason::BadType));
    }

    #[test]
    fn test_numeric_amount_out_is_text() {
        let mut value = receipt_json();
        value["amountOut"] = json!(1230);
        let receipt = Receipt::from_value(&value).unwrap();
        assert_eq!(receipt.amount_out, "1230");
        assert!(receipt.has_numeric_amount_out());

        value["amountOut"] = json!("12a3");
        let receipt = Receipt::from_value(&value).unwrap();
        assert!(!receipt.has_numeric_amount_out());

        value["amountOut"] = json!(-5);
        let receipt = Receipt::from_value(&value).unwrap();
        assert!(!receipt.has_numeric_amount_out());
    }

    #[test]
    fn test_amount_out_follows_loose_text() {
        let passing = [json!(100.0), json!(1e2), json!(["100"]), json!(-0.0), json!([])];
        for amount in passing {
            let mut value = receipt_json();
            value["amountOut"] = amount.clone();
            let receipt = Receipt::from_value(&value).unwrap();
            assert!(receipt.has_numeric_amount_out(), "amountOut {amount}");
        }
        assert_eq!(loose_text(&json!(1e2)), "100");
        assert_eq!(loose_text(&json!(["100"])), "100");

        let failing = [json!(12.5), json!(1e21), json!(["1", "2"]), json!({}), json!(true)];
        for amount in failing {
            let mut value = receipt_json();
            value["amountOut"] = amount.clone();
            let receipt = Receipt::from_value(&value).unwrap();
            assert!(!receipt.has_numeric_amount_out(), "amountOut {amount}");
        }
    }

    #[test]
    fn test_loose_text_shapes() {
        assert_eq!(loose_text(&json!([1, null, "a", [2, 3]])), "1,,a,2,3");
        assert_eq!(loose_text(&json!({"a": 1})), "[object Object]");
        assert_eq!(loose_text(&json!(false)), "false");
        assert_eq!(loose_text(&json!(-7)), "-7");
        assert_eq!(loose_text(&json!(0.5)), "0.5");
    }

    #[test]
    fn test_field_names() {
        assert_eq!(ReceiptField::from_name("AMOUNTOUT"), Some(ReceiptField::AmountOut));
        assert_eq!(ReceiptField::from_name("txHash"), Some(ReceiptField::TxHash));
        assert_eq!(ReceiptField::from_name("memo"), None);
    }
}
