//! Configuration for the x402 AAR demo server.
//!
//! Configuration is read from an optional JSON file named by `--config` or `$CONFIG`.
//! Without a file the built-in demo merchant is served. Values missing from the
//! file fall back to environment variables, then to hardcoded defaults.
//!
//! ```json
//! {
//!   "port": 8787,
//!   "merchant": {
//!     "offer_id": "0xabc123",
//!     "amount": "2500",
//!     "asset": "0xaccepted_asset",
//!     "chain": "base",
//!     "pay_to": "$MERCHANT_PAY_TO",
//!     "accepted_assets": [
//!       { "chain": "base", "asset": "0xaccepted_asset", "symbol": "USDC", "decimals": 6 }
//!     ]
//!   },
//!   "verifier": { "enforce_pay_to_match": false }
//! }
//! ```

use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::net::IpAddr;
use std::ops::Deref;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;
use x402_aar_types::proto::{AarOffer, AcceptedAsset, Policy, StandardOffer};
use x402_aar_types::timestamp::UnixMillis;
use x402_aar_types::verifier::VerifierOptions;

/// CLI arguments for the x402 AAR server.
#[derive(Parser, Debug)]
#[command(name = "x402-aar")]
#[command(about = "x402 Accept-Asset-Range demo resource server")]
struct CliArgs {
    /// Path to the JSON configuration file
    #[arg(long, short, env = "CONFIG")]
    config: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "config_defaults::default_port")]
    port: u16,
    #[serde(default = "config_defaults::default_host")]
    host: IpAddr,
    #[serde(default)]
    merchant: MerchantConfig,
    #[serde(default)]
    verifier: VerifierOptions,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: config_defaults::default_port(),
            host: config_defaults::default_host(),
            merchant: MerchantConfig::default(),
            verifier: VerifierOptions::default(),
        }
    }
}

pub mod config_defaults {
    use std::env;
    use std::net::{IpAddr, Ipv4Addr};

    pub const DEFAULT_PORT: u16 = 8787;
    pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

    /// Returns the default port value with fallback: $PORT env var -> 8787
    pub fn default_port() -> u16 {
        env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT)
    }

    /// Returns the default host value with fallback: $HOST env var -> "0.0.0.0"
    pub fn default_host() -> IpAddr {
        env::var("HOST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_HOST)
    }
}

/// The merchant's offer template.
///
/// Both the standard offer and the AAR offer are derived from it; nothing here
/// changes after startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MerchantConfig {
    pub offer_id: String,
    pub description: String,
    /// Price in the asset's smallest unit.
    pub amount: String,
    pub asset: String,
    pub chain: String,
    pub pay_to: LiteralOrEnv<String>,
    pub accepted_assets: Vec<AcceptedAsset>,
    pub route_uri: Option<Url>,
    pub min_settle_window_ms: Option<u64>,
    pub policy: Policy,
}

impl Default for MerchantConfig {
    fn default() -> Self {
        let asset = |asset: &str, symbol: &str, decimals: u8| AcceptedAsset {
            chain: "base".to_string(),
            asset: asset.to_string(),
            symbol: symbol.to_string(),
            decimals,
        };
        Self {
            offer_id: "0xabc123".to_string(),
            description: "Demo resource pay-per-request".to_string(),
            amount: "2500".to_string(),
            asset: "0xaccepted_asset".to_string(),
            chain: "base".to_string(),
            pay_to: LiteralOrEnv::from_literal("0xMERCHANT".to_string()),
            accepted_assets: vec![
                asset("0xaccepted_asset", "USDC", 6),
                asset("0xyourtoken", "YTK", 18),
            ],
            route_uri: Url::parse("https://router.example/aar/quote").ok(),
            min_settle_window_ms: Some(15_000),
            policy: Policy {
                deny_assets: Vec::new(),
                max_slippage_bps: 100,
                deadline_ms: 30_000,
            },
        }
    }
}

impl MerchantConfig {
    /// The Accept-Asset-Range offer advertised in `X-402-AAR-OFFER`.
    pub fn aar_offer(&self) -> AarOffer {
        AarOffer {
            offer_id: Some(self.offer_id.clone()),
            accepted_assets: self.accepted_assets.clone(),
            route_uri: self.route_uri.clone(),
            min_settle_window_ms: self.min_settle_window_ms,
            policy: Some(self.policy.clone()),
            pay_to: Some(self.pay_to.inner().clone()).filter(|p| !p.is_empty()),
        }
    }

    /// A fresh standard offer advertised in `X-402-OFFER`.
    pub fn standard_offer(&self, nonce: UnixMillis) -> StandardOffer {
        StandardOffer {
            offer_id: self.offer_id.clone(),
            description: self.description.clone(),
            amount: self.amount.clone(),
            asset: self.asset.clone(),
            chain: self.chain.clone(),
            pay_to: self.pay_to.inner().clone(),
            nonce,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {0}: {1}")]
    FileRead(PathBuf, std::io::Error),
    #[error("Failed to parse config file: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Config {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn host(&self) -> IpAddr {
        self.host
    }

    pub fn merchant(&self) -> &MerchantConfig {
        &self.merchant
    }

    pub fn verifier(&self) -> VerifierOptions {
        self.verifier
    }

    /// Load configuration from CLI arguments and an optional JSON file.
    ///
    /// The config file path is taken from `--config <path>` or `$CONFIG`.
    /// Without either, defaults are used.
    pub fn load() -> Result<Self, ConfigError> {
        let cli_args = CliArgs::parse();
        match cli_args.config {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::FileRead(path, e))?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }
}

/// A transparent wrapper that resolves environment variables during deserialization.
///
/// Supports both literal values and environment variable references:
/// - Literal: `"0xMERCHANT"`
/// - Simple env var: `"$MERCHANT_PAY_TO"`
/// - Braced env var: `"${MERCHANT_PAY_TO}"`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteralOrEnv<T>(T);

impl<T> LiteralOrEnv<T> {
    pub fn from_literal(value: T) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> &T {
        &self.0
    }

    /// Returns the variable name if `s` matches `$VAR` or `${VAR}` syntax.
    fn parse_env_var_syntax(s: &str) -> Option<&str> {
        if let Some(braced) = s.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
            Some(braced)
        } else {
            s.strip_prefix('$')
                .filter(|name| !name.is_empty())
                .filter(|name| name.chars().all(|c| c.is_alphanumeric() || c == '_'))
        }
    }
}

impl<T> Deref for LiteralOrEnv<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de, T> Deserialize<'de> for LiteralOrEnv<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let value = match Self::parse_env_var_syntax(&s) {
            Some(var_name) => std::env::var(var_name).map_err(|_| {
                serde::de::Error::custom(format!(
                    "Environment variable '{}' not found (referenced as '{}')",
                    var_name, s
                ))
            })?,
            None => s,
        };

        let parsed = value
            .parse::<T>()
            .map_err(|e| serde::de::Error::custom(format!("Failed to parse value: {}", e)))?;

        Ok(LiteralOrEnv(parsed))
    }
}
