//! Types standing for one fixed protocol string.
//!
//! The [`lit_str!`](crate::lit_str) macro declares a unit struct that serializes as,
//! and only deserializes from, a single literal. It is used for the receipt
//! version tag and the `VERIFY_FAIL` error code.
//!
//! ```
//! use x402_aar_types::lit_str;
//!
//! lit_str!(QuoteKind, "aar-quote");
//!
//! let kind: QuoteKind = "aar-quote".parse().unwrap();
//! assert_eq!(kind.to_string(), "aar-quote");
//! assert!("other".parse::<QuoteKind>().is_err());
//! ```

/// Declares a unit struct bound to the string literal `$val`.
///
/// The generated type has a `VALUE` constant and implements `FromStr`, `Display`,
/// `Default`, `AsRef<str>` and serde `Serialize`/`Deserialize` in terms of it.
#[macro_export]
macro_rules! lit_str {
    ($struct_name:ident, $val:expr) => {
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $struct_name;

        impl $struct_name {
            pub const VALUE: &'static str = $val;

            /// Whether `s` is exactly this literal.
            pub fn matches(s: &str) -> bool {
                s == Self::VALUE
            }
        }

        impl AsRef<str> for $struct_name {
            fn as_ref(&self) -> &str {
                Self::VALUE
            }
        }

        impl std::str::FromStr for $struct_name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if Self::matches(s) {
                    Ok($struct_name)
                } else {
                    Err(format!("expected '{}', got '{}'", Self::VALUE, s))
                }
            }
        }

        impl serde::Serialize for $struct_name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(Self::VALUE)
            }
        }

        impl<'de> serde::Deserialize<'de> for $struct_name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }

        impl std::fmt::Display for $struct_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(Self::VALUE)
            }
        }
    };
}
