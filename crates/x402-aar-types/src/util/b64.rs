//! URL-safe base64 header codec.
//!
//! Every x402 AAR header (`X-402-PAYMENT`, `X-402-OFFER`, `X-402-AAR-OFFER`,
//! `X-402-AAR-ERROR`) carries a JSON document encoded as unpadded URL-safe
//! base64. This module provides [`Base64UrlBytes`] for the raw byte layer and
//! [`encode_json`] / [`decode_json`] for the JSON layer on top of it.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::fmt::Display;

/// A wrapper for URL-safe base64 encoded byte data.
///
/// Encoding always uses the URL-safe alphabet (`-` and `_`) without `=` padding.
/// Decoding is lenient about the form it accepts: either alphabet, padded or not.
///
/// # Example
///
/// ```rust
/// use x402_aar_types::util::Base64UrlBytes;
///
/// let encoded = Base64UrlBytes::encode(b"hello world");
/// assert_eq!(encoded.to_string(), "aGVsbG8gd29ybGQ");
///
/// let decoded = encoded.decode().unwrap();
/// assert_eq!(decoded, b"hello world");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base64UrlBytes<'a>(pub Cow<'a, [u8]>);

impl Base64UrlBytes<'_> {
    /// Decodes the base64 bytes to raw binary data.
    ///
    /// The URL-safe substitution is reversed and padding is restored before decoding,
    /// so tokens produced by either alphabet are accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        let mut standard: Vec<u8> = self
            .0
            .iter()
            .map(|byte| match byte {
                b'-' => b'+',
                b'_' => b'/',
                other => *other,
            })
            .collect();
        let padding = (4 - standard.len() % 4) % 4;
        standard.extend(std::iter::repeat_n(b'=', padding));
        STANDARD.decode(standard)
    }

    /// Encodes raw binary data into unpadded URL-safe base64 bytes.
    pub fn encode<T: AsRef<[u8]>>(input: T) -> Base64UrlBytes<'static> {
        let encoded = URL_SAFE_NO_PAD.encode(input.as_ref());
        Base64UrlBytes(Cow::Owned(encoded.into_bytes()))
    }
}

impl AsRef<[u8]> for Base64UrlBytes<'_> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl<'a> From<&'a [u8]> for Base64UrlBytes<'a> {
    fn from(slice: &'a [u8]) -> Self {
        Base64UrlBytes(Cow::Borrowed(slice))
    }
}

impl<'a> From<&'a str> for Base64UrlBytes<'a> {
    fn from(s: &'a str) -> Self {
        Base64UrlBytes(Cow::Borrowed(s.as_bytes()))
    }
}

impl Display for Base64UrlBytes<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.0.as_ref()))
    }
}

/// Why a header token could not be turned back into a value.
#[derive(Debug, thiserror::Error)]
pub enum HeaderDecodeError {
    #[error("Header is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Header is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializes `value` to JSON and encodes it as an unpadded URL-safe base64 token.
///
/// The output never contains `+`, `/` or `=`, so it is always a valid header value.
pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlBytes::encode(json).to_string())
}

/// Decodes a header token into `T`, reporting which layer failed.
pub fn try_decode_json<T: DeserializeOwned>(token: &str) -> Result<T, HeaderDecodeError> {
    let bytes = Base64UrlBytes::from(token).decode()?;
    let value = serde_json::from_slice(&bytes)?;
    Ok(value)
}

/// Decodes a header token into `T`.
///
/// Returns `None` if the token is not base64 or the decoded text is not JSON of the
/// expected shape. Malformed client input is never a panic.
pub fn decode_json<T: DeserializeOwned>(token: &str) -> Option<T> {
    try_decode_json(token).ok()
}
