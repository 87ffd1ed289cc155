//! Millisecond Unix timestamps.
//!
//! Standard offers carry a `nonce` equal to their issue time in milliseconds since
//! the Unix epoch, serialized as a plain JSON number.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::time::SystemTime;

/// Milliseconds since the Unix epoch (1970-01-01T00:00:00Z).
///
/// # Example
///
/// ```
/// use x402_aar_types::timestamp::UnixMillis;
///
/// let ts = UnixMillis::from_millis(1_700_000_000_000);
/// assert_eq!(ts.as_millis(), 1_700_000_000_000);
/// assert_eq!(serde_json::to_string(&ts).unwrap(), "1700000000000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct UnixMillis(u64);

impl Serialize for UnixMillis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for UnixMillis {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(UnixMillis)
    }
}

impl Display for UnixMillis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl UnixMillis {
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the current system time.
    ///
    /// A clock set before the Unix epoch reads as zero.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        Self(u64::try_from(millis).unwrap_or(u64::MAX))
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(UnixMillis::now().as_millis() > 1_577_836_800_000);
    }

    #[test]
    fn test_deserializes_from_number() {
        let ts: UnixMillis = serde_json::from_str("1699999999123").unwrap();
        assert_eq!(ts, UnixMillis::from_millis(1_699_999_999_123));
        assert!(serde_json::from_str::<UnixMillis>("\"1699999999123\"").is_err());
    }
}
