use serde::{Deserialize, Serialize};
use std::fmt;

/// A record's content-address: lowercase hex of a 32-byte SHA-256 digest.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn from_hex(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, hex::FromHexError> {
        hex::decode(&self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = if self.0.len() > 12 { &self.0[..12] } else { &self.0[..] };
        write!(f, "RecordId({short}…)")
    }
}

/// Decimal-string seconds since epoch, per the canonical timestamp form.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Debug)]
pub struct Timestamp(pub String);

impl Timestamp {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The current wall-clock time as a decimal-string of seconds.
    pub fn now() -> Self {
        let secs = chrono::Utc::now().timestamp();
        Self(secs.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monetary amount in a currency's minor unit. Must be non-negative.
pub type Amount = i64;
