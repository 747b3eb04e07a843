//! Transaction hash type.

use crate::error::TypeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 32-byte transaction hash.
///
/// Parsed from and rendered as the canonical `0x`-prefixed 64-hex-digit
/// string form, which is also how it is serialized in the persisted table.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for TxHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| TypeError::InvalidHash(s.to_string()))?;
        if digits.len() != 64 {
            return Err(TypeError::InvalidHash(s.to_string()));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| TypeError::InvalidHash(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash(0x{}…)", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "0x2c6a1a553435e5bae3dd9cdbcf9b2b94b51e1c4e277d1257b8f2aed1c749185d";

    #[test]
    fn parse_valid_hash() {
        let hash: TxHash = VALID.parse().unwrap();
        assert_eq!(hash.to_string(), VALID);
    }

    #[test]
    fn reject_missing_prefix() {
        let no_prefix = &VALID[2..];
        assert!(no_prefix.parse::<TxHash>().is_err());
    }

    #[test]
    fn reject_wrong_length() {
        assert!("0xabcd".parse::<TxHash>().is_err());
        let too_long = format!("{VALID}00");
        assert!(too_long.parse::<TxHash>().is_err());
    }

    #[test]
    fn reject_non_hex() {
        let bad = format!("0x{}", "zz".repeat(32));
        assert!(bad.parse::<TxHash>().is_err());
    }

    #[test]
    fn serde_round_trip_as_string() {
        let hash: TxHash = VALID.parse().unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{VALID}\""));
        let back: TxHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
