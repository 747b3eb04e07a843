//! User address type with `0x` prefix.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An account address, always prefixed with `0x` (20 bytes, 40 hex digits).
///
/// Addresses are map keys in the persisted table, so the wrapper keeps the
/// original string form rather than decoding to bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserAddress(String);

impl UserAddress {
    /// Create an address from a raw string without validation.
    ///
    /// Use [`UserAddress::from_str`] when the input is untrusted.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this address is well-formed (`0x` + 40 hex digits).
    pub fn is_valid(&self) -> bool {
        match self.0.strip_prefix("0x") {
            Some(digits) => digits.len() == 40 && digits.bytes().all(|b| b.is_ascii_hexdigit()),
            None => false,
        }
    }
}

impl FromStr for UserAddress {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let addr = Self(s.to_string());
        if !addr.is_valid() {
            return Err(TypeError::InvalidAddress(s.to_string()));
        }
        Ok(addr)
    }
}

impl fmt::Display for UserAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
