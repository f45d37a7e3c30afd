//! Merchant API key handling.

use std::fmt;

use serde::{Deserialize, Deserializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{Result, WxPayError};

/// The merchant's shared API secret.
///
/// Used both as the signing key and, through its MD5, as the key for
/// notification payload decryption. The contents are zeroized on drop and
/// never appear in `Debug` output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(String);

impl SecretKey {
    /// Wrap a secret. Empty secrets are rejected.
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(WxPayError::invalid_config("key", "secret key cannot be empty"));
        }
        Ok(Self(secret))
    }

    /// Borrow the raw secret.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl std::str::FromStr for SecretKey {
    type Err = WxPayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for SecretKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_rejected() {
        let err = SecretKey::new("").unwrap_err();
        assert_eq!(err.code(), crate::WxPayErrorCode::InvalidConfig);
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = SecretKey::new("6Q9VX4N3WTBM9G9XBL7H1L9PB9ANHLY7").unwrap();
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains("6Q9VX4N3"));
        assert_eq!(key.expose(), "6Q9VX4N3WTBM9G9XBL7H1L9PB9ANHLY7");
    }

    #[test]
    fn test_deserialize() {
        let key: SecretKey = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(key.expose(), "abc");
        assert!(serde_json::from_str::<SecretKey>("\"\"").is_err());
    }
}
