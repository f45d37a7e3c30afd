//! Request signing.
//!
//! The provider authenticates every payload with a digest over the
//! [canonical string](canonical::canonical_string): either plain MD5 or
//! HMAC-SHA256 keyed with the merchant secret, rendered as uppercase hex.
//!
//! All functions here are pure and may be called from any thread.

pub mod canonical;
mod verify;

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::fields::FieldMap;
use crate::secret::SecretKey;
use crate::WxPayError;

pub use canonical::canonical_string;
pub use verify::{verify, verify_declared};

type HmacSha256 = Hmac<Sha256>;

/// Digest algorithm used for a signature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SignMethod {
    /// MD5 over the canonical string.
    #[default]
    Md5,
    /// HMAC-SHA256 over the canonical string, keyed with the secret.
    HmacSha256,
}

impl SignMethod {
    /// Wire label, as carried in the `sign_type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::HmacSha256 => "HMAC-SHA256",
        }
    }

    /// Determine the method a payload asks for via its `sign_type` field.
    ///
    /// Absent or blank means MD5.
    pub fn from_fields(fields: &FieldMap) -> Result<Self, WxPayError> {
        match fields.get_string(crate::fields::SIGN_TYPE_FIELD) {
            Some(label) => label.parse(),
            None => Ok(Self::Md5),
        }
    }
}

impl FromStr for SignMethod {
    type Err = WxPayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MD5" => Ok(Self::Md5),
            "HMAC-SHA256" => Ok(Self::HmacSha256),
            other => Err(WxPayError::UnsupportedSignMethod(other.to_string())),
        }
    }
}

impl fmt::Display for SignMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uppercase hexadecimal signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    /// Borrow the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the hex string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Signature {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Signature {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Signature {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Compute the signature of `fields` under `secret`.
///
/// The `sign` field itself and blank values are ignored, so signing a map
/// that already carries a signature yields the same result.
pub fn sign(method: SignMethod, fields: &FieldMap, secret: &SecretKey) -> Signature {
    let canonical = canonical_string(fields, secret);
    let hex = match method {
        SignMethod::Md5 => format!("{:X}", md5::compute(canonical.as_bytes())),
        SignMethod::HmacSha256 => {
            let mut mac = HmacSha256::new_from_slice(secret.expose().as_bytes())
                .expect("HMAC accepts keys of any length");
            mac.update(canonical.as_bytes());
            hex::encode_upper(mac.finalize().into_bytes())
        }
    };
    Signature(hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldValue;

    fn abc() -> SecretKey {
        SecretKey::new("abc").unwrap()
    }

    fn sample() -> FieldMap {
        FieldMap::new().with("a", 3i64).with("b", 4i64)
    }

    #[test]
    fn test_md5_known_vector() {
        assert_eq!(
            sign(SignMethod::Md5, &sample(), &abc()),
            "85566166DABF8B84307C0AF0A7699366"
        );
    }

    #[test]
    fn test_hmac_sha256_known_vector() {
        assert_eq!(
            sign(SignMethod::HmacSha256, &sample(), &abc()),
            "AAF907CA1B2239E0187A4BD73331DCD840F84748C6905B7FD857688BED84ACF7"
        );
    }

    #[test]
    fn test_signature_lengths() {
        assert_eq!(sign(SignMethod::Md5, &sample(), &abc()).as_str().len(), 32);
        assert_eq!(
            sign(SignMethod::HmacSha256, &sample(), &abc()).as_str().len(),
            64
        );
    }

    #[test]
    fn test_string_and_number_sign_alike() {
        let numeric = FieldMap::new().with("a", 3i64).with("b", 4i64);
        let textual = FieldMap::new().with("a", "3").with("b", "4");
        assert_eq!(
            sign(SignMethod::Md5, &numeric, &abc()),
            sign(SignMethod::Md5, &textual, &abc())
        );
    }

    #[test]
    fn test_ignores_sign_and_blank_fields() {
        let noisy = sample()
            .with("sign", "85566166DABF8B84307C0AF0A7699366")
            .with("c", FieldValue::Null)
            .with("e", "");
        assert_eq!(
            sign(SignMethod::Md5, &noisy, &abc()),
            sign(SignMethod::Md5, &sample(), &abc())
        );
    }

    #[test]
    fn test_parse_sign_method() {
        assert_eq!("MD5".parse::<SignMethod>().unwrap(), SignMethod::Md5);
        assert_eq!(
            "HMAC-SHA256".parse::<SignMethod>().unwrap(),
            SignMethod::HmacSha256
        );
        let err = "SHA1".parse::<SignMethod>().unwrap_err();
        assert_eq!(err.code(), crate::WxPayErrorCode::UnsupportedSignMethod);
        assert_eq!(SignMethod::default(), SignMethod::Md5);
        assert_eq!(SignMethod::HmacSha256.to_string(), "HMAC-SHA256");
    }

    #[test]
    fn test_method_from_fields() {
        assert_eq!(SignMethod::from_fields(&sample()).unwrap(), SignMethod::Md5);
        let hmac = sample().with("sign_type", "HMAC-SHA256");
        assert_eq!(
            SignMethod::from_fields(&hmac).unwrap(),
            SignMethod::HmacSha256
        );
        assert!(SignMethod::from_fields(&sample().with("sign_type", "RSA")).is_err());
    }
}
