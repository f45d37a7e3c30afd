//! RSA encryption of sensitive request fields.
//!
//! Bank-transfer calls carry the payee's account number and real name
//! encrypted under the provider's public key. The provider accepts OAEP
//! (SHA-1) padding; PKCS#1 v1.5 is kept for older integrations.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ::rsa::pkcs1::DecodeRsaPublicKey;
use ::rsa::pkcs8::DecodePublicKey;
use ::rsa::{Oaep, Pkcs1v15Encrypt, RsaPublicKey};

use super::{CryptoError, CryptoResult};

/// Padding scheme for [`encrypt_field_with`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RsaPadding {
    /// RSAES-OAEP with SHA-1 for both the digest and MGF1.
    #[default]
    Oaep,
    /// RSAES-PKCS1-v1_5.
    Pkcs1v15,
}

/// Parse a PEM public key, PKCS#1 (`RSA PUBLIC KEY`) or SPKI (`PUBLIC KEY`).
pub fn parse_public_key(pem: &str) -> CryptoResult<RsaPublicKey> {
    let pem = pem.trim();
    if pem.contains("BEGIN RSA PUBLIC KEY") {
        RsaPublicKey::from_pkcs1_pem(pem).map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    } else {
        RsaPublicKey::from_public_key_pem(pem)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }
}

/// Encrypt `plaintext` with OAEP padding and return base64.
pub fn encrypt_field(public_key_pem: &str, plaintext: &str) -> CryptoResult<String> {
    encrypt_field_with(public_key_pem, plaintext, RsaPadding::Oaep)
}

/// Encrypt `plaintext` with the given padding and return base64.
///
/// # Arguments
///
/// * `public_key_pem` - Provider public key, as returned by the key endpoint
/// * `plaintext` - UTF-8 value to protect (e.g. a bank account number)
/// * `padding` - Padding scheme
///
/// # Errors
///
/// [`CryptoError::InvalidPublicKey`] for an unparseable PEM and
/// [`CryptoError::EncryptFailed`] when the message is too long for the key.
pub fn encrypt_field_with(
    public_key_pem: &str,
    plaintext: &str,
    padding: RsaPadding,
) -> CryptoResult<String> {
    let key = parse_public_key(public_key_pem)?;
    let mut rng = rand::thread_rng();

    let ciphertext = match padding {
        RsaPadding::Oaep => key.encrypt(&mut rng, Oaep::new::<sha1::Sha1>(), plaintext.as_bytes()),
        RsaPadding::Pkcs1v15 => key.encrypt(&mut rng, Pkcs1v15Encrypt, plaintext.as_bytes()),
    }
    .map_err(|e| CryptoError::EncryptFailed(e.to_string()))?;

    Ok(STANDARD.encode(ciphertext))
}
