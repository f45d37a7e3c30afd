//! AES-256-ECB decryption of notification payloads.
//!
//! # Wire Format
//!
//! ```text
//! key        = ascii(lowercase_hex(md5(secret)))   // 32 bytes, used as-is
//! plaintext  = AES-256-ECB-decrypt(key, base64_decode(req_info)), PKCS#7
//! ```

use ::aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use zeroize::Zeroizing;

use super::{CryptoError, CryptoResult};
use crate::secret::SecretKey;

type Aes256EcbDec = ecb::Decryptor<::aes::Aes256>;

const BLOCK_SIZE: usize = 16;

/// Derive the AES key: the 32 ASCII bytes of lowercase hex MD5(secret).
pub fn notification_key(secret: &SecretKey) -> Zeroizing<[u8; 32]> {
    let hex = Zeroizing::new(format!("{:x}", md5::compute(secret.expose().as_bytes())));
    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(hex.as_bytes());
    key
}

/// Decrypt a base64 `req_info` blob into UTF-8 text.
///
/// Deterministic: a failure here means the key or the ciphertext is wrong,
/// and retrying cannot help.
pub fn decrypt_notification(secret: &SecretKey, base64_ciphertext: &str) -> CryptoResult<String> {
    let ciphertext = STANDARD
        .decode(base64_ciphertext.trim())
        .map_err(|e| CryptoError::InvalidBase64(e.to_string()))?;

    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidLength(ciphertext.len()));
    }

    let key = notification_key(secret);
    let plaintext = Aes256EcbDec::new(&(*key).into())
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| CryptoError::BadPadding)?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
}

/// Encrypt the way the provider does. Only needed to fabricate notifications.
#[cfg(any(test, feature = "test-utils"))]
pub fn encrypt_notification(secret: &SecretKey, plaintext: &str) -> String {
    use ::aes::cipher::BlockEncryptMut;

    type Aes256EcbEnc = ecb::Encryptor<::aes::Aes256>;

    let key = notification_key(secret);
    let ciphertext =
        Aes256EcbEnc::new(&(*key).into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
    STANDARD.encode(ciphertext)
}
