//! Payload cryptography.
//!
//! - [`aes`]: AES-256-ECB decryption of the `req_info` blob in refund
//!   notifications, keyed by the lowercase hex MD5 of the merchant secret.
//! - [`rsa`]: RSA public-key encryption of sensitive request fields.
//! - [`nonce`]: random `nonce_str` values.
//!
//! ECB mode and the MD5-derived key are fixed by the provider's wire format.

pub mod aes;
pub mod nonce;
pub mod rsa;

pub use self::aes::{decrypt_notification, notification_key};
pub use self::nonce::{nonce_str, nonce_str_with_len};
pub use self::rsa::{encrypt_field, encrypt_field_with, RsaPadding};

/// Errors raised by the payload codecs.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid base64: {0}")]
    InvalidBase64(String),
    #[error("ciphertext length {0} is not a positive multiple of the block size")]
    InvalidLength(usize),
    #[error("bad padding (wrong key or corrupted ciphertext)")]
    BadPadding,
    #[error("plaintext is not valid UTF-8")]
    InvalidUtf8,
    #[error("invalid RSA public key: {0}")]
    InvalidPublicKey(String),
    #[error("RSA encryption failed: {0}")]
    EncryptFailed(String),
}

/// Result type for codec operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
