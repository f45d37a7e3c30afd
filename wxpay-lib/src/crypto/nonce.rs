//! Random `nonce_str` values.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the nonces attached to outgoing requests.
pub const NONCE_LEN: usize = 32;

/// A fresh 32-character alphanumeric nonce.
pub fn nonce_str() -> String {
    nonce_str_with_len(NONCE_LEN)
}

/// A fresh alphanumeric nonce of `len` characters.
pub fn nonce_str_with_len(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
