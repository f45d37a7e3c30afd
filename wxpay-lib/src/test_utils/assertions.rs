//! Assertion helpers.

use crate::secret::SecretKey;
use crate::signing::verify_declared;
use crate::xml::from_xml;
use crate::{Result, WxPayError};

/// Assert that an XML body carries a valid signature under `key`.
///
/// # Panics
/// Panics if the body does not parse or the signature does not match.
pub fn assert_signed(body: &str, key: &SecretKey) {
    let fields = match from_xml(body) {
        Ok(fields) => fields,
        Err(e) => panic!("request body is not valid XML ({}): {}", e, body),
    };
    assert!(
        verify_declared(&fields, key),
        "signature does not verify for body: {}",
        body
    );
}

/// Assert that a result is a provider `Return` failure with the given message.
///
/// # Panics
/// Panics on success or on any other error.
pub fn assert_return_error<T: std::fmt::Debug>(result: &Result<T>, expected_msg: &str) {
    match result {
        Err(WxPayError::Return { code, msg }) => {
            assert_eq!(code, "FAIL");
            assert_eq!(msg, expected_msg);
        }
        other => panic!("expected a Return error, got {:?}", other),
    }
}
