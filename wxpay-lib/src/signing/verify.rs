//! Signature verification for inbound payloads.
//!
//! Verification fails closed: a missing, non-text or mismatched `sign`
//! field, or an unrecognised `sign_type`, all yield `false`.

use subtle::ConstantTimeEq;

use super::{sign, SignMethod};
use crate::fields::{FieldMap, SIGN_FIELD};
use crate::secret::SecretKey;

/// Recompute the signature of `fields` and compare it with its `sign` field.
///
/// The comparison is exact (case-sensitive) and constant-time.
pub fn verify(fields: &FieldMap, method: SignMethod, secret: &SecretKey) -> bool {
    let Some(attached) = fields.get_str(SIGN_FIELD) else {
        return false;
    };
    let expected = sign(method, fields, secret);
    expected.as_str().as_bytes().ct_eq(attached.as_bytes()).into()
}

/// Verify using the method named by the payload's own `sign_type`.
pub fn verify_declared(fields: &FieldMap, secret: &SecretKey) -> bool {
    match SignMethod::from_fields(fields) {
        Ok(method) => verify(fields, method, secret),
        Err(_) => false,
    }
}
