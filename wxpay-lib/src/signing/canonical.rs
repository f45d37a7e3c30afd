//! Canonical signing string.
//!
//! ```text
//! k1=v1&k2=v2&...&key=<secret>
//! ```
//!
//! Keys are sorted byte-wise ascending, nothing is URL-encoded, and the
//! `&key=<secret>` suffix is always present. The `sign` field and blank
//! values (`Null`, empty string) are skipped.

use crate::fields::{FieldMap, FieldValue, SIGN_FIELD};
use crate::secret::SecretKey;

/// Iterate the fields that take part in signing, in canonical order.
pub fn signable_fields(fields: &FieldMap) -> impl Iterator<Item = (&String, &FieldValue)> {
    fields
        .iter()
        .filter(|(key, value)| key.as_str() != SIGN_FIELD && !value.is_blank())
}

/// Build the string the signature is computed over.
pub fn canonical_string(fields: &FieldMap, secret: &SecretKey) -> String {
    let mut out = signable_fields(fields)
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");
    out.push_str("&key=");
    out.push_str(secret.expose());
    out
}
