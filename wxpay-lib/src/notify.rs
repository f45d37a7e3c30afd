//! Inbound notifications.
//!
//! The provider POSTs payment results signed like any reply, and refund
//! results with the interesting part encrypted in `req_info`. Both expect an
//! XML acknowledgement ([`NotifyAck`]) in the HTTP response.

use serde_json::Value;

use crate::client::ensure_return_success;
use crate::crypto::decrypt_notification;
use crate::fields::FieldMap;
use crate::secret::SecretKey;
use crate::signing::verify_declared;
use crate::xml::{from_xml, render};
use crate::{Result, WxPayError};

const REQ_INFO_FIELD: &str = "req_info";

/// Parse a payment notification and check its signature.
///
/// The method is taken from the notification's own `sign_type` (MD5 if
/// absent).
///
/// # Errors
///
/// - [`WxPayError::Return`] if the notification reports `return_code=FAIL`
/// - [`WxPayError::InvalidSignature`] if the signature does not match
/// - [`WxPayError::Xml`] for a malformed body
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
pub fn parse_pay_notification(body: &str, secret: &SecretKey) -> Result<FieldMap> {
    let fields = from_xml(body)?;
    ensure_return_success(&fields)?;

    if !verify_declared(&fields, secret) {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            out_trade_no = fields.get_str("out_trade_no").unwrap_or("-"),
            "payment notification failed signature check"
        );
        return Err(WxPayError::InvalidSignature);
    }

    Ok(fields)
}

/// Parse a refund notification and decrypt its `req_info`.
///
/// The decrypted JSON object is merged over the envelope; its fields win on
/// conflicts. `req_info` itself is kept as received.
///
/// # Errors
///
/// - [`WxPayError::Return`] if the notification reports `return_code=FAIL`
/// - [`WxPayError::InvalidData`] if `req_info` is missing or does not
///   decrypt to a JSON object
/// - [`WxPayError::Decryption`] if `req_info` cannot be decrypted
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
pub fn decode_refund_notification(body: &str, secret: &SecretKey) -> Result<FieldMap> {
    let mut fields = from_xml(body)?;
    ensure_return_success(&fields)?;

    let blob = fields
        .get_string(REQ_INFO_FIELD)
        .ok_or_else(|| WxPayError::invalid_data(REQ_INFO_FIELD, "missing from refund notification"))?;

    let plaintext = decrypt_notification(secret, &blob)?;
    let decoded: Value = serde_json::from_str(&plaintext)
        .map_err(|e| WxPayError::invalid_data(REQ_INFO_FIELD, format!("not JSON: {}", e)))?;

    fields.merge(FieldMap::from_json_object(decoded)?);
    Ok(fields)
}

/// Acknowledgement returned to the provider for a notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotifyAck {
    /// `SUCCESS` or `FAIL`.
    pub return_code: String,
    /// Human-readable message.
    pub return_msg: String,
}

impl NotifyAck {
    /// Accept the notification.
    pub fn success() -> Self {
        Self {
            return_code: "SUCCESS".to_string(),
            return_msg: "OK".to_string(),
        }
    }

    /// Reject the notification; the provider will redeliver it.
    pub fn fail(msg: impl Into<String>) -> Self {
        Self {
            return_code: "FAIL".to_string(),
            return_msg: msg.into(),
        }
    }

    /// Ack for a notification that could not be processed.
    ///
    /// A provider `Return` failure is echoed back unchanged.
    pub fn from_error(err: &WxPayError) -> Self {
        match err {
            WxPayError::Return { code, msg } => Self {
                return_code: code.clone(),
                return_msg: msg.clone(),
            },
            WxPayError::InvalidSignature => Self::fail("签名失败"),
            other => Self::fail(other.to_string()),
        }
    }

    /// Whether this ack accepts the notification.
    pub fn is_success(&self) -> bool {
        self.return_code == "SUCCESS"
    }

    /// Render as the XML body of the HTTP response.
    pub fn to_xml(&self) -> String {
        render(
            &FieldMap::new()
                .with("return_code", self.return_code.as_str())
                .with("return_msg", self.return_msg.as_str()),
        )
    }
}
