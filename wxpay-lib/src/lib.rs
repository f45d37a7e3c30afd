//! WeChat Pay v2 client library.
//!
//! The provider's v2 ("mch") API exchanges flat XML documents authenticated
//! by a shared-secret signature. This crate implements that protocol:
//!
//! - **Signing**: canonical string, MD5 / HMAC-SHA256 signatures, and
//!   constant-time verification that fails closed
//! - **Payload crypto**: AES-256-ECB decryption of refund notifications and
//!   RSA encryption of sensitive request fields
//! - **Requests**: a generic signed-request pipeline over a pluggable
//!   [`Transport`], with sandbox mode
//! - **Notifications**: payment verification, refund decryption and the
//!   XML acknowledgement sent back
//!
//! The signing and crypto functions are pure and synchronous; only the
//! [`Client`] touches the network.
//!
//! # Example
//!
//! ```
//! use wxpay_lib::{sign, verify, FieldMap, SecretKey, SignMethod};
//!
//! let key = SecretKey::new("abc")?;
//! let mut fields = FieldMap::new().with("a", 3).with("b", 4);
//!
//! let signature = sign(SignMethod::Md5, &fields, &key);
//! assert_eq!(signature, "85566166DABF8B84307C0AF0A7699366");
//!
//! fields.insert("sign", signature.into_string());
//! assert!(verify(&fields, SignMethod::Md5, &key));
//! # Ok::<(), wxpay_lib::WxPayError>(())
//! ```

pub mod client;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod fields;
pub mod notify;
pub mod prelude;
pub mod secret;
pub mod signing;
pub mod transport;
pub mod xml;

/// Test utilities: scripted transport, fixtures and assertions.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client::{Client, Endpoint, IdField};
pub use config::MerchantConfig;
pub use crypto::{decrypt_notification, encrypt_field, nonce_str, CryptoError, RsaPadding};
pub use errors::{ErrorKind, WxPayError, WxPayErrorCode};
pub use fields::{FieldMap, FieldValue};
pub use notify::{decode_refund_notification, parse_pay_notification, NotifyAck};
pub use secret::SecretKey;
pub use signing::{canonical_string, sign, verify, verify_declared, SignMethod, Signature};
pub use transport::Transport;
pub use xml::{from_xml, to_xml};

#[cfg(feature = "http-client")]
pub use transport::HttpTransport;

/// Common result alias for WeChat Pay operations.
pub type Result<T> = std::result::Result<T, WxPayError>;
