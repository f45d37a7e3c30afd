//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use wxpay_lib::prelude::*;
//! ```

// Payloads and keys
pub use crate::fields::{FieldMap, FieldValue};
pub use crate::secret::SecretKey;

// Error handling
pub use crate::errors::{ErrorKind, WxPayError, WxPayErrorCode};
pub use crate::Result;

// Signing
pub use crate::signing::{sign, verify, verify_declared, SignMethod, Signature};

// Requests
pub use crate::client::{Client, Endpoint, IdField};
pub use crate::config::MerchantConfig;
pub use crate::transport::Transport;

#[cfg(feature = "http-client")]
pub use crate::transport::HttpTransport;

// Notifications
pub use crate::notify::NotifyAck;
