//! Error types for WeChat Pay operations.
//!
//! Failures fall into a handful of families: configuration mistakes made by
//! the caller, integrity failures on inbound data, payload decryption
//! failures, provider-reported failures, and transport failures. Only the
//! transport family is ever worth retrying; everything else is deterministic
//! for a given input.

use std::fmt;

use crate::crypto::CryptoError;

/// Numeric error codes, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum WxPayErrorCode {
    /// Invalid merchant configuration
    InvalidConfig = 1000,
    /// Sign method label not recognised
    UnsupportedSignMethod = 1001,
    /// Signature on inbound data did not match
    InvalidSignature = 2000,
    /// Encrypted payload could not be decrypted
    Decryption = 3000,
    /// Field could not be encrypted
    Encryption = 3001,
    /// Invalid request/response data
    InvalidData = 4000,
    /// Malformed XML document
    Xml = 4001,
    /// Serialization error
    Serialization = 4002,
    /// Provider returned `return_code=FAIL`
    Return = 5000,
    /// Provider returned `result_code=FAIL`
    Business = 5001,
    /// Transport/network layer error
    Transport = 6000,
    /// Connection failed
    ConnectionFailed = 6001,
    /// Connection timeout
    ConnectionTimeout = 6002,
}

/// Broad classification of a [`WxPayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied a bad configuration or argument.
    Configuration,
    /// Inbound data failed signature verification.
    Integrity,
    /// Encrypted payload could not be processed.
    Crypto,
    /// Data could not be parsed or was incomplete.
    Data,
    /// The provider rejected the call.
    Provider,
    /// The network exchange failed.
    Transport,
}

/// Comprehensive error type for WeChat Pay operations.
#[derive(Debug)]
pub enum WxPayError {
    /// Merchant configuration is unusable.
    InvalidConfig {
        /// Offending configuration field
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// Sign method label is not `MD5` or `HMAC-SHA256`.
    UnsupportedSignMethod(String),

    /// Recomputed signature does not match the attached `sign` field.
    InvalidSignature,

    /// Encrypted notification payload could not be decrypted.
    Decryption(String),

    /// A sensitive field could not be RSA-encrypted.
    Encryption(String),

    /// Invalid or missing data.
    InvalidData {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Malformed XML.
    Xml(String),

    /// JSON serialization/deserialization error.
    Serialization(String),

    /// Communication-level failure reported by the provider.
    Return {
        /// `return_code` value
        code: String,
        /// `return_msg` value
        msg: String,
    },

    /// Business-level failure reported by the provider.
    Business {
        /// `err_code` value, if present
        err_code: Option<String>,
        /// `err_code_des` value, if present
        err_code_des: Option<String>,
    },

    /// Transport/network layer error.
    Transport(String),

    /// Connection failed.
    ConnectionFailed {
        /// Target URL
        target: String,
        /// Underlying error message
        reason: String,
    },

    /// Connection timeout.
    ConnectionTimeout {
        /// Operation that timed out
        operation: String,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },
}

impl WxPayError {
    /// Get the numeric error code.
    pub fn code(&self) -> WxPayErrorCode {
        match self {
            Self::InvalidConfig { .. } => WxPayErrorCode::InvalidConfig,
            Self::UnsupportedSignMethod(_) => WxPayErrorCode::UnsupportedSignMethod,
            Self::InvalidSignature => WxPayErrorCode::InvalidSignature,
            Self::Decryption(_) => WxPayErrorCode::Decryption,
            Self::Encryption(_) => WxPayErrorCode::Encryption,
            Self::InvalidData { .. } => WxPayErrorCode::InvalidData,
            Self::Xml(_) => WxPayErrorCode::Xml,
            Self::Serialization(_) => WxPayErrorCode::Serialization,
            Self::Return { .. } => WxPayErrorCode::Return,
            Self::Business { .. } => WxPayErrorCode::Business,
            Self::Transport(_) => WxPayErrorCode::Transport,
            Self::ConnectionFailed { .. } => WxPayErrorCode::ConnectionFailed,
            Self::ConnectionTimeout { .. } => WxPayErrorCode::ConnectionTimeout,
        }
    }

    /// Get the broad error family.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig { .. } | Self::UnsupportedSignMethod(_) => ErrorKind::Configuration,
            Self::InvalidSignature => ErrorKind::Integrity,
            Self::Decryption(_) | Self::Encryption(_) => ErrorKind::Crypto,
            Self::InvalidData { .. } | Self::Xml(_) | Self::Serialization(_) => ErrorKind::Data,
            Self::Return { .. } | Self::Business { .. } => ErrorKind::Provider,
            Self::Transport(_) | Self::ConnectionFailed { .. } | Self::ConnectionTimeout { .. } => {
                ErrorKind::Transport
            }
        }
    }

    /// Returns true if retrying the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Create an invalid config error.
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for WxPayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid configuration {}: {}", field, reason)
            }
            Self::UnsupportedSignMethod(label) => {
                write!(f, "unsupported sign method: {}", label)
            }
            Self::InvalidSignature => write!(f, "signature mismatch"),
            Self::Decryption(msg) => write!(f, "decryption failed: {}", msg),
            Self::Encryption(msg) => write!(f, "encryption failed: {}", msg),
            Self::InvalidData { field, reason } => {
                write!(f, "invalid {}: {}", field, reason)
            }
            Self::Xml(msg) => write!(f, "xml error: {}", msg),
            Self::Serialization(msg) => write!(f, "serialization error: {}", msg),
            Self::Return { code, msg } => write!(f, "{}: {}", code, msg),
            Self::Business {
                err_code,
                err_code_des,
            } => write!(
                f,
                "business failure, err_code: {}, err_code_des: {}",
                err_code.as_deref().unwrap_or("-"),
                err_code_des.as_deref().unwrap_or("-")
            ),
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::ConnectionFailed { target, reason } => {
                write!(f, "connection to {} failed: {}", target, reason)
            }
            Self::ConnectionTimeout {
                operation,
                timeout_ms,
            } => {
                write!(f, "{} timed out after {}ms", operation, timeout_ms)
            }
        }
    }
}

impl std::error::Error for WxPayError {}

impl From<serde_json::Error> for WxPayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<quick_xml::Error> for WxPayError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<CryptoError> for WxPayError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidPublicKey(_) | CryptoError::EncryptFailed(_) => {
                Self::Encryption(err.to_string())
            }
            _ => Self::Decryption(err.to_string()),
        }
    }
}
