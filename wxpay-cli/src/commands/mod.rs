//! CLI command implementations

pub mod call;
pub mod decrypt;
pub mod encrypt;
pub mod nonce;
pub mod sign;
pub mod verify;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use wxpay_lib::{FieldMap, MerchantConfig, SecretKey};

/// Parse a `key=value` argument. The value may itself contain `=`.
pub fn parse_pair(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{}`", s))?;
    if key.is_empty() {
        return Err(format!("empty key in `{}`", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Collect parsed pairs into a field map.
pub fn fields_from_pairs(pairs: Vec<(String, String)>) -> FieldMap {
    pairs.into_iter().collect()
}

/// Wrap a command-line secret.
pub fn secret(key: &str) -> Result<SecretKey> {
    SecretKey::new(key).context("--key is required")
}

/// Read a file, or stdin for `None` / `-`.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => {
            std::fs::read_to_string(p).with_context(|| format!("failed to read {}", p.display()))
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Load merchant credentials from the environment.
pub fn load_config() -> Result<MerchantConfig> {
    MerchantConfig::from_env()
        .context("set WXPAY_APP_ID, WXPAY_MCH_ID and WXPAY_KEY to issue calls")
}
