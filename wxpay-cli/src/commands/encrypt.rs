//! Encrypt command - RSA-encrypt a sensitive value

use anyhow::{Context, Result};
use std::path::Path;
use wxpay_lib::crypto::encrypt_field_with;
use wxpay_lib::RsaPadding;

use crate::ui;

pub fn run(value: &str, pem_path: &Path, pkcs1: bool) -> Result<()> {
    let pem = std::fs::read_to_string(pem_path)
        .with_context(|| format!("failed to read {}", pem_path.display()))?;
    let padding = if pkcs1 {
        RsaPadding::Pkcs1v15
    } else {
        RsaPadding::Oaep
    };
    ui::value(&encrypt_field_with(&pem, value, padding)?);
    Ok(())
}
