//! Decrypt command - decrypt refund notification payloads

use anyhow::Result;
use std::path::Path;
use wxpay_lib::{decode_refund_notification, decrypt_notification};

use crate::ui;

pub fn run(input: &str, key: &str) -> Result<()> {
    let key = super::secret(key)?;
    let input = if input == "-" {
        super::read_input(Some(Path::new("-")))?
    } else {
        input.to_string()
    };

    if input.trim_start().starts_with('<') {
        let fields = decode_refund_notification(&input, &key)?;
        ui::json(&serde_json::to_value(&fields)?)?;
    } else {
        ui::value(&decrypt_notification(&key, &input)?);
    }
    Ok(())
}
