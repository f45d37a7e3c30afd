//! Nonce command

use anyhow::Result;
use wxpay_lib::crypto::nonce_str_with_len;

use crate::ui;

pub fn run(len: usize) -> Result<()> {
    ui::value(&nonce_str_with_len(len));
    Ok(())
}
