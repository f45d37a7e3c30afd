//! Verify command - check the signature of an XML payload

use anyhow::{bail, Result};
use std::path::Path;
use wxpay_lib::{from_xml, verify_declared, SignMethod};

use crate::ui;

pub fn run(file: Option<&Path>, key: &str) -> Result<()> {
    let key = super::secret(key)?;
    let body = super::read_input(file)?;
    let fields = from_xml(&body)?;
    let method = SignMethod::from_fields(&fields)?;

    if !verify_declared(&fields, &key) {
        bail!("signature does not verify ({})", method);
    }

    ui::success(&format!("signature valid ({})", method));
    Ok(())
}
