//! Sign command - sign key=value pairs

use anyhow::Result;
use wxpay_lib::fields::SIGN_FIELD;
use wxpay_lib::{sign, to_xml, SignMethod};

use crate::ui;

pub fn run(pairs: Vec<(String, String)>, key: &str, method: &str, xml: bool) -> Result<()> {
    let key = super::secret(key)?;
    let method: SignMethod = method.parse()?;
    let mut fields = super::fields_from_pairs(pairs);

    let signature = sign(method, &fields, &key);
    tracing::debug!(method = %method, fields = fields.len(), "signed");

    if xml {
        fields.insert(SIGN_FIELD, signature.into_string());
        ui::value(&to_xml(&fields)?);
    } else {
        ui::value(signature.as_str());
    }
    Ok(())
}
