//! Flat XML wire format.
//!
//! Requests are sent as a single `<xml>` element whose children are the
//! fields. Responses and notifications use the same shape, though the root
//! name is not checked and values may arrive as CDATA.
//!
//! ```xml
//! <xml>
//!   <appid><![CDATA[wx2421b1c4370ec43b]]></appid>
//!   <total_fee>100</total_fee>
//! </xml>
//! ```

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::fields::{FieldMap, FieldValue};
use crate::{Result, WxPayError};

const ROOT: &str = "xml";

/// Serialize fields as `<xml><k>v</k>...</xml>`, skipping `Null` values.
///
/// # Errors
///
/// [`WxPayError::Xml`] if a key is not a valid XML element name.
pub fn to_xml(fields: &FieldMap) -> Result<String> {
    if let Some((key, _)) = fields.iter().find(|(key, _)| !is_element_name(key)) {
        return Err(WxPayError::Xml(format!("invalid element name {:?}", key)));
    }
    Ok(render(fields))
}

/// Whether `name` can be written as an element name.
///
/// Accepts a letter or `_`, then letters, digits, `_`, `-` and `.`.
/// Colons are refused since field names carry no namespace.
pub fn is_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Render without checking keys. Only for maps with fixed keys.
pub(crate) fn render(fields: &FieldMap) -> String {
    let mut out = String::with_capacity(64 + fields.len() * 32);
    out.push('<');
    out.push_str(ROOT);
    out.push('>');
    for (key, value) in fields {
        if matches!(value, FieldValue::Null) {
            continue;
        }
        out.push('<');
        out.push_str(key);
        out.push('>');
        out.push_str(&escape(value.to_string().as_str()));
        out.push_str("</");
        out.push_str(key);
        out.push('>');
    }
    out.push_str("</");
    out.push_str(ROOT);
    out.push('>');
    out
}

/// Parse a flat XML document into fields.
///
/// Text and CDATA content are both accepted and trimmed; `<k/>` yields an
/// empty value. Nested elements, repeated keys, stray text and a missing
/// root element are rejected.
pub fn from_xml(text: &str) -> Result<FieldMap> {
    let mut reader = Reader::from_str(text.trim());
    reader.config_mut().trim_text(true);

    let mut fields = FieldMap::new();
    let mut root_seen = false;
    let mut root_closed = false;
    // (field name, accumulated value) while inside a child element
    let mut current: Option<(String, String)> = None;

    loop {
        let event = reader.read_event().map_err(xml_error)?;
        match event {
            Event::Start(start) => {
                let name = element_name(start.name().as_ref())?;
                if root_closed {
                    return Err(WxPayError::Xml(format!("unexpected element <{}> after root", name)));
                }
                if !root_seen {
                    root_seen = true;
                } else if current.is_some() {
                    return Err(WxPayError::Xml(format!("nested element <{}>", name)));
                } else {
                    current = Some((name, String::new()));
                }
            }
            Event::Empty(empty) => {
                let name = element_name(empty.name().as_ref())?;
                if root_closed {
                    return Err(WxPayError::Xml(format!("unexpected element <{}> after root", name)));
                }
                if !root_seen {
                    root_seen = true;
                    root_closed = true;
                } else if current.is_some() {
                    return Err(WxPayError::Xml(format!("nested element <{}>", name)));
                } else {
                    insert_unique(&mut fields, name, String::new())?;
                }
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(xml_error)?;
                match current.as_mut() {
                    Some((_, buf)) => buf.push_str(&value),
                    None => return Err(WxPayError::Xml("text outside of a field element".into())),
                }
            }
            Event::CData(cdata) => {
                let value = String::from_utf8(cdata.into_inner().into_owned())
                    .map_err(|_| WxPayError::Xml("CDATA is not valid UTF-8".into()))?;
                match current.as_mut() {
                    Some((_, buf)) => buf.push_str(&value),
                    None => return Err(WxPayError::Xml("CDATA outside of a field element".into())),
                }
            }
            Event::End(_) => match current.take() {
                Some((name, value)) => insert_unique(&mut fields, name, value)?,
                None => root_closed = true,
            },
            Event::Eof => break,
            // declarations, comments, processing instructions, doctypes
            _ => {}
        }
    }

    if !root_seen {
        return Err(WxPayError::Xml("missing root element".into()));
    }
    if !root_closed {
        return Err(WxPayError::Xml("unterminated root element".into()));
    }
    Ok(fields)
}

fn insert_unique(fields: &mut FieldMap, name: String, value: String) -> Result<()> {
    if fields.contains_key(&name) {
        return Err(WxPayError::Xml(format!("duplicate element <{}>", name)));
    }
    fields.insert(name, value.trim());
    Ok(())
}

fn element_name(raw: &[u8]) -> Result<String> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|_| WxPayError::Xml("element name is not valid UTF-8".into()))
}

fn xml_error(err: impl std::fmt::Display) -> WxPayError {
    WxPayError::Xml(err.to_string())
}
