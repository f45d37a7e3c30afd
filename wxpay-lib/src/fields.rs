//! Flat key/value payloads exchanged with the provider.
//!
//! Every request and response body is a single level of `key -> scalar`.
//! [`FieldMap`] keeps its keys in byte-wise ascending order, which is also
//! the order the signing string is built in.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::{Result, WxPayError};

/// Key under which the signature travels.
pub const SIGN_FIELD: &str = "sign";

/// Key naming the sign method of a payload.
pub const SIGN_TYPE_FIELD: &str = "sign_type";

/// A scalar field value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text value, sent verbatim.
    Text(String),
    /// Integer value (amounts are integer cents on this API).
    Integer(i64),
    /// Present key without a value. Never signed, never serialized.
    Null,
}

impl FieldValue {
    /// Whether this value is left out of the signing string.
    ///
    /// `Null` and the empty string are both skipped.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Integer(_) => false,
            Self::Null => true,
        }
    }

    /// Borrow the text, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Null => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Integer(n.into())
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        Self::Integer(n.into())
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => Self::Integer(n),
            Err(_) => Self::Text(n.to_string()),
        }
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// An ordered map of request or response fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, FieldValue>);

impl FieldMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a field, returning the previous value for the key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a field value.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// Get a field as text. Integers are not converted.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(FieldValue::as_str)
    }

    /// Get a non-blank field rendered as a string.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.0
            .get(key)
            .filter(|v| !v.is_blank())
            .map(ToString::to_string)
    }

    /// Parse a field into any `FromStr` type.
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get_string(key).and_then(|s| s.parse().ok())
    }

    /// Remove a field.
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.0.remove(key)
    }

    /// Whether the key is present (blank or not).
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all fields in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
        self.0.iter()
    }

    /// Copy every field of `other` into this map, overwriting duplicates.
    pub fn merge(&mut self, other: FieldMap) {
        self.0.extend(other.0);
    }

    /// Build a map from a flat serializable struct.
    ///
    /// `None` fields become [`FieldValue::Null`]; nested values are stored
    /// as their JSON text.
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Self::from_json_object(serde_json::to_value(value)?)
    }

    /// Build a map from a JSON object.
    pub fn from_json_object(value: Value) -> Result<Self> {
        let Value::Object(object) = value else {
            return Err(WxPayError::invalid_data(
                "payload",
                "expected a JSON object",
            ));
        };

        Ok(object
            .into_iter()
            .map(|(key, value)| (key, json_to_field(value)))
            .collect())
    }
}

fn json_to_field(value: Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::String(s) => FieldValue::Text(s),
        Value::Bool(b) => FieldValue::Text(b.to_string()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => FieldValue::Integer(i),
            None => FieldValue::Text(n.to_string()),
        },
        nested @ (Value::Array(_) | Value::Object(_)) => FieldValue::Text(nested.to_string()),
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a FieldMap {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, FieldValue);
    type IntoIter = btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_values() {
        assert!(FieldValue::Null.is_blank());
        assert!(FieldValue::from("").is_blank());
        assert!(!FieldValue::from("0").is_blank());
        assert!(!FieldValue::from(0i64).is_blank());
    }

    #[test]
    fn test_number_and_text_render_alike() {
        assert_eq!(FieldValue::from(888i64).to_string(), "888");
        assert_eq!(FieldValue::from("888").to_string(), "888");
        assert_eq!(FieldValue::from(u64::MAX).to_string(), u64::MAX.to_string());
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(FieldValue::from(None::<&str>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(5u32)), FieldValue::Integer(5));
    }

    #[test]
    fn test_keys_iterate_sorted() {
        let map: FieldMap = [("b", "2"), ("a", "1"), ("C", "3")].into_iter().collect();
        let keys: Vec<&str> = map.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["C", "a", "b"]);
    }

    #[test]
    fn test_from_serializable() {
        #[derive(Serialize)]
        struct Refund<'a> {
            out_trade_no: &'a str,
            total_fee: u32,
            refund_desc: Option<&'a str>,
            detail: Vec<u8>,
        }

        let map = FieldMap::from_serializable(&Refund {
            out_trade_no: "1217752501201407033233368018",
            total_fee: 100,
            refund_desc: None,
            detail: vec![1, 2],
        })
        .unwrap();

        assert_eq!(map.get_str("out_trade_no"), Some("1217752501201407033233368018"));
        assert_eq!(map.get("total_fee"), Some(&FieldValue::Integer(100)));
        assert_eq!(map.get("refund_desc"), Some(&FieldValue::Null));
        assert_eq!(map.get_str("detail"), Some("[1,2]"));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(FieldMap::from_json_object(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_parse_and_merge() {
        let mut base = FieldMap::new().with("total_fee", "100").with("a", "x");
        base.merge(FieldMap::new().with("a", "y"));
        assert_eq!(base.parse::<u64>("total_fee"), Some(100));
        assert_eq!(base.get_str("a"), Some("y"));
        assert_eq!(base.get_string("missing"), None);
    }
}
