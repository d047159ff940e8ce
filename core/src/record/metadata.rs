use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Keyed metadata dictionary attached to a record.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Closed set of values allowed in the `standard` and `format_specific`
/// dictionaries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Map(BTreeMap<String, MetadataValue>),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetadataValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }
}

// Station descriptions must be strict JSON, so non-finite numbers are refused
// instead of being written as `null`.
impl Serialize for MetadataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetadataValue::Bool(flag) => serializer.serialize_bool(*flag),
            MetadataValue::Number(value) if value.is_finite() => serializer.serialize_f64(*value),
            MetadataValue::Number(value) => Err(S::Error::custom(format!(
                "non-finite number {} cannot be serialized",
                value
            ))),
            MetadataValue::Text(text) => serializer.serialize_str(text),
            MetadataValue::Map(map) => map.serialize(serializer),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Number(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

/// Text value for `key`, or the empty string when absent or not text.
pub fn text_or_empty<'a>(metadata: &'a Metadata, key: &str) -> &'a str {
    metadata.get(key).and_then(MetadataValue::as_str).unwrap_or("")
}

/// Finite numeric value for `key`; NaN counts as absent.
pub fn finite_number(metadata: &Metadata, key: &str) -> Option<f64> {
    metadata
        .get(key)
        .and_then(MetadataValue::as_f64)
        .filter(|value| value.is_finite())
}
