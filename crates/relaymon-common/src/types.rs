use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A scalar field value carried by a [`Metric`].
///
/// Deserialization is untagged, so wire values map onto the narrowest
/// matching variant (`true` → `Bool`, `101` → `Int`, `1.5` → `Float`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::UInt(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}

/// A named, timestamped bundle of tags and fields produced by a collector.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use relaymon_common::types::{FieldValue, Metric};
/// use std::collections::HashMap;
///
/// let m = Metric::new(
///     "cpu",
///     HashMap::new(),
///     HashMap::from([
///         ("usage".to_string(), Some(FieldValue::from(42.0))),
///         ("broken".to_string(), None),
///     ]),
///     Utc::now(),
/// );
/// assert!(m.field("usage").is_some());
/// assert!(m.field("broken").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub tags: HashMap<String, String>,
    pub fields: HashMap<String, FieldValue>,
    pub timestamp: DateTime<Utc>,
}

impl Metric {
    /// Builds a metric from raw collector output.
    ///
    /// A field whose value is `None` is silently removed; collectors that
    /// read optional system values can pass them through without checking.
    /// A metric may end up with zero fields here; the pipeline drops it
    /// later rather than treating it as an error.
    pub fn new(
        name: impl Into<String>,
        tags: HashMap<String, String>,
        fields: HashMap<String, Option<FieldValue>>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let fields = fields
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect();
        Self {
            name: name.into(),
            tags,
            fields,
            timestamp,
        }
    }

    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}

/// Format a tag map into a stable human-readable string, sorted by key.
pub fn format_tags(tags: &HashMap<String, String>) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let mut pairs: Vec<String> = tags.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort();
    pairs.join(", ")
}
