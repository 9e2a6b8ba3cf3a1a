use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::GearId;

/// Raised when a gear item's raw spec blob cannot be turned into a map
#[derive(Debug, thiserror::Error)]
pub enum SpecParseError {
    #[error("spec text is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("spec value must be an object, got {0}")]
    NotAnObject(&'static str),
}

/// Normalized spec attributes of one gear item
///
/// Catalog rows deliver specs either as a JSON object or as JSON-encoded text.
/// Both shapes are folded into a single key → text map at the catalog boundary,
/// so scorers only ever read strings and parse numbers on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecMap(BTreeMap<String, String>);

impl SpecMap {
    /// Parses a raw spec value (object, JSON text, or null)
    pub fn from_raw(raw: &Value) -> Result<Self, SpecParseError> {
        match raw {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => Ok(Self::from_object(map)),
            Value::String(text) if text.trim().is_empty() => Ok(Self::default()),
            Value::String(text) => match serde_json::from_str::<Value>(text)? {
                Value::Object(map) => Ok(Self::from_object(&map)),
                other => Err(SpecParseError::NotAnObject(kind_of(&other))),
            },
            other => Err(SpecParseError::NotAnObject(kind_of(other))),
        }
    }

    /// Parses a raw spec value, substituting an empty map when it is unusable
    pub fn normalize(raw: &Value, gear_id: GearId) -> Self {
        Self::from_raw(raw).unwrap_or_else(|e| {
            tracing::warn!(gear_id = %gear_id, error = %e, "Unparsable gear specs, using empty map");
            Self::default()
        })
    }

    fn from_object(map: &serde_json::Map<String, Value>) -> Self {
        let entries = map
            .iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    nested => nested.to_string(),
                };
                Some((key.clone(), text))
            })
            .collect();
        Self(entries)
    }

    /// Adds or replaces one attribute
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Trimmed, non-blank value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Value for `key`, or an empty string
    pub fn text(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// First non-blank value among `keys`, or an empty string
    pub fn first_text(&self, keys: &[&str]) -> &str {
        keys.iter().find_map(|key| self.get(key)).unwrap_or("")
    }

    /// Numeric value for `key` with unit suffixes such as `g`, `Hz` or `kg` stripped
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(parse_number)
    }

    /// First parsable number among `keys`
    pub fn first_number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|key| self.number(key))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parses a number that may carry a trailing unit
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .trim_end_matches(|c: char| c.is_alphabetic() || c == '%')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
