/*
[INPUT]:  Typed query/request structs or hand-built key/value pairs
[OUTPUT]: Ordered string parameters for query strings and form bodies
[POS]:    HTTP layer - request parameter encoding
[UPDATE]: When the broker's list or value encoding changes
*/

use serde::Serialize;
use serde_json::Value;

use crate::http::{OandaError, Result};

/// Ordered request parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a serializable struct into parameters.
    ///
    /// `None` fields are skipped and arrays are joined with `,`.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)?;
        let mut params = Self::new();
        match value {
            Value::Null => {}
            Value::Object(map) => {
                for (key, value) in map {
                    if let Some(encoded) = encode_value(&value)? {
                        params.0.push((key, encoded));
                    }
                }
            }
            other => {
                return Err(OandaError::InvalidParams(format!(
                    "parameters must serialize to an object, got {other}"
                )));
            }
        }
        Ok(params)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.0.iter().position(|(existing, _)| existing == key)?;
        Some(self.0.remove(index).1)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

/// Percent-encode one path segment so `/`, `?` or `#` in caller input
/// stay inside the segment
pub fn encode_path_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

fn encode_value(value: &Value) -> Result<Option<String>> {
    let encoded = match value {
        Value::Null => return Ok(None),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                if let Some(part) = encode_value(item)? {
                    parts.push(part);
                }
            }
            parts.join(",")
        }
        Value::Object(_) => {
            return Err(OandaError::InvalidParams(
                "nested objects cannot be sent as parameters".to_string(),
            ));
        }
    };
    Ok(Some(encoded))
}
