use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

/// Wire key carrying a character's display name.
pub const NAME_KEY: &str = "chr_name";

/// Minimal identity returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CharacterSummary {
    #[serde(rename = "chr_name")]
    pub name: String,
}

impl CharacterSummary {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Open mapping of backend-defined character fields.
///
/// The two game variants expose different subsets, so nothing here assumes a
/// fixed field list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet(Map<String, Value>);

impl AttributeSet {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// The `chr_name` field, if present and textual
    pub fn name(&self) -> Option<&str> {
        self.get(NAME_KEY).and_then(Value::as_str)
    }

    /// Numeric view of a field. Numeric strings are accepted as well since
    /// some rows come back from the database as text.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Per-attribute verdict from the comparison endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AttributeVerdict {
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "unknown")]
    pub value: Option<Value>,
}

impl AttributeVerdict {
    pub fn correct() -> Self {
        Self {
            is_correct: true,
            value: None,
        }
    }

    pub fn incorrect() -> Self {
        Self {
            is_correct: false,
            value: None,
        }
    }
}
