//! Structured values carried inside a signed payload.
//!
//! A payload is a tree with exactly three node shapes: scalars (kept in
//! their textual form), sequences and string-keyed mappings.

mod convert;

use std::collections::BTreeMap;

use serde::Serialize;

/// Mapping node type. Ordering of keys carries no meaning.
pub type Mapping = BTreeMap<String, Value>;

/// A node of a structured payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// A leaf, stored as its textual representation.
    Scalar(String),
    /// An ordered list of values.
    Sequence(Vec<Value>),
    /// A string-keyed mapping of values.
    Mapping(Mapping),
}

impl Value {
    /// Create an empty mapping.
    pub fn mapping() -> Self {
        Value::Mapping(Mapping::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Value::Scalar(_) => false,
            Value::Sequence(items) => items.is_empty(),
            Value::Mapping(map) => map.is_empty(),
        }
    }

    /// Look up a key if this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Follow a chain of mapping keys.
    ///
    /// ```
    /// use signed_params::Value;
    ///
    /// let value = Value::from(serde_json::json!({"account": {"account_code": "123"}}));
    /// assert_eq!(
    ///     value.get_path(&["account", "account_code"]).and_then(Value::as_str),
    ///     Some("123")
    /// );
    /// ```
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Convert into a JSON value. Scalars become JSON strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Scalar(s) => serde_json::Value::String(s.clone()),
            Value::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Mapping(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}
