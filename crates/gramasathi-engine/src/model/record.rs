//! User profile values as seen by the injector.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single injectable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Convert a stored JSON value. Numbers become text; `null`, objects and
    /// arrays holding anything but strings have no injectable value.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Number(n) => Some(FieldValue::Text(n.to_string())),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(FieldValue::List),
            Value::Null | Value::Object(_) => None,
        }
    }

    /// Empty strings and empty arrays count as absent.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Bool(_) => false,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }

    /// Stringified form used for typing and option matching.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items.join(","),
        }
    }
}

/// A stored user profile, keyed by field name in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserRecord {
    fields: BTreeMap<String, Option<FieldValue>>,
}

impl UserRecord {
    /// Build from a stored JSON document. Non-object documents yield an empty record.
    pub fn from_document(document: &Value) -> Self {
        let fields = document
            .as_object()
            .map(|object| {
                object
                    .iter()
                    .map(|(key, value)| (key.clone(), FieldValue::from_json(value)))
                    .collect()
            })
            .unwrap_or_default();
        Self { fields }
    }

    /// Iterate every field; the value is `None` when it has nothing to inject.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_ref().filter(|v| !v.is_empty())))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for UserRecord {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), Some(value)))
                .collect(),
        }
    }
}
