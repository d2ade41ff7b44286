//! Value resolution: turning a field reference into a scalar or multi value.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::FieldId;

/// The current value of a field, resolved once per rule evaluation.
///
/// Single-valued inputs (text, select, radio, hidden, ...) resolve to
/// [`FieldValue::Scalar`]; checkbox-like inputs resolve to
/// [`FieldValue::Multi`] holding the checked values in presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    Multi(Vec<String>),
}

impl FieldValue {
    /// The value of a field that is missing or has nothing entered.
    pub fn empty() -> Self {
        Self::Scalar(String::new())
    }

    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    pub fn multi<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Multi(values.into_iter().map(Into::into).collect())
    }

    /// `true` for an empty scalar or a multi value with nothing checked.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(s) => s.is_empty(),
            Self::Multi(items) => items.is_empty(),
        }
    }

    /// The individual non-empty values carried by this field value.
    pub fn entries(&self) -> Vec<&str> {
        match self {
            Self::Scalar(s) if s.is_empty() => Vec::new(),
            Self::Scalar(s) => vec![s.as_str()],
            Self::Multi(items) => items
                .iter()
                .map(String::as_str)
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(_) | Value::Object(_) => Self::Multi(
                crate::lenient::sequence(value)
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(scalar_string)
                    .collect(),
            ),
            scalar => Self::Scalar(scalar_string(&scalar)),
        }
    }
}

/// Coerce a JSON scalar to the string the evaluator compares against.
///
/// `true` becomes `"1"` and `false`/`null` become `""`, matching how form
/// platforms serialise submitted booleans.
pub(crate) fn scalar_string(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Anything that can report a field's current value.
///
/// Implemented by the submitted-values snapshot on the server and by live
/// form surfaces on the client. Returning `None` means the field is unknown.
pub trait ValueSource {
    fn field_value(&self, field_id: &str) -> Option<FieldValue>;
}

/// Resolve a field reference against a value source.
///
/// Unknown fields resolve to the empty scalar, never to an error, so rules
/// that reference removed fields remain defined.
pub fn resolve<S: ValueSource + ?Sized>(source: &S, field_id: &str) -> FieldValue {
    source
        .field_value(field_id.trim())
        .unwrap_or_else(FieldValue::empty)
}

impl<S: ValueSource + ?Sized> ValueSource for &S {
    fn field_value(&self, field_id: &str) -> Option<FieldValue> {
        (**self).field_value(field_id)
    }
}

impl ValueSource for HashMap<FieldId, FieldValue> {
    fn field_value(&self, field_id: &str) -> Option<FieldValue> {
        self.get(field_id).cloned()
    }
}

/// Values submitted with a request, keyed by field id.
///
/// Deserializes from a JSON object whose values are scalars (single-valued
/// fields) or arrays (the checked values of multi-valued fields).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmittedValues {
    values: HashMap<FieldId, FieldValue>,
}

impl SubmittedValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from a JSON object of `field id -> value`.
    pub fn from_json(map: &serde_json::Map<String, Value>) -> Self {
        let values = map
            .iter()
            .map(|(k, v)| (k.trim().to_string(), FieldValue::from(v.clone())))
            .collect();
        Self { values }
    }

    pub fn insert(&mut self, field_id: impl Into<FieldId>, value: FieldValue) {
        self.values.insert(field_id.into(), value);
    }

    pub fn with_scalar(mut self, field_id: impl Into<FieldId>, value: impl Into<String>) -> Self {
        self.insert(field_id, FieldValue::scalar(value));
        self
    }

    pub fn with_multi<I, S>(mut self, field_id: impl Into<FieldId>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(field_id, FieldValue::multi(values));
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ValueSource for SubmittedValues {
    fn field_value(&self, field_id: &str) -> Option<FieldValue> {
        self.values.get(field_id).cloned()
    }
}
