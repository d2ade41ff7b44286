//! Forgiving deserializers for stored configuration.
//!
//! Configurations are authored by an external editor and may carry numbers
//! where strings are expected, `null`s, associative objects where lists are
//! expected, or missing keys. None of these may abort loading; each helper
//! degrades to the value that never restricts a target.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::conditions::choices::Choice;
use crate::conditions::groups::Group;
use crate::conditions::rules::Rule;
use crate::conditions::value::scalar_string;

/// Normalise a field reference: numbers become their decimal form, strings
/// are trimmed, anything else is blank.
pub(crate) fn normalize_field_id(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => String::new(),
    }
}

/// Flatten a list-like value. Objects count as lists of their values, which
/// is how sparse PHP-style arrays arrive after entries are deleted.
pub(crate) fn sequence(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn field_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_field_id(&value))
}

pub(crate) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_string(&value))
}

pub(crate) fn strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Null => Vec::new(),
        Value::Array(_) | Value::Object(_) => sequence(value),
        scalar => vec![scalar],
    };
    Ok(items
        .iter()
        .filter(|v| !v.is_null())
        .map(scalar_string)
        .collect())
}

/// Only a JSON `true` enables a target or group.
pub(crate) fn strict_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}

/// Rules that cannot be read become never-matching rules rather than being
/// dropped, so an `all` group cannot widen by losing a condition.
pub(crate) fn rules<'de, D>(deserializer: D) -> Result<Vec<Rule>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(sequence(value)
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_else(|_| Rule::never()))
        .collect())
}

pub(crate) fn groups<'de, D>(deserializer: D) -> Result<Vec<Group>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(sequence(value)
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Group>(item) {
            Ok(group) => Some(group),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable condition group");
                None
            }
        })
        .collect())
}

pub(crate) fn choices<'de, D>(deserializer: D) -> Result<Vec<Choice>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(choice_list(value))
}

/// Like [`choices`], but keeps the distinction between "no choice list" and
/// an empty one.
pub(crate) fn optional_choices<'de, D>(deserializer: D) -> Result<Option<Vec<Choice>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(_) | Value::Object(_) => Some(choice_list(value)),
        _ => None,
    })
}

fn choice_list(value: Value) -> Vec<Choice> {
    sequence(value)
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(_) => serde_json::from_value::<Choice>(item).ok(),
            Value::Null => None,
            scalar => {
                let text = scalar_string(&scalar);
                Some(Choice::new(text.clone(), text))
            }
        })
        .collect()
}
