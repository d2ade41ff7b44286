//! Choices and pure choice filtering.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::groups::AllowedSet;
use super::value::scalar_string;

/// One selectable option of a target field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawChoice")]
pub struct Choice {
    pub value: String,
    pub text: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }
}

/// Choice metadata as field definitions store it: either key may be missing
/// or non-string.
#[derive(Deserialize)]
struct RawChoice {
    #[serde(default)]
    value: Value,
    #[serde(default)]
    text: Value,
}

impl From<RawChoice> for Choice {
    fn from(raw: RawChoice) -> Self {
        let value = (!raw.value.is_null()).then(|| scalar_string(&raw.value));
        let text = (!raw.text.is_null()).then(|| scalar_string(&raw.text));
        match (value, text) {
            (Some(value), Some(text)) => Self { value, text },
            (Some(value), None) => Self {
                text: value.clone(),
                value,
            },
            (None, Some(text)) => Self {
                value: text.clone(),
                text,
            },
            (None, None) => Self::new("", ""),
        }
    }
}

/// Filter a target's original choices down to an allowed set.
///
/// `None` returns the original list unchanged. Otherwise the result is the
/// ordered subsequence of `original` whose values are allowed; values in the
/// allowed set that are not original choices are ignored.
pub fn filter_choices(original: &[Choice], allowed: Option<&AllowedSet>) -> Vec<Choice> {
    match allowed {
        None => original.to_vec(),
        Some(set) => original
            .iter()
            .filter(|choice| set.contains(&choice.value))
            .cloned()
            .collect(),
    }
}
