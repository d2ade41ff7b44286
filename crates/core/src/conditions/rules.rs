//! Single-condition evaluation.

use serde::{Deserialize, Serialize};

use crate::types::FieldId;

use super::value::{resolve, FieldValue, ValueSource};

// ---------------------------------------------------------------------------
// Operator
// ---------------------------------------------------------------------------

/// Comparison applied between a source field's value and a rule literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    #[serde(rename = "is")]
    Is,
    #[serde(rename = "isnot")]
    IsNot,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "starts_with")]
    StartsWith,
    #[serde(rename = "ends_with")]
    EndsWith,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    /// Any operator string the engine does not know. Never matches.
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl Operator {
    /// Return the wire-format string for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Is => "is",
            Self::IsNot => "isnot",
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the operator has a defined meaning against a multi-valued
    /// source field.
    pub fn supports_multi(&self) -> bool {
        matches!(self, Self::Is | Self::IsNot | Self::Contains)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// One condition: `<source field> <operator> <literal>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Source field reference. Blank means the rule never matches.
    #[serde(default, deserialize_with = "crate::lenient::field_id")]
    pub field_id: FieldId,
    #[serde(default)]
    pub operator: Operator,
    #[serde(default, deserialize_with = "crate::lenient::string")]
    pub value: String,
}

impl Rule {
    pub fn new(field_id: impl Into<FieldId>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            operator,
            value: value.into(),
        }
    }

    /// A rule with no source field; evaluates to `false` everywhere.
    pub fn never() -> Self {
        Self::new("", Operator::Is, "")
    }

    pub fn has_field(&self) -> bool {
        !self.field_id.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate a rule against a value source.
pub fn evaluate<S: ValueSource + ?Sized>(rule: &Rule, source: &S) -> bool {
    if !rule.has_field() {
        return false;
    }
    evaluate_rule(rule, &resolve(source, &rule.field_id))
}

/// Evaluate a rule against an already-resolved value.
pub fn evaluate_rule(rule: &Rule, value: &FieldValue) -> bool {
    if !rule.has_field() {
        return false;
    }
    match value {
        FieldValue::Scalar(sv) => evaluate_scalar(rule.operator, sv, &rule.value),
        FieldValue::Multi(items) => evaluate_multi(rule.operator, items, &rule.value),
    }
}

fn evaluate_scalar(operator: Operator, sv: &str, rv: &str) -> bool {
    match operator {
        Operator::Is => sv == rv,
        Operator::IsNot => sv != rv,
        Operator::Contains => sv.contains(rv),
        Operator::StartsWith => sv.starts_with(rv),
        Operator::EndsWith => sv.ends_with(rv),
        Operator::GreaterThan => compare_numbers(sv, rv, |a, b| a > b),
        Operator::LessThan => compare_numbers(sv, rv, |a, b| a < b),
        Operator::Unknown => false,
    }
}

/// Multi-valued sources only answer membership questions.
fn evaluate_multi(operator: Operator, items: &[String], rv: &str) -> bool {
    if !operator.supports_multi() {
        return false;
    }
    let present = items.iter().any(|item| item == rv);
    match operator {
        Operator::IsNot => !present,
        _ => present,
    }
}

fn compare_numbers(sv: &str, rv: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (parse_number(sv), parse_number(rv)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

/// Strict decimal parsing: surrounding whitespace is ignored, trailing
/// garbage, empty strings and non-finite values are not numbers.
fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
