//! Condition groups and target resolution.
//!
//! A group combines its rules under `all`/`any` logic and carries the set of
//! choice values it allows. A target's ordered groups are resolved under a
//! [`MatchMode`] into an [`AllowedSet`], or `None` when nothing matched.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::TargetConfig;
use crate::error::CoreError;

use super::rules::{self, Rule};
use super::value::ValueSource;

// ---------------------------------------------------------------------------
// LogicType
// ---------------------------------------------------------------------------

/// How a group combines its rule results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicType {
    #[default]
    All,
    Any,
}

impl LogicType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Any => "any",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "all" => Ok(Self::All),
            "any" => Ok(Self::Any),
            _ => Err(CoreError::Validation(format!(
                "Invalid logic type: '{s}'. Must be one of: all, any"
            ))),
        }
    }
}

/// Case-insensitive; anything other than `any` means `all`.
impl<'de> Deserialize<'de> for LogicType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .and_then(|s| Self::from_str(&s.trim().to_ascii_lowercase()).ok())
            .unwrap_or_default())
    }
}

impl std::fmt::Display for LogicType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MatchMode
// ---------------------------------------------------------------------------

/// Which matching group wins when several groups of a target match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// The first enabled matching group in declared order wins.
    #[default]
    FirstMatch,
    /// Every group is evaluated; the last enabled matching group wins.
    LastMatch,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstMatch => "first_match",
            Self::LastMatch => "last_match",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "first_match" => Ok(Self::FirstMatch),
            "last_match" => Ok(Self::LastMatch),
            _ => Err(CoreError::Validation(format!(
                "Invalid match mode: '{s}'. Must be one of: first_match, last_match"
            ))),
        }
    }
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AllowedSet
// ---------------------------------------------------------------------------

/// Choice values permitted by a matching group.
///
/// Distinct from "no restriction": an empty set hides every choice, while a
/// resolution of `None` leaves the original choices untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowedSet(BTreeSet<String>);

impl AllowedSet {
    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for AllowedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// A named set of rules tied to the choices it allows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default, deserialize_with = "crate::lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "crate::lenient::string")]
    pub label: String,
    #[serde(default, deserialize_with = "crate::lenient::strict_true")]
    pub enabled: bool,
    #[serde(default)]
    pub logic_type: LogicType,
    #[serde(default, deserialize_with = "crate::lenient::rules")]
    pub rules: Vec<Rule>,
    /// Raw allowed values. Labels always come from the target's original
    /// choices.
    #[serde(default, deserialize_with = "crate::lenient::strings")]
    pub choices: Vec<String>,
}

impl Group {
    /// An enabled `all` group with no rules and no choices.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            enabled: true,
            logic_type: LogicType::All,
            rules: Vec::new(),
            choices: Vec::new(),
        }
    }

    pub fn with_logic(mut self, logic_type: LogicType) -> Self {
        self.logic_type = logic_type;
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn allowed_set(&self) -> AllowedSet {
        self.choices.iter().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate a group against a value source.
///
/// Disabled groups and groups without rules never match.
pub fn evaluate_group<S: ValueSource + ?Sized>(group: &Group, source: &S) -> bool {
    if !group.enabled || group.rules.is_empty() {
        return false;
    }
    let mut results = group.rules.iter().map(|rule| rules::evaluate(rule, source));
    match group.logic_type {
        LogicType::All => results.all(|matched| matched),
        LogicType::Any => results.any(|matched| matched),
    }
}

/// Resolve the allowed set for one target.
///
/// Returns `None` ("no restriction") for disabled targets and when no
/// enabled group matches.
pub fn resolve_target<S: ValueSource + ?Sized>(
    target: &TargetConfig,
    source: &S,
    mode: MatchMode,
) -> Option<AllowedSet> {
    if !target.enabled {
        return None;
    }

    let mut matched: Option<&Group> = None;
    for group in &target.groups {
        if !evaluate_group(group, source) {
            continue;
        }
        matched = Some(group);
        if mode == MatchMode::FirstMatch {
            break;
        }
    }

    matched.map(Group::allowed_set)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
