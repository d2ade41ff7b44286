//! Conditional-choice configuration for a form.
//!
//! A [`FormConfig`] maps target field ids to [`TargetConfig`]s and carries
//! the form's [`MatchMode`]. Stored configurations are loaded leniently: a
//! target entry that cannot be read is skipped with a warning and the rest
//! of the form still loads.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::conditions::choices::Choice;
use crate::conditions::groups::{Group, MatchMode};
use crate::error::CoreError;
use crate::form::FormDefinition;
use crate::lenient;
use crate::types::{FieldId, FormId};

// ---------------------------------------------------------------------------
// TargetConfig
// ---------------------------------------------------------------------------

/// The condition groups attached to one target field.
///
/// `original_choices` is empty in stored configurations and is filled from
/// the field's current metadata by [`FormConfig::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetConfig {
    #[serde(default, deserialize_with = "lenient::field_id")]
    pub target_field_id: FieldId,
    #[serde(default, deserialize_with = "lenient::strict_true")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "lenient::groups")]
    pub groups: Vec<Group>,
    #[serde(default, deserialize_with = "lenient::choices")]
    pub original_choices: Vec<Choice>,
}

impl TargetConfig {
    /// An enabled target with no groups and no choices.
    pub fn new(target_field_id: impl Into<FieldId>) -> Self {
        Self {
            target_field_id: target_field_id.into(),
            enabled: true,
            groups: Vec::new(),
            original_choices: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.original_choices = choices;
        self
    }

    /// Source field ids referenced by the enabled groups of this target.
    pub fn source_fields(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .filter(|group| group.enabled)
            .flat_map(|group| group.rules.iter())
            .filter(|rule| rule.has_field())
            .map(|rule| rule.field_id.trim())
    }
}

// ---------------------------------------------------------------------------
// FormConfig
// ---------------------------------------------------------------------------

/// All conditional-choice targets of one form, in configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    pub mode: MatchMode,
    pub targets: IndexMap<FieldId, TargetConfig>,
}

impl FormConfig {
    pub fn new(mode: MatchMode) -> Self {
        Self {
            mode,
            targets: IndexMap::new(),
        }
    }

    /// Add (or replace) a target, keyed by its field id.
    pub fn with_target(mut self, target: TargetConfig) -> Self {
        self.targets.insert(target.target_field_id.clone(), target);
        self
    }

    pub fn target(&self, target_field_id: &str) -> Option<&TargetConfig> {
        self.targets.get(target_field_id)
    }

    pub fn enabled_targets(&self) -> impl Iterator<Item = &TargetConfig> {
        self.targets.values().filter(|target| target.enabled)
    }

    /// Load a stored configuration.
    ///
    /// Only a non-object document is an error. `targets` may be an object
    /// keyed by target field id or a list of targets carrying their own
    /// `targetFieldId`; unreadable entries are skipped.
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        let obj = value.as_object().ok_or_else(|| {
            CoreError::Validation("conditional choice config must be a JSON object".to_string())
        })?;

        let mode = match obj.get("mode") {
            None | Some(Value::Null) => MatchMode::default(),
            Some(raw) => raw
                .as_str()
                .and_then(|s| MatchMode::from_str(s.trim()).ok())
                .unwrap_or_else(|| {
                    tracing::warn!(mode = %raw, "Unknown match mode, using first_match");
                    MatchMode::FirstMatch
                }),
        };

        let mut config = Self::new(mode);
        let entries: Vec<(Option<String>, Value)> = match obj.get("targets") {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| (Some(k.trim().to_string()), v.clone()))
                .collect(),
            Some(Value::Array(items)) => items.iter().map(|v| (None, v.clone())).collect(),
            _ => Vec::new(),
        };

        for (key, raw) in entries {
            match serde_json::from_value::<TargetConfig>(raw) {
                Ok(mut target) => {
                    if let Some(key) = key {
                        target.target_field_id = key;
                    }
                    if target.target_field_id.is_empty() {
                        tracing::warn!("Skipping conditional choice target without a field id");
                        continue;
                    }
                    config
                        .targets
                        .insert(target.target_field_id.clone(), target);
                }
                Err(e) => {
                    tracing::warn!(
                        target_field_id = key.as_deref().unwrap_or(""),
                        error = %e,
                        "Skipping unreadable conditional choice target",
                    );
                }
            }
        }

        Ok(config)
    }

    /// Resolve the configuration against the form's current fields.
    ///
    /// Keeps enabled targets whose field exists on the form and attaches the
    /// field's current choices as `original_choices`. The result is what the
    /// client runtime binds to.
    pub fn resolve(&self, form: &FormDefinition) -> ResolvedForm {
        let mut targets = IndexMap::new();
        for target in self.enabled_targets() {
            let Some(field) = form.field(&target.target_field_id) else {
                tracing::debug!(
                    form_id = form.id,
                    target_field_id = %target.target_field_id,
                    "Target field not on form, skipping",
                );
                continue;
            };
            let mut resolved = target.clone();
            resolved.original_choices = field.choices.clone().unwrap_or_default();
            targets.insert(target.target_field_id.clone(), resolved);
        }

        ResolvedForm {
            form_id: form.id,
            config: FormConfig {
                mode: self.mode,
                targets,
            },
        }
    }
}

impl<'de> Deserialize<'de> for FormConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// ResolvedForm
// ---------------------------------------------------------------------------

/// A form's configuration with every target's original choices attached.
///
/// Serialises to the client payload
/// `{ "formId", "mode", "targets": { id: { groups, originalChoices, .. } } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedForm {
    pub form_id: FormId,
    #[serde(flatten)]
    pub config: FormConfig,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::rules::{Operator, Rule};
    use crate::form::{FieldDefinition, FieldKind};
    use serde_json::json;

    fn stored_config() -> Value {
        json!({
            "mode": "last_match",
            "targets": {
                "30": {
                    "enabled": true,
                    "groups": [{
                        "id": "g1",
                        "label": "Small sizes",
                        "enabled": true,
                        "logicType": "any",
                        "rules": [{"fieldId": 10, "operator": "is", "value": "a"}],
                        "choices": ["s", "m"]
                    }]
                },
                "31": {"enabled": false, "groups": []},
                "32": "garbage"
            }
        })
    }

    #[test]
    fn loads_stored_config_and_skips_unreadable_targets() {
        let config = FormConfig::from_json(&stored_config()).unwrap();
        assert_eq!(config.mode, MatchMode::LastMatch);
        assert_eq!(config.targets.len(), 2);

        let target = config.target("30").unwrap();
        assert_eq!(target.target_field_id, "30");
        assert!(target.enabled);
        assert_eq!(target.groups[0].rules[0], Rule::new("10", Operator::Is, "a"));
        assert!(!config.target("31").unwrap().enabled);
        assert!(config.target("32").is_none());
    }

    #[test]
    fn non_object_config_is_rejected() {
        assert!(FormConfig::from_json(&json!([])).is_err());
        assert!(FormConfig::from_json(&json!("targets")).is_err());
    }

    #[test]
    fn missing_targets_and_mode_default() {
        let config = FormConfig::from_json(&json!({})).unwrap();
        assert_eq!(config.mode, MatchMode::FirstMatch);
        assert!(config.targets.is_empty());

        let config = FormConfig::from_json(&json!({"mode": "best_match"})).unwrap();
        assert_eq!(config.mode, MatchMode::FirstMatch);
    }

    #[test]
    fn list_shaped_targets_use_their_own_field_ids() {
        let config = FormConfig::from_json(&json!({
            "targets": [
                {"targetFieldId": 8, "enabled": true},
                {"enabled": true}
            ]
        }))
        .unwrap();
        assert_eq!(config.targets.len(), 1);
        assert!(config.target("8").is_some());
    }

    #[test]
    fn target_order_is_preserved() {
        let config = FormConfig::from_json(&json!({
            "targets": {"9": {"enabled": true}, "10": {"enabled": true}, "2": {"enabled": true}}
        }))
        .unwrap();
        let order: Vec<&str> = config.targets.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["9", "10", "2"]);
    }

    #[test]
    fn source_fields_ignore_disabled_groups_and_blank_rules() {
        let target = TargetConfig::new("30")
            .with_group(
                Group::new("g1", "G1")
                    .with_rule(Rule::new("10", Operator::Is, "a"))
                    .with_rule(Rule::never()),
            )
            .with_group(
                Group::new("g2", "G2")
                    .with_rule(Rule::new("11", Operator::Is, "b"))
                    .disabled(),
            );
        let sources: Vec<&str> = target.source_fields().collect();
        assert_eq!(sources, vec!["10"]);
    }

    #[test]
    fn resolve_attaches_field_choices_and_drops_missing_targets() {
        let config = FormConfig::from_json(&json!({
            "targets": {
                "30": {"enabled": true, "groups": []},
                "31": {"enabled": false},
                "99": {"enabled": true}
            }
        }))
        .unwrap();
        let form = FormDefinition::new(4, "Order")
            .with_field(FieldDefinition::new("10", "Kind", FieldKind::Select))
            .with_field(
                FieldDefinition::new("30", "Size", FieldKind::Radio)
                    .with_choices(vec![Choice::new("s", "Small"), Choice::new("l", "Large")]),
            )
            .with_field(FieldDefinition::new("31", "Colour", FieldKind::Select));

        let resolved = config.resolve(&form);
        assert_eq!(resolved.form_id, 4);
        assert_eq!(resolved.config.targets.len(), 1);
        let target = resolved.config.target("30").unwrap();
        assert_eq!(target.original_choices.len(), 2);
        assert_eq!(target.original_choices[1].text, "Large");
    }

    #[test]
    fn resolved_form_serialises_to_client_payload() {
        let config = FormConfig::new(MatchMode::FirstMatch).with_target(
            TargetConfig::new("30").with_choices(vec![Choice::new("s", "Small")]),
        );
        let resolved = ResolvedForm { form_id: 4, config };
        let payload = serde_json::to_value(&resolved).unwrap();
        assert_eq!(payload["formId"], 4);
        assert_eq!(payload["mode"], "first_match");
        assert_eq!(payload["targets"]["30"]["originalChoices"][0]["text"], "Small");

        let back: ResolvedForm = serde_json::from_value(payload).unwrap();
        assert_eq!(back, resolved);
    }
}
