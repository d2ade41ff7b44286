//! Source field to dependent target mapping.

use choicegate_core::conditions::MatchMode;
use choicegate_core::config::{FormConfig, ResolvedForm, TargetConfig};
use choicegate_core::types::{FieldId, FormId};
use indexmap::IndexMap;

/// Which targets must be re-evaluated when a source field changes.
///
/// Built from enabled targets and enabled groups only. A rule referencing
/// field F makes the target owning that rule's group depend on F. Dependents
/// are listed in configuration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyModel {
    form_id: FormId,
    mode: MatchMode,
    targets: IndexMap<FieldId, TargetConfig>,
    sources: IndexMap<FieldId, Vec<FieldId>>,
}

impl DependencyModel {
    pub fn build(form_id: FormId, config: &FormConfig) -> Self {
        let mut targets = IndexMap::new();
        let mut sources: IndexMap<FieldId, Vec<FieldId>> = IndexMap::new();

        for target in config.enabled_targets() {
            let id = &target.target_field_id;
            for source in target.source_fields() {
                let dependents = sources.entry(source.to_string()).or_default();
                if !dependents.contains(id) {
                    dependents.push(id.clone());
                }
            }
            targets.insert(id.clone(), target.clone());
        }

        tracing::debug!(
            form_id,
            targets = targets.len(),
            sources = sources.len(),
            "Built dependency model",
        );

        Self {
            form_id,
            mode: config.mode,
            targets,
            sources,
        }
    }

    /// Build from the client payload, whose targets carry their original choices.
    pub fn from_resolved(resolved: &ResolvedForm) -> Self {
        Self::build(resolved.form_id, &resolved.config)
    }

    pub fn form_id(&self) -> FormId {
        self.form_id
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Distinct source fields; one listener is bound per entry.
    pub fn source_fields(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn dependents_of(&self, source_field_id: &str) -> &[FieldId] {
        self.sources
            .get(source_field_id.trim())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn targets(&self) -> impl Iterator<Item = &TargetConfig> {
        self.targets.values()
    }

    pub fn target(&self, target_field_id: &str) -> Option<&TargetConfig> {
        self.targets.get(target_field_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use choicegate_core::conditions::{Group, Operator, Rule};

    fn config() -> FormConfig {
        let mut disabled = TargetConfig::new("40")
            .with_group(Group::new("g", "G").with_rule(Rule::new("1", Operator::Is, "x")));
        disabled.enabled = false;

        FormConfig::new(MatchMode::FirstMatch)
            .with_target(
                TargetConfig::new("30").with_group(
                    Group::new("g1", "G1")
                        .with_rule(Rule::new("1", Operator::Is, "a"))
                        .with_rule(Rule::new("2", Operator::Contains, "b"))
                        .with_rule(Rule::new("1", Operator::IsNot, "c")),
                ),
            )
            .with_target(
                TargetConfig::new("31")
                    .with_group(Group::new("g2", "G2").with_rule(Rule::new("2", Operator::Is, "z")))
                    .with_group(
                        Group::new("g3", "G3")
                            .with_rule(Rule::new("3", Operator::Is, "q"))
                            .disabled(),
                    ),
            )
            .with_target(disabled)
    }

    #[test]
    fn maps_each_source_to_its_dependents_in_config_order() {
        let model = DependencyModel::build(7, &config());
        assert_eq!(model.form_id(), 7);
        assert_eq!(model.dependents_of("1"), ["30".to_string()]);
        assert_eq!(model.dependents_of("2"), ["30".to_string(), "31".to_string()]);
    }

    #[test]
    fn one_entry_per_distinct_source() {
        let model = DependencyModel::build(7, &config());
        let sources: Vec<&str> = model.source_fields().collect();
        assert_eq!(sources, vec!["1", "2"]);
    }

    #[test]
    fn disabled_targets_and_groups_are_excluded() {
        let model = DependencyModel::build(7, &config());
        assert!(model.dependents_of("3").is_empty());
        assert!(model.target("40").is_none());
        assert_eq!(model.targets().count(), 2);
    }

    #[test]
    fn unknown_sources_have_no_dependents() {
        let model = DependencyModel::build(7, &config());
        assert!(model.dependents_of("99").is_empty());
    }
}
