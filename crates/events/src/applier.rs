//! Live choice applier.
//!
//! Turns a filtered choice list into the minimal set of [`Mutation`]s for a
//! target's current [`Presentation`]. Planning compares the presented state
//! with the wanted state first, so applying the same list twice writes
//! nothing the second time.

use std::collections::HashSet;

use choicegate_core::conditions::Choice;

use crate::surface::{ChangeEvent, ChangeOrigin, FormSurface, Mutation, Presentation};

/// Mutations needed to bring `presentation` in line with `filtered`.
pub fn plan_mutations(presentation: &Presentation, filtered: &[Choice]) -> Vec<Mutation> {
    match presentation {
        Presentation::Select { options, selected } => {
            plan_select(options, selected.as_deref(), filtered)
        }
        Presentation::ChoiceList { items } => {
            let allowed: HashSet<&str> = filtered.iter().map(|c| c.value.as_str()).collect();
            let mut mutations = Vec::new();
            for item in items {
                let show = allowed.contains(item.value.as_str());
                // Deselect before hiding so no hidden choice stays checked.
                if !show && item.checked {
                    mutations.push(Mutation::Uncheck {
                        value: item.value.clone(),
                    });
                }
                if item.visible != show {
                    mutations.push(Mutation::SetVisible {
                        value: item.value.clone(),
                        visible: show,
                    });
                }
            }
            mutations
        }
    }
}

fn plan_select(options: &[Choice], selected: Option<&str>, filtered: &[Choice]) -> Vec<Mutation> {
    let keeps_selection = selected.filter(|s| filtered.iter().any(|c| c.value == *s));
    let wanted = keeps_selection
        .map(str::to_string)
        .or_else(|| filtered.first().map(|c| c.value.clone()));

    if options == filtered && selected.map(str::to_string) == wanted {
        return Vec::new();
    }
    vec![Mutation::ReplaceOptions {
        options: filtered.to_vec(),
        selected: wanted,
    }]
}

/// What one live application did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveApply {
    pub mutations: usize,
    /// Change events raised by the writes; all engine-originated.
    pub events: Vec<ChangeEvent>,
}

/// Apply a filtered choice list to a rendered target.
///
/// Returns `None` when the surface does not render the target.
pub fn apply_live<S: FormSurface + ?Sized>(
    surface: &mut S,
    field_id: &str,
    filtered: &[Choice],
) -> Option<LiveApply> {
    let presentation = surface.presentation(field_id)?;
    let mutations = plan_mutations(&presentation, filtered);

    let mut applied = LiveApply {
        mutations: mutations.len(),
        events: Vec::new(),
    };
    for mutation in &mutations {
        applied
            .events
            .extend(surface.apply(field_id, mutation, ChangeOrigin::Engine));
    }
    Some(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::ChoiceItem;

    fn choices(values: &[&str]) -> Vec<Choice> {
        values
            .iter()
            .map(|v| Choice::new(*v, v.to_uppercase()))
            .collect()
    }

    fn item(value: &str, visible: bool, checked: bool) -> ChoiceItem {
        ChoiceItem {
            value: value.to_string(),
            visible,
            checked,
        }
    }

    #[test]
    fn select_keeps_a_still_allowed_selection() {
        let presentation = Presentation::Select {
            options: choices(&["a", "b", "c"]),
            selected: Some("b".into()),
        };
        let plan = plan_mutations(&presentation, &choices(&["b", "c"]));
        assert_eq!(
            plan,
            vec![Mutation::ReplaceOptions {
                options: choices(&["b", "c"]),
                selected: Some("b".into()),
            }]
        );
    }

    #[test]
    fn select_falls_back_to_the_first_option() {
        let presentation = Presentation::Select {
            options: choices(&["a", "b", "c"]),
            selected: Some("a".into()),
        };
        let plan = plan_mutations(&presentation, &choices(&["b", "c"]));
        assert_eq!(
            plan,
            vec![Mutation::ReplaceOptions {
                options: choices(&["b", "c"]),
                selected: Some("b".into()),
            }]
        );
    }

    #[test]
    fn select_with_no_options_left_has_no_selection() {
        let presentation = Presentation::Select {
            options: choices(&["a"]),
            selected: Some("a".into()),
        };
        let plan = plan_mutations(&presentation, &[]);
        assert_eq!(
            plan,
            vec![Mutation::ReplaceOptions {
                options: Vec::new(),
                selected: None,
            }]
        );
    }

    #[test]
    fn select_already_in_shape_needs_nothing() {
        let presentation = Presentation::Select {
            options: choices(&["b", "c"]),
            selected: Some("c".into()),
        };
        assert!(plan_mutations(&presentation, &choices(&["b", "c"])).is_empty());
    }

    #[test]
    fn choice_list_unchecks_before_hiding() {
        let presentation = Presentation::ChoiceList {
            items: vec![item("a", true, true), item("b", true, false), item("c", false, false)],
        };
        let plan = plan_mutations(&presentation, &choices(&["b", "c"]));
        assert_eq!(
            plan,
            vec![
                Mutation::Uncheck { value: "a".into() },
                Mutation::SetVisible { value: "a".into(), visible: false },
                Mutation::SetVisible { value: "c".into(), visible: true },
            ]
        );
    }

    #[test]
    fn hidden_but_checked_item_is_still_unchecked() {
        let presentation = Presentation::ChoiceList {
            items: vec![item("a", false, true)],
        };
        let plan = plan_mutations(&presentation, &[]);
        assert_eq!(plan, vec![Mutation::Uncheck { value: "a".into() }]);
    }

    #[test]
    fn choice_list_in_shape_needs_nothing() {
        let presentation = Presentation::ChoiceList {
            items: vec![item("a", false, false), item("b", true, true)],
        };
        assert!(plan_mutations(&presentation, &choices(&["b"])).is_empty());
    }
}
