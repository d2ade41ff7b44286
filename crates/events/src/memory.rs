//! In-memory [`FormSurface`] for headless evaluation and tests.
//!
//! Holds one state per field: a plain input, a single-select drop-down, or a
//! radio/checkbox list. User edits return one [`ChangeOrigin::User`] event
//! per listener attached to the edited field; engine writes that a browser
//! would report as a change (option replacement, deselection) return events
//! carrying the origin they were applied with.

use std::collections::BTreeMap;

use choicegate_core::conditions::{Choice, FieldValue, ValueSource};
use choicegate_core::form::{FieldKind, FormDefinition};
use choicegate_core::types::{FieldId, FormId};
use indexmap::IndexMap;

use crate::surface::{
    ChangeEvent, ChangeOrigin, ChoiceItem, FormSurface, ListenerId, Mutation, Presentation,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldState {
    Input(String),
    Select {
        options: Vec<Choice>,
        selected: Option<String>,
    },
    List {
        multi: bool,
        items: Vec<ChoiceItem>,
    },
}

/// A form held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryForm {
    form_id: FormId,
    fields: IndexMap<FieldId, FieldState>,
    listeners: BTreeMap<ListenerId, FieldId>,
    next_listener: u64,
    writes: usize,
}

impl MemoryForm {
    pub fn new(form_id: FormId) -> Self {
        Self {
            form_id,
            ..Self::default()
        }
    }

    /// Render every field of a definition in its initial state: selects pick
    /// their first option, lists start all visible and unchecked.
    pub fn from_definition(form: &FormDefinition) -> Self {
        let mut surface = Self::new(form.id);
        for field in &form.fields {
            let choices = field.choices.clone().unwrap_or_default();
            surface = match field.kind {
                FieldKind::Select => surface.with_select(&field.id, choices),
                FieldKind::Radio => surface.with_radio(&field.id, &choices),
                FieldKind::Checkbox | FieldKind::Multiselect => {
                    surface.with_checkboxes(&field.id, &choices)
                }
                _ => surface.with_input(&field.id, ""),
            };
        }
        surface
    }

    pub fn with_input(mut self, field_id: &str, value: impl Into<String>) -> Self {
        self.fields
            .insert(field_id.to_string(), FieldState::Input(value.into()));
        self
    }

    pub fn with_select(mut self, field_id: &str, options: Vec<Choice>) -> Self {
        let selected = options.first().map(|c| c.value.clone());
        self.fields
            .insert(field_id.to_string(), FieldState::Select { options, selected });
        self
    }

    pub fn with_radio(self, field_id: &str, choices: &[Choice]) -> Self {
        self.with_list(field_id, choices, false)
    }

    pub fn with_checkboxes(self, field_id: &str, choices: &[Choice]) -> Self {
        self.with_list(field_id, choices, true)
    }

    fn with_list(mut self, field_id: &str, choices: &[Choice], multi: bool) -> Self {
        let items = choices.iter().map(|c| ChoiceItem::new(c.value.clone())).collect();
        self.fields
            .insert(field_id.to_string(), FieldState::List { multi, items });
        self
    }

    // -- user edits ---------------------------------------------------------

    /// Type into a plain input.
    pub fn set_input(&mut self, field_id: &str, value: impl Into<String>) -> Vec<ChangeEvent> {
        match self.fields.get_mut(field_id) {
            Some(FieldState::Input(current)) => *current = value.into(),
            _ => return Vec::new(),
        }
        self.raise(field_id, ChangeOrigin::User)
    }

    /// Pick an option of a drop-down. Values not among its options are ignored.
    pub fn select(&mut self, field_id: &str, value: &str) -> Vec<ChangeEvent> {
        match self.fields.get_mut(field_id) {
            Some(FieldState::Select { options, selected })
                if options.iter().any(|c| c.value == value) =>
            {
                *selected = Some(value.to_string());
            }
            _ => return Vec::new(),
        }
        self.raise(field_id, ChangeOrigin::User)
    }

    /// Check a radio button or checkbox. Checking a radio clears its siblings.
    pub fn check(&mut self, field_id: &str, value: &str) -> Vec<ChangeEvent> {
        match self.fields.get_mut(field_id) {
            Some(FieldState::List { multi, items }) if items.iter().any(|i| i.value == value) => {
                for item in items.iter_mut() {
                    if item.value == value {
                        item.checked = true;
                    } else if !*multi {
                        item.checked = false;
                    }
                }
            }
            _ => return Vec::new(),
        }
        self.raise(field_id, ChangeOrigin::User)
    }

    /// Clear a checkbox by hand.
    pub fn uncheck(&mut self, field_id: &str, value: &str) -> Vec<ChangeEvent> {
        if !self.set_checked(field_id, value, false) {
            return Vec::new();
        }
        self.raise(field_id, ChangeOrigin::User)
    }

    // -- inspection ---------------------------------------------------------

    /// Number of mutations applied by the runtime so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Listeners attached to one field.
    pub fn listeners_on(&self, field_id: &str) -> usize {
        self.listeners.values().filter(|f| *f == field_id).count()
    }

    /// Values a user can currently pick: select options or visible list items.
    pub fn available(&self, field_id: &str) -> Vec<String> {
        match self.fields.get(field_id) {
            Some(FieldState::Select { options, .. }) => {
                options.iter().map(|c| c.value.clone()).collect()
            }
            Some(FieldState::List { items, .. }) => items
                .iter()
                .filter(|i| i.visible)
                .map(|i| i.value.clone())
                .collect(),
            _ => Vec::new(),
        }
    }

    fn set_checked(&mut self, field_id: &str, value: &str, checked: bool) -> bool {
        let Some(FieldState::List { items, .. }) = self.fields.get_mut(field_id) else {
            return false;
        };
        match items.iter_mut().find(|i| i.value == value) {
            Some(item) if item.checked != checked => {
                item.checked = checked;
                true
            }
            _ => false,
        }
    }

    fn raise(&self, field_id: &str, origin: ChangeOrigin) -> Vec<ChangeEvent> {
        self.listeners
            .values()
            .filter(|f| *f == field_id)
            .map(|f| ChangeEvent {
                field_id: f.clone(),
                origin,
            })
            .collect()
    }
}

impl ValueSource for MemoryForm {
    fn field_value(&self, field_id: &str) -> Option<FieldValue> {
        let value = match self.fields.get(field_id)? {
            FieldState::Input(value) => FieldValue::scalar(value.clone()),
            FieldState::Select { selected, .. } => {
                FieldValue::scalar(selected.clone().unwrap_or_default())
            }
            FieldState::List { multi: true, items } => FieldValue::multi(
                items.iter().filter(|i| i.checked).map(|i| i.value.clone()),
            ),
            FieldState::List { multi: false, items } => FieldValue::scalar(
                items
                    .iter()
                    .find(|i| i.checked)
                    .map(|i| i.value.clone())
                    .unwrap_or_default(),
            ),
        };
        Some(value)
    }
}

impl FormSurface for MemoryForm {
    fn form_id(&self) -> FormId {
        self.form_id
    }

    fn presentation(&self, field_id: &str) -> Option<Presentation> {
        match self.fields.get(field_id)? {
            FieldState::Input(_) => None,
            FieldState::Select { options, selected } => Some(Presentation::Select {
                options: options.clone(),
                selected: selected.clone(),
            }),
            FieldState::List { items, .. } => Some(Presentation::ChoiceList {
                items: items.clone(),
            }),
        }
    }

    fn apply(
        &mut self,
        field_id: &str,
        mutation: &Mutation,
        origin: ChangeOrigin,
    ) -> Vec<ChangeEvent> {
        let raises = match (self.fields.get_mut(field_id), mutation) {
            (
                Some(FieldState::Select { options, selected }),
                Mutation::ReplaceOptions {
                    options: new_options,
                    selected: new_selected,
                },
            ) => {
                *options = new_options.clone();
                *selected = new_selected.clone();
                true
            }
            (Some(FieldState::List { items, .. }), Mutation::SetVisible { value, visible }) => {
                let Some(item) = items.iter_mut().find(|i| i.value == *value) else {
                    return Vec::new();
                };
                item.visible = *visible;
                false
            }
            (Some(FieldState::List { items, .. }), Mutation::Uncheck { value }) => {
                let Some(item) = items.iter_mut().find(|i| i.value == *value && i.checked) else {
                    return Vec::new();
                };
                item.checked = false;
                true
            }
            _ => {
                tracing::trace!(field_id, ?mutation, "Mutation does not fit field, ignored");
                return Vec::new();
            }
        };

        self.writes += 1;
        if raises {
            self.raise(field_id, origin)
        } else {
            Vec::new()
        }
    }

    fn attach_listener(&mut self, field_id: &str) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, field_id.to_string());
        id
    }

    fn detach_listener(&mut self, listener: ListenerId) {
        self.listeners.remove(&listener);
    }
}
