//! In-memory form and field model.
//!
//! This is the server-side mutation sink: the pipeline overwrites a target
//! field's `choices` before the platform's own validation runs. The model
//! does not own storage; callers load it from wherever forms live.

use serde::{Deserialize, Serialize};

use crate::conditions::choices::Choice;
use crate::conditions::value::{FieldValue, ValueSource};
use crate::config::FormConfig;
use crate::error::CoreError;
use crate::lenient;
use crate::types::{FieldId, FormId};

// ---------------------------------------------------------------------------
// FieldKind
// ---------------------------------------------------------------------------

/// Input kind of a field, as far as value shape is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Textarea,
    Select,
    Multiselect,
    Hidden,
    Number,
    Radio,
    Checkbox,
    /// Any kind the engine has no special handling for; single-valued.
    #[serde(other)]
    Other,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Hidden => "hidden",
            Self::Number => "number",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Other => "other",
        }
    }

    /// Whether values of this kind resolve to a list of checked values.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Self::Checkbox | Self::Multiselect)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FieldDefinition
// ---------------------------------------------------------------------------

/// One field of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(deserialize_with = "lenient::field_id")]
    pub id: FieldId,
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "type")]
    pub kind: FieldKind,
    /// `None` for fields without a choice list (text inputs, ...).
    #[serde(
        default,
        deserialize_with = "lenient::optional_choices",
        skip_serializing_if = "Option::is_none"
    )]
    pub choices: Option<Vec<Choice>>,
}

impl FieldDefinition {
    pub fn new(id: impl Into<FieldId>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            choices: None,
        }
    }

    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = Some(choices);
        self
    }
}

// ---------------------------------------------------------------------------
// FormDefinition
// ---------------------------------------------------------------------------

/// A form, its fields, and its conditional-choice configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub id: FormId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub conditional_choices: FormConfig,
}

impl FormDefinition {
    pub fn new(id: FormId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            fields: Vec::new(),
            conditional_choices: FormConfig::default(),
        }
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_config(mut self, config: FormConfig) -> Self {
        self.conditional_choices = config;
        self
    }

    pub fn field(&self, field_id: &str) -> Option<&FieldDefinition> {
        let field_id = field_id.trim();
        self.fields.iter().find(|f| f.id == field_id)
    }

    pub fn field_mut(&mut self, field_id: &str) -> Option<&mut FieldDefinition> {
        let field_id = field_id.trim();
        self.fields.iter_mut().find(|f| f.id == field_id)
    }

    /// The current choice list of a field.
    ///
    /// Errors when the field does not exist or has no choice list.
    pub fn field_choices(&self, field_id: &str) -> Result<&[Choice], CoreError> {
        let field = self.field(field_id).ok_or_else(|| CoreError::NotFound {
            entity: "Field",
            id: field_id.to_string(),
        })?;
        field.choices.as_deref().ok_or_else(|| {
            CoreError::Validation(format!("Field {field_id} has no choices"))
        })
    }

    /// View `values` through this form's field kinds.
    pub fn shaped<'a, S: ValueSource + ?Sized>(&'a self, values: &'a S) -> ShapedValues<'a, S> {
        ShapedValues { form: self, values }
    }
}

// ---------------------------------------------------------------------------
// ShapedValues
// ---------------------------------------------------------------------------

/// Submitted values resolved with the shape their field kind implies.
///
/// A submission carries no entry for a checkbox group with nothing checked,
/// and may carry a bare scalar when exactly one box is checked. Multi-valued
/// fields therefore always resolve to [`FieldValue::Multi`] here: empty when
/// absent or blank, a one-element list for a scalar. Other fields resolve as
/// submitted.
#[derive(Debug)]
pub struct ShapedValues<'a, S: ?Sized> {
    form: &'a FormDefinition,
    values: &'a S,
}

impl<S: ValueSource + ?Sized> ValueSource for ShapedValues<'_, S> {
    fn field_value(&self, field_id: &str) -> Option<FieldValue> {
        let submitted = self.values.field_value(field_id);
        let multi_valued = self
            .form
            .field(field_id)
            .is_some_and(|field| field.kind.is_multi_valued());
        if !multi_valued {
            return submitted;
        }
        Some(match submitted {
            None => FieldValue::Multi(Vec::new()),
            Some(FieldValue::Scalar(s)) if s.is_empty() => FieldValue::Multi(Vec::new()),
            Some(FieldValue::Scalar(s)) => FieldValue::Multi(vec![s]),
            Some(multi) => multi,
        })
    }
}
