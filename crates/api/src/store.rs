//! Read-only store of form definitions.
//!
//! Forms are loaded once at startup from a JSON file holding either a list
//! of form definitions or `{ "forms": [...] }`. Each definition carries its
//! fields and its `conditional_choices` configuration.

use std::path::Path;

use choicegate_core::error::CoreError;
use choicegate_core::form::FormDefinition;
use choicegate_core::types::FormId;
use indexmap::IndexMap;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read forms file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid forms file: {0}")]
    Parse(String),
}

#[derive(Debug, Default)]
pub struct FormStore {
    forms: IndexMap<FormId, FormDefinition>,
}

impl FormStore {
    /// Build a store from definitions; a repeated form id replaces the earlier one.
    pub fn from_forms(forms: impl IntoIterator<Item = FormDefinition>) -> Self {
        let mut store = Self::default();
        for form in forms {
            if store.forms.contains_key(&form.id) {
                tracing::warn!(form_id = form.id, "Duplicate form id, keeping the last one");
            }
            store.forms.insert(form.id, form);
        }
        store
    }

    /// Parse a forms document.
    ///
    /// A form entry that cannot be read is skipped with a warning; the rest
    /// of the document still loads.
    pub fn from_json(document: Value) -> Result<Self, StoreError> {
        let entries = match document {
            Value::Array(items) => items,
            Value::Object(mut obj) => match obj.remove("forms") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(StoreError::Parse(
                        "expected a \"forms\" list".to_string(),
                    ))
                }
            },
            _ => {
                return Err(StoreError::Parse(
                    "expected a list of forms".to_string(),
                ))
            }
        };

        let forms = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, raw)| match serde_json::from_value(raw) {
                Ok(form) => Some(form),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping unreadable form definition");
                    None
                }
            });
        Ok(Self::from_forms(forms))
    }

    /// Load the forms file. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Forms file not found, starting empty");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        let document: Value =
            serde_json::from_str(&text).map_err(|e| StoreError::Parse(e.to_string()))?;
        Self::from_json(document)
    }

    pub fn get(&self, form_id: FormId) -> Result<&FormDefinition, CoreError> {
        self.forms.get(&form_id).ok_or_else(|| CoreError::NotFound {
            entity: "Form",
            id: form_id.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}
