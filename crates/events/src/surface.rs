//! The render/mutation sink the client runtime drives.
//!
//! A [`FormSurface`] is whatever owns live form state: a browser bridge, a
//! terminal UI, or the in-memory [`MemoryForm`](crate::memory::MemoryForm).
//! The runtime reads values through it, asks it how a target is presented,
//! and hands it [`Mutation`]s tagged with a [`ChangeOrigin`]. Change events
//! the surface raises carry that origin back, which is how the binder tells
//! its own writes apart from user edits.

use choicegate_core::conditions::{Choice, ValueSource};
use choicegate_core::types::{FieldId, FormId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Change events
// ---------------------------------------------------------------------------

/// Who caused a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOrigin {
    User,
    /// A mutation applied by the runtime itself; never re-evaluated.
    Engine,
}

/// A change notification for one field, as delivered to a listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub field_id: FieldId,
    pub origin: ChangeOrigin,
}

impl ChangeEvent {
    pub fn user(field_id: impl Into<FieldId>) -> Self {
        Self {
            field_id: field_id.into(),
            origin: ChangeOrigin::User,
        }
    }

    pub fn engine(field_id: impl Into<FieldId>) -> Self {
        Self {
            field_id: field_id.into(),
            origin: ChangeOrigin::Engine,
        }
    }
}

/// Handle for an attached change listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

// ---------------------------------------------------------------------------
// Presentation and mutations
// ---------------------------------------------------------------------------

/// One rendered choice of a radio or checkbox list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceItem {
    pub value: String,
    pub visible: bool,
    pub checked: bool,
}

impl ChoiceItem {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            visible: true,
            checked: false,
        }
    }
}

/// How a target field is currently presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Presentation {
    /// A single-select drop-down whose option list can be replaced.
    Select {
        options: Vec<Choice>,
        selected: Option<String>,
    },
    /// Radio buttons or checkboxes; elements are shown or hidden, never removed.
    ChoiceList { items: Vec<ChoiceItem> },
}

/// A single write to a target's presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mutation {
    ReplaceOptions {
        options: Vec<Choice>,
        selected: Option<String>,
    },
    SetVisible { value: String, visible: bool },
    Uncheck { value: String },
}

// ---------------------------------------------------------------------------
// FormSurface
// ---------------------------------------------------------------------------

/// Live form state the runtime reads from and writes to.
pub trait FormSurface: ValueSource {
    fn form_id(&self) -> FormId;

    /// Current presentation of a target, or `None` when it is not rendered.
    fn presentation(&self, field_id: &str) -> Option<Presentation>;

    /// Apply one mutation and return the change events it raised, each
    /// carrying `origin`.
    fn apply(&mut self, field_id: &str, mutation: &Mutation, origin: ChangeOrigin)
        -> Vec<ChangeEvent>;

    fn attach_listener(&mut self, field_id: &str) -> ListenerId;

    fn detach_listener(&mut self, listener: ListenerId);
}
