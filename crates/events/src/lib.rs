//! Client-side runtime for conditional choices.
//!
//! Drives a live form surface from the shared evaluator in
//! `choicegate-core`:
//!
//! - [`FormSurface`]: the render/mutation sink an embedding layer implements.
//! - [`DependencyModel`]: source field to dependent target mapping.
//! - [`FormBinding`]: per-form listener lifecycle and evaluation passes.
//! - [`applier`]: minimal, idempotent mutations for a filtered choice list.
//! - [`ChangeBus`] / [`BindingRegistry`]: fan-in of change events for every
//!   bound form, backed by `tokio::sync::broadcast`.
//! - [`MemoryForm`]: a complete in-memory surface.

pub mod applier;
pub mod binding;
pub mod bus;
pub mod dependency;
pub mod memory;
pub mod registry;
pub mod surface;

pub use applier::{apply_live, plan_mutations, LiveApply};
pub use binding::{FormBinding, PassReport};
pub use bus::{ChangeBus, FormChange};
pub use dependency::DependencyModel;
pub use memory::MemoryForm;
pub use registry::BindingRegistry;
pub use surface::{
    ChangeEvent, ChangeOrigin, ChoiceItem, FormSurface, ListenerId, Mutation, Presentation,
};
