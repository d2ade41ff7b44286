//! Conditional choice evaluation engine.
//!
//! Pure domain logic shared by the interactive client runtime
//! (`choicegate-events`) and the authoritative server pipeline
//! (`choicegate-api`). Nothing in this crate performs I/O; callers supply
//! configuration, field metadata and value snapshots.
//!
//! - [`conditions`]: value resolution, rule and group evaluation, choice
//!   filtering.
//! - [`config`]: per-form conditional-choice configuration and its lenient
//!   loader.
//! - [`form`]: the in-memory field model the server pipeline mutates.
//! - [`pipeline`]: the pre-validation pass that narrows target choices.
//! - [`submission`]: post-pipeline check of submitted choice values.

pub mod conditions;
pub mod config;
pub mod error;
pub mod form;
pub(crate) mod lenient;
pub mod pipeline;
pub mod submission;
pub mod types;
