//! Conditional choice evaluation.
//!
//! Leaves first: [`value`] resolves field references, [`rules`] evaluates one
//! condition, [`groups`] combines conditions and resolves a target's allowed
//! set, and [`choices`] filters the original choice list. Everything here is
//! pure, so the client runtime and the server pipeline share one evaluator.

pub mod choices;
pub mod groups;
pub mod rules;
pub mod value;

pub use choices::{filter_choices, Choice};
pub use groups::{evaluate_group, resolve_target, AllowedSet, Group, LogicType, MatchMode};
pub use rules::{evaluate, evaluate_rule, Operator, Rule};
pub use value::{resolve, FieldValue, SubmittedValues, ValueSource};
