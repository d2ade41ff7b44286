//! Per-form event binding.
//!
//! A [`FormBinding`] owns a form's [`DependencyModel`] and its surface. It
//! attaches one listener per distinct source field, evaluates every target
//! once on bind, and afterwards re-evaluates only the dependents of a
//! changed field. Engine-originated change events are dropped on arrival, so
//! a pass never triggers another pass.

use choicegate_core::conditions::{filter_choices, resolve_target, AllowedSet};
use choicegate_core::types::FieldId;

use crate::applier::apply_live;
use crate::dependency::DependencyModel;
use crate::surface::{ChangeEvent, ChangeOrigin, FormSurface, ListenerId};

/// What one evaluation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Targets whose allowed set was resolved and applied.
    pub evaluated: usize,
    pub mutations: usize,
    /// Engine-originated change events that were not re-evaluated.
    pub suppressed: usize,
    /// Targets not rendered on the surface or without original choices.
    pub skipped: usize,
    /// Allowed set of every evaluated target, in evaluation order.
    pub resolved: Vec<(FieldId, Option<AllowedSet>)>,
}

impl PassReport {
    fn merge(&mut self, other: PassReport) {
        self.evaluated += other.evaluated;
        self.mutations += other.mutations;
        self.suppressed += other.suppressed;
        self.skipped += other.skipped;
        self.resolved.extend(other.resolved);
    }
}

/// The bound state of one rendered form.
#[derive(Debug)]
pub struct FormBinding<S: FormSurface> {
    model: DependencyModel,
    surface: S,
    listeners: Vec<ListenerId>,
}

impl<S: FormSurface> FormBinding<S> {
    /// Attach listeners and bring every target into its filtered state.
    pub fn bind(model: DependencyModel, surface: S) -> Self {
        let mut binding = Self {
            model,
            surface,
            listeners: Vec::new(),
        };
        binding.attach();
        let report = binding.evaluate_all();
        tracing::debug!(
            form_id = binding.model.form_id(),
            listeners = binding.listeners.len(),
            evaluated = report.evaluated,
            mutations = report.mutations,
            "Bound form",
        );
        binding
    }

    /// Replace the model after a re-render.
    ///
    /// Every listener from the previous bind is detached before the new ones
    /// are attached, then all targets are evaluated again.
    pub fn rebind(&mut self, model: DependencyModel) -> PassReport {
        self.detach();
        self.model = model;
        self.attach();
        self.evaluate_all()
    }

    /// Detach every listener and hand the surface back.
    pub fn dispose(mut self) -> S {
        self.detach();
        self.surface
    }

    pub fn model(&self) -> &DependencyModel {
        &self.model
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access for the embedding layer; user edits go through here.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// React to a change event delivered by a listener.
    pub fn handle_change(&mut self, event: &ChangeEvent) -> PassReport {
        if event.origin == ChangeOrigin::Engine {
            tracing::trace!(field_id = %event.field_id, "Suppressed engine-originated change");
            return PassReport {
                suppressed: 1,
                ..PassReport::default()
            };
        }
        self.evaluate_for(&event.field_id)
    }

    /// Handle a batch of events in order, one pass per user event.
    pub fn handle_all<'a, I>(&mut self, events: I) -> PassReport
    where
        I: IntoIterator<Item = &'a ChangeEvent>,
    {
        let mut report = PassReport::default();
        for event in events {
            report.merge(self.handle_change(event));
        }
        report
    }

    /// Evaluate every target of the form.
    pub fn evaluate_all(&mut self) -> PassReport {
        let targets: Vec<FieldId> = self
            .model
            .targets()
            .map(|t| t.target_field_id.clone())
            .collect();
        self.run_pass(&targets)
    }

    /// Evaluate only the targets that depend on `source_field_id`.
    pub fn evaluate_for(&mut self, source_field_id: &str) -> PassReport {
        let targets = self.model.dependents_of(source_field_id).to_vec();
        self.run_pass(&targets)
    }

    fn run_pass(&mut self, targets: &[FieldId]) -> PassReport {
        let mut report = PassReport::default();
        let mode = self.model.mode();

        for id in targets {
            let Some(target) = self.model.target(id) else {
                continue;
            };
            if target.original_choices.is_empty() {
                report.skipped += 1;
                continue;
            }

            let allowed = resolve_target(target, &self.surface, mode);
            let filtered = filter_choices(&target.original_choices, allowed.as_ref());
            let Some(applied) = apply_live(&mut self.surface, id, &filtered) else {
                tracing::debug!(target_field_id = %id, "Target not rendered, skipping");
                report.skipped += 1;
                continue;
            };

            report.evaluated += 1;
            report.mutations += applied.mutations;
            for event in &applied.events {
                report.merge(self.handle_change(event));
            }
            report.resolved.push((id.clone(), allowed));
        }

        report
    }

    fn attach(&mut self) {
        let sources: Vec<FieldId> = self.model.source_fields().map(str::to_string).collect();
        for source in sources {
            self.listeners.push(self.surface.attach_listener(&source));
        }
    }

    fn detach(&mut self) {
        for listener in self.listeners.drain(..) {
            self.surface.detach_listener(listener);
        }
    }
}
