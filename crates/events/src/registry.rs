//! Bindings of every rendered form, addressed by form id.
//!
//! [`BindingRegistry`] exposes the form-scoped entry points
//! ([`evaluate_all`](BindingRegistry::evaluate_all),
//! [`evaluate_for`](BindingRegistry::evaluate_for)) and can drain a
//! [`ChangeBus`](crate::bus::ChangeBus) subscription with
//! [`listen`](BindingRegistry::listen).

use choicegate_core::types::FormId;
use indexmap::IndexMap;
use tokio::sync::broadcast;

use crate::binding::{FormBinding, PassReport};
use crate::bus::FormChange;
use crate::dependency::DependencyModel;
use crate::surface::FormSurface;

#[derive(Debug)]
pub struct BindingRegistry<S: FormSurface> {
    bindings: IndexMap<FormId, FormBinding<S>>,
}

impl<S: FormSurface> Default for BindingRegistry<S> {
    fn default() -> Self {
        Self {
            bindings: IndexMap::new(),
        }
    }
}

impl<S: FormSurface> BindingRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a rendered form. A previous binding of the same form is disposed
    /// first and its surface returned.
    pub fn bind(&mut self, model: DependencyModel, surface: S) -> Option<S> {
        let form_id = model.form_id();
        let previous = self.dispose(form_id);
        self.bindings
            .insert(form_id, FormBinding::bind(model, surface));
        previous
    }

    /// Drop a form's binding, detaching its listeners.
    pub fn dispose(&mut self, form_id: FormId) -> Option<S> {
        self.bindings
            .shift_remove(&form_id)
            .map(FormBinding::dispose)
    }

    pub fn get(&self, form_id: FormId) -> Option<&FormBinding<S>> {
        self.bindings.get(&form_id)
    }

    pub fn get_mut(&mut self, form_id: FormId) -> Option<&mut FormBinding<S>> {
        self.bindings.get_mut(&form_id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Evaluate every target of a form. `None` when the form is not bound.
    pub fn evaluate_all(&mut self, form_id: FormId) -> Option<PassReport> {
        self.bindings.get_mut(&form_id).map(FormBinding::evaluate_all)
    }

    /// Evaluate the targets of a form that depend on one source field.
    pub fn evaluate_for(&mut self, form_id: FormId, source_field_id: &str) -> Option<PassReport> {
        self.bindings
            .get_mut(&form_id)
            .map(|binding| binding.evaluate_for(source_field_id))
    }

    /// Route one change to its form's binding.
    pub fn handle(&mut self, change: &FormChange) -> Option<PassReport> {
        let Some(binding) = self.bindings.get_mut(&change.form_id) else {
            tracing::debug!(form_id = change.form_id, "Change for unbound form ignored");
            return None;
        };
        Some(binding.handle_change(&change.event))
    }

    /// Process changes until the bus is dropped.
    ///
    /// A lagging receiver has missed changes, so every bound form is
    /// re-evaluated before continuing. Returns the number of changes handled.
    pub async fn listen(&mut self, mut receiver: broadcast::Receiver<FormChange>) -> usize {
        let mut handled = 0;
        loop {
            match receiver.recv().await {
                Ok(change) => {
                    if self.handle(&change).is_some() {
                        handled += 1;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Change listener lagged, re-evaluating all forms");
                    for binding in self.bindings.values_mut() {
                        binding.evaluate_all();
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Change bus closed, listener shutting down");
                    break;
                }
            }
        }
        handled
    }
}
