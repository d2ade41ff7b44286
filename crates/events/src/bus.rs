//! In-process change bus backed by a `tokio::sync::broadcast` channel.
//!
//! Embedding layers publish the [`ChangeEvent`]s their surfaces raise as
//! [`FormChange`]s; a [`BindingRegistry`](crate::registry::BindingRegistry)
//! consumes them and runs the matching evaluation passes in order.

use choicegate_core::types::FormId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::surface::ChangeEvent;

/// A change event addressed to one bound form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormChange {
    pub form_id: FormId,
    #[serde(flatten)]
    pub event: ChangeEvent,
}

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// Fan-out bus for form change events.
pub struct ChangeBus {
    sender: broadcast::Sender<FormChange>,
}

impl ChangeBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest changes are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a change to all current subscribers. Dropped when nobody listens.
    pub fn publish(&self, change: FormChange) {
        let _ = self.sender.send(change);
    }

    /// Publish every event a surface raised for `form_id`, in order.
    pub fn publish_all(&self, form_id: FormId, events: impl IntoIterator<Item = ChangeEvent>) {
        for event in events {
            self.publish(FormChange { form_id, event });
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FormChange> {
        self.sender.subscribe()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
