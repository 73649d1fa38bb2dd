//! In-process tracker broadcasting change events to monitors.

use crate::types::{MonitorId, ObjectRef, QuerySignature, StackId};
use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::{ChangeEvent, DropReason, Registration, TrackedTarget};
use super::ChangeTracker;

/// Internal registration state.
struct Listener {
    owner: StackId,
    target: TrackedTarget,
    sender: Sender<ChangeEvent>,
}

impl Listener {
    /// Try to send an event. Returns false if the buffer is full or the
    /// receiver is gone (listener will be dropped).
    fn try_send(&self, event: ChangeEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    fn watches_object(&self, object: &ObjectRef) -> bool {
        matches!(&self.target, TrackedTarget::Object(o) if o == object)
    }

    fn watches_query(&self, signature: &QuerySignature) -> bool {
        matches!(&self.target, TrackedTarget::List { signature: s, .. } if s == signature)
    }

    fn watches_entity(&self, entity: &str) -> bool {
        self.target.entity() == entity
    }
}

/// Routes published change events to registered monitors.
pub struct ChangeBroadcaster {
    /// Live registrations by ID.
    listeners: RwLock<HashMap<MonitorId, Listener>>,
    /// Counter for generating monitor IDs.
    next_id: AtomicU64,
}

impl ChangeBroadcaster {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    // --- Publishing ---

    /// Deliver an event to monitors of one object. Returns the number of
    /// monitors that accepted it.
    pub fn publish_object(&self, object: &ObjectRef, event: ChangeEvent) -> usize {
        self.broadcast(|l| l.watches_object(object), event)
    }

    /// Deliver an event to list monitors with the given query signature.
    pub fn publish_list(&self, signature: &QuerySignature, event: ChangeEvent) -> usize {
        self.broadcast(|l| l.watches_query(signature), event)
    }

    /// Deliver an event to every monitor of an entity, object or list.
    pub fn publish_entity(&self, entity: &str, event: ChangeEvent) -> usize {
        self.broadcast(|l| l.watches_entity(entity), event)
    }

    /// Targets of all live registrations, in no particular order.
    pub fn targets(&self) -> Vec<(MonitorId, TrackedTarget)> {
        self.listeners
            .read()
            .iter()
            .map(|(id, l)| (*id, l.target.clone()))
            .collect()
    }

    /// Internal broadcast helper. Drops listeners that fail to receive.
    fn broadcast<F>(&self, filter: F, event: ChangeEvent) -> usize
    where
        F: Fn(&Listener) -> bool,
    {
        let mut delivered = 0;
        let mut to_remove = Vec::new();

        {
            let listeners = self.listeners.read();
            for (id, listener) in listeners.iter() {
                if filter(listener) {
                    if listener.try_send(event.clone()) {
                        delivered += 1;
                    } else {
                        to_remove.push(*id);
                    }
                }
            }
        }

        if !to_remove.is_empty() {
            let mut listeners = self.listeners.write();
            for id in to_remove {
                if let Some(listener) = listeners.remove(&id) {
                    tracing::warn!(monitor = %id, "dropping monitor that stopped receiving");
                    // Best effort: the buffer is usually still full.
                    let _ = listener.sender.try_send(ChangeEvent::Dropped {
                        reason: DropReason::BufferOverflow,
                    });
                }
            }
        }

        delivered
    }
}

impl ChangeTracker for ChangeBroadcaster {
    fn register(&self, owner: StackId, target: TrackedTarget, buffer_size: usize) -> Registration {
        let id = MonitorId(self.next_id.fetch_add(1, Ordering::SeqCst));
        // A zero-capacity channel would reject every try_send.
        let (sender, receiver) = bounded(buffer_size.max(1));

        tracing::debug!(
            monitor = %id,
            stack = owner.0,
            entity = target.entity(),
            list = target.is_list(),
            "registered monitor"
        );
        self.listeners.write().insert(
            id,
            Listener {
                owner,
                target,
                sender,
            },
        );

        Registration { id, receiver }
    }

    fn unregister(&self, id: MonitorId) {
        let mut listeners = self.listeners.write();
        if let Some(listener) = listeners.remove(&id) {
            tracing::debug!(monitor = %id, "unregistered monitor");
            let _ = listener.sender.try_send(ChangeEvent::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
    }

    fn monitor_count(&self) -> usize {
        self.listeners.read().len()
    }

    fn owned_count(&self, owner: StackId) -> usize {
        self.listeners
            .read()
            .values()
            .filter(|l| l.owner == owner)
            .count()
    }

    fn shutdown(&self, owner: StackId) {
        let drained: Vec<Listener> = {
            let mut listeners = self.listeners.write();
            let ids: Vec<MonitorId> = listeners
                .iter()
                .filter(|(_, l)| l.owner == owner)
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter().filter_map(|id| listeners.remove(&id)).collect()
        };
        tracing::debug!(stack = owner.0, monitors = drained.len(), "stack monitors shut down");
        for listener in drained {
            let _ = listener.sender.try_send(ChangeEvent::Dropped {
                reason: DropReason::StoreTornDown,
            });
        }
    }
}

impl Default for ChangeBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
