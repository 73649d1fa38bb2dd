//! Single-object monitor.

use super::Link;
use crate::tracking::ChangeEvent;
use crate::types::{Entity, MonitorId, ObjectRef, StackId};
use crossbeam_channel::{RecvError, RecvTimeoutError, TryRecvError};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Monitors changes to one managed object.
pub struct ObjectMonitor<T: Entity> {
    link: Link,
    object: Arc<T>,
    object_ref: ObjectRef,
    deleted: AtomicBool,
}

impl<T: Entity> ObjectMonitor<T> {
    pub(crate) fn new(link: Link, object: Arc<T>) -> Self {
        let object_ref = object.object_ref();
        Self {
            link,
            object,
            object_ref,
            deleted: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> MonitorId {
        self.link.id
    }

    pub fn stack_id(&self) -> StackId {
        self.link.stack_id
    }

    /// The object this monitor was created for.
    pub fn object(&self) -> &Arc<T> {
        &self.object
    }

    pub fn object_ref(&self) -> &ObjectRef {
        &self.object_ref
    }

    /// True once the owning stack has been torn down.
    pub fn is_stale(&self) -> bool {
        self.link.is_stale()
    }

    /// True once an `ObjectDeleted` event for this object has been received.
    pub fn is_object_deleted(&self) -> bool {
        self.deleted.load(Ordering::Acquire)
    }

    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<ChangeEvent, RecvError> {
        self.link.recv().map(|e| self.observe(e))
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<ChangeEvent, TryRecvError> {
        self.link.try_recv().map(|e| self.observe(e))
    }

    /// Receive with timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<ChangeEvent, RecvTimeoutError> {
        self.link.recv_timeout(timeout).map(|e| self.observe(e))
    }

    fn observe(&self, event: ChangeEvent) -> ChangeEvent {
        if let ChangeEvent::ObjectDeleted { object } = &event {
            if *object == self.object_ref {
                self.deleted.store(true, Ordering::Release);
            }
        }
        event
    }
}

impl<T: Entity> fmt::Debug for ObjectMonitor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectMonitor")
            .field("id", &self.link.id)
            .field("object", &self.object_ref)
            .field("stale", &self.is_stale())
            .finish()
    }
}
