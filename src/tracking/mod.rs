//! Change tracking engine interface.
//!
//! Monitors do not detect changes themselves. Each monitor registers a
//! [`TrackedTarget`] with a [`ChangeTracker`] and receives [`ChangeEvent`]s
//! on the channel returned in its [`Registration`]. Dropping the monitor
//! unregisters it.
//!
//! [`ChangeBroadcaster`] is the in-process tracker used by default:
//! - Bounded per-monitor buffers with slow-consumer dropping
//! - Delivery by object, by query signature, or by entity
//!
//! # Example
//!
//! ```ignore
//! let stack = DataStack::new(DataStackConfig::default());
//! let broadcaster = stack.broadcaster().unwrap().clone();
//! let ctx = stack.current_context();
//!
//! let monitor = stack.monitor_object(&ctx, user.clone())?;
//! broadcaster.publish_object(
//!     &user.object_ref(),
//!     ChangeEvent::ObjectUpdated { object: user.object_ref(), changed_keys: vec!["name".into()] },
//! );
//! assert!(matches!(monitor.try_recv(), Ok(ChangeEvent::ObjectUpdated { .. })));
//! ```

mod broadcaster;
mod types;

pub use broadcaster::ChangeBroadcaster;
pub use types::{ChangeEvent, DropReason, Registration, TrackedTarget};

use crate::types::{MonitorId, StackId};

/// Collaborator that observes store changes and notifies monitors.
///
/// One tracker may serve several stacks; every registration is owned by the
/// stack that created it.
pub trait ChangeTracker: Send + Sync {
    /// Register a target for `owner`. Events are buffered up to `buffer_size`.
    fn register(&self, owner: StackId, target: TrackedTarget, buffer_size: usize) -> Registration;

    /// Remove a registration. Unknown ids are ignored.
    fn unregister(&self, id: MonitorId);

    /// Number of live registrations across all owners.
    fn monitor_count(&self) -> usize;

    /// Number of live registrations owned by one stack.
    fn owned_count(&self, owner: StackId) -> usize;

    /// Drop the registrations of `owner`; called when that stack is torn down.
    /// Registrations of other stacks are untouched.
    fn shutdown(&self, owner: StackId);
}
