//! Types exchanged between monitors and the tracking engine.

use crate::clauses::FetchRequest;
use crate::types::{IndexPath, MonitorId, ObjectRef, QuerySignature};
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};

/// Change notifications delivered to monitors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    // --- Object Events ---
    /// Attributes of a monitored object changed.
    ObjectUpdated {
        object: ObjectRef,
        changed_keys: Vec<String>,
    },

    /// A monitored object was deleted from the store.
    ObjectDeleted {
        object: ObjectRef,
    },

    // --- List Events ---
    /// A batch of list changes is about to be delivered.
    ListWillChange,

    /// The batch announced by `ListWillChange` is complete.
    ListDidChange,

    /// The list is about to be fetched again from scratch.
    ListWillRefetch,

    /// Refetch finished; previous index paths are invalid.
    ListDidRefetch,

    ListObjectInserted {
        object: ObjectRef,
        at: IndexPath,
    },

    ListObjectDeleted {
        object: ObjectRef,
        from: IndexPath,
    },

    ListObjectUpdated {
        object: ObjectRef,
        at: IndexPath,
    },

    ListObjectMoved {
        object: ObjectRef,
        from: IndexPath,
        to: IndexPath,
    },

    SectionInserted {
        name: String,
        index: usize,
    },

    SectionDeleted {
        name: String,
        index: usize,
    },

    // --- Lifecycle Events ---
    /// The monitor was removed from the tracker.
    Dropped {
        reason: DropReason,
    },
}

impl ChangeEvent {
    pub fn is_dropped(&self) -> bool {
        matches!(self, ChangeEvent::Dropped { .. })
    }
}

/// Why a monitor was removed from the tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Event buffer overflowed (slow consumer).
    BufferOverflow,
    /// The monitor handle was dropped.
    Unsubscribed,
    /// The owning data stack was torn down.
    StoreTornDown,
}

/// What a monitor observes, as seen by the tracking engine.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackedTarget {
    Object(ObjectRef),
    List {
        signature: QuerySignature,
        request: FetchRequest,
    },
}

impl TrackedTarget {
    pub fn entity(&self) -> &str {
        match self {
            TrackedTarget::Object(object) => &object.entity,
            TrackedTarget::List { request, .. } => &request.entity,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, TrackedTarget::List { .. })
    }
}

/// Result of registering a monitor with a tracker.
pub struct Registration {
    pub id: MonitorId,
    /// Channel the tracker delivers events on.
    pub receiver: Receiver<ChangeEvent>,
}
