//! Monitor handles returned by the data stack.
//!
//! A monitor is a caller-held view of a live subscription. It keeps a weak
//! reference to its stack and unregisters itself from the tracker when
//! dropped; there is no explicit close step.

mod list;
mod object;

pub use list::ListMonitor;
pub use object::ObjectMonitor;

use crate::stack::StackInner;
use crate::tracking::{ChangeEvent, Registration};
use crate::types::{MonitorId, StackId};
use crossbeam_channel::{Receiver, RecvError, RecvTimeoutError, TryRecvError};
use std::sync::Weak;
use std::time::Duration;

/// Registration shared by both monitor kinds.
pub(crate) struct Link {
    id: MonitorId,
    stack_id: StackId,
    stack: Weak<StackInner>,
    receiver: Receiver<ChangeEvent>,
}

impl Link {
    pub(crate) fn new(stack: Weak<StackInner>, stack_id: StackId, registration: Registration) -> Self {
        Self {
            id: registration.id,
            stack_id,
            stack,
            receiver: registration.receiver,
        }
    }

    fn is_stale(&self) -> bool {
        self.stack.strong_count() == 0
    }

    fn recv(&self) -> Result<ChangeEvent, RecvError> {
        self.receiver.recv()
    }

    fn try_recv(&self) -> Result<ChangeEvent, TryRecvError> {
        self.receiver.try_recv()
    }

    fn recv_timeout(&self, timeout: Duration) -> Result<ChangeEvent, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        if let Some(stack) = self.stack.upgrade() {
            stack.tracker.unregister(self.id);
        }
    }
}
