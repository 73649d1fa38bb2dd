//! Execution context tokens and contract enforcement.
//!
//! Monitors may only be created from a stack's coordinating context. Rather
//! than checking ambient thread state inside every call, the caller mints an
//! [`ExecutionContext`] from the stack and passes it explicitly. The token is
//! `!Send`, so a token minted on one thread cannot be used from another.

use crate::error::{ContractViolation, MonitorError};
use crate::types::StackId;
use std::marker::PhantomData;
use std::thread::ThreadId;

/// How contract violations are surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContractMode {
    /// Return `MonitorError::Contract`.
    Fail,
    /// Panic with the violation message.
    Panic,
    /// Log at error level and continue building the monitor.
    Log,
}

impl Default for ContractMode {
    /// `Fail` with debug assertions, `Log` otherwise.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            ContractMode::Fail
        } else {
            ContractMode::Log
        }
    }
}

impl ContractMode {
    /// Enforce a contract check under this mode.
    ///
    /// Returns `Ok(())` when the check holds, or when the mode lets the
    /// violation through.
    pub fn enforce(self, holds: bool, violation: impl FnOnce() -> ContractViolation) -> Result<(), MonitorError> {
        if holds {
            return Ok(());
        }

        let violation = violation();
        match self {
            ContractMode::Fail => Err(MonitorError::Contract(violation)),
            ContractMode::Panic => panic!("{}", violation),
            ContractMode::Log => {
                tracing::error!(%violation, "contract violation ignored");
                Ok(())
            }
        }
    }
}

/// Token identifying the execution context a call is made from.
///
/// Obtained from `DataStack::current_context`.
#[derive(Debug)]
pub struct ExecutionContext {
    stack: StackId,
    thread: ThreadId,
    coordinating: bool,
    _not_send: PhantomData<*const ()>,
}

impl ExecutionContext {
    pub(crate) fn new(stack: StackId, thread: ThreadId, coordinating: bool) -> Self {
        Self {
            stack,
            thread,
            coordinating,
            _not_send: PhantomData,
        }
    }

    /// Stack that minted this token.
    pub fn stack_id(&self) -> StackId {
        self.stack
    }

    /// Thread the token was minted on.
    pub fn thread_id(&self) -> ThreadId {
        self.thread
    }

    /// Whether this token was minted on the coordinating thread.
    pub fn is_coordinating(&self) -> bool {
        self.coordinating
    }

    /// Whether this token may create monitors on `stack`.
    pub(crate) fn is_coordinating_for(&self, stack: StackId) -> bool {
        self.coordinating && self.stack == stack
    }
}
