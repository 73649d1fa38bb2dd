//! # DataStack Monitor
//!
//! Change-notification monitors over a managed data stack.
//!
//! ## Core Concepts
//!
//! - **DataStack**: Owner of the managed data; hands out monitors
//! - **ExecutionContext**: Token proving a call comes from the coordinating thread
//! - **Monitors**: Caller-held handles observing one object or an ordered list
//! - **Clauses**: `Where` / `OrderBy` / `Tweak` / `SectionBy` describing a list
//! - **Tracking**: Pluggable engine that detects changes and notifies monitors
//!
//! ## Example
//!
//! ```ignore
//! use datastack_monitor::{DataStack, DataStackConfig, FromClause, OrderBy, SectionBy, Where};
//!
//! let stack = DataStack::new(DataStackConfig::default());
//! let ctx = stack.current_context();
//!
//! // Watch a single object
//! let user_monitor = stack.monitor_object(&ctx, user.clone())?;
//!
//! // Watch an ordered list
//! let active = monitor_list!(
//!     stack,
//!     &ctx,
//!     FromClause::<User>::new(),
//!     Where::eq("active", true),
//!     OrderBy::ascending("name"),
//! )?;
//!
//! // Watch a list grouped by department
//! let by_department = stack.monitor_sectioned_list(
//!     &ctx,
//!     FromClause::<User>::new(),
//!     SectionBy::new("department"),
//!     vec![OrderBy::ascending("department").then_ascending("name").into()],
//! )?;
//! ```

#[macro_use]
mod macros;

pub mod clauses;
pub mod context;
pub mod error;
pub mod monitors;
pub mod stack;
pub mod tracking;
pub mod types;

// Re-exports
pub use clauses::{
    query_signature, Comparison, FetchClause, FetchRequest, FromClause, OrderBy, Predicate,
    SectionBy, SortDirection, SortKey, Tweak, Where,
};
pub use context::{ContractMode, ExecutionContext};
pub use error::{ContractViolation, MonitorError, Result};
pub use monitors::{ListMonitor, ObjectMonitor};
pub use stack::{DataStack, DataStackConfig};
pub use tracking::{
    ChangeBroadcaster, ChangeEvent, ChangeTracker, DropReason, Registration, TrackedTarget,
};
pub use types::*;
