//! The data stack: entry point for creating monitors.

use crate::clauses::{query_signature, FetchClause, FetchRequest, FromClause, SectionBy};
use crate::context::{ContractMode, ExecutionContext};
use crate::error::{ContractViolation, Result};
use crate::monitors::{Link, ListMonitor, ObjectMonitor};
use crate::tracking::{ChangeBroadcaster, ChangeTracker, Registration, TrackedTarget};
use crate::types::{Entity, StackId};
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// Data stack configuration.
#[derive(Clone, Debug)]
pub struct DataStackConfig {
    /// Name used in contract violation messages and logs.
    pub name: String,

    /// Max buffered events per monitor before it is dropped.
    /// Default: 1000
    pub buffer_size: usize,

    /// How contract violations are surfaced.
    pub contract_mode: ContractMode,

    /// Coordinating thread (None = the thread that creates the stack).
    pub coordinator: Option<ThreadId>,
}

impl Default for DataStackConfig {
    fn default() -> Self {
        Self {
            name: "DataStack".to_string(),
            buffer_size: 1000,
            contract_mode: ContractMode::default(),
            coordinator: None,
        }
    }
}

/// State monitors hold a weak reference to.
pub(crate) struct StackInner {
    pub(crate) id: StackId,
    pub(crate) tracker: Arc<dyn ChangeTracker>,
}

/// Owner of the managed data that monitors observe.
///
/// Monitors may only be created from the coordinating context, and list
/// monitors must be ordered:
///
/// ```ignore
/// let stack = DataStack::new(DataStackConfig::default());
/// let ctx = stack.current_context();
///
/// let users = stack.monitor_list(
///     &ctx,
///     FromClause::<User>::new(),
///     vec![Where::eq("active", true).into(), OrderBy::ascending("name").into()],
/// )?;
/// ```
///
/// Dropping the stack removes its own monitors from the tracker; they become
/// stale and receive a final `Dropped` event. Monitors of other stacks
/// sharing the tracker are unaffected.
pub struct DataStack {
    inner: Arc<StackInner>,
    /// Set when the stack owns an in-process broadcaster.
    broadcaster: Option<Arc<ChangeBroadcaster>>,
    config: DataStackConfig,
    coordinator: ThreadId,
}

impl DataStack {
    /// Create a stack backed by a fresh in-process [`ChangeBroadcaster`],
    /// reachable through [`broadcaster`](Self::broadcaster).
    pub fn new(config: DataStackConfig) -> Self {
        Self::with_broadcaster(config, Arc::new(ChangeBroadcaster::new()))
    }

    /// Create a stack backed by a (possibly shared) broadcaster.
    pub fn with_broadcaster(config: DataStackConfig, broadcaster: Arc<ChangeBroadcaster>) -> Self {
        let mut stack = Self::with_tracker(config, broadcaster.clone());
        stack.broadcaster = Some(broadcaster);
        stack
    }

    /// Create a stack backed by a custom tracking engine.
    ///
    /// The tracker may be shared with other stacks; each stack only counts
    /// and tears down its own monitors.
    pub fn with_tracker(config: DataStackConfig, tracker: Arc<dyn ChangeTracker>) -> Self {
        let id = StackId::next();
        let coordinator = config.coordinator.unwrap_or_else(|| thread::current().id());

        tracing::debug!(stack = %config.name, id = id.0, ?coordinator, "data stack created");

        Self {
            inner: Arc::new(StackInner { id, tracker }),
            broadcaster: None,
            config,
            coordinator,
        }
    }

    /// Process-unique identity of this stack.
    pub fn id(&self) -> StackId {
        self.inner.id
    }

    /// Name used in logs and contract violation messages.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Configuration the stack was created with.
    pub fn config(&self) -> &DataStackConfig {
        &self.config
    }

    /// Thread whose context tokens may create monitors.
    pub fn coordinator_thread(&self) -> ThreadId {
        self.coordinator
    }

    /// Tracking engine the stack registers monitors with.
    pub fn tracker(&self) -> &Arc<dyn ChangeTracker> {
        &self.inner.tracker
    }

    /// Broadcaster for publishing changes, if the stack was built on one.
    pub fn broadcaster(&self) -> Option<&Arc<ChangeBroadcaster>> {
        self.broadcaster.as_ref()
    }

    /// Number of live monitors created by this stack.
    pub fn monitor_count(&self) -> usize {
        self.inner.tracker.owned_count(self.inner.id)
    }

    /// Token for the calling thread.
    pub fn current_context(&self) -> ExecutionContext {
        let thread = thread::current().id();
        ExecutionContext::new(self.inner.id, thread, thread == self.coordinator)
    }

    // --- Monitors ---

    /// Monitor a single object.
    pub fn monitor_object<T: Entity>(
        &self,
        ctx: &ExecutionContext,
        object: Arc<T>,
    ) -> Result<ObjectMonitor<T>> {
        self.check_context(ctx)?;

        let object_ref = object.object_ref();
        tracing::debug!(stack = %self.config.name, object = %object_ref, "monitoring object");

        let registration = self
            .inner
            .tracker
            .register(self.inner.id, TrackedTarget::Object(object_ref), self.config.buffer_size);

        Ok(ObjectMonitor::new(self.link(registration), object))
    }

    /// Monitor an ordered list of objects.
    ///
    /// `fetch_clauses` must contain at least one `OrderBy`. The
    /// [`monitor_list!`](crate::monitor_list) macro accepts the clauses as
    /// separate arguments.
    pub fn monitor_list<T: Entity>(
        &self,
        ctx: &ExecutionContext,
        from: FromClause<T>,
        fetch_clauses: Vec<FetchClause>,
    ) -> Result<ListMonitor<T>> {
        self.create_list_monitor(ctx, from, None, fetch_clauses)
    }

    /// Monitor an ordered list partitioned into sections by `section_by`.
    ///
    /// Same preconditions as [`monitor_list`](Self::monitor_list).
    pub fn monitor_sectioned_list<T: Entity>(
        &self,
        ctx: &ExecutionContext,
        from: FromClause<T>,
        section_by: SectionBy,
        fetch_clauses: Vec<FetchClause>,
    ) -> Result<ListMonitor<T>> {
        self.create_list_monitor(ctx, from, Some(section_by), fetch_clauses)
    }

    fn create_list_monitor<T: Entity>(
        &self,
        ctx: &ExecutionContext,
        from: FromClause<T>,
        section_by: Option<SectionBy>,
        fetch_clauses: Vec<FetchClause>,
    ) -> Result<ListMonitor<T>> {
        self.check_context(ctx)?;
        self.config.contract_mode.enforce(
            fetch_clauses.iter().any(FetchClause::is_order_by),
            || ContractViolation::MissingOrderBy,
        )?;

        let signature = query_signature(&from, section_by.as_ref(), &fetch_clauses)?;
        let request = FetchRequest::build(&from, section_by.as_ref(), &fetch_clauses);

        tracing::debug!(
            stack = %self.config.name,
            entity = T::ENTITY_NAME,
            section_by = section_by.as_ref().map(|s| s.key_path.as_str()),
            clauses = fetch_clauses.len(),
            %signature,
            "monitoring list"
        );

        let registration = self.inner.tracker.register(
            self.inner.id,
            TrackedTarget::List {
                signature,
                request: request.clone(),
            },
            self.config.buffer_size,
        );

        Ok(ListMonitor::new(
            self.link(registration),
            from,
            section_by,
            fetch_clauses,
            signature,
            request,
        ))
    }

    fn check_context(&self, ctx: &ExecutionContext) -> Result<()> {
        self.config
            .contract_mode
            .enforce(ctx.is_coordinating_for(self.inner.id), || {
                ContractViolation::WrongContext {
                    stack: self.config.name.clone(),
                }
            })
    }

    fn link(&self, registration: Registration) -> Link {
        Link::new(Arc::downgrade(&self.inner), self.inner.id, registration)
    }
}

impl Drop for DataStack {
    fn drop(&mut self) {
        tracing::debug!(stack = %self.config.name, "tearing down data stack");
        self.inner.tracker.shutdown(self.inner.id);
    }
}

impl std::fmt::Debug for DataStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStack")
            .field("id", &self.inner.id)
            .field("name", &self.config.name)
            .field("coordinator", &self.coordinator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clauses::{OrderBy, Tweak, Where};
    use crate::error::MonitorError;
    use crate::tracking::ChangeEvent;
    use crate::types::ObjectId;

    #[derive(Debug)]
    struct User {
        id: u64,
    }

    impl Entity for User {
        const ENTITY_NAME: &'static str = "User";

        fn object_id(&self) -> ObjectId {
            ObjectId(self.id)
        }
    }

    fn failing_stack() -> DataStack {
        DataStack::new(DataStackConfig {
            name: "TestStack".to_string(),
            contract_mode: ContractMode::Fail,
            ..Default::default()
        })
    }

    #[test]
    fn test_monitor_object_registers() {
        let stack = failing_stack();
        let ctx = stack.current_context();
        let user = Arc::new(User { id: 1 });

        let monitor = stack.monitor_object(&ctx, user.clone()).unwrap();
        assert!(Arc::ptr_eq(monitor.object(), &user));
        assert_eq!(monitor.stack_id(), stack.id());
        assert_eq!(stack.monitor_count(), 1);

        drop(monitor);
        assert_eq!(stack.monitor_count(), 0);
    }

    #[test]
    fn test_context_from_other_stack_rejected() {
        let stack = failing_stack();
        let other = failing_stack();
        let foreign = other.current_context();

        let result = stack.monitor_object(&foreign, Arc::new(User { id: 1 }));
        match result {
            Err(MonitorError::Contract(ContractViolation::WrongContext { stack })) => {
                assert_eq!(stack, "TestStack");
            }
            other => panic!("Expected WrongContext, got {:?}", other),
        }
        assert_eq!(stack.monitor_count(), 0);
    }

    #[test]
    fn test_list_without_order_rejected() {
        let stack = failing_stack();
        let ctx = stack.current_context();

        let result = stack.monitor_list(
            &ctx,
            FromClause::<User>::new(),
            vec![Where::eq("active", true).into(), Tweak::FetchLimit(5).into()],
        );
        assert!(matches!(
            result,
            Err(MonitorError::Contract(ContractViolation::MissingOrderBy))
        ));
        assert_eq!(stack.monitor_count(), 0);
    }

    #[test]
    fn test_context_checked_before_ordering() {
        let stack = failing_stack();
        let other = failing_stack();
        let foreign = other.current_context();

        let result = stack.monitor_list(&foreign, FromClause::<User>::new(), vec![]);
        assert!(matches!(
            result,
            Err(MonitorError::Contract(ContractViolation::WrongContext { .. }))
        ));
    }

    #[test]
    fn test_log_mode_builds_monitor_anyway() {
        let stack = DataStack::new(DataStackConfig {
            contract_mode: ContractMode::Log,
            ..Default::default()
        });
        let ctx = stack.current_context();

        let monitor = stack
            .monitor_list(&ctx, FromClause::<User>::new(), vec![Where::always().into()])
            .unwrap();
        assert_eq!(monitor.order_by().count(), 0);
        assert_eq!(stack.monitor_count(), 1);
    }

    #[test]
    fn test_list_monitor_carries_request() {
        let stack = failing_stack();
        let ctx = stack.current_context();

        let monitor = stack
            .monitor_sectioned_list(
                &ctx,
                FromClause::<User>::new(),
                SectionBy::new("department"),
                vec![OrderBy::ascending("department").then_ascending("name").into()],
            )
            .unwrap();

        let request = monitor.fetch_request();
        assert_eq!(request.entity, "User");
        assert_eq!(request.sort_keys.len(), 2);
        assert_eq!(request.section_key_path.as_deref(), Some("department"));
    }

    #[test]
    fn test_explicit_coordinator_thread() {
        let here = thread::current().id();
        let elsewhere = thread::spawn(|| thread::current().id()).join().unwrap();

        let stack = DataStack::new(DataStackConfig {
            coordinator: Some(elsewhere),
            contract_mode: ContractMode::Fail,
            ..Default::default()
        });
        assert_eq!(stack.coordinator_thread(), elsewhere);

        let ctx = stack.current_context();
        assert_eq!(ctx.thread_id(), here);
        assert!(!ctx.is_coordinating());
        assert!(stack.monitor_object(&ctx, Arc::new(User { id: 1 })).is_err());
    }

    #[test]
    fn test_new_exposes_working_broadcaster() {
        let stack = failing_stack();
        let ctx = stack.current_context();
        let user = Arc::new(User { id: 3 });
        let monitor = stack.monitor_object(&ctx, user.clone()).unwrap();

        let broadcaster = stack.broadcaster().expect("new() owns a broadcaster");
        let delivered = broadcaster.publish_object(
            &user.object_ref(),
            ChangeEvent::ObjectDeleted {
                object: user.object_ref(),
            },
        );
        assert_eq!(delivered, 1);
        assert!(matches!(monitor.try_recv(), Ok(ChangeEvent::ObjectDeleted { .. })));
        assert!(monitor.is_object_deleted());
    }

    #[test]
    fn test_custom_tracker_has_no_broadcaster() {
        let tracker: Arc<dyn ChangeTracker> = Arc::new(ChangeBroadcaster::new());
        let stack = DataStack::with_tracker(DataStackConfig::default(), tracker.clone());

        assert!(stack.broadcaster().is_none());
        assert!(Arc::ptr_eq(stack.tracker(), &tracker));
    }

    #[test]
    fn test_accessors_reflect_config() {
        let stack = failing_stack();
        assert_eq!(stack.name(), "TestStack");
        assert_eq!(stack.config().contract_mode, ContractMode::Fail);
        assert_eq!(stack.config().buffer_size, 1000);
        assert_eq!(stack.coordinator_thread(), thread::current().id());
        assert_eq!(stack.current_context().stack_id(), stack.id());
    }
}
