//! List monitor over a fetch-clause-defined result set.

use super::Link;
use crate::clauses::{FetchClause, FetchRequest, FromClause, OrderBy, SectionBy};
use crate::tracking::ChangeEvent;
use crate::types::{Entity, MonitorId, QuerySignature, StackId};
use crossbeam_channel::{RecvError, RecvTimeoutError, TryRecvError};
use std::fmt;
use std::time::Duration;

/// Monitors changes to an ordered, optionally sectioned, list of objects.
pub struct ListMonitor<T: Entity> {
    link: Link,
    from: FromClause<T>,
    section_by: Option<SectionBy>,
    fetch_clauses: Vec<FetchClause>,
    signature: QuerySignature,
    request: FetchRequest,
}

impl<T: Entity> ListMonitor<T> {
    pub(crate) fn new(
        link: Link,
        from: FromClause<T>,
        section_by: Option<SectionBy>,
        fetch_clauses: Vec<FetchClause>,
        signature: QuerySignature,
        request: FetchRequest,
    ) -> Self {
        Self {
            link,
            from,
            section_by,
            fetch_clauses,
            signature,
            request,
        }
    }

    pub fn id(&self) -> MonitorId {
        self.link.id
    }

    pub fn stack_id(&self) -> StackId {
        self.link.stack_id
    }

    pub fn entity(&self) -> &'static str {
        T::ENTITY_NAME
    }

    pub fn from_clause(&self) -> &FromClause<T> {
        &self.from
    }

    pub fn configurations(&self) -> &[String] {
        self.from.configurations()
    }

    /// Clauses exactly as passed at creation.
    pub fn fetch_clauses(&self) -> &[FetchClause] {
        &self.fetch_clauses
    }

    /// The ordering clauses, in creation order.
    pub fn order_by(&self) -> impl Iterator<Item = &OrderBy> + '_ {
        self.fetch_clauses.iter().filter_map(FetchClause::as_order_by)
    }

    pub fn section_by(&self) -> Option<&SectionBy> {
        self.section_by.as_ref()
    }

    pub fn is_sectioned(&self) -> bool {
        self.section_by.is_some()
    }

    /// Signature the tracking engine keys this list by.
    pub fn signature(&self) -> QuerySignature {
        self.signature
    }

    /// Request the tracking engine runs for this list.
    pub fn fetch_request(&self) -> &FetchRequest {
        &self.request
    }

    /// True once the owning stack has been torn down.
    pub fn is_stale(&self) -> bool {
        self.link.is_stale()
    }

    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<ChangeEvent, RecvError> {
        self.link.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<ChangeEvent, TryRecvError> {
        self.link.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<ChangeEvent, RecvTimeoutError> {
        self.link.recv_timeout(timeout)
    }
}

impl<T: Entity> fmt::Debug for ListMonitor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListMonitor")
            .field("id", &self.link.id)
            .field("entity", &T::ENTITY_NAME)
            .field("section_by", &self.section_by)
            .field("clauses", &self.fetch_clauses.len())
            .field("signature", &self.signature)
            .finish()
    }
}
