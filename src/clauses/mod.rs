//! Fetch clauses describing what a list monitor observes.
//!
//! A list request is a [`FromClause`] naming the entity plus an ordered
//! sequence of [`FetchClause`]s:
//! - [`Where`] narrows the result set with a predicate
//! - [`OrderBy`] sorts it (at least one is required by list monitors)
//! - [`Tweak`] adjusts the generated request (limits, batching, hints)
//!
//! An optional [`SectionBy`] partitions the list into named groups.
//!
//! # Example
//!
//! ```ignore
//! let clauses = vec![
//!     FetchClause::from(Where::eq("active", true)),
//!     FetchClause::from(OrderBy::ascending("name")),
//!     FetchClause::from(Tweak::FetchLimit(50)),
//! ];
//! let request = FetchRequest::build(&FromClause::<User>::new(), None, &clauses);
//! assert_eq!(request.fetch_limit, Some(50));
//! ```

mod fetch;
mod from;
mod request;
mod section;

pub use fetch::{Comparison, FetchClause, OrderBy, Predicate, SortDirection, SortKey, Tweak, Where};
pub use from::FromClause;
pub use request::{query_signature, FetchRequest};
pub use section::SectionBy;
