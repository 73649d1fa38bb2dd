//! Concrete fetch request built from clauses.

use super::fetch::{FetchClause, Predicate, SortKey, Tweak};
use super::from::FromClause;
use super::section::SectionBy;
use crate::error::Result;
use crate::types::{Entity, QuerySignature};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The query a tracking engine runs for a list monitor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub entity: String,
    pub configurations: Vec<String>,
    /// Conjunction of every `Where` clause (None = no filter).
    pub predicate: Option<Predicate>,
    /// Sort keys from every `OrderBy` clause, in clause order.
    pub sort_keys: Vec<SortKey>,
    pub section_key_path: Option<String>,
    pub fetch_limit: Option<usize>,
    pub fetch_offset: usize,
    pub batch_size: Option<usize>,
    pub includes_pending_changes: bool,
    pub hints: BTreeMap<String, Value>,
}

impl FetchRequest {
    /// Empty request for an entity.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            configurations: Vec::new(),
            predicate: None,
            sort_keys: Vec::new(),
            section_key_path: None,
            fetch_limit: None,
            fetch_offset: 0,
            batch_size: None,
            includes_pending_changes: true,
            hints: BTreeMap::new(),
        }
    }

    /// Build a request by applying clauses in order.
    pub fn build<T: Entity>(
        from: &FromClause<T>,
        section_by: Option<&SectionBy>,
        clauses: &[FetchClause],
    ) -> Self {
        let mut request = FetchRequest::new(from.entity_name());
        request.configurations = from.configurations().to_vec();
        request.section_key_path = section_by.map(|s| s.key_path.clone());
        for clause in clauses {
            request.apply(clause);
        }
        request
    }

    /// Apply one clause. Filters AND together, sort keys append, tweaks
    /// override earlier tweaks of the same kind.
    pub fn apply(&mut self, clause: &FetchClause) {
        match clause {
            FetchClause::Where(w) => {
                let predicate = w.predicate().clone();
                self.predicate = Some(match self.predicate.take() {
                    Some(existing) => existing.and(predicate),
                    None => predicate,
                });
            }
            FetchClause::OrderBy(order) => {
                self.sort_keys.extend(order.keys.iter().cloned());
            }
            FetchClause::Tweak(tweak) => match tweak {
                Tweak::FetchLimit(n) => self.fetch_limit = Some(*n),
                Tweak::FetchOffset(n) => self.fetch_offset = *n,
                Tweak::BatchSize(n) => self.batch_size = Some(*n),
                Tweak::IncludesPendingChanges(b) => self.includes_pending_changes = *b,
                Tweak::Hint { name, value } => {
                    self.hints.insert(name.clone(), value.clone());
                }
            },
        }
    }

    pub fn is_sectioned(&self) -> bool {
        self.section_key_path.is_some()
    }
}

/// Canonical form hashed into a query signature.
#[derive(Serialize)]
struct CanonicalQuery<'a> {
    entity: &'a str,
    configurations: &'a [String],
    section_by: Option<&'a SectionBy>,
    clauses: &'a [FetchClause],
}

/// Signature of a list query.
///
/// Depends on the entity, configurations, section key and the exact clause
/// sequence, so tracking engines can key lists without holding monitors.
pub fn query_signature<T: Entity>(
    from: &FromClause<T>,
    section_by: Option<&SectionBy>,
    clauses: &[FetchClause],
) -> Result<QuerySignature> {
    let canonical = CanonicalQuery {
        entity: from.entity_name(),
        configurations: from.configurations(),
        section_by,
        clauses,
    };
    let bytes = serde_json::to_vec(&canonical)?;
    Ok(QuerySignature::from_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clauses::{OrderBy, SortDirection, Where};
    use crate::types::ObjectId;

    struct User;

    impl Entity for User {
        const ENTITY_NAME: &'static str = "User";

        fn object_id(&self) -> ObjectId {
            ObjectId(0)
        }
    }

    #[test]
    fn test_build_combines_filters() {
        let clauses = vec![
            FetchClause::from(Where::eq("active", true)),
            FetchClause::from(OrderBy::ascending("name")),
            FetchClause::from(Where::gt("age", 30)),
        ];
        let request = FetchRequest::build(&FromClause::<User>::new(), None, &clauses);

        assert_eq!(request.entity, "User");
        assert_eq!(
            request.predicate,
            Some((Where::eq("active", true) & Where::gt("age", 30)).0)
        );
        assert_eq!(request.sort_keys.len(), 1);
        assert!(!request.is_sectioned());
    }

    #[test]
    fn test_build_appends_sort_keys_in_order() {
        let clauses = vec![
            FetchClause::from(OrderBy::descending("department")),
            FetchClause::from(OrderBy::ascending("name")),
        ];
        let request = FetchRequest::build(
            &FromClause::<User>::new(),
            Some(&SectionBy::new("department")),
            &clauses,
        );

        let paths: Vec<_> = request.sort_keys.iter().map(|k| k.key_path.as_str()).collect();
        assert_eq!(paths, vec!["department", "name"]);
        assert_eq!(request.sort_keys[0].direction, SortDirection::Descending);
        assert_eq!(request.section_key_path.as_deref(), Some("department"));
    }

    #[test]
    fn test_last_tweak_wins() {
        let clauses = vec![
            FetchClause::from(Tweak::FetchLimit(10)),
            FetchClause::from(Tweak::IncludesPendingChanges(false)),
            FetchClause::from(Tweak::FetchLimit(25)),
            FetchClause::from(Tweak::hint("prefetch", "department")),
        ];
        let request = FetchRequest::build(
            &FromClause::<User>::new().with_configurations(["Cloud"]),
            None,
            &clauses,
        );

        assert_eq!(request.fetch_limit, Some(25));
        assert!(!request.includes_pending_changes);
        assert_eq!(request.configurations, vec!["Cloud".to_string()]);
        assert_eq!(request.hints.get("prefetch"), Some(&Value::from("department")));
        assert!(request.predicate.is_none());
    }

    #[test]
    fn test_signature_tracks_clause_order() {
        let from = FromClause::<User>::new();
        let a = vec![
            FetchClause::from(Where::eq("active", true)),
            FetchClause::from(OrderBy::ascending("name")),
        ];
        let b = vec![a[1].clone(), a[0].clone()];

        let sig_a = query_signature(&from, None, &a).unwrap();
        assert_eq!(sig_a, query_signature(&from, None, &a.clone()).unwrap());
        assert_ne!(sig_a, query_signature(&from, None, &b).unwrap());
        assert_ne!(
            sig_a,
            query_signature(&from, Some(&SectionBy::new("department")), &a).unwrap()
        );
    }
}
