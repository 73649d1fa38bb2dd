//! Property tests for monitor creation contracts.

use datastack_monitor::{
    ContractMode, ContractViolation, DataStack, DataStackConfig, Entity, FetchClause, FromClause,
    MonitorError, ObjectId, OrderBy, SectionBy, Tweak, Where,
};
use proptest::prelude::*;
use std::sync::Arc;

struct Visitor {
    id: u64,
}

impl Entity for Visitor {
    const ENTITY_NAME: &'static str = "Visitor";

    fn object_id(&self) -> ObjectId {
        ObjectId(self.id)
    }
}

fn stack() -> DataStack {
    DataStack::new(DataStackConfig {
        contract_mode: ContractMode::Fail,
        ..Default::default()
    })
}

fn key_path() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn where_clause() -> impl Strategy<Value = FetchClause> {
    prop_oneof![
        (key_path(), any::<i64>()).prop_map(|(k, v)| FetchClause::from(Where::eq(k, v))),
        (key_path(), "[a-z]{0,6}").prop_map(|(k, v)| FetchClause::from(Where::ne(k, v))),
        key_path().prop_map(|k| FetchClause::from(Where::is_null(k))),
    ]
}

fn tweak_clause() -> impl Strategy<Value = FetchClause> {
    prop_oneof![
        (0usize..500).prop_map(|n| FetchClause::from(Tweak::FetchLimit(n))),
        (0usize..500).prop_map(|n| FetchClause::from(Tweak::FetchOffset(n))),
        any::<bool>().prop_map(|b| FetchClause::from(Tweak::IncludesPendingChanges(b))),
    ]
}

fn order_clause() -> impl Strategy<Value = FetchClause> {
    (key_path(), any::<bool>()).prop_map(|(k, asc)| {
        if asc {
            FetchClause::from(OrderBy::ascending(k))
        } else {
            FetchClause::from(OrderBy::descending(k))
        }
    })
}

fn unordered_clauses() -> impl Strategy<Value = Vec<FetchClause>> {
    prop::collection::vec(prop_oneof![where_clause(), tweak_clause()], 0..8)
}

/// Clause lists containing at least one OrderBy at an arbitrary position.
fn ordered_clauses() -> impl Strategy<Value = Vec<FetchClause>> {
    (unordered_clauses(), order_clause(), any::<prop::sample::Index>()).prop_map(
        |(mut clauses, order, index)| {
            let at = index.index(clauses.len() + 1);
            clauses.insert(at, order);
            clauses
        },
    )
}

fn any_clauses() -> impl Strategy<Value = Vec<FetchClause>> {
    prop_oneof![unordered_clauses(), ordered_clauses()]
}

proptest! {
    #[test]
    fn ordered_lists_keep_their_clauses(clauses in ordered_clauses()) {
        let stack = stack();
        let ctx = stack.current_context();

        let monitor = stack
            .monitor_list(&ctx, FromClause::<Visitor>::new(), clauses.clone())
            .unwrap();
        prop_assert_eq!(monitor.fetch_clauses(), clauses.as_slice());
        prop_assert!(monitor.order_by().count() >= 1);
    }

    #[test]
    fn unordered_lists_are_rejected(clauses in unordered_clauses(), sectioned in any::<bool>()) {
        let stack = stack();
        let ctx = stack.current_context();

        let result = if sectioned {
            stack.monitor_sectioned_list(
                &ctx,
                FromClause::<Visitor>::new(),
                SectionBy::new("company"),
                clauses,
            )
        } else {
            stack.monitor_list(&ctx, FromClause::<Visitor>::new(), clauses)
        };
        prop_assert!(matches!(
            result,
            Err(MonitorError::Contract(ContractViolation::MissingOrderBy))
        ));
        prop_assert_eq!(stack.monitor_count(), 0);
    }

    #[test]
    fn foreign_context_is_rejected(clauses in any_clauses(), id in any::<u64>()) {
        let other = stack();
        let stack = stack();
        let foreign = other.current_context();

        let list = stack.monitor_list(&foreign, FromClause::<Visitor>::new(), clauses.clone());
        let is_wrong_context = matches!(
            list,
            Err(MonitorError::Contract(ContractViolation::WrongContext { .. }))
        );
        prop_assert!(is_wrong_context);

        let sectioned = stack.monitor_sectioned_list(
            &foreign,
            FromClause::<Visitor>::new(),
            SectionBy::new("company"),
            clauses,
        );
        let is_wrong_context = matches!(
            sectioned,
            Err(MonitorError::Contract(ContractViolation::WrongContext { .. }))
        );
        prop_assert!(is_wrong_context);

        let object = stack.monitor_object(&foreign, Arc::new(Visitor { id }));
        prop_assert!(object.is_err());
        prop_assert_eq!(stack.monitor_count(), 0);
    }

    #[test]
    fn sectioning_only_adds_the_key(clauses in ordered_clauses(), key in key_path()) {
        let stack = stack();
        let ctx = stack.current_context();

        let plain = stack
            .monitor_list(&ctx, FromClause::<Visitor>::new(), clauses.clone())
            .unwrap();
        let sectioned = stack
            .monitor_sectioned_list(&ctx, FromClause::<Visitor>::new(), SectionBy::new(key.clone()), clauses)
            .unwrap();

        prop_assert_eq!(plain.fetch_clauses(), sectioned.fetch_clauses());
        prop_assert_eq!(sectioned.section_by().map(|s| s.key_path.clone()), Some(key));
        prop_assert!(plain.section_by().is_none());
    }
}
