//! Argument-list forms of the list monitor constructors.

/// Create a list monitor from clauses given as separate arguments.
///
/// Each clause is converted with `FetchClause::from` and the call delegates
/// to `DataStack::monitor_list`, so the two forms are interchangeable.
///
/// ```ignore
/// let monitor = monitor_list!(
///     stack,
///     &ctx,
///     FromClause::<User>::new(),
///     Where::eq("active", true),
///     OrderBy::ascending("name"),
/// )?;
/// ```
#[macro_export]
macro_rules! monitor_list {
    ($stack:expr, $ctx:expr, $from:expr $(, $clause:expr)* $(,)?) => {
        $stack.monitor_list(
            $ctx,
            $from,
            ::std::vec![$($crate::FetchClause::from($clause)),*],
        )
    };
}

/// Create a sectioned list monitor from clauses given as separate arguments.
///
/// Delegates to `DataStack::monitor_sectioned_list`.
#[macro_export]
macro_rules! monitor_sectioned_list {
    ($stack:expr, $ctx:expr, $from:expr, $section_by:expr $(, $clause:expr)* $(,)?) => {
        $stack.monitor_sectioned_list(
            $ctx,
            $from,
            $section_by,
            ::std::vec![$($crate::FetchClause::from($clause)),*],
        )
    };
}
