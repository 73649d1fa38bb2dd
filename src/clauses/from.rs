//! Entity source clause.

use crate::types::Entity;
use std::fmt;
use std::marker::PhantomData;

/// Names the entity a list monitor fetches from.
///
/// Optionally restricted to a set of persistent-store configurations; an
/// empty set means every configuration that contains the entity.
pub struct FromClause<T: Entity> {
    configurations: Vec<String>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> FromClause<T> {
    pub fn new() -> Self {
        Self {
            configurations: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Restrict the fetch to the named store configurations.
    pub fn with_configurations<I, S>(mut self, configurations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.configurations = configurations.into_iter().map(Into::into).collect();
        self
    }

    pub fn entity_name(&self) -> &'static str {
        T::ENTITY_NAME
    }

    pub fn configurations(&self) -> &[String] {
        &self.configurations
    }
}

impl<T: Entity> Default for FromClause<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Clone for FromClause<T> {
    fn clone(&self) -> Self {
        Self {
            configurations: self.configurations.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> PartialEq for FromClause<T> {
    fn eq(&self, other: &Self) -> bool {
        self.configurations == other.configurations
    }
}

impl<T: Entity> fmt::Debug for FromClause<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromClause")
            .field("entity", &T::ENTITY_NAME)
            .field("configurations", &self.configurations)
            .finish()
    }
}
