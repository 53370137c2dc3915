//! Existence checks against directories owned by other parts of the system.
//!
//! Users, groups and categories are weak references from a task's point of
//! view: the task stores their identifiers and checks they resolve at write
//! time, nothing more.

use crate::task::domain::{CategoryId, GroupId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for reference lookups.
pub type ReferenceLookupResult<T> = Result<T, ReferenceLookupError>;

/// Resolves user identifiers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Returns `true` when the user exists.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceLookupError`] when the directory cannot be read.
    async fn user_exists(&self, user_id: UserId) -> ReferenceLookupResult<bool>;
}

/// Resolves study group identifiers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupLookup: Send + Sync {
    /// Returns `true` when the group exists.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceLookupError`] when the directory cannot be read.
    async fn group_exists(&self, group_id: GroupId) -> ReferenceLookupResult<bool>;
}

/// Resolves category identifiers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryLookup: Send + Sync {
    /// Returns `true` when the category exists.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceLookupError`] when the directory cannot be read.
    async fn category_exists(&self, category_id: CategoryId) -> ReferenceLookupResult<bool>;
}

/// Errors returned by reference lookup implementations.
#[derive(Debug, Clone, Error)]
pub enum ReferenceLookupError {
    /// The backing directory could not be queried.
    #[error("reference lookup failed: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ReferenceLookupError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
