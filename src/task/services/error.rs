//! Service-level errors for task lifecycle operations.

use crate::task::{
    domain::{CategoryId, GroupId, ParseTaskStatusError, TaskDomainError, TaskId, UserId},
    ports::{ReferenceLookupError, TaskStoreError},
};
use std::fmt;
use thiserror::Error;

/// Reference to an entity owned outside the task engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    /// A user.
    User(UserId),
    /// A study group.
    Group(GroupId),
    /// A task category.
    Category(CategoryId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user {id}"),
            Self::Group(id) => write!(f, "group {id}"),
            Self::Category(id) => write!(f, "category {id}"),
        }
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// No task exists with the given identifier.
    #[error("task {0} not found")]
    NotFound(TaskId),
    /// A supplied user, group or category does not resolve.
    #[error("referenced {0} not found")]
    ReferenceNotFound(EntityRef),
    /// A raw status string did not name a known status.
    #[error(transparent)]
    InvalidStatus(#[from] ParseTaskStatusError),
    /// Store operation failed.
    #[error(transparent)]
    Storage(#[from] TaskStoreError),
    /// Reference lookup failed.
    #[error(transparent)]
    Lookup(#[from] ReferenceLookupError),
}

/// Coarse classification of [`TaskLifecycleError`] for callers that map
/// errors onto responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskLifecycleErrorKind {
    /// The task does not exist.
    NotFound,
    /// A referenced user, group or category does not exist.
    ReferenceNotFound,
    /// The status change violates the state machine.
    InvalidTransition,
    /// The input is malformed.
    InvalidInput,
    /// Storage or a lookup directory failed.
    StorageFailure,
}

impl TaskLifecycleError {
    /// Returns the error's classification.
    #[must_use]
    pub const fn kind(&self) -> TaskLifecycleErrorKind {
        match self {
            Self::NotFound(_) | Self::Storage(TaskStoreError::NotFound(_)) => {
                TaskLifecycleErrorKind::NotFound
            }
            Self::ReferenceNotFound(_) => TaskLifecycleErrorKind::ReferenceNotFound,
            Self::Domain(TaskDomainError::InvalidTransition { .. }) => {
                TaskLifecycleErrorKind::InvalidTransition
            }
            Self::Domain(TaskDomainError::EmptyTitle | TaskDomainError::TitleTooLong { .. })
            | Self::InvalidStatus(_) => TaskLifecycleErrorKind::InvalidInput,
            Self::Storage(_) | Self::Lookup(_) => TaskLifecycleErrorKind::StorageFailure,
        }
    }
}

impl TaskLifecycleError {
    /// Returns `true` when running the same operation again may succeed:
    /// the store reported a write conflict, or a concurrent writer inserted
    /// the assignment first.
    #[must_use]
    pub(crate) const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Storage(TaskStoreError::Conflict(_) | TaskStoreError::DuplicateAssignment { .. })
        )
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;
