//! Transactional persistence port for tasks and their assignments.

use crate::task::domain::{Task, TaskAssignment, TaskFilter, TaskId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Scoped repository handles valid for the duration of one transaction.
///
/// Every write made through a unit of work becomes visible to other callers
/// only when the enclosing [`TaskStore::transaction`] commits.
pub trait TaskUnitOfWork {
    /// Finds a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the lookup fails.
    fn find_task(&mut self, id: TaskId) -> TaskStoreResult<Option<Task>>;

    /// Finds a task and locks it against concurrent writers until the
    /// transaction ends.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the lookup fails.
    fn find_task_for_update(&mut self, id: TaskId) -> TaskStoreResult<Option<Task>>;

    /// Returns tasks matching `filter`, ordered by creation time then id.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the query fails.
    fn find_tasks(&mut self, filter: &TaskFilter) -> TaskStoreResult<Vec<Task>>;

    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the identifier is
    /// already taken.
    fn insert_task(&mut self, task: &Task) -> TaskStoreResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    fn save_task(&mut self, task: &Task) -> TaskStoreResult<()>;

    /// Deletes a task row. Returns `false` when no row existed.
    ///
    /// Assignment rows are not cascaded; callers remove them first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the delete fails.
    fn delete_task(&mut self, id: TaskId) -> TaskStoreResult<bool>;

    /// Finds the assignment for a (task, user) pair.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the lookup fails.
    fn find_assignment(
        &mut self,
        task_id: TaskId,
        user_id: UserId,
    ) -> TaskStoreResult<Option<TaskAssignment>>;

    /// Returns every assignment of a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the query fails.
    fn find_assignments(&mut self, task_id: TaskId) -> TaskStoreResult<Vec<TaskAssignment>>;

    /// Stores a new assignment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateAssignment`] when the pair is
    /// already assigned.
    fn insert_assignment(&mut self, assignment: &TaskAssignment) -> TaskStoreResult<()>;

    /// Deletes the assignment for a (task, user) pair. Returns `false` when
    /// no row existed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the delete fails.
    fn delete_assignment(&mut self, task_id: TaskId, user_id: UserId) -> TaskStoreResult<bool>;

    /// Deletes every assignment of a task and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the delete fails.
    fn delete_assignments_for_task(&mut self, task_id: TaskId) -> TaskStoreResult<usize>;
}

/// Task persistence contract built around atomic units of work.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Runs `work` inside one atomic transaction.
    ///
    /// The transaction commits when `work` returns `Ok` and rolls back when
    /// it returns `Err`, after which the error is handed back unchanged.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or a [`TaskStoreError`]
    /// converted into `E` when the transaction itself cannot be opened or
    /// committed.
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskUnitOfWork) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TaskStoreError> + Send + 'static;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The (task, user) pair already has an assignment row.
    #[error("user {user_id} is already assigned to task {task_id}")]
    DuplicateAssignment {
        /// Assigned task.
        task_id: TaskId,
        /// Assigned user.
        user_id: UserId,
    },

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The transaction lost a race with a concurrent writer and was rolled
    /// back. Running it again may succeed.
    #[error("transaction conflict: {0}")]
    Conflict(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Wraps a serialization or write-conflict error.
    pub fn conflict(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Conflict(Arc::new(err))
    }
}
