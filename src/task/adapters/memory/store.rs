//! In-memory task store with snapshot transactions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::task::{
    domain::{AssignmentId, Task, TaskAssignment, TaskFilter, TaskId, UserId},
    ports::{TaskStore, TaskStoreError, TaskStoreResult, TaskUnitOfWork},
};

/// Thread-safe in-memory task store.
///
/// Transactions run one at a time against a staged copy of the state. The
/// copy replaces the committed state only when the unit of work succeeds.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<Mutex<InMemoryTaskState>>,
}

#[derive(Debug, Clone, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    assignments: HashMap<AssignmentId, TaskAssignment>,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(|left, right| {
        left.created_at()
            .cmp(&right.created_at())
            .then_with(|| left.id().cmp(&right.id()))
    });
}

impl InMemoryTaskState {
    fn assignments_of(&self, task_id: TaskId) -> impl Iterator<Item = &TaskAssignment> {
        self.assignments
            .values()
            .filter(move |assignment| assignment.task_id() == task_id)
    }

    fn is_assigned(&self, task_id: TaskId, user_id: UserId) -> bool {
        self.assignments_of(task_id)
            .any(|assignment| assignment.user_id() == user_id)
    }
}

impl TaskUnitOfWork for InMemoryTaskState {
    fn find_task(&mut self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        Ok(self.tasks.get(&id).cloned())
    }

    fn find_task_for_update(&mut self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        // Transactions already hold the store-wide lock.
        self.find_task(id)
    }

    fn find_tasks(&mut self, filter: &TaskFilter) -> TaskStoreResult<Vec<Task>> {
        let mut found: Vec<Task> = self
            .tasks
            .values()
            .filter(|task| filter.matches_task(task))
            .filter(|task| {
                filter
                    .assignee_id
                    .is_none_or(|user_id| self.is_assigned(task.id(), user_id))
            })
            .cloned()
            .collect();
        sort_tasks(&mut found);
        Ok(found)
    }

    fn insert_task(&mut self, task: &Task) -> TaskStoreResult<()> {
        if self.tasks.contains_key(&task.id()) {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }
        self.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    fn save_task(&mut self, task: &Task) -> TaskStoreResult<()> {
        let stored = self
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskStoreError::NotFound(task.id()))?;
        *stored = task.clone();
        Ok(())
    }

    fn delete_task(&mut self, id: TaskId) -> TaskStoreResult<bool> {
        Ok(self.tasks.remove(&id).is_some())
    }

    fn find_assignment(
        &mut self,
        task_id: TaskId,
        user_id: UserId,
    ) -> TaskStoreResult<Option<TaskAssignment>> {
        Ok(self
            .assignments_of(task_id)
            .find(|assignment| assignment.user_id() == user_id)
            .cloned())
    }

    fn find_assignments(&mut self, task_id: TaskId) -> TaskStoreResult<Vec<TaskAssignment>> {
        let mut found: Vec<TaskAssignment> = self.assignments_of(task_id).cloned().collect();
        found.sort_by(|left, right| {
            left.assigned_at()
                .cmp(&right.assigned_at())
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(found)
    }

    fn insert_assignment(&mut self, assignment: &TaskAssignment) -> TaskStoreResult<()> {
        if self.is_assigned(assignment.task_id(), assignment.user_id()) {
            return Err(TaskStoreError::DuplicateAssignment {
                task_id: assignment.task_id(),
                user_id: assignment.user_id(),
            });
        }
        self.assignments.insert(assignment.id(), assignment.clone());
        Ok(())
    }

    fn delete_assignment(&mut self, task_id: TaskId, user_id: UserId) -> TaskStoreResult<bool> {
        let before = self.assignments.len();
        self.assignments.retain(|_, assignment| {
            !(assignment.task_id() == task_id && assignment.user_id() == user_id)
        });
        Ok(self.assignments.len() < before)
    }

    fn delete_assignments_for_task(&mut self, task_id: TaskId) -> TaskStoreResult<usize> {
        let before = self.assignments.len();
        self.assignments
            .retain(|_, assignment| assignment.task_id() != task_id);
        Ok(before - self.assignments.len())
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskUnitOfWork) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TaskStoreError> + Send + 'static,
    {
        let mut committed = self.state.lock().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut staged = committed.clone();
        let output = work(&mut staged)?;
        *committed = staged;
        Ok(output)
    }
}
