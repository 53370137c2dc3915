//! Assignment records linking tasks to responsible users.

use super::{AssignmentId, TaskId, UserId, task::current_time};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Join record linking a task to one assignee.
///
/// The record belongs to its task and never outlives it. The user is only
/// referenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssignment {
    id: AssignmentId,
    task_id: TaskId,
    user_id: UserId,
    assigned_at: DateTime<Utc>,
}

impl TaskAssignment {
    /// Creates a new assignment stamped with the current clock time.
    #[must_use]
    pub fn new(task_id: TaskId, user_id: UserId, clock: &impl Clock) -> Self {
        Self {
            id: AssignmentId::new(),
            task_id,
            user_id,
            assigned_at: current_time(clock),
        }
    }

    /// Reconstructs an assignment from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: AssignmentId,
        task_id: TaskId,
        user_id: UserId,
        assigned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task_id,
            user_id,
            assigned_at,
        }
    }

    /// Returns the assignment identifier.
    #[must_use]
    pub const fn id(&self) -> AssignmentId {
        self.id
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the assigned user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns when the assignment was created.
    #[must_use]
    pub const fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }
}
