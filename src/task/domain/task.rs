//! Task aggregate root.

use super::{
    CategoryId, GroupId, TaskChanges, TaskDomainError, TaskId, TaskPriority, TaskStatus, UserId,
};
use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Truncates `timestamp` to the microsecond precision `PostgreSQL` stores,
/// so a task read back from storage equals the value that was written.
pub(super) fn to_storage_precision(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp.trunc_subsecs(6)
}

/// Reads `clock` at storage precision.
pub(super) fn current_time(clock: &impl Clock) -> DateTime<Utc> {
    to_storage_precision(clock.utc())
}

/// Validated, trimmed, non-empty task title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Maximum title length in characters.
    pub const MAX_CHARS: usize = 255;

    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the value is empty after
    /// trimming, or [`TaskDomainError::TitleTooLong`] when it is longer than
    /// [`Self::MAX_CHARS`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_CHARS {
            return Err(TaskDomainError::TitleTooLong {
                max: Self::MAX_CHARS,
                actual: length,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskTitle {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskTitle> for String {
    fn from(title: TaskTitle) -> Self {
        title.0
    }
}

impl AsRef<str> for TaskTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parameter object for creating a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskData {
    /// User creating the task.
    pub creator_id: UserId,
    /// Validated title.
    pub title: TaskTitle,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Initial priority.
    pub priority: TaskPriority,
    /// Optional deadline.
    pub due_date: Option<DateTime<Utc>>,
    /// Optional owning group, already checked for existence.
    pub group_id: Option<GroupId>,
    /// Optional category, already checked for existence.
    pub category_id: Option<CategoryId>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted creator reference.
    pub creator_id: UserId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted notes.
    pub notes: Option<String>,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Persisted deadline.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted group reference.
    pub group_id: Option<GroupId>,
    /// Persisted category reference.
    pub category_id: Option<CategoryId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    creator_id: UserId,
    title: TaskTitle,
    notes: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
    group_id: Option<GroupId>,
    category_id: Option<CategoryId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task in [`TaskStatus::Open`].
    #[must_use]
    pub fn new(data: NewTaskData, clock: &impl Clock) -> Self {
        let timestamp = current_time(clock);
        Self {
            id: TaskId::new(),
            creator_id: data.creator_id,
            title: data.title,
            notes: data.notes,
            status: TaskStatus::Open,
            priority: data.priority,
            due_date: data.due_date.map(to_storage_precision),
            group_id: data.group_id,
            category_id: data.category_id,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            creator_id: data.creator_id,
            title: data.title,
            notes: data.notes,
            status: data.status,
            priority: data.priority,
            due_date: data.due_date,
            group_id: data.group_id,
            category_id: data.category_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn creator_id(&self) -> UserId {
        self.creator_id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the task notes, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the owning group, if any.
    #[must_use]
    pub const fn group_id(&self) -> Option<GroupId> {
        self.group_id
    }

    /// Returns the category, if any.
    #[must_use]
    pub const fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the task to `target` along a permitted state machine edge.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when the edge is not
    /// permitted. The task is left unchanged.
    pub fn set_status(
        &mut self,
        target: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.touch(clock);
        Ok(())
    }

    /// Returns `true` when the deadline lies strictly before `now` and the
    /// task is not completed.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != TaskStatus::Completed && self.due_date.is_some_and(|due| due < now)
    }

    /// Applies the fields present in `changes`.
    ///
    /// Referenced groups and categories must already have been validated.
    /// An empty change set leaves the task, including its timestamp,
    /// untouched.
    pub fn apply_changes(&mut self, changes: TaskChanges, clock: &impl Clock) {
        if changes.is_empty() {
            return;
        }
        let TaskChanges {
            title,
            notes,
            priority,
            due_date,
            group_id,
            category_id,
        } = changes;

        if let Some(new_title) = title {
            self.title = new_title;
        }
        if let Some(new_priority) = priority {
            self.priority = new_priority;
        }
        notes.apply_to(&mut self.notes);
        due_date
            .map(to_storage_precision)
            .apply_to(&mut self.due_date);
        group_id.apply_to(&mut self.group_id);
        category_id.apply_to(&mut self.category_id);
        self.touch(clock);
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = current_time(clock);
    }
}
