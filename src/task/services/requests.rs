//! Request payloads accepted by the task lifecycle service.

use crate::task::domain::{
    CategoryId, FieldUpdate, GroupId, NewTaskData, TaskChanges, TaskDomainError, TaskId,
    TaskPriority, TaskTitle, UserId,
};
use chrono::{DateTime, Utc};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    creator_id: UserId,
    title: String,
    notes: Option<String>,
    priority: Option<TaskPriority>,
    due_date: Option<DateTime<Utc>>,
    group_id: Option<GroupId>,
    category_id: Option<CategoryId>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(creator_id: UserId, title: impl Into<String>) -> Self {
        Self {
            creator_id,
            title: title.into(),
            notes: None,
            priority: None,
            due_date: None,
            group_id: None,
            category_id: None,
        }
    }

    /// Sets task notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets the priority. Defaults to [`TaskPriority::Medium`].
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Places the task in a group.
    #[must_use]
    pub const fn with_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Files the task under a category.
    #[must_use]
    pub const fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn creator_id(&self) -> UserId {
        self.creator_id
    }

    /// Returns the requested group, if any.
    #[must_use]
    pub const fn group_id(&self) -> Option<GroupId> {
        self.group_id
    }

    /// Returns the requested category, if any.
    #[must_use]
    pub const fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    pub(crate) fn into_new_task(self) -> Result<NewTaskData, TaskDomainError> {
        Ok(NewTaskData {
            creator_id: self.creator_id,
            title: TaskTitle::new(self.title)?,
            notes: self.notes,
            priority: self.priority.unwrap_or_default(),
            due_date: self.due_date,
            group_id: self.group_id,
            category_id: self.category_id,
        })
    }
}

/// Request payload for a partial task update.
///
/// Fields that are never set on the request stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    notes: FieldUpdate<String>,
    priority: Option<TaskPriority>,
    due_date: FieldUpdate<DateTime<Utc>>,
    group_id: FieldUpdate<GroupId>,
    category_id: FieldUpdate<CategoryId>,
}

impl UpdateTaskRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = FieldUpdate::Set(notes.into());
        self
    }

    /// Removes the notes.
    #[must_use]
    pub fn clear_notes(mut self) -> Self {
        self.notes = FieldUpdate::Clear;
        self
    }

    /// Replaces the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Replaces the deadline.
    #[must_use]
    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = FieldUpdate::Set(due_date);
        self
    }

    /// Removes the deadline.
    #[must_use]
    pub fn clear_due_date(mut self) -> Self {
        self.due_date = FieldUpdate::Clear;
        self
    }

    /// Moves the task to a group.
    #[must_use]
    pub fn with_group(mut self, group_id: GroupId) -> Self {
        self.group_id = FieldUpdate::Set(group_id);
        self
    }

    /// Removes the task from its group.
    #[must_use]
    pub fn clear_group(mut self) -> Self {
        self.group_id = FieldUpdate::Clear;
        self
    }

    /// Files the task under a category.
    #[must_use]
    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = FieldUpdate::Set(category_id);
        self
    }

    /// Removes the task's category.
    #[must_use]
    pub fn clear_category(mut self) -> Self {
        self.category_id = FieldUpdate::Clear;
        self
    }

    pub(crate) fn into_changes(self) -> Result<TaskChanges, TaskDomainError> {
        Ok(TaskChanges {
            title: self.title.map(TaskTitle::new).transpose()?,
            notes: self.notes,
            priority: self.priority,
            due_date: self.due_date,
            group_id: self.group_id,
            category_id: self.category_id,
        })
    }
}

/// Request payload for a status change expressed as a raw string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTaskRequest {
    task_id: TaskId,
    target_status: String,
}

impl TransitionTaskRequest {
    /// Creates a transition request.
    #[must_use]
    pub fn new(task_id: TaskId, target_status: impl Into<String>) -> Self {
        Self {
            task_id,
            target_status: target_status.into(),
        }
    }

    /// Returns the task to transition.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the requested status as supplied.
    #[must_use]
    pub fn target_status(&self) -> &str {
        &self.target_status
    }
}
