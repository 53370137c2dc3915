//! Query filter for task listings.

use super::{CategoryId, GroupId, Task, TaskPriority, TaskStatus, UserId};
use chrono::{DateTime, Utc};

/// Conjunctive filter for task listings. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Only tasks in this status.
    pub status: Option<TaskStatus>,
    /// Only tasks with this priority.
    pub priority: Option<TaskPriority>,
    /// Only tasks created by this user.
    pub creator_id: Option<UserId>,
    /// Only tasks in this group.
    pub group_id: Option<GroupId>,
    /// Only tasks in this category.
    pub category_id: Option<CategoryId>,
    /// Only tasks assigned to this user.
    pub assignee_id: Option<UserId>,
    /// Only tasks overdue at this instant.
    pub overdue_at: Option<DateTime<Utc>>,
}

impl TaskFilter {
    /// Creates a filter matching every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the filter to a status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts the filter to a priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Restricts the filter to a creator.
    #[must_use]
    pub const fn with_creator(mut self, creator_id: UserId) -> Self {
        self.creator_id = Some(creator_id);
        self
    }

    /// Restricts the filter to a group.
    #[must_use]
    pub const fn with_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Restricts the filter to a category.
    #[must_use]
    pub const fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Restricts the filter to tasks assigned to a user.
    #[must_use]
    pub const fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Restricts the filter to tasks overdue at `now`.
    #[must_use]
    pub const fn overdue_at(mut self, now: DateTime<Utc>) -> Self {
        self.overdue_at = Some(now);
        self
    }

    /// Evaluates every criterion that depends on the task row alone.
    ///
    /// The assignee criterion needs assignment rows and is left to the
    /// store.
    #[must_use]
    pub fn matches_task(&self, task: &Task) -> bool {
        self.status.is_none_or(|status| task.status() == status)
            && self.priority.is_none_or(|priority| task.priority() == priority)
            && self.creator_id.is_none_or(|creator| task.creator_id() == creator)
            && self.group_id.is_none_or(|group| task.group_id() == Some(group))
            && self
                .category_id
                .is_none_or(|category| task.category_id() == Some(category))
            && self.overdue_at.is_none_or(|now| task.is_overdue(now))
    }
}
