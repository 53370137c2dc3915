//! Diesel row models for task persistence and their domain conversions.

use super::schema::{task_assignments, tasks};
use crate::task::{
    domain::{
        AssignmentId, CategoryId, GroupId, PersistedTaskData, Task, TaskAssignment, TaskId,
        TaskPriority, TaskStatus, TaskTitle, UserId,
    },
    ports::{TaskStoreError, TaskStoreResult},
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Query result row for task records.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: Uuid,
    /// Creating user.
    pub creator_id: Uuid,
    /// Task title.
    pub title: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Optional deadline.
    pub due_date: Option<DateTime<Utc>>,
    /// Optional owning group.
    pub group_id: Option<Uuid>,
    /// Optional category.
    pub category_id: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for task records.
///
/// `None` values are written as `NULL` so cleared fields stay cleared.
#[derive(Debug, Clone, PartialEq, Eq, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskRecord {
    /// Internal task identifier.
    pub id: Uuid,
    /// Creating user.
    pub creator_id: Uuid,
    /// Task title.
    pub title: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Optional deadline.
    pub due_date: Option<DateTime<Utc>>,
    /// Optional owning group.
    pub group_id: Option<Uuid>,
    /// Optional category.
    pub category_id: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query and insert row for assignment records.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AssignmentRow {
    /// Assignment identifier.
    pub id: Uuid,
    /// Owning task.
    pub task_id: Uuid,
    /// Assigned user.
    pub user_id: Uuid,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
}

/// Maps a domain task onto its storage record.
#[must_use]
pub fn task_to_record(task: &Task) -> TaskRecord {
    TaskRecord {
        id: task.id().into_inner(),
        creator_id: task.creator_id().into_inner(),
        title: task.title().to_owned(),
        notes: task.notes().map(str::to_owned),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        due_date: task.due_date(),
        group_id: task.group_id().map(GroupId::into_inner),
        category_id: task.category_id().map(CategoryId::into_inner),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

/// Rebuilds a domain task from a storage row.
///
/// # Errors
///
/// Returns [`TaskStoreError::Persistence`] when the row holds a status,
/// priority or title the domain rejects.
pub fn row_to_task(row: TaskRow) -> TaskStoreResult<Task> {
    let TaskRow {
        id,
        creator_id,
        title,
        notes,
        status,
        priority,
        due_date,
        group_id,
        category_id,
        created_at,
        updated_at,
    } = row;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        creator_id: UserId::from_uuid(creator_id),
        title: TaskTitle::new(title).map_err(TaskStoreError::persistence)?,
        notes,
        status: TaskStatus::try_from(status.as_str()).map_err(TaskStoreError::persistence)?,
        priority: TaskPriority::try_from(priority.as_str())
            .map_err(TaskStoreError::persistence)?,
        due_date,
        group_id: group_id.map(GroupId::from_uuid),
        category_id: category_id.map(CategoryId::from_uuid),
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}

/// Maps a domain assignment onto its storage row.
#[must_use]
pub fn assignment_to_row(assignment: &TaskAssignment) -> AssignmentRow {
    AssignmentRow {
        id: assignment.id().into_inner(),
        task_id: assignment.task_id().into_inner(),
        user_id: assignment.user_id().into_inner(),
        assigned_at: assignment.assigned_at(),
    }
}

/// Rebuilds a domain assignment from a storage row.
#[must_use]
pub fn row_to_assignment(row: AssignmentRow) -> TaskAssignment {
    TaskAssignment::from_persisted(
        AssignmentId::from_uuid(row.id),
        TaskId::from_uuid(row.task_id),
        UserId::from_uuid(row.user_id),
        row.assigned_at,
    )
}
