//! Partial change sets applied to existing tasks.

use super::{CategoryId, GroupId, TaskPriority, TaskTitle};
use chrono::{DateTime, Utc};

/// Update instruction for an optional task field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Leave the stored value untouched.
    #[default]
    Unchanged,
    /// Remove the stored value.
    Clear,
    /// Replace the stored value.
    Set(T),
}

impl<T> FieldUpdate<T> {
    /// Returns the newly supplied value, if any.
    #[must_use]
    pub const fn new_value(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unchanged | Self::Clear => None,
        }
    }

    /// Returns `true` when the field is left untouched.
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// Transforms a supplied value, keeping `Unchanged` and `Clear` as they
    /// are.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldUpdate<U> {
        match self {
            Self::Unchanged => FieldUpdate::Unchanged,
            Self::Clear => FieldUpdate::Clear,
            Self::Set(value) => FieldUpdate::Set(f(value)),
        }
    }

    /// Writes the update into `field`.
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            Self::Unchanged => {}
            Self::Clear => *field = None,
            Self::Set(value) => *field = Some(value),
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    /// Maps `Some` to [`FieldUpdate::Set`] and `None` to
    /// [`FieldUpdate::Clear`].
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Clear, Self::Set)
    }
}

/// Validated set of field changes for a task.
///
/// Status is deliberately absent; it only changes through the state
/// machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    /// Replacement title.
    pub title: Option<TaskTitle>,
    /// Notes update.
    pub notes: FieldUpdate<String>,
    /// Replacement priority.
    pub priority: Option<TaskPriority>,
    /// Due date update.
    pub due_date: FieldUpdate<DateTime<Utc>>,
    /// Group reference update.
    pub group_id: FieldUpdate<GroupId>,
    /// Category reference update.
    pub category_id: FieldUpdate<CategoryId>,
}

impl TaskChanges {
    /// Returns `true` when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.notes.is_unchanged()
            && self.priority.is_none()
            && self.due_date.is_unchanged()
            && self.group_id.is_unchanged()
            && self.category_id.is_unchanged()
    }
}
