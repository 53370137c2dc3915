//! Domain model for task lifecycle management.
//!
//! The task domain models task creation, the status state machine, overdue
//! evaluation and assignment records while keeping all infrastructure
//! concerns outside of the domain boundary.

mod assignment;
mod changes;
mod error;
mod filter;
mod ids;
mod status;
mod task;

pub use assignment::TaskAssignment;
pub use changes::{FieldUpdate, TaskChanges};
pub use error::{ParseTaskPriorityError, ParseTaskStatusError, TaskDomainError};
pub use filter::TaskFilter;
pub use ids::{AssignmentId, CategoryId, GroupId, TaskId, UserId};
pub use status::{TaskPriority, TaskStatus};
pub use task::{NewTaskData, PersistedTaskData, Task, TaskTitle};
