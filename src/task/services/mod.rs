//! Application services for task lifecycle orchestration.

mod error;
mod lifecycle;
mod requests;

pub use error::{EntityRef, TaskLifecycleError, TaskLifecycleErrorKind, TaskLifecycleResult};
pub use lifecycle::{AssignmentOutcome, DeleteTaskOutcome, TaskLifecycleService, TaskReferences};
pub use requests::{CreateTaskRequest, TransitionTaskRequest, UpdateTaskRequest};
