//! Shared world state for task status BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use studydesk::task::{
    adapters::memory::{InMemoryDirectory, InMemoryTaskStore},
    domain::{Task, UserId},
    services::{TaskLifecycleError, TaskLifecycleService, TaskReferences},
};

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<InMemoryTaskStore, DefaultClock>;

/// Scenario world for task status behaviour tests.
pub struct TaskStatusWorld {
    pub service: TestTaskService,
    pub directory: Arc<InMemoryDirectory>,
    pub user_id: Option<UserId>,
    pub last_task: Option<Task>,
    pub last_transition_result: Option<Result<Task, TaskLifecycleError>>,
}

impl TaskStatusWorld {
    /// Creates a world with an empty store and directory.
    #[must_use]
    pub fn new() -> Self {
        let directory = Arc::new(InMemoryDirectory::new());
        let service = TaskLifecycleService::new(
            Arc::new(InMemoryTaskStore::new()),
            TaskReferences::from_directory(&directory),
            Arc::new(DefaultClock),
        );

        Self {
            service,
            directory,
            user_id: None,
            last_task: None,
            last_transition_result: None,
        }
    }

    /// Returns the scenario's task or an error when none was created.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.last_task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing created task in scenario world"))
    }

    /// Returns the scenario's user or an error when none was registered.
    pub fn user(&self) -> Result<UserId, eyre::Report> {
        self.user_id
            .ok_or_else(|| eyre::eyre!("missing registered user in scenario world"))
    }
}

impl Default for TaskStatusWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskStatusWorld {
    TaskStatusWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
