//! Shared test helpers for in-memory task lifecycle integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use studydesk::task::{
    adapters::memory::{InMemoryDirectory, InMemoryTaskStore},
    domain::{Task, UserId},
    ports::TaskStore,
    services::{CreateTaskRequest, TaskLifecycleService, TaskReferences},
};

/// Service type used by the in-memory integration tests.
pub type TestService<S = InMemoryTaskStore> = TaskLifecycleService<S, DefaultClock>;

/// Service wired to a store plus the in-memory directory backing its
/// reference lookups.
pub struct Harness<S: TaskStore = InMemoryTaskStore> {
    pub service: TestService<S>,
    pub directory: Arc<InMemoryDirectory>,
}

impl<S: TaskStore> Harness<S> {
    /// Registers a user in the directory.
    pub fn user(&self) -> UserId {
        self.directory.add_user().expect("directory should accept users")
    }

    /// Creates an open task owned by a freshly registered user.
    pub async fn task(&self, title: &str) -> Task {
        let creator_id = self.user();
        self.service
            .create_task(CreateTaskRequest::new(creator_id, title))
            .await
            .expect("task creation should succeed")
    }
}

/// Builds a service over `store` using a fresh directory.
pub fn harness_with_store<S: TaskStore>(store: S) -> Harness<S> {
    let directory = Arc::new(InMemoryDirectory::new());
    let service = TaskLifecycleService::new(
        Arc::new(store),
        TaskReferences::from_directory(&directory),
        Arc::new(DefaultClock),
    );
    Harness { service, directory }
}

/// Provides a fresh harness for each test.
#[fixture]
pub fn harness() -> Harness {
    // Another test may already have installed the global subscriber.
    studydesk::telemetry::init_tracing("studydesk=debug").ok();
    harness_with_store(InMemoryTaskStore::new())
}
