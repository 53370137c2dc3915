//! Shared helpers for the `PostgreSQL` integration tests.

use std::sync::Arc;

use diesel::r2d2::{ConnectionManager, Pool};
use diesel::{PgConnection, RunQueryDsl, sql_types};
use mockable::DefaultClock;
use rstest::fixture;
use studydesk::task::{
    adapters::postgres::{PostgresDirectory, PostgresTaskStore, TaskPgPool},
    domain::{CategoryId, GroupId, Task, UserId},
    services::{CreateTaskRequest, TaskLifecycleService, TaskReferences},
};
use uuid::Uuid;

use super::cluster::{BoxError, TemporaryDatabase, shared_cluster};

/// Service type used by the `PostgreSQL` integration tests.
pub type PgService = TaskLifecycleService<PostgresTaskStore, DefaultClock>;

/// Service and store over a private database cloned from the template.
pub struct PgHarness {
    pub service: PgService,
    pub store: Arc<PostgresTaskStore>,
    pool: TaskPgPool,
    // Declared last so the pool closes before the database is dropped.
    _database: TemporaryDatabase,
}

impl PgHarness {
    fn new(database: TemporaryDatabase) -> Result<Self, BoxError> {
        let manager = ConnectionManager::<PgConnection>::new(database.url());
        let pool: TaskPgPool = Pool::builder().max_size(8).build(manager)?;
        let store = Arc::new(PostgresTaskStore::new(pool.clone()));
        let directory = Arc::new(PostgresDirectory::new(pool.clone()));
        let service = TaskLifecycleService::new(
            Arc::clone(&store),
            TaskReferences::from_directory(&directory),
            Arc::new(DefaultClock),
        );
        Ok(Self {
            service,
            store,
            pool,
            _database: database,
        })
    }

    /// Inserts a user row.
    pub fn user(&self) -> UserId {
        UserId::from_uuid(self.insert_reference("users"))
    }

    /// Inserts a study group row.
    pub fn group(&self) -> GroupId {
        GroupId::from_uuid(self.insert_reference("study_groups"))
    }

    /// Inserts a category row.
    pub fn category(&self) -> CategoryId {
        CategoryId::from_uuid(self.insert_reference("categories"))
    }

    /// Creates an open task owned by a freshly inserted user.
    pub async fn task(&self, title: &str) -> Task {
        let creator_id = self.user();
        self.service
            .create_task(CreateTaskRequest::new(creator_id, title))
            .await
            .expect("task creation should succeed")
    }

    fn insert_reference(&self, table: &str) -> Uuid {
        let id = Uuid::new_v4();
        let mut connection = self.pool.get().expect("pooled connection");
        diesel::sql_query(format!("INSERT INTO {table} (id) VALUES ($1)"))
            .bind::<sql_types::Uuid, _>(id)
            .execute(&mut connection)
            .expect("reference row insert");
        id
    }
}

/// Provides a harness over a fresh database, or `None` when no server is
/// reachable.
#[fixture]
pub fn pg() -> Option<PgHarness> {
    // Another test may already have installed the global subscriber.
    studydesk::telemetry::init_tracing("studydesk=debug").ok();
    let cluster = shared_cluster()?;
    let database = cluster
        .temporary_database()
        .expect("temporary database creation");
    Some(PgHarness::new(database).expect("harness setup"))
}
