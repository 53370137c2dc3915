//! `PostgreSQL` existence checks for users, groups and categories.

use super::{
    schema::{categories, study_groups, users},
    store::TaskPgPool,
};
use crate::task::{
    domain::{CategoryId, GroupId, UserId},
    ports::{
        CategoryLookup, GroupLookup, ReferenceLookupError, ReferenceLookupResult, UserLookup,
    },
};
use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// Directory lookups backed by the shared `PostgreSQL` database.
#[derive(Debug, Clone)]
pub struct PostgresDirectory {
    pool: TaskPgPool,
}

impl PostgresDirectory {
    /// Creates a directory from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F>(&self, f: F) -> ReferenceLookupResult<bool>
    where
        F: FnOnce(&mut PgConnection) -> QueryResult<bool> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ReferenceLookupError::persistence)?;
            f(&mut connection).map_err(ReferenceLookupError::persistence)
        })
        .await
        .map_err(ReferenceLookupError::persistence)?
    }
}

#[async_trait]
impl UserLookup for PostgresDirectory {
    async fn user_exists(&self, user_id: UserId) -> ReferenceLookupResult<bool> {
        self.run_blocking(move |connection| {
            diesel::select(exists(users::table.find(user_id.into_inner()))).get_result(connection)
        })
        .await
    }
}

#[async_trait]
impl GroupLookup for PostgresDirectory {
    async fn group_exists(&self, group_id: GroupId) -> ReferenceLookupResult<bool> {
        self.run_blocking(move |connection| {
            diesel::select(exists(study_groups::table.find(group_id.into_inner())))
                .get_result(connection)
        })
        .await
    }
}

#[async_trait]
impl CategoryLookup for PostgresDirectory {
    async fn category_exists(&self, category_id: CategoryId) -> ReferenceLookupResult<bool> {
        self.run_blocking(move |connection| {
            diesel::select(exists(categories::table.find(category_id.into_inner())))
                .get_result(connection)
        })
        .await
    }
}
