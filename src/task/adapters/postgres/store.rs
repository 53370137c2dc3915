//! `PostgreSQL` task store with serializable units of work.

use super::{
    models::{
        AssignmentRow, TaskRow, assignment_to_row, row_to_assignment, row_to_task, task_to_record,
    },
    schema::{task_assignments, tasks},
};
use crate::task::{
    domain::{Task, TaskAssignment, TaskFilter, TaskId, TaskStatus, UserId},
    ports::{TaskStore, TaskStoreError, TaskStoreResult, TaskUnitOfWork},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task store.
///
/// Each unit of work runs in a `SERIALIZABLE` transaction on a pooled
/// connection, off the async executor.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: TaskPgPool,
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }
}

/// Failure raised inside a Diesel transaction closure.
enum TransactionFailure<E> {
    /// The unit of work returned an error.
    Aborted(E),
    /// Diesel failed to begin, commit or roll back.
    Database(DieselError),
}

impl<E> From<DieselError> for TransactionFailure<E> {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

/// Maps a Diesel error, classing serialization failures as conflicts.
fn store_error(err: DieselError) -> TaskStoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            TaskStoreError::conflict(err)
        }
        _ => TaskStoreError::persistence(err),
    }
}

impl<E: From<TaskStoreError>> TransactionFailure<E> {
    fn into_caller_error(self) -> E {
        match self {
            Self::Aborted(err) => err,
            Self::Database(err) => E::from(store_error(err)),
        }
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskUnitOfWork) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TaskStoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(|err| E::from(TaskStoreError::persistence(err)))?;
            connection
                .build_transaction()
                .serializable()
                .run(|tx_connection| {
                    let mut unit_of_work = PgUnitOfWork {
                        connection: tx_connection,
                    };
                    work(&mut unit_of_work).map_err(TransactionFailure::Aborted)
                })
                .map_err(TransactionFailure::into_caller_error)
        })
        .await
        .map_err(|err| E::from(TaskStoreError::persistence(err)))?
    }
}

/// Unit of work bound to one open transaction.
struct PgUnitOfWork<'c> {
    connection: &'c mut PgConnection,
}

impl PgUnitOfWork<'_> {
    fn load_task(&mut self, id: TaskId, lock: bool) -> TaskStoreResult<Option<Task>> {
        let query = tasks::table
            .find(id.into_inner())
            .select(TaskRow::as_select());
        let result = if lock {
            query.for_update().first::<TaskRow>(self.connection)
        } else {
            query.first::<TaskRow>(self.connection)
        };
        let row = result.optional().map_err(store_error)?;
        row.map(row_to_task).transpose()
    }
}

impl TaskUnitOfWork for PgUnitOfWork<'_> {
    fn find_task(&mut self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        self.load_task(id, false)
    }

    fn find_task_for_update(&mut self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        self.load_task(id, true)
    }

    fn find_tasks(&mut self, filter: &TaskFilter) -> TaskStoreResult<Vec<Task>> {
        let mut query = tasks::table.select(TaskRow::as_select()).into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(tasks::status.eq(status.as_str()));
        }
        if let Some(priority) = filter.priority {
            query = query.filter(tasks::priority.eq(priority.as_str()));
        }
        if let Some(creator_id) = filter.creator_id {
            query = query.filter(tasks::creator_id.eq(creator_id.into_inner()));
        }
        if let Some(group_id) = filter.group_id {
            query = query.filter(tasks::group_id.eq(group_id.into_inner()));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(tasks::category_id.eq(category_id.into_inner()));
        }
        if let Some(assignee_id) = filter.assignee_id {
            let assigned_tasks = task_assignments::table
                .filter(task_assignments::user_id.eq(assignee_id.into_inner()))
                .select(task_assignments::task_id);
            query = query.filter(tasks::id.eq_any(assigned_tasks));
        }
        if let Some(now) = filter.overdue_at {
            query = query
                .filter(tasks::due_date.lt(now))
                .filter(tasks::status.ne(TaskStatus::Completed.as_str()));
        }

        let rows = query
            .order((tasks::created_at.asc(), tasks::id.asc()))
            .load::<TaskRow>(self.connection)
            .map_err(store_error)?;
        rows.into_iter().map(row_to_task).collect()
    }

    fn insert_task(&mut self, task: &Task) -> TaskStoreResult<()> {
        let task_id = task.id();
        diesel::insert_into(tasks::table)
            .values(&task_to_record(task))
            .execute(self.connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    TaskStoreError::DuplicateTask(task_id)
                }
                _ => store_error(err),
            })?;
        Ok(())
    }

    fn save_task(&mut self, task: &Task) -> TaskStoreResult<()> {
        let updated = diesel::update(tasks::table.find(task.id().into_inner()))
            .set(&task_to_record(task))
            .execute(self.connection)
            .map_err(store_error)?;
        if updated == 0 {
            return Err(TaskStoreError::NotFound(task.id()));
        }
        Ok(())
    }

    fn delete_task(&mut self, id: TaskId) -> TaskStoreResult<bool> {
        let deleted = diesel::delete(tasks::table.find(id.into_inner()))
            .execute(self.connection)
            .map_err(store_error)?;
        Ok(deleted > 0)
    }

    fn find_assignment(
        &mut self,
        task_id: TaskId,
        user_id: UserId,
    ) -> TaskStoreResult<Option<TaskAssignment>> {
        let row = task_assignments::table
            .filter(task_assignments::task_id.eq(task_id.into_inner()))
            .filter(task_assignments::user_id.eq(user_id.into_inner()))
            .select(AssignmentRow::as_select())
            .first::<AssignmentRow>(self.connection)
            .optional()
            .map_err(store_error)?;
        Ok(row.map(row_to_assignment))
    }

    fn find_assignments(&mut self, task_id: TaskId) -> TaskStoreResult<Vec<TaskAssignment>> {
        let rows = task_assignments::table
            .filter(task_assignments::task_id.eq(task_id.into_inner()))
            .order((task_assignments::assigned_at.asc(), task_assignments::id.asc()))
            .select(AssignmentRow::as_select())
            .load::<AssignmentRow>(self.connection)
            .map_err(store_error)?;
        Ok(rows.into_iter().map(row_to_assignment).collect())
    }

    fn insert_assignment(&mut self, assignment: &TaskAssignment) -> TaskStoreResult<()> {
        diesel::insert_into(task_assignments::table)
            .values(&assignment_to_row(assignment))
            .execute(self.connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    TaskStoreError::DuplicateAssignment {
                        task_id: assignment.task_id(),
                        user_id: assignment.user_id(),
                    }
                }
                _ => store_error(err),
            })?;
        Ok(())
    }

    fn delete_assignment(&mut self, task_id: TaskId, user_id: UserId) -> TaskStoreResult<bool> {
        let deleted = diesel::delete(
            task_assignments::table
                .filter(task_assignments::task_id.eq(task_id.into_inner()))
                .filter(task_assignments::user_id.eq(user_id.into_inner())),
        )
        .execute(self.connection)
        .map_err(store_error)?;
        Ok(deleted > 0)
    }

    fn delete_assignments_for_task(&mut self, task_id: TaskId) -> TaskStoreResult<usize> {
        diesel::delete(
            task_assignments::table.filter(task_assignments::task_id.eq(task_id.into_inner())),
        )
        .execute(self.connection)
        .map_err(store_error)
    }
}
