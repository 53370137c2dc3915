//! Service layer coordinating task creation, updates, assignment and
//! deletion as atomic, referentially valid operations.

use super::{
    CreateTaskRequest, EntityRef, TaskLifecycleError, TaskLifecycleResult, TransitionTaskRequest,
    UpdateTaskRequest,
};
use crate::task::{
    domain::{
        CategoryId, GroupId, Task, TaskAssignment, TaskFilter, TaskId, TaskStatus, UserId,
    },
    ports::{CategoryLookup, GroupLookup, TaskStore, TaskUnitOfWork, UserLookup},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Lookup collaborators used to validate weak references at write time.
#[derive(Clone)]
pub struct TaskReferences {
    users: Arc<dyn UserLookup>,
    groups: Arc<dyn GroupLookup>,
    categories: Arc<dyn CategoryLookup>,
}

impl TaskReferences {
    /// Bundles independent lookup collaborators.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserLookup>,
        groups: Arc<dyn GroupLookup>,
        categories: Arc<dyn CategoryLookup>,
    ) -> Self {
        Self {
            users,
            groups,
            categories,
        }
    }

    /// Uses one directory for all three lookups.
    #[must_use]
    pub fn from_directory<D>(directory: &Arc<D>) -> Self
    where
        D: UserLookup + GroupLookup + CategoryLookup + 'static,
    {
        Self {
            users: Arc::clone(directory) as Arc<dyn UserLookup>,
            groups: Arc::clone(directory) as Arc<dyn GroupLookup>,
            categories: Arc::clone(directory) as Arc<dyn CategoryLookup>,
        }
    }
}

/// Result of an assignment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentOutcome {
    /// The assignment row for the pair.
    pub assignment: TaskAssignment,
    /// `false` when the pair was already assigned and nothing was written.
    pub created: bool,
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteTaskOutcome {
    /// `false` when the task did not exist.
    pub deleted: bool,
    /// Number of assignment rows removed with the task.
    pub removed_assignments: usize,
}

/// Attempts made for a write transaction that keeps losing races with
/// concurrent writers.
const MAX_TRANSACTION_ATTEMPTS: u32 = 5;

/// Task lifecycle orchestration service.
///
/// Every storage access goes through one [`TaskStore::transaction`] per
/// attempt, so a failed operation leaves no partial writes behind. Write
/// transactions rolled back by a conflict are run again from a fresh read.
pub struct TaskLifecycleService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    references: TaskReferences,
    clock: Arc<C>,
}

impl<S, C> Clone for TaskLifecycleService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            references: self.references.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, C> TaskLifecycleService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(store: Arc<S>, references: TaskReferences, clock: Arc<C>) -> Self {
        Self {
            store,
            references,
            clock,
        }
    }

    /// Runs the unit of work built by `make_work`, building and running a
    /// fresh one after each retryable failure.
    async fn write_transaction<T, W>(
        &self,
        make_work: impl Fn() -> W + Send,
    ) -> TaskLifecycleResult<T>
    where
        W: FnOnce(&mut dyn TaskUnitOfWork) -> TaskLifecycleResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut attempt = 1;
        loop {
            match self.store.transaction(make_work()).await {
                Err(err) if err.is_retryable() && attempt < MAX_TRANSACTION_ATTEMPTS => {
                    debug!(attempt, error = %err, "retrying conflicting transaction");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn ensure_user_exists(&self, user_id: UserId) -> TaskLifecycleResult<()> {
        if self.references.users.user_exists(user_id).await? {
            Ok(())
        } else {
            Err(TaskLifecycleError::ReferenceNotFound(EntityRef::User(user_id)))
        }
    }

    async fn ensure_group_exists(&self, group_id: Option<GroupId>) -> TaskLifecycleResult<()> {
        let Some(id) = group_id else {
            return Ok(());
        };
        if self.references.groups.group_exists(id).await? {
            Ok(())
        } else {
            Err(TaskLifecycleError::ReferenceNotFound(EntityRef::Group(id)))
        }
    }

    async fn ensure_category_exists(
        &self,
        category_id: Option<CategoryId>,
    ) -> TaskLifecycleResult<()> {
        let Some(id) = category_id else {
            return Ok(());
        };
        if self.references.categories.category_exists(id).await? {
            Ok(())
        } else {
            Err(TaskLifecycleError::ReferenceNotFound(EntityRef::Category(id)))
        }
    }

    /// Creates a task in [`TaskStatus::Open`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an empty title,
    /// [`TaskLifecycleError::ReferenceNotFound`] when the group or category
    /// does not exist, or storage and lookup errors.
    #[instrument(skip_all, fields(creator_id = %request.creator_id()))]
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let group_id = request.group_id();
        let category_id = request.category_id();
        let data = request.into_new_task()?;
        self.ensure_group_exists(group_id).await?;
        self.ensure_category_exists(category_id).await?;

        let task = Task::new(data, &*self.clock);
        self.write_transaction(|| {
            let stored = task.clone();
            move |uow: &mut dyn TaskUnitOfWork| -> TaskLifecycleResult<()> {
                uow.insert_task(&stored)?;
                Ok(())
            }
        })
        .await?;

        info!(task_id = %task.id(), "task created");
        Ok(task)
    }

    /// Applies a partial update and returns the task as read back from
    /// storage after commit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist,
    /// [`TaskLifecycleError::Domain`] for an empty replacement title,
    /// [`TaskLifecycleError::ReferenceNotFound`] for an unknown group or
    /// category, or storage and lookup errors.
    #[instrument(skip_all, fields(task_id = %task_id))]
    pub async fn update_task(
        &self,
        task_id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let changes = request.into_changes()?;
        let group_id = changes.group_id.new_value().copied();
        let category_id = changes.category_id.new_value().copied();
        if group_id.is_some() || category_id.is_some() {
            // A missing task outranks a missing reference.
            self.find_one(task_id).await?;
            self.ensure_group_exists(group_id).await?;
            self.ensure_category_exists(category_id).await?;
        }

        self.write_transaction(|| {
            let attempt_changes = changes.clone();
            let clock = Arc::clone(&self.clock);
            move |uow: &mut dyn TaskUnitOfWork| -> TaskLifecycleResult<()> {
                let mut task = uow
                    .find_task_for_update(task_id)?
                    .ok_or(TaskLifecycleError::NotFound(task_id))?;
                task.apply_changes(attempt_changes, &*clock);
                uow.save_task(&task)?;
                Ok(())
            }
        })
        .await?;

        info!("task updated");
        self.find_one(task_id).await
    }

    /// Moves a task along the status state machine.
    ///
    /// The current status is read inside the same transaction as the write,
    /// so concurrent transitions cannot both succeed from stale state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist,
    /// [`TaskLifecycleError::Domain`] wrapping
    /// [`crate::task::domain::TaskDomainError::InvalidTransition`] when the
    /// edge is not permitted, or storage errors.
    #[instrument(skip_all, fields(task_id = %task_id, target = %target))]
    pub async fn set_status(
        &self,
        task_id: TaskId,
        target: TaskStatus,
    ) -> TaskLifecycleResult<Task> {
        let result = self
            .write_transaction(|| {
                let clock = Arc::clone(&self.clock);
                move |uow: &mut dyn TaskUnitOfWork| -> TaskLifecycleResult<Task> {
                    let mut task = uow
                        .find_task_for_update(task_id)?
                        .ok_or(TaskLifecycleError::NotFound(task_id))?;
                    task.set_status(target, &*clock)?;
                    uow.save_task(&task)?;
                    Ok(task)
                }
            })
            .await;

        match &result {
            Ok(_) => info!("task status changed"),
            Err(err @ TaskLifecycleError::Domain(_)) => warn!(error = %err, "transition rejected"),
            Err(_) => {}
        }
        result
    }

    /// Parses a raw status string and applies it with
    /// [`Self::set_status`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::InvalidStatus`] for an unknown status
    /// string, plus every error [`Self::set_status`] returns.
    pub async fn transition_task(
        &self,
        request: TransitionTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let target = TaskStatus::try_from(request.target_status())?;
        self.set_status(request.task_id(), target).await
    }

    /// Assigns a user to a task.
    ///
    /// Assigning an already assigned pair succeeds without writing and
    /// returns the existing row.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::ReferenceNotFound`] when the user does
    /// not exist, [`TaskLifecycleError::NotFound`] when the task does not
    /// exist, or storage and lookup errors.
    #[instrument(skip_all, fields(task_id = %task_id, user_id = %user_id))]
    pub async fn assign_user(
        &self,
        task_id: TaskId,
        user_id: UserId,
    ) -> TaskLifecycleResult<AssignmentOutcome> {
        self.ensure_user_exists(user_id).await?;

        let outcome = self
            .write_transaction(|| {
                let clock = Arc::clone(&self.clock);
                move |uow: &mut dyn TaskUnitOfWork| -> TaskLifecycleResult<AssignmentOutcome> {
                    uow.find_task_for_update(task_id)?
                        .ok_or(TaskLifecycleError::NotFound(task_id))?;
                    if let Some(existing) = uow.find_assignment(task_id, user_id)? {
                        return Ok(AssignmentOutcome {
                            assignment: existing,
                            created: false,
                        });
                    }
                    let assignment = TaskAssignment::new(task_id, user_id, &*clock);
                    uow.insert_assignment(&assignment)?;
                    Ok(AssignmentOutcome {
                        assignment,
                        created: true,
                    })
                }
            })
            .await?;

        if outcome.created {
            info!(assignment_id = %outcome.assignment.id(), "user assigned");
        } else {
            debug!("user already assigned");
        }
        Ok(outcome)
    }

    /// Removes a user's assignment from a task.
    ///
    /// Returns `false` when there was nothing to remove.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Storage`] when persistence fails.
    #[instrument(skip_all, fields(task_id = %task_id, user_id = %user_id))]
    pub async fn unassign_user(
        &self,
        task_id: TaskId,
        user_id: UserId,
    ) -> TaskLifecycleResult<bool> {
        let removed = self
            .write_transaction(|| {
                move |uow: &mut dyn TaskUnitOfWork| -> TaskLifecycleResult<bool> {
                    Ok(uow.delete_assignment(task_id, user_id)?)
                }
            })
            .await?;

        if removed {
            info!("user unassigned");
        } else {
            debug!("no assignment to remove");
        }
        Ok(removed)
    }

    /// Deletes a task together with all of its assignments.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Storage`] when persistence fails; the
    /// task and its assignments are then left as they were.
    #[instrument(skip_all, fields(task_id = %task_id))]
    pub async fn delete_task(&self, task_id: TaskId) -> TaskLifecycleResult<DeleteTaskOutcome> {
        let outcome = self
            .write_transaction(|| {
                move |uow: &mut dyn TaskUnitOfWork| -> TaskLifecycleResult<DeleteTaskOutcome> {
                    if uow.find_task_for_update(task_id)?.is_none() {
                        return Ok(DeleteTaskOutcome {
                            deleted: false,
                            removed_assignments: 0,
                        });
                    }
                    let removed_assignments = uow.delete_assignments_for_task(task_id)?;
                    let deleted = uow.delete_task(task_id)?;
                    Ok(DeleteTaskOutcome {
                        deleted,
                        removed_assignments,
                    })
                }
            })
            .await?;

        if outcome.deleted {
            info!(
                removed_assignments = outcome.removed_assignments,
                "task deleted"
            );
        } else {
            debug!("task already absent");
        }
        Ok(outcome)
    }

    /// Returns the persisted task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist,
    /// or storage errors.
    pub async fn find_one(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.store
            .transaction(move |uow| -> TaskLifecycleResult<Task> {
                uow.find_task(task_id)?
                    .ok_or(TaskLifecycleError::NotFound(task_id))
            })
            .await
    }

    /// Returns persisted tasks matching `filter`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Storage`] when persistence fails.
    pub async fn find_all(&self, filter: TaskFilter) -> TaskLifecycleResult<Vec<Task>> {
        self.store
            .transaction(move |uow| -> TaskLifecycleResult<Vec<Task>> {
                Ok(uow.find_tasks(&filter)?)
            })
            .await
    }

    /// Returns the assignments of a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist,
    /// or storage errors.
    pub async fn assignees(&self, task_id: TaskId) -> TaskLifecycleResult<Vec<TaskAssignment>> {
        self.store
            .transaction(move |uow| -> TaskLifecycleResult<Vec<TaskAssignment>> {
                uow.find_task(task_id)?
                    .ok_or(TaskLifecycleError::NotFound(task_id))?;
                Ok(uow.find_assignments(task_id)?)
            })
            .await
    }
}
