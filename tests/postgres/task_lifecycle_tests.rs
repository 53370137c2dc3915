//! `PostgreSQL` round trips for task creation, updates, filters and
//! deletion.

use chrono::{Duration, SubsecRound, Utc};
use rstest::rstest;
use studydesk::task::{
    domain::{CategoryId, GroupId, Task, TaskFilter, TaskPriority, TaskStatus, TaskTitle},
    services::{CreateTaskRequest, TaskLifecycleErrorKind, UpdateTaskRequest},
};

use crate::postgres::helpers::{PgHarness, pg};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_task_matches_its_stored_row(
    pg: Option<PgHarness>,
) -> Result<(), eyre::Report> {
    let Some(pg) = pg else { return Ok(()) };
    let creator_id = pg.user();
    let group_id = pg.group();
    let category_id = pg.category();
    // Nanoseconds are below `timestamptz` precision.
    let due = Utc::now() + Duration::days(2) + Duration::nanoseconds(789);

    let created = pg
        .service
        .create_task(
            CreateTaskRequest::new(creator_id, "  Lab report  ")
                .with_notes("figures 1-4")
                .with_priority(TaskPriority::High)
                .with_due_date(due)
                .with_group(group_id)
                .with_category(category_id),
        )
        .await?;
    let found = pg.service.find_one(created.id()).await?;

    eyre::ensure!(found == created, "stored {found:?} differs from {created:?}");
    eyre::ensure!(found.title() == "Lab report", "title not trimmed");
    eyre::ensure!(
        found.due_date() == Some(due.trunc_subsecs(6)),
        "due date not kept at microsecond precision"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_clears_optional_columns(pg: Option<PgHarness>) -> Result<(), eyre::Report> {
    let Some(pg) = pg else { return Ok(()) };
    let creator_id = pg.user();
    let created = pg
        .service
        .create_task(
            CreateTaskRequest::new(creator_id, "Flashcards")
                .with_notes("deck 2")
                .with_due_date(Utc::now() + Duration::days(1))
                .with_group(pg.group())
                .with_category(pg.category()),
        )
        .await?;

    let updated = pg
        .service
        .update_task(
            created.id(),
            UpdateTaskRequest::new()
                .with_title("Flashcards v2")
                .clear_notes()
                .clear_due_date()
                .clear_group()
                .clear_category(),
        )
        .await?;
    let found = pg.service.find_one(created.id()).await?;

    eyre::ensure!(found == updated, "stored {found:?} differs from {updated:?}");
    eyre::ensure!(found.title() == "Flashcards v2", "title not replaced");
    eyre::ensure!(found.notes().is_none(), "notes not cleared");
    eyre::ensure!(found.due_date().is_none(), "due date not cleared");
    eyre::ensure!(found.group_id().is_none(), "group not cleared");
    eyre::ensure!(found.category_id().is_none(), "category not cleared");
    eyre::ensure!(found.created_at() == created.created_at(), "creation time moved");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_references_are_rejected_by_the_directory(
    pg: Option<PgHarness>,
) -> Result<(), eyre::Report> {
    let Some(pg) = pg else { return Ok(()) };
    let creator_id = pg.user();

    let unknown_group = pg
        .service
        .create_task(CreateTaskRequest::new(creator_id, "Orphan").with_group(GroupId::new()))
        .await
        .expect_err("unknown group must be rejected");
    let unknown_category = pg
        .service
        .create_task(
            CreateTaskRequest::new(creator_id, "Orphan").with_category(CategoryId::new()),
        )
        .await
        .expect_err("unknown category must be rejected");
    let stored = pg.service.find_all(TaskFilter::new()).await?;

    assert_eq!(unknown_group.kind(), TaskLifecycleErrorKind::ReferenceNotFound);
    assert_eq!(unknown_category.kind(), TaskLifecycleErrorKind::ReferenceNotFound);
    eyre::ensure!(stored.is_empty(), "rejected tasks were stored");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn filters_run_in_sql(pg: Option<PgHarness>) -> Result<(), eyre::Report> {
    let Some(pg) = pg else { return Ok(()) };
    let creator_id = pg.user();
    let assignee_id = pg.user();
    let now = Utc::now();
    let late = pg
        .service
        .create_task(
            CreateTaskRequest::new(creator_id, "Late essay")
                .with_priority(TaskPriority::High)
                .with_due_date(now - Duration::hours(1)),
        )
        .await?;
    let started = pg.task("Started reading").await;
    pg.service.set_status(started.id(), TaskStatus::InProgress).await?;
    pg.service.assign_user(started.id(), assignee_id).await?;

    let ids = |tasks: Vec<Task>| -> Vec<_> {
        tasks.iter().map(|task| task.id()).collect()
    };
    let by_status = pg
        .service
        .find_all(TaskFilter::new().with_status(TaskStatus::InProgress))
        .await?;
    let by_priority = pg
        .service
        .find_all(TaskFilter::new().with_priority(TaskPriority::High))
        .await?;
    let by_creator = pg
        .service
        .find_all(TaskFilter::new().with_creator(creator_id))
        .await?;
    let by_assignee = pg
        .service
        .find_all(TaskFilter::new().with_assignee(assignee_id))
        .await?;
    let overdue = pg.service.find_all(TaskFilter::new().overdue_at(now)).await?;

    eyre::ensure!(ids(by_status) == vec![started.id()], "status filter");
    eyre::ensure!(ids(by_priority) == vec![late.id()], "priority filter");
    eyre::ensure!(ids(by_creator) == vec![late.id()], "creator filter");
    eyre::ensure!(ids(by_assignee) == vec![started.id()], "assignee filter");
    eyre::ensure!(ids(overdue) == vec![late.id()], "overdue filter");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_removes_assignment_rows(pg: Option<PgHarness>) -> Result<(), eyre::Report> {
    let Some(pg) = pg else { return Ok(()) };
    let task = pg.task("Retired").await;
    pg.service.assign_user(task.id(), pg.user()).await?;
    pg.service.assign_user(task.id(), pg.user()).await?;

    let outcome = pg.service.delete_task(task.id()).await?;
    let lookup = pg.service.find_one(task.id()).await;
    let remaining = pg.service.assignees(task.id()).await?;

    eyre::ensure!(outcome.deleted, "task should be deleted");
    eyre::ensure!(
        outcome.removed_assignments == 2,
        "expected 2 removed assignments, found {}",
        outcome.removed_assignments
    );
    eyre::ensure!(
        lookup.is_err_and(|err| err.kind() == TaskLifecycleErrorKind::NotFound),
        "deleted task still readable"
    );
    eyre::ensure!(remaining.is_empty(), "assignment rows survived the delete");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overlong_title_is_rejected_before_insert(
    pg: Option<PgHarness>,
) -> Result<(), eyre::Report> {
    let Some(pg) = pg else { return Ok(()) };
    let creator_id = pg.user();
    let title = "x".repeat(TaskTitle::MAX_CHARS + 1);

    let err = pg
        .service
        .create_task(CreateTaskRequest::new(creator_id, title))
        .await
        .expect_err("title wider than the column must be rejected");
    let widest = pg
        .service
        .create_task(CreateTaskRequest::new(
            creator_id,
            "x".repeat(TaskTitle::MAX_CHARS),
        ))
        .await?;

    assert_eq!(err.kind(), TaskLifecycleErrorKind::InvalidInput);
    eyre::ensure!(
        pg.service.find_one(widest.id()).await? == widest,
        "widest title did not round trip"
    );
    Ok(())
}
