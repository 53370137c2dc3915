//! In-memory integration tests for assignment workflows.

use rstest::rstest;
use studydesk::task::{
    domain::{TaskFilter, TaskId, UserId},
    services::{TaskLifecycleError, TaskLifecycleErrorKind},
};

use super::helpers::{Harness, harness};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn assigning_twice_keeps_a_single_row(harness: Harness) -> Result<(), eyre::Report> {
    let task = harness.task("Pair study").await;
    let user_id = harness.user();

    let first = harness.service.assign_user(task.id(), user_id).await?;
    let second = harness.service.assign_user(task.id(), user_id).await?;
    let rows = harness.service.assignees(task.id()).await?;

    eyre::ensure!(first.created, "first assignment should write a row");
    eyre::ensure!(!second.created, "second assignment should be a no-op");
    eyre::ensure!(
        second.assignment == first.assignment,
        "idempotent assign must return the existing row"
    );
    eyre::ensure!(rows.len() == 1, "expected one row, found {}", rows.len());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_assigns_of_same_pair_write_one_row(
    harness: Harness,
) -> Result<(), eyre::Report> {
    let task = harness.task("Popular task").await;
    let user_id = harness.user();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = harness.service.clone();
            let task_id = task.id();
            tokio::spawn(async move { service.assign_user(task_id, user_id).await })
        })
        .collect();
    let mut created = 0;
    for handle in handles {
        if handle.await??.created {
            created += 1;
        }
    }
    let rows = harness.service.assignees(task.id()).await?;

    eyre::ensure!(created == 1, "expected one creating call, found {created}");
    eyre::ensure!(rows.len() == 1, "expected one row, found {}", rows.len());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn assign_rejects_unknown_user_and_missing_task(harness: Harness) {
    let task = harness.task("Strict").await;
    let known_user = harness.user();

    let unknown_user = harness
        .service
        .assign_user(task.id(), UserId::new())
        .await
        .expect_err("unknown user must be rejected");
    let missing_task = harness
        .service
        .assign_user(TaskId::new(), known_user)
        .await
        .expect_err("missing task must be rejected");

    assert_eq!(unknown_user.kind(), TaskLifecycleErrorKind::ReferenceNotFound);
    assert!(matches!(missing_task, TaskLifecycleError::NotFound(_)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unassign_removes_only_the_matching_pair(harness: Harness) -> Result<(), eyre::Report> {
    let task = harness.task("Shared reading").await;
    let alice = harness.user();
    let bob = harness.user();
    harness.service.assign_user(task.id(), alice).await?;
    harness.service.assign_user(task.id(), bob).await?;

    let removed = harness.service.unassign_user(task.id(), alice).await?;
    let removed_again = harness.service.unassign_user(task.id(), alice).await?;
    let remaining = harness.service.assignees(task.id()).await?;

    eyre::ensure!(removed, "first unassign should remove a row");
    eyre::ensure!(!removed_again, "second unassign should find nothing");
    let users: Vec<_> = remaining.iter().map(|row| row.user_id()).collect();
    eyre::ensure!(users == vec![bob], "unexpected remaining assignees {users:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn assignee_filter_lists_assigned_tasks(harness: Harness) -> Result<(), eyre::Report> {
    let assigned = harness.task("Assigned").await;
    harness.task("Unassigned").await;
    let user_id = harness.user();
    harness.service.assign_user(assigned.id(), user_id).await?;

    let found = harness
        .service
        .find_all(TaskFilter::new().with_assignee(user_id))
        .await?;

    let ids: Vec<_> = found.iter().map(|task| task.id()).collect();
    eyre::ensure!(ids == vec![assigned.id()], "unexpected tasks {ids:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_removes_task_and_assignments(harness: Harness) -> Result<(), eyre::Report> {
    let task = harness.task("Obsolete").await;
    let other = harness.task("Survivor").await;
    let alice = harness.user();
    let bob = harness.user();
    harness.service.assign_user(task.id(), alice).await?;
    harness.service.assign_user(task.id(), bob).await?;
    harness.service.assign_user(other.id(), alice).await?;

    let outcome = harness.service.delete_task(task.id()).await?;

    eyre::ensure!(outcome.deleted, "task should be deleted");
    eyre::ensure!(
        outcome.removed_assignments == 2,
        "expected 2 removed assignments, found {}",
        outcome.removed_assignments
    );
    let lookup = harness.service.find_one(task.id()).await;
    eyre::ensure!(
        matches!(lookup, Err(TaskLifecycleError::NotFound(_))),
        "deleted task still readable"
    );
    let survivors = harness.service.assignees(other.id()).await?;
    eyre::ensure!(survivors.len() == 1, "other task lost its assignment");
    let alice_tasks = harness
        .service
        .find_all(TaskFilter::new().with_assignee(alice))
        .await?;
    eyre::ensure!(alice_tasks.len() == 1, "orphaned assignment remains");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_missing_task_reports_not_deleted(harness: Harness) -> Result<(), eyre::Report> {
    let outcome = harness.service.delete_task(TaskId::new()).await?;

    eyre::ensure!(!outcome.deleted, "missing task reported as deleted");
    eyre::ensure!(outcome.removed_assignments == 0, "phantom assignments removed");
    Ok(())
}
