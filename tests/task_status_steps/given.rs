//! Given steps for task status BDD scenarios.

use super::world::{TaskStatusWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use studydesk::task::services::{CreateTaskRequest, TransitionTaskRequest};

#[given("a registered user")]
fn registered_user(world: &mut TaskStatusWorld) -> Result<(), eyre::Report> {
    let user_id = world
        .directory
        .add_user()
        .wrap_err("register scenario user")?;
    world.user_id = Some(user_id);
    Ok(())
}

#[given(r#"the user has created a task titled "{title}""#)]
fn user_created_task(world: &mut TaskStatusWorld, title: String) -> Result<(), eyre::Report> {
    let creator_id = world.user()?;
    let created = run_async(
        world
            .service
            .create_task(CreateTaskRequest::new(creator_id, title)),
    )
    .wrap_err("create task for scenario")?;
    world.last_task = Some(created);
    Ok(())
}

#[given(r#"the task has been transitioned to "{target_status}""#)]
fn task_has_been_transitioned(
    world: &mut TaskStatusWorld,
    target_status: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let transitioned = run_async(
        world
            .service
            .transition_task(TransitionTaskRequest::new(task_id, target_status)),
    )
    .wrap_err("transition task in scenario setup")?;
    world.last_task = Some(transitioned);
    Ok(())
}
