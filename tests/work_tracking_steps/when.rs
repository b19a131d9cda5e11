//! When steps for work tracking BDD scenarios.

use chrono::Duration;
use rstest_bdd_macros::when;
use taskledger::task::{
    domain::ActivityType,
    services::RecordActivityRequest,
};

use super::world::{WorkTrackingWorld, run_async};

fn record(world: &mut WorkTrackingWorld, kind: ActivityType) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    let result = run_async(
        world
            .activities
            .record_activity(RecordActivityRequest::new(task_id, kind)),
    );
    world.last_result = Some(result.map(|activity| {
        world.last_activity = Some(activity);
    }));
    Ok(())
}

#[when("{seconds:i64} seconds pass")]
fn seconds_pass(world: &mut WorkTrackingWorld, seconds: i64) {
    world.clock.advance(Duration::seconds(seconds));
}

#[when("the task is paused")]
fn task_paused(world: &mut WorkTrackingWorld) -> Result<(), eyre::Report> {
    record(world, ActivityType::Paused)
}

#[when("the task is completed")]
fn task_completed(world: &mut WorkTrackingWorld) -> Result<(), eyre::Report> {
    record(world, ActivityType::Completed)
}

#[when("the last activity is deleted")]
fn last_activity_deleted(world: &mut WorkTrackingWorld) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    let activity_id = world
        .last_activity
        .as_ref()
        .map(taskledger::task::domain::Activity::id)
        .ok_or_else(|| eyre::eyre!("missing recorded activity in scenario world"))?;
    world.last_result = Some(run_async(
        world.activities.delete_activity(task_id, activity_id),
    ));
    Ok(())
}

#[when("the dependency is made to depend on the task")]
fn dependency_depends_on_task(world: &mut WorkTrackingWorld) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    let dependency_id = world
        .dependency_id
        .ok_or_else(|| eyre::eyre!("missing dependency task in scenario world"))?;
    let result = run_async(world.dependencies.add_dependency(dependency_id, task_id));
    world.last_result = Some(result.map(|_| ()));
    Ok(())
}
