//! In-memory integration tests for subtasks.

use std::collections::HashMap;

use super::helpers::{Services, services};
use rstest::rstest;
use taskledger::task::{
    domain::{ActivityType, SubtaskStatus, WorkState},
    services::AddSubtaskRequest,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn roll_up_is_independent_of_work_state(services: Services) -> Result<(), eyre::Report> {
    let task_id = services.create("Release checklist").await?;
    services.record_after(0, task_id, ActivityType::Started).await?;

    let mut ids = Vec::new();
    for title in ["Bump version", "Update changelog", "Tag release"] {
        let subtask = services
            .subtasks
            .add_subtask(AddSubtaskRequest::new(task_id, title))
            .await?;
        ids.push(subtask.id());
    }
    for id in &ids {
        services
            .subtasks
            .set_subtask_status(task_id, *id, SubtaskStatus::Completed)
            .await?;
    }

    let task = services.tasks.get(task_id).await?;
    eyre::ensure!(task.subtasks_completed(), "every subtask completed");
    eyre::ensure!(task.work_state() == WorkState::Active, "work state untouched");
    eyre::ensure!(!task.is_completed(), "status untouched");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reorder_persists_and_ties_keep_insertion_order(
    services: Services,
) -> Result<(), eyre::Report> {
    let task_id = services.create("Ordering").await?;
    let mut created = Vec::new();
    for title in ["one", "two", "three"] {
        created.push(
            services
                .subtasks
                .add_subtask(AddSubtaskRequest::new(task_id, title))
                .await?,
        );
    }
    let orders: HashMap<_, _> = created.iter().map(|subtask| (subtask.id(), 1)).collect();

    services.subtasks.reorder_subtasks(task_id, &orders).await?;

    let listed = services.subtasks.list_subtasks(task_id).await?;
    let titles: Vec<&str> = listed.iter().map(|subtask| subtask.title().as_str()).collect();
    eyre::ensure!(titles == ["one", "two", "three"], "unexpected order {titles:?}");
    eyre::ensure!(
        listed.iter().all(|subtask| subtask.order() == 1),
        "orders applied"
    );
    Ok(())
}
