//! In-memory integration tests for due-date queries and cascading deletes.

use chrono::Duration;
use mockable::Clock;

use super::helpers::{Services, services};
use rstest::rstest;
use taskledger::task::{
    domain::{ActivityType, Task},
    ports::{ActivityRepository, DependencyRepository, SubtaskRepository},
    services::{AddSubtaskRequest, CreateTaskRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_tasks_are_never_overdue(services: Services) -> Result<(), eyre::Report> {
    let now = services.clock.utc();
    let late = services
        .tasks
        .create_task(CreateTaskRequest::new("Late").with_due_date(now - Duration::days(1)))
        .await?;
    let finished = services
        .tasks
        .create_task(CreateTaskRequest::new("Finished").with_due_date(now - Duration::days(2)))
        .await?;
    services
        .record_after(0, finished.id(), ActivityType::Completed)
        .await?;

    let overdue = services.tasks.find_overdue(None).await?;

    let ids: Vec<_> = overdue.iter().map(Task::id).collect();
    eyre::ensure!(ids == vec![late.id()], "only the pending task is overdue");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn due_soon_moves_with_the_clock(services: Services) -> Result<(), eyre::Report> {
    let now = services.clock.utc();
    services
        .tasks
        .create_task(CreateTaskRequest::new("Next week").with_due_date(now + Duration::days(7)))
        .await?;

    eyre::ensure!(services.tasks.find_due_soon(3).await?.is_empty(), "not yet due");
    services.clock.advance(Duration::days(5));
    eyre::ensure!(services.tasks.find_due_soon(3).await?.len() == 1, "now due soon");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_task_cascades(services: Services) -> Result<(), eyre::Report> {
    let doomed = services.create("Doomed").await?;
    let survivor = services.create("Survivor").await?;
    services.record_after(0, doomed, ActivityType::Started).await?;
    services
        .subtasks
        .add_subtask(AddSubtaskRequest::new(doomed, "Orphan"))
        .await?;
    services.dependencies.add_dependency(survivor, doomed).await?;

    services.tasks.delete_task(doomed).await?;

    eyre::ensure!(services.tasks.find_by_id(doomed).await?.is_none(), "task gone");
    eyre::ensure!(
        services.store.list_activities(doomed).await?.is_empty(),
        "activities gone"
    );
    eyre::ensure!(
        services.store.list_subtasks(doomed).await?.is_empty(),
        "subtasks gone"
    );
    eyre::ensure!(services.store.list_edges().await?.is_empty(), "edges gone");
    services
        .record_after(0, survivor, ActivityType::Completed)
        .await?;
    Ok(())
}
