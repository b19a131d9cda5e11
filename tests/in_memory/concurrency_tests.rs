//! In-memory integration tests for optimistic version checks.

use std::sync::Arc;

use super::helpers::{Services, services};
use rstest::rstest;
use taskledger::task::{
    domain::{ActivityType, Priority, TaskUpdate},
    ports::{TaskRepository, TaskRepositoryError},
    services::{RecordActivityRequest, TaskLifecycleError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_write_is_rejected(services: Services) -> Result<(), eyre::Report> {
    let task_id = services.create("Contended").await?;
    let mut first = services.tasks.get(task_id).await?;
    let mut second = services.tasks.get(task_id).await?;

    first.advance_version();
    services.store.update(&first, 0).await?;

    second.advance_version();
    let result = services.store.update(&second, 0).await;

    eyre::ensure!(
        matches!(
            result,
            Err(TaskRepositoryError::ConcurrentModification {
                expected: 0,
                actual: 1,
                ..
            })
        ),
        "expected ConcurrentModification, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn racing_writers_never_lose_updates(services: Services) -> Result<(), eyre::Report> {
    let task_id = services.create("Hot task").await?;
    let shared = Arc::new(services);

    let mut handles = Vec::new();
    for _ in 0..16 {
        let writer = Arc::clone(&shared);
        handles.push(tokio::spawn(async move {
            writer
                .activities
                .record_activity(RecordActivityRequest::new(task_id, ActivityType::Discarded))
                .await
        }));
    }

    let mut accepted = 0_u64;
    for handle in handles {
        match handle.await? {
            Ok(_) => accepted += 1,
            Err(TaskLifecycleError::Repository(
                TaskRepositoryError::ConcurrentModification { .. },
            )) => {}
            Err(other) => return Err(other.into()),
        }
    }

    let task = shared.tasks.get(task_id).await?;
    let ledger = shared.activities.ledger(task_id).await?;
    eyre::ensure!(accepted >= 1, "at least one writer wins");
    eyre::ensure!(task.version() == accepted, "one version per accepted write");
    eyre::ensure!(
        u64::try_from(ledger.entries().len())? == accepted,
        "one ledger entry per accepted write"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edits_and_activities_share_one_version_line(
    services: Services,
) -> Result<(), eyre::Report> {
    let task_id = services.create("Versioned").await?;

    services.record_after(0, task_id, ActivityType::Started).await?;
    services
        .tasks
        .update_task(
            task_id,
            TaskUpdate {
                priority: Some(Priority::High),
                ..TaskUpdate::default()
            },
        )
        .await?;
    services.record_after(30, task_id, ActivityType::Paused).await?;

    let task = services.tasks.get(task_id).await?;
    eyre::ensure!(task.version() == 3, "three writes, three versions");
    eyre::ensure!(task.priority() == Priority::High, "edit survived");
    eyre::ensure!(task.total_work_time() == 30, "work time survived");
    Ok(())
}
