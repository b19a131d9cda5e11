//! In-memory integration tests for work sessions and the activity ledger.

use super::helpers::{Services, services};
use rstest::rstest;
use taskledger::task::{
    domain::{ActivityType, TaskDomainError, WorkState},
    services::{RecordActivityRequest, TaskLifecycleError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_session_with_discard_and_notes(services: Services) -> Result<(), eyre::Report> {
    let task_id = services.create("Investigate flaky test").await?;

    let started = services.record_after(0, task_id, ActivityType::Started).await?;
    let discarded = services
        .activities
        .record_activity(
            RecordActivityRequest::new(task_id, ActivityType::Discarded)
                .with_note("interrupted by a meeting"),
        )
        .await?;
    let paused = services.record_after(1_800, task_id, ActivityType::Paused).await?;
    services.record_after(600, task_id, ActivityType::Started).await?;
    let completed = services
        .record_after(900, task_id, ActivityType::Completed)
        .await?;

    eyre::ensure!(discarded.note() == Some("interrupted by a meeting"), "note kept");
    eyre::ensure!(discarded.work_time() == Some(0), "discard measured at the same instant");
    eyre::ensure!(paused.work_time() == Some(1_800), "first session length");
    eyre::ensure!(completed.work_time() == Some(900), "second session length");
    eyre::ensure!(
        started.work_period_id() == paused.work_period_id(),
        "pause closes the period the start opened"
    );

    let summary = services.activities.total_work_time(task_id).await?;
    eyre::ensure!(summary.total_work_time == 2_700, "total is the sum of sessions");
    eyre::ensure!(summary.work_state == WorkState::Completed, "task completed");
    eyre::ensure!(
        summary.formatted_time == "45 minutes",
        "unexpected rendering {}",
        summary.formatted_time
    );
    Ok(())
}

#[rstest]
#[case(ActivityType::Started)]
#[case(ActivityType::Paused)]
#[case(ActivityType::Completed)]
#[tokio::test(flavor = "multi_thread")]
async fn completed_task_rejects_further_transitions(
    services: Services,
    #[case] kind: ActivityType,
) -> Result<(), eyre::Report> {
    let task_id = services.create("Done already").await?;
    services.record_after(0, task_id, ActivityType::Completed).await?;

    let result = services
        .activities
        .record_activity(RecordActivityRequest::new(task_id, kind))
        .await;

    eyre::ensure!(
        matches!(
            result,
            Err(TaskLifecycleError::Domain(
                TaskDomainError::InvalidStateTransition {
                    from: WorkState::Completed,
                    ..
                }
            ))
        ),
        "expected InvalidStateTransition, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn discard_on_completed_task_is_recorded(services: Services) -> Result<(), eyre::Report> {
    let task_id = services.create("Archived").await?;
    services.record_after(0, task_id, ActivityType::Completed).await?;

    let discarded = services
        .record_after(60, task_id, ActivityType::Discarded)
        .await?;

    eyre::ensure!(discarded.work_time().is_none(), "no elapsed time off the clock");
    eyre::ensure!(
        discarded.previous_state() == Some(WorkState::Completed),
        "previous state recorded"
    );
    let task = services.tasks.get(task_id).await?;
    eyre::ensure!(task.work_state() == WorkState::Completed, "state unchanged");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_an_activity_never_recomputes_totals(
    services: Services,
) -> Result<(), eyre::Report> {
    let task_id = services.create("Audit trail").await?;
    let first = services.record_after(0, task_id, ActivityType::Started).await?;
    services.record_after(120, task_id, ActivityType::Paused).await?;
    let restart = services.record_after(30, task_id, ActivityType::Started).await?;
    let noise = services
        .record_after(10, task_id, ActivityType::Discarded)
        .await?;
    services.record_after(0, task_id, ActivityType::Paused).await?;

    services.activities.delete_activity(task_id, first.id()).await?;
    let refused = services.activities.delete_activity(task_id, restart.id()).await;
    eyre::ensure!(refused.is_err(), "latest start is protected");
    let refused_noise = services.activities.delete_activity(task_id, noise.id()).await;
    eyre::ensure!(
        refused_noise.is_err(),
        "discard carrying elapsed seconds is protected"
    );

    let task = services.tasks.get(task_id).await?;
    eyre::ensure!(task.total_work_time() == 130, "total unchanged by deletion");
    let ledger = services.activities.ledger(task_id).await?;
    eyre::ensure!(ledger.entries().len() == 4, "one entry removed");
    Ok(())
}
