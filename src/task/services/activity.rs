//! Service layer for recording and deleting work activities.

use super::{LifecycleConfig, TaskLifecycleResult, error::load_task};
use crate::task::{
    domain::{
        Activity, ActivityId, ActivityLedger, ActivityType, DependencyGraph, EntityRef, Task,
        TaskDomainError, TaskId, WorkTimeSummary, ensure_can_complete,
    },
    ports::{ActivityRepository, DependencyRepository, TaskRepository},
};
use mockable::Clock;
use std::sync::Arc;

/// Request payload for recording an activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordActivityRequest {
    task_id: TaskId,
    kind: ActivityType,
    note: Option<String>,
}

impl RecordActivityRequest {
    /// Creates a request without a note.
    #[must_use]
    pub const fn new(task_id: TaskId, kind: ActivityType) -> Self {
        Self {
            task_id,
            kind,
            note: None,
        }
    }

    /// Attaches a free-text note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Work tracking orchestration service.
///
/// Each operation loads the task, runs the pure domain rules and hands the
/// repository one write.
#[derive(Clone)]
pub struct ActivityService<S, C>
where
    S: TaskRepository + ActivityRepository + DependencyRepository,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    config: LifecycleConfig,
}

impl<S, C> ActivityService<S, C>
where
    S: TaskRepository + ActivityRepository + DependencyRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new activity service with default configuration.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self::with_config(store, clock, LifecycleConfig::default())
    }

    /// Creates a new activity service with custom configuration.
    #[must_use]
    pub const fn with_config(store: Arc<S>, clock: Arc<C>, config: LifecycleConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Records an activity against a task.
    ///
    /// A `completed` activity is gated on the task's dependencies before
    /// the work-state machine runs; when gating fails nothing is recorded.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the task does not exist.
    /// - `IncompleteDependencies` when completion is gated.
    /// - `InvalidStateTransition` when the work-state machine rejects the
    ///   activity.
    /// - Repository errors, including a concurrent modification.
    pub async fn record_activity(
        &self,
        request: RecordActivityRequest,
    ) -> TaskLifecycleResult<Activity> {
        let mut task = load_task(&*self.store, request.task_id).await?;
        if request.kind == ActivityType::Completed {
            self.ensure_dependencies_complete(&task).await?;
        }

        let expected_version = task.version();
        let activity =
            ActivityLedger::record(&mut task, request.kind, request.note, self.clock.utc())?;
        task.advance_version();
        self.store
            .append_activity(&task, expected_version, &activity)
            .await?;
        Ok(activity)
    }

    /// Deletes an activity when the ledger policy allows it.
    ///
    /// Totals and work state are never recomputed.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the activity does not exist.
    /// - `Forbidden` when it belongs to another task.
    /// - `UnauthorizedActivityDeletion` when the policy refuses.
    pub async fn delete_activity(
        &self,
        task_id: TaskId,
        activity_id: ActivityId,
    ) -> TaskLifecycleResult<()> {
        let activity = self
            .store
            .find_activity(activity_id)
            .await?
            .ok_or(TaskDomainError::NotFound(EntityRef::Activity(activity_id)))?;
        if activity.task_id() != task_id {
            return Err(TaskDomainError::Forbidden {
                task_id,
                activity_id,
            }
            .into());
        }

        let ledger = ActivityLedger::new(task_id, self.store.list_activities(task_id).await?);
        ledger.ensure_deletable(activity_id)?;
        self.store.delete_activity(activity_id).await?;
        Ok(())
    }

    /// Returns a task's activities in ledger order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist.
    pub async fn list_activities(&self, task_id: TaskId) -> TaskLifecycleResult<Vec<Activity>> {
        load_task(&*self.store, task_id).await?;
        Ok(self.store.list_activities(task_id).await?)
    }

    /// Returns a task's ledger.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist.
    pub async fn ledger(&self, task_id: TaskId) -> TaskLifecycleResult<ActivityLedger> {
        let activities = self.list_activities(task_id).await?;
        Ok(ActivityLedger::new(task_id, activities))
    }

    /// Returns accumulated work time with its human-readable rendering.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist.
    pub async fn total_work_time(&self, task_id: TaskId) -> TaskLifecycleResult<WorkTimeSummary> {
        let task = load_task(&*self.store, task_id).await?;
        Ok(WorkTimeSummary::for_task(&task))
    }

    async fn ensure_dependencies_complete(&self, task: &Task) -> TaskLifecycleResult<()> {
        let graph = DependencyGraph::from_edges(self.store.list_edges().await?);
        let gating = graph.gating_dependencies_of(task.id(), self.config.dependency_gating);
        if gating.is_empty() {
            return Ok(());
        }
        let dependencies = self.store.find_by_ids(&gating).await?;
        ensure_can_complete(task.id(), &dependencies)?;
        Ok(())
    }
}
