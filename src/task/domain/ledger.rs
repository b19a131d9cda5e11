//! Append-only activity ledger and its deletion policy.

use super::{
    Activity, ActivityId, ActivityType, DeletionRefusal, EntityRef, Task, TaskDomainError, TaskId,
    WorkPeriodId, work_state,
};
use chrono::{DateTime, Utc};

/// Ordered activities of one task.
///
/// Entries are kept in ledger order (the order the repository returns
/// them, which is insertion order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLedger {
    task_id: TaskId,
    entries: Vec<Activity>,
}

impl ActivityLedger {
    /// Wraps the activities of `task_id` in ledger order.
    ///
    /// Entries owned by other tasks are ignored.
    #[must_use]
    pub fn new(task_id: TaskId, entries: impl IntoIterator<Item = Activity>) -> Self {
        Self {
            task_id,
            entries: entries
                .into_iter()
                .filter(|activity| activity.task_id() == task_id)
                .collect(),
        }
    }

    /// Records `kind` against `task` at `now`.
    ///
    /// On success the task's work state, timestamps, total work time,
    /// status and open work period are updated in place, and the new ledger
    /// entry is returned. The caller persists both together.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] when the
    /// work-state machine rejects the activity. The task is left untouched.
    pub fn record(
        task: &mut Task,
        kind: ActivityType,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Activity, TaskDomainError> {
        let transition =
            work_state::transition(task.work_state(), kind, task.last_state_change_at(), now)
                .map_err(|reason| TaskDomainError::InvalidStateTransition {
                    task_id: task.id(),
                    activity: kind,
                    from: task.work_state(),
                    reason,
                })?;

        let work_period_id = match kind {
            ActivityType::Started => {
                let period = WorkPeriodId::new();
                task.open_work_period(period);
                Some(period)
            }
            ActivityType::Paused | ActivityType::Completed => task.close_work_period(),
            ActivityType::Discarded => task.current_work_period(),
        };

        task.apply_work_transition(&transition, kind.accrues_work_time(), now);

        Ok(Activity::new(
            task.id(),
            kind,
            transition.work_time,
            transition.previous_state,
            note,
            work_period_id,
            now,
        ))
    }

    /// Returns the owning task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the entries in ledger order.
    #[must_use]
    pub fn entries(&self) -> &[Activity] {
        &self.entries
    }

    /// Consumes the ledger, returning its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<Activity> {
        self.entries
    }

    /// Returns the most recent entry of `kind`.
    ///
    /// Recency is decided by creation time, with ledger order breaking ties.
    #[must_use]
    pub fn latest_of_type(&self, kind: ActivityType) -> Option<&Activity> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, activity)| activity.kind() == kind)
            .max_by_key(|(position, activity)| (activity.created_at(), *position))
            .map(|(_, activity)| activity)
    }

    /// Sum of positive work time carried by accruing entries.
    #[must_use]
    pub fn accrued_work_time(&self) -> u64 {
        self.entries
            .iter()
            .filter(|activity| activity.kind().accrues_work_time())
            .filter_map(Activity::work_time)
            .fold(0, u64::saturating_add)
    }

    /// Returns the entries that belong to `period`, in ledger order.
    #[must_use]
    pub fn work_period(&self, period: WorkPeriodId) -> Vec<&Activity> {
        self.entries
            .iter()
            .filter(|activity| activity.work_period_id() == Some(period))
            .collect()
    }

    /// Checks whether `activity_id` may be removed from this ledger.
    ///
    /// # Errors
    ///
    /// - [`TaskDomainError::NotFound`] when the entry is not in the ledger.
    /// - [`TaskDomainError::UnauthorizedActivityDeletion`] when the entry
    ///   carries work time or is the latest entry of a state-changing type.
    pub fn ensure_deletable(&self, activity_id: ActivityId) -> Result<&Activity, TaskDomainError> {
        let activity = self
            .entries
            .iter()
            .find(|activity| activity.id() == activity_id)
            .ok_or(TaskDomainError::NotFound(EntityRef::Activity(
                activity_id,
            )))?;

        if let Some(seconds) = activity.work_time().filter(|seconds| *seconds > 0) {
            return Err(TaskDomainError::UnauthorizedActivityDeletion {
                activity_id,
                reason: DeletionRefusal::CarriesWorkTime(seconds),
            });
        }

        let kind = activity.kind();
        let is_latest = self
            .latest_of_type(kind)
            .is_some_and(|latest| latest.id() == activity_id);
        if kind.is_state_transition() && is_latest {
            return Err(TaskDomainError::UnauthorizedActivityDeletion {
                activity_id,
                reason: DeletionRefusal::LatestOfType(kind),
            });
        }

        Ok(activity)
    }

    /// Removes an entry after [`Self::ensure_deletable`] accepted it.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`Self::ensure_deletable`].
    pub fn remove(&mut self, activity_id: ActivityId) -> Result<Activity, TaskDomainError> {
        self.ensure_deletable(activity_id)?;
        let position = self
            .entries
            .iter()
            .position(|activity| activity.id() == activity_id)
            .ok_or(TaskDomainError::NotFound(EntityRef::Activity(
                activity_id,
            )))?;
        Ok(self.entries.remove(position))
    }
}
