//! Activity ledger entries.

use super::{ActivityId, ParseActivityTypeError, TaskId, WorkPeriodId, WorkState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of activity recorded against a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    /// Work started or resumed.
    Started,
    /// Work paused.
    Paused,
    /// Work finished and the task completed.
    Completed,
    /// Session closed out without completing the task.
    Discarded,
}

impl ActivityType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Discarded => "discarded",
        }
    }

    /// Returns whether the activity's work time is added to the task total.
    #[must_use]
    pub const fn accrues_work_time(self) -> bool {
        matches!(self, Self::Paused | Self::Completed)
    }

    /// Returns whether the activity explains a work-state change.
    ///
    /// The most recent activity of each of these types is protected from
    /// deletion.
    #[must_use]
    pub const fn is_state_transition(self) -> bool {
        matches!(self, Self::Started | Self::Paused | Self::Completed)
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ActivityType {
    type Error = ParseActivityTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "started" => Ok(Self::Started),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "discarded" => Ok(Self::Discarded),
            _ => Err(ParseActivityTypeError(value.to_owned())),
        }
    }
}

/// Immutable audit record of one accepted activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    id: ActivityId,
    task_id: TaskId,
    kind: ActivityType,
    work_time: Option<u64>,
    previous_state: Option<WorkState>,
    note: Option<String>,
    work_period_id: Option<WorkPeriodId>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedActivityData {
    /// Persisted activity identifier.
    pub id: ActivityId,
    /// Owning task.
    pub task_id: TaskId,
    /// Activity type.
    pub kind: ActivityType,
    /// Seconds closed by the activity, if any.
    pub work_time: Option<u64>,
    /// Work state before the activity, if recorded.
    pub previous_state: Option<WorkState>,
    /// Free-text note.
    pub note: Option<String>,
    /// Work session grouping key.
    pub work_period_id: Option<WorkPeriodId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Activity {
    pub(super) fn new(
        task_id: TaskId,
        kind: ActivityType,
        work_time: Option<u64>,
        previous_state: WorkState,
        note: Option<String>,
        work_period_id: Option<WorkPeriodId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActivityId::new(),
            task_id,
            kind,
            work_time,
            previous_state: Some(previous_state),
            note: note.filter(|text| !text.trim().is_empty()),
            work_period_id,
            created_at,
        }
    }

    /// Reconstructs an activity from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedActivityData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            kind: data.kind,
            work_time: data.work_time,
            previous_state: data.previous_state,
            note: data.note,
            work_period_id: data.work_period_id,
            created_at: data.created_at,
        }
    }

    /// Returns the activity identifier.
    #[must_use]
    pub const fn id(&self) -> ActivityId {
        self.id
    }

    /// Returns the owning task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the activity type.
    #[must_use]
    pub const fn kind(&self) -> ActivityType {
        self.kind
    }

    /// Returns the seconds closed by this activity, if any.
    #[must_use]
    pub const fn work_time(&self) -> Option<u64> {
        self.work_time
    }

    /// Returns whether the activity carries a positive work time.
    #[must_use]
    pub fn has_work_time(&self) -> bool {
        self.work_time.is_some_and(|seconds| seconds > 0)
    }

    /// Returns the task's work state immediately before this activity.
    #[must_use]
    pub const fn previous_state(&self) -> Option<WorkState> {
        self.previous_state
    }

    /// Returns the free-text note, if any.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Returns the work period this activity belongs to, if any.
    #[must_use]
    pub const fn work_period_id(&self) -> Option<WorkPeriodId> {
        self.work_period_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
