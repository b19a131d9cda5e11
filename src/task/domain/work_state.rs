//! Work-tracking state machine.
//!
//! The machine is a pure function of the current [`WorkState`], the
//! requested [`ActivityType`], the instant of the last state change and the
//! current instant. It never reads a clock and never inspects ledger
//! history, so elapsed-time arithmetic is deterministic.

use super::{ActivityType, ParseWorkStateError, TransitionRejection};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Work-tracking lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkState {
    /// No work has been started yet.
    Idle,
    /// Work is in progress and time is accruing.
    Active,
    /// Work is suspended.
    Paused,
    /// Work tracking has finished.
    Completed,
}

impl WorkState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }

    /// Returns whether no further work can be tracked.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for WorkState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for WorkState {
    type Error = ParseWorkStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "idle" => Ok(Self::Idle),
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseWorkStateError(value.to_owned())),
        }
    }
}

/// Outcome of an allowed work-state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkTransition {
    /// State the task moves to. Equal to `previous_state` for discards.
    pub new_state: WorkState,
    /// State immediately before the activity, stamped on the ledger entry.
    pub previous_state: WorkState,
    /// Seconds closed by the activity, when the activity closes an interval.
    pub work_time: Option<u64>,
}

impl WorkTransition {
    /// Returns whether the transition changes the work state.
    #[must_use]
    pub fn changes_state(&self) -> bool {
        self.new_state != self.previous_state
    }
}

/// Decides the outcome of recording `activity` against a task in `current`.
///
/// # Errors
///
/// Returns the [`TransitionRejection`] describing why the activity is not
/// allowed from `current`.
pub fn transition(
    current: WorkState,
    activity: ActivityType,
    last_state_change_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<WorkTransition, TransitionRejection> {
    let elapsed = || elapsed_seconds(last_state_change_at, now);
    let (new_state, work_time) = match (current, activity) {
        (WorkState::Idle | WorkState::Paused, ActivityType::Started) => {
            (WorkState::Active, Some(0))
        }
        (WorkState::Active, ActivityType::Started) => {
            return Err(TransitionRejection::AlreadyActive);
        }
        (WorkState::Completed, ActivityType::Started) => {
            return Err(TransitionRejection::StartCompleted);
        }
        (WorkState::Active, ActivityType::Paused) => (WorkState::Paused, Some(elapsed())),
        (WorkState::Idle | WorkState::Paused | WorkState::Completed, ActivityType::Paused) => {
            return Err(TransitionRejection::PauseRequiresActive);
        }
        (WorkState::Active, ActivityType::Completed) => (WorkState::Completed, Some(elapsed())),
        (WorkState::Idle | WorkState::Paused, ActivityType::Completed) => {
            (WorkState::Completed, Some(0))
        }
        (WorkState::Completed, ActivityType::Completed) => {
            return Err(TransitionRejection::AlreadyCompleted);
        }
        (WorkState::Active, ActivityType::Discarded) => (WorkState::Active, Some(elapsed())),
        (state, ActivityType::Discarded) => (state, None),
    };

    Ok(WorkTransition {
        new_state,
        previous_state: current,
        work_time,
    })
}

/// Whole seconds between `since` and `now`, floored.
///
/// A `now` earlier than `since` yields zero.
#[must_use]
pub fn elapsed_seconds(since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from(now.signed_duration_since(since).num_seconds()).unwrap_or(0)
}
