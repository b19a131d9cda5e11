//! Work time summaries and human-readable durations.

use super::{Task, WorkState};
use serde::{Deserialize, Serialize};

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;

/// Accumulated work time of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkTimeSummary {
    /// Accumulated work time in seconds.
    pub total_work_time: u64,
    /// Current work state.
    pub work_state: WorkState,
    /// `total_work_time` rendered by [`format_work_time`].
    pub formatted_time: String,
}

impl WorkTimeSummary {
    /// Summarises the accumulated work time of `task`.
    #[must_use]
    pub fn for_task(task: &Task) -> Self {
        Self {
            total_work_time: task.total_work_time(),
            work_state: task.work_state(),
            formatted_time: format_work_time(task.total_work_time()),
        }
    }
}

/// Renders seconds as e.g. `"1 hour, 1 minute, 1 second"`.
///
/// Zero components are omitted; a zero total renders as `"0 seconds"`.
#[must_use]
pub fn format_work_time(total_seconds: u64) -> String {
    if total_seconds == 0 {
        return "0 seconds".to_owned();
    }

    let hours = total_seconds.div_euclid(SECONDS_PER_HOUR);
    let minutes = total_seconds
        .rem_euclid(SECONDS_PER_HOUR)
        .div_euclid(SECONDS_PER_MINUTE);
    let seconds = total_seconds.rem_euclid(SECONDS_PER_MINUTE);

    [(hours, "hour"), (minutes, "minute"), (seconds, "second")]
        .into_iter()
        .filter(|(amount, _)| *amount > 0)
        .map(|(amount, unit)| pluralise(amount, unit))
        .collect::<Vec<_>>()
        .join(", ")
}

fn pluralise(amount: u64, unit: &str) -> String {
    if amount == 1 {
        format!("{amount} {unit}")
    } else {
        format!("{amount} {unit}s")
    }
}
