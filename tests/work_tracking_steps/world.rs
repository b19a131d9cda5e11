//! Shared world state for work tracking BDD scenarios.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::fixture;
use taskledger::task::{
    adapters::{clock::ManualClock, memory::InMemoryTaskStore},
    domain::{Activity, TaskId},
    services::{
        ActivityService, DependencyService, TaskLifecycleError, TaskLifecycleService,
    },
};

/// Scenario world for work tracking behaviour tests.
pub struct WorkTrackingWorld {
    pub clock: Arc<ManualClock>,
    pub tasks: TaskLifecycleService<InMemoryTaskStore, ManualClock>,
    pub activities: ActivityService<InMemoryTaskStore, ManualClock>,
    pub dependencies: DependencyService<InMemoryTaskStore>,
    pub task_id: Option<TaskId>,
    pub dependency_id: Option<TaskId>,
    pub last_activity: Option<Activity>,
    pub last_result: Option<Result<(), TaskLifecycleError>>,
}

impl WorkTrackingWorld {
    /// Creates a world over an empty store and a frozen clock.
    #[must_use]
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 2, 1, 10, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let clock = Arc::new(ManualClock::new(start));
        let store = Arc::new(InMemoryTaskStore::new());

        Self {
            tasks: TaskLifecycleService::new(Arc::clone(&store), Arc::clone(&clock)),
            activities: ActivityService::new(Arc::clone(&store), Arc::clone(&clock)),
            dependencies: DependencyService::new(store),
            clock,
            task_id: None,
            dependency_id: None,
            last_activity: None,
            last_result: None,
        }
    }

    /// Returns the scenario's main task.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has been created yet.
    pub fn task_id(&self) -> Result<TaskId, eyre::Report> {
        self.task_id
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Returns the outcome of the last fallible step.
    ///
    /// # Errors
    ///
    /// Returns an error when no outcome has been recorded.
    pub fn last_result(&self) -> Result<&Result<(), TaskLifecycleError>, eyre::Report> {
        self.last_result
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing step outcome in scenario world"))
    }
}

impl Default for WorkTrackingWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> WorkTrackingWorld {
    WorkTrackingWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
