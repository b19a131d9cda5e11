//! Shared test helpers for in-memory store integration tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rstest::fixture;
use taskledger::task::{
    adapters::{clock::ManualClock, memory::InMemoryTaskStore},
    domain::{Activity, ActivityType, TaskId},
    services::{
        ActivityService, CreateTaskRequest, DependencyService, LifecycleConfig,
        RecordActivityRequest, SubtaskService, TagService, TaskLifecycleService,
    },
};
use tracing_subscriber::EnvFilter;

/// Every service wired over one store and one manual clock.
pub struct Services {
    pub clock: Arc<ManualClock>,
    pub store: Arc<InMemoryTaskStore>,
    pub tasks: TaskLifecycleService<InMemoryTaskStore, ManualClock>,
    pub activities: ActivityService<InMemoryTaskStore, ManualClock>,
    pub dependencies: DependencyService<InMemoryTaskStore>,
    pub subtasks: SubtaskService<InMemoryTaskStore, ManualClock>,
    pub tags: TagService<InMemoryTaskStore, ManualClock>,
}

impl Services {
    /// Wires the services with `config`.
    #[must_use]
    pub fn with_config(config: &LifecycleConfig) -> Self {
        init_tracing();
        let clock = Arc::new(ManualClock::new(epoch()));
        let store = Arc::new(InMemoryTaskStore::new());
        Self {
            tasks: TaskLifecycleService::with_config(
                Arc::clone(&store),
                Arc::clone(&clock),
                config.clone(),
            ),
            activities: ActivityService::with_config(
                Arc::clone(&store),
                Arc::clone(&clock),
                config.clone(),
            ),
            dependencies: DependencyService::new(Arc::clone(&store)),
            subtasks: SubtaskService::with_config(
                Arc::clone(&store),
                Arc::clone(&clock),
                config.clone(),
            ),
            tags: TagService::new(Arc::clone(&store), Arc::clone(&clock)),
            clock,
            store,
        }
    }

    /// Creates a task with `title`.
    ///
    /// # Errors
    ///
    /// Returns an error when task creation fails.
    pub async fn create(&self, title: &str) -> Result<TaskId, eyre::Report> {
        Ok(self
            .tasks
            .create_task(CreateTaskRequest::new(title))
            .await?
            .id())
    }

    /// Advances the clock by `seconds` and records `kind`.
    ///
    /// # Errors
    ///
    /// Returns an error when the activity is rejected.
    pub async fn record_after(
        &self,
        seconds: i64,
        task_id: TaskId,
        kind: ActivityType,
    ) -> Result<Activity, eyre::Report> {
        self.clock.advance(Duration::seconds(seconds));
        Ok(self
            .activities
            .record_activity(RecordActivityRequest::new(task_id, kind))
            .await?)
    }
}

/// Routes adapter logs to the test harness, filtered by `RUST_LOG`.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Instant every scenario clock starts from.
#[must_use]
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Provides services with the default configuration.
#[fixture]
pub fn services() -> Services {
    Services::with_config(&LifecycleConfig::default())
}
