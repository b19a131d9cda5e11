//! In-memory persistence adapter.
//!
//! A single [`InMemoryTaskStore`] implements every repository port over one
//! lock, so writes spanning a task and its ledger, subtasks or edges are
//! applied atomically.

mod activity;
mod dependency;
mod subtask;
mod tag;
mod task;

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{Activity, DependencyEdge, Subtask, Tag, TagId, Task, TaskId},
    ports::{TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory store for tasks and everything they own.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    activities: Vec<Activity>,
    subtasks: HashMap<TaskId, Vec<Subtask>>,
    edges: BTreeSet<DependencyEdge>,
    tags: HashMap<TagId, Tag>,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl InMemoryTaskState {
    /// Checks that `task` exists and is stored at `expected_version`.
    fn check_version(&self, task: &Task, expected_version: u64) -> TaskRepositoryResult<()> {
        let stored = self
            .tasks
            .get(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        if stored.version() != expected_version {
            tracing::warn!(
                task_id = %task.id(),
                expected = expected_version,
                actual = stored.version(),
                "rejected stale task write"
            );
            return Err(TaskRepositoryError::ConcurrentModification {
                task_id: task.id(),
                expected: expected_version,
                actual: stored.version(),
            });
        }
        Ok(())
    }

    fn put_task(&mut self, task: &Task) {
        tracing::debug!(task_id = %task.id(), version = task.version(), "committed task");
        self.tasks.insert(task.id(), task.clone());
    }
}
