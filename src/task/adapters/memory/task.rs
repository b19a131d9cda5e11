//! [`TaskRepository`] over the in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::InMemoryTaskStore;
use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Returns tasks matching `predicate`, earliest due date first.
fn collect_by_due_date(
    tasks: impl Iterator<Item = Task>,
    predicate: impl Fn(DateTime<Utc>, &Task) -> bool,
) -> Vec<Task> {
    let mut found: Vec<Task> = tasks
        .filter(|task| task.due_date().is_some_and(|due| predicate(due, task)))
        .collect();
    found.sort_by_key(|task| (task.due_date(), task.created_at()));
    found
}

#[async_trait]
impl TaskRepository for InMemoryTaskStore {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.put_task(task);
        Ok(())
    }

    async fn update(&self, task: &Task, expected_version: u64) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        state.check_version(task, expected_version)?;
        state.put_task(task);
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.remove(&id).is_none() {
            return Err(TaskRepositoryError::NotFound(id));
        }
        state.activities.retain(|activity| activity.task_id() != id);
        state.subtasks.remove(&id);
        state.edges.retain(|edge| !edge.touches(id));
        tracing::debug!(task_id = %id, "deleted task and owned records");
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.tasks.get(id).cloned())
            .collect())
    }

    async fn find_due_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(collect_by_due_date(state.tasks.values().cloned(), |due, _| {
            start <= due && due <= end
        }))
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(collect_by_due_date(state.tasks.values().cloned(), |_, task| {
            task.is_overdue(now)
        }))
    }
}
