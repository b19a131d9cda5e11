//! [`ActivityRepository`] over the in-memory store.

use async_trait::async_trait;

use super::InMemoryTaskStore;
use crate::task::{
    domain::{Activity, ActivityId, Task, TaskId},
    ports::{ActivityRepository, TaskRepositoryError, TaskRepositoryResult},
};

#[async_trait]
impl ActivityRepository for InMemoryTaskStore {
    async fn append_activity(
        &self,
        task: &Task,
        expected_version: u64,
        activity: &Activity,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        state.check_version(task, expected_version)?;
        state.put_task(task);
        state.activities.push(activity.clone());
        tracing::debug!(
            task_id = %task.id(),
            activity_id = %activity.id(),
            kind = %activity.kind(),
            "appended activity"
        );
        Ok(())
    }

    async fn find_activity(&self, id: ActivityId) -> TaskRepositoryResult<Option<Activity>> {
        let state = self.read()?;
        Ok(state
            .activities
            .iter()
            .find(|activity| activity.id() == id)
            .cloned())
    }

    async fn list_activities(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Activity>> {
        let state = self.read()?;
        Ok(state
            .activities
            .iter()
            .filter(|activity| activity.task_id() == task_id)
            .cloned()
            .collect())
    }

    async fn delete_activity(&self, id: ActivityId) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let position = state
            .activities
            .iter()
            .position(|activity| activity.id() == id)
            .ok_or(TaskRepositoryError::ActivityNotFound(id))?;
        state.activities.remove(position);
        tracing::debug!(activity_id = %id, "deleted activity");
        Ok(())
    }
}
