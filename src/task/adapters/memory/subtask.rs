//! [`SubtaskRepository`] over the in-memory store.

use async_trait::async_trait;

use super::InMemoryTaskStore;
use crate::task::{
    domain::{Subtask, SubtaskId, Task, TaskId, sort_subtasks},
    ports::{SubtaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

#[async_trait]
impl SubtaskRepository for InMemoryTaskStore {
    async fn list_subtasks(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Subtask>> {
        let state = self.read()?;
        Ok(state.subtasks.get(&task_id).cloned().unwrap_or_default())
    }

    async fn save_subtasks(
        &self,
        task: &Task,
        expected_version: u64,
        subtasks: &[Subtask],
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        state.check_version(task, expected_version)?;
        state.put_task(task);
        let stored = state.subtasks.entry(task.id()).or_default();
        for subtask in subtasks.iter().filter(|subtask| subtask.task_id() == task.id()) {
            match stored.iter_mut().find(|existing| existing.id() == subtask.id()) {
                Some(existing) => *existing = subtask.clone(),
                None => stored.push(subtask.clone()),
            }
        }
        sort_subtasks(stored);
        Ok(())
    }

    async fn remove_subtask(
        &self,
        task: &Task,
        expected_version: u64,
        subtask_id: SubtaskId,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        state.check_version(task, expected_version)?;
        let stored = state
            .subtasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::SubtaskNotFound(subtask_id))?;
        let position = stored
            .iter()
            .position(|subtask| subtask.id() == subtask_id)
            .ok_or(TaskRepositoryError::SubtaskNotFound(subtask_id))?;
        stored.remove(position);
        state.put_task(task);
        Ok(())
    }
}
