//! [`TagRepository`] over the in-memory store.

use async_trait::async_trait;

use super::{InMemoryTaskState, InMemoryTaskStore};
use crate::task::{
    domain::{Tag, TagId, Task},
    ports::{TagRepository, TaskRepositoryError, TaskRepositoryResult},
};

fn ensure_name_free(state: &InMemoryTaskState, tag: &Tag) -> TaskRepositoryResult<()> {
    let key = tag.name().normalized();
    let clash = state
        .tags
        .values()
        .any(|other| other.id() != tag.id() && other.name().normalized() == key);
    if clash {
        return Err(TaskRepositoryError::DuplicateTagName(
            tag.name().as_str().to_owned(),
        ));
    }
    Ok(())
}

#[async_trait]
impl TagRepository for InMemoryTaskStore {
    async fn store_tag(&self, tag: &Tag) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        ensure_name_free(&state, tag)?;
        state.tags.insert(tag.id(), tag.clone());
        Ok(())
    }

    async fn update_tag(&self, tag: &Tag) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.tags.contains_key(&tag.id()) {
            return Err(TaskRepositoryError::TagNotFound(tag.id()));
        }
        ensure_name_free(&state, tag)?;
        state.tags.insert(tag.id(), tag.clone());
        Ok(())
    }

    async fn delete_tag(&self, id: TagId) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tags.remove(&id).is_none() {
            return Err(TaskRepositoryError::TagNotFound(id));
        }
        for task in state.tasks.values_mut() {
            if task.remove_tag_reference(id) {
                task.advance_version();
            }
        }
        tracing::debug!(tag_id = %id, "deleted tag");
        Ok(())
    }

    async fn save_tagged_task(
        &self,
        task: &Task,
        expected_version: u64,
        tag_id: TagId,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.tags.contains_key(&tag_id) {
            return Err(TaskRepositoryError::TagNotFound(tag_id));
        }
        state.check_version(task, expected_version)?;
        state.put_task(task);
        Ok(())
    }

    async fn find_tag(&self, id: TagId) -> TaskRepositoryResult<Option<Tag>> {
        let state = self.read()?;
        Ok(state.tags.get(&id).cloned())
    }

    async fn find_tag_by_name(&self, name: &str) -> TaskRepositoryResult<Option<Tag>> {
        let key = name.trim().to_lowercase();
        let state = self.read()?;
        Ok(state
            .tags
            .values()
            .find(|tag| tag.name().normalized() == key)
            .cloned())
    }

    async fn list_tags(&self) -> TaskRepositoryResult<Vec<Tag>> {
        let state = self.read()?;
        let mut tags: Vec<Tag> = state.tags.values().cloned().collect();
        tags.sort_by_key(|tag| tag.name().normalized());
        Ok(tags)
    }
}
