//! Service layer for tags.

use super::{TaskLifecycleResult, error::load_task};
use crate::task::{
    domain::{EntityRef, Tag, TagId, TagName, Task, TaskDomainError, TaskId},
    ports::{TagRepository, TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;

/// Tag orchestration service.
#[derive(Clone)]
pub struct TagService<S, C>
where
    S: TaskRepository + TagRepository,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> TagService<S, C>
where
    S: TaskRepository + TagRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new tag service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    async fn load_tag(&self, tag_id: TagId) -> TaskLifecycleResult<Tag> {
        self.store
            .find_tag(tag_id)
            .await?
            .ok_or_else(|| TaskDomainError::NotFound(EntityRef::Tag(tag_id)).into())
    }

    async fn ensure_name_free(
        &self,
        name: &TagName,
        owner: Option<TagId>,
    ) -> TaskLifecycleResult<()> {
        let existing = self.store.find_tag_by_name(name.as_str()).await?;
        if existing.is_some_and(|tag| Some(tag.id()) != owner) {
            return Err(TaskDomainError::NameExists(name.as_str().to_owned()).into());
        }
        Ok(())
    }

    /// Creates a tag with a unique name.
    ///
    /// # Errors
    ///
    /// Returns `EmptyTagName` or `NameExists`.
    pub async fn create_tag(
        &self,
        name: impl Into<String> + Send,
        color: Option<String>,
    ) -> TaskLifecycleResult<Tag> {
        let tag_name = TagName::new(name)?;
        self.ensure_name_free(&tag_name, None).await?;
        let tag = Tag::new(tag_name, color, &*self.clock);
        self.store.store_tag(&tag).await.map_err(name_clash)?;
        Ok(tag)
    }

    /// Renames a tag.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `EmptyTagName` or `NameExists`.
    pub async fn rename_tag(
        &self,
        tag_id: TagId,
        name: impl Into<String> + Send,
    ) -> TaskLifecycleResult<Tag> {
        let mut tag = self.load_tag(tag_id).await?;
        let tag_name = TagName::new(name)?;
        self.ensure_name_free(&tag_name, Some(tag_id)).await?;
        tag.rename(tag_name, &*self.clock);
        self.store.update_tag(&tag).await.map_err(name_clash)?;
        Ok(tag)
    }

    /// Deletes a tag and detaches it from every task.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the tag does not exist.
    pub async fn delete_tag(&self, tag_id: TagId) -> TaskLifecycleResult<()> {
        self.load_tag(tag_id).await?;
        self.store.delete_tag(tag_id).await?;
        Ok(())
    }

    /// Returns all tags ordered by name.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the query fails.
    pub async fn list_tags(&self) -> TaskLifecycleResult<Vec<Tag>> {
        Ok(self.store.list_tags().await?)
    }

    /// Attaches a tag to a task. Attaching twice is a no-op.
    ///
    /// The tag's existence is re-checked in the write itself, so a tag
    /// deleted concurrently is never attached.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing task or tag.
    pub async fn attach_tag(&self, task_id: TaskId, tag_id: TagId) -> TaskLifecycleResult<Task> {
        let mut task = load_task(&*self.store, task_id).await?;
        self.load_tag(tag_id).await?;
        if task.attach_tag(tag_id, &*self.clock) {
            let expected_version = task.version();
            task.advance_version();
            self.store
                .save_tagged_task(&task, expected_version, tag_id)
                .await
                .map_err(missing_tag)?;
        }
        Ok(task)
    }

    /// Detaches a tag from a task. Detaching an absent tag is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing task.
    pub async fn detach_tag(&self, task_id: TaskId, tag_id: TagId) -> TaskLifecycleResult<Task> {
        let mut task = load_task(&*self.store, task_id).await?;
        if task.detach_tag(tag_id, &*self.clock) {
            self.persist(&mut task).await?;
        }
        Ok(task)
    }

    async fn persist(&self, task: &mut Task) -> TaskLifecycleResult<()> {
        let expected_version = task.version();
        task.advance_version();
        self.store.update(task, expected_version).await?;
        Ok(())
    }
}

/// Maps a repository-level name clash to [`TaskDomainError::NameExists`].
fn name_clash(err: TaskRepositoryError) -> super::TaskLifecycleError {
    match err {
        TaskRepositoryError::DuplicateTagName(name) => TaskDomainError::NameExists(name).into(),
        other => other.into(),
    }
}

/// Maps a tag deleted under a concurrent write to [`TaskDomainError::NotFound`].
fn missing_tag(err: TaskRepositoryError) -> super::TaskLifecycleError {
    match err {
        TaskRepositoryError::TagNotFound(id) => TaskDomainError::NotFound(EntityRef::Tag(id)).into(),
        other => other.into(),
    }
}
