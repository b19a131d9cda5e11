//! Service layer for the task dependency relation.

use super::{TaskLifecycleResult, error::load_task};
use crate::task::{
    domain::{
        DependencyEdge, DependencyGraph, Task, TaskDomainError, TaskId, ensure_can_complete,
    },
    ports::{DependencyRepository, TaskRepository, TaskRepositoryError},
};
use std::sync::Arc;

/// Dependency graph orchestration service.
#[derive(Clone)]
pub struct DependencyService<S>
where
    S: TaskRepository + DependencyRepository,
{
    store: Arc<S>,
}

impl<S> DependencyService<S>
where
    S: TaskRepository + DependencyRepository,
{
    /// Creates a new dependency service.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    async fn graph(&self) -> TaskLifecycleResult<DependencyGraph> {
        Ok(DependencyGraph::from_edges(self.store.list_edges().await?))
    }

    /// Records that `task_id` depends on `depends_on`.
    ///
    /// # Errors
    ///
    /// - `SelfDependency` when both ids are equal.
    /// - `NotFound` when either task does not exist.
    /// - `DependencyExists` for a duplicate edge.
    /// - `DependencyCycle` when `depends_on` already reaches `task_id`.
    pub async fn add_dependency(
        &self,
        task_id: TaskId,
        depends_on: TaskId,
    ) -> TaskLifecycleResult<DependencyEdge> {
        let edge = DependencyEdge::new(task_id, depends_on);
        if task_id == depends_on {
            return Err(TaskDomainError::SelfDependency(task_id).into());
        }
        load_task(&*self.store, task_id).await?;
        load_task(&*self.store, depends_on).await?;

        self.graph().await?.validate_insertion(edge)?;
        match self.store.insert_edge(edge).await {
            Ok(()) => Ok(edge),
            Err(TaskRepositoryError::DuplicateEdge(_)) => Err(TaskDomainError::DependencyExists {
                task_id,
                depends_on,
            }
            .into()),
            Err(TaskRepositoryError::DependencyCycle(_)) => Err(TaskDomainError::DependencyCycle {
                task_id,
                depends_on,
            }
            .into()),
            Err(err) => Err(err.into()),
        }
    }

    /// Removes the edge `task_id` -> `depends_on`.
    ///
    /// # Errors
    ///
    /// Returns `DependencyNotFound` when the edge does not exist.
    pub async fn remove_dependency(
        &self,
        task_id: TaskId,
        depends_on: TaskId,
    ) -> TaskLifecycleResult<()> {
        let edge = DependencyEdge::new(task_id, depends_on);
        if !self.store.remove_edge(edge).await? {
            return Err(TaskDomainError::DependencyNotFound {
                task_id,
                depends_on,
            }
            .into());
        }
        Ok(())
    }

    /// Returns the tasks `task_id` directly depends on.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist.
    pub async fn dependencies(&self, task_id: TaskId) -> TaskLifecycleResult<Vec<Task>> {
        load_task(&*self.store, task_id).await?;
        let ids = self.graph().await?.dependencies_of(task_id);
        Ok(self.store.find_by_ids(&ids).await?)
    }

    /// Returns the tasks that directly depend on `task_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist.
    pub async fn dependents(&self, task_id: TaskId) -> TaskLifecycleResult<Vec<Task>> {
        load_task(&*self.store, task_id).await?;
        let ids = self.graph().await?.dependents_of(task_id);
        Ok(self.store.find_by_ids(&ids).await?)
    }

    /// Returns whether every direct dependency of `task_id` has completed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist, or
    /// `IncompleteDependencies` naming the pending dependencies.
    pub async fn can_complete(&self, task_id: TaskId) -> TaskLifecycleResult<()> {
        let dependencies = self.dependencies(task_id).await?;
        ensure_can_complete(task_id, &dependencies)?;
        Ok(())
    }
}
