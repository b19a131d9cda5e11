//! [`DependencyRepository`] over the in-memory store.

use async_trait::async_trait;

use super::InMemoryTaskStore;
use crate::task::{
    domain::{DependencyEdge, DependencyGraph},
    ports::{DependencyRepository, TaskRepositoryError, TaskRepositoryResult},
};

#[async_trait]
impl DependencyRepository for InMemoryTaskStore {
    async fn insert_edge(&self, edge: DependencyEdge) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        for endpoint in [edge.task_id(), edge.depends_on()] {
            if !state.tasks.contains_key(&endpoint) {
                return Err(TaskRepositoryError::NotFound(endpoint));
            }
        }
        if state.edges.contains(&edge) {
            return Err(TaskRepositoryError::DuplicateEdge(edge));
        }
        let graph = DependencyGraph::from_edges(state.edges.iter().copied());
        if graph.reaches(edge.depends_on(), edge.task_id()) {
            tracing::warn!(
                task_id = %edge.task_id(),
                depends_on = %edge.depends_on(),
                "rejected cyclic dependency edge"
            );
            return Err(TaskRepositoryError::DependencyCycle(edge));
        }
        state.edges.insert(edge);
        tracing::debug!(
            task_id = %edge.task_id(),
            depends_on = %edge.depends_on(),
            "inserted dependency edge"
        );
        Ok(())
    }

    async fn remove_edge(&self, edge: DependencyEdge) -> TaskRepositoryResult<bool> {
        let mut state = self.write()?;
        Ok(state.edges.remove(&edge))
    }

    async fn list_edges(&self) -> TaskRepositoryResult<Vec<DependencyEdge>> {
        let state = self.read()?;
        Ok(state.edges.iter().copied().collect())
    }
}
