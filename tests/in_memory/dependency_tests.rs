//! In-memory integration tests for dependency validation and gating.

use std::sync::Arc;

use super::helpers::{Services, services};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rstest::rstest;
use taskledger::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{
        ActivityType, DependencyEdge, DependencyGating, DependencyGraph, Task, TaskDomainError,
        TaskId,
    },
    ports::{DependencyRepository, TaskRepository, TaskRepositoryResult},
    services::{DependencyService, LifecycleConfig, RecordActivityRequest, TaskLifecycleError},
};
use tokio::sync::Barrier;

/// Store whose edge reads wait for every racing caller, so each one
/// validates against the same snapshot before any insert lands.
struct LockstepEdges {
    inner: Arc<InMemoryTaskStore>,
    barrier: Barrier,
}

#[async_trait]
impl TaskRepository for LockstepEdges {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.inner.store(task).await
    }

    async fn update(&self, task: &Task, expected_version: u64) -> TaskRepositoryResult<()> {
        self.inner.update(task, expected_version).await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.inner.delete(id).await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_ids(&self, ids: &[TaskId]) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.find_by_ids(ids).await
    }

    async fn find_due_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.find_due_between(start, end).await
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> TaskRepositoryResult<Vec<Task>> {
        self.inner.find_overdue(now).await
    }
}

#[async_trait]
impl DependencyRepository for LockstepEdges {
    async fn insert_edge(&self, edge: DependencyEdge) -> TaskRepositoryResult<()> {
        self.inner.insert_edge(edge).await
    }

    async fn remove_edge(&self, edge: DependencyEdge) -> TaskRepositoryResult<bool> {
        self.inner.remove_edge(edge).await
    }

    async fn list_edges(&self) -> TaskRepositoryResult<Vec<DependencyEdge>> {
        let edges = self.inner.list_edges().await;
        self.barrier.wait().await;
        edges
    }
}

async fn chain(services: &Services, titles: &[&str]) -> Result<Vec<TaskId>, eyre::Report> {
    let mut ids = Vec::new();
    for title in titles {
        ids.push(services.create(title).await?);
    }
    for pair in ids.windows(2) {
        if let [from, to] = pair {
            services.dependencies.add_dependency(*from, *to).await?;
        }
    }
    Ok(ids)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn closing_a_long_cycle_is_rejected(services: Services) -> Result<(), eyre::Report> {
    let ids = chain(&services, &["a", "b", "c", "d", "e"]).await?;
    let (Some(first), Some(last)) = (ids.first(), ids.last()) else {
        eyre::bail!("chain is empty");
    };

    let result = services.dependencies.add_dependency(*last, *first).await;

    eyre::ensure!(
        matches!(
            result,
            Err(TaskLifecycleError::Domain(TaskDomainError::DependencyCycle { .. }))
        ),
        "expected DependencyCycle, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completing_dependencies_unblocks_in_order(
    services: Services,
) -> Result<(), eyre::Report> {
    let ids = chain(&services, &["deploy", "test", "build"]).await?;
    let [deploy, test, build] = ids.as_slice() else {
        eyre::bail!("expected three tasks");
    };

    let blocked = services
        .activities
        .record_activity(RecordActivityRequest::new(*test, ActivityType::Completed))
        .await;
    eyre::ensure!(blocked.is_err(), "test waits for build");

    services.record_after(0, *build, ActivityType::Completed).await?;
    services.record_after(0, *test, ActivityType::Completed).await?;
    services.record_after(0, *deploy, ActivityType::Completed).await?;

    let task = services.tasks.get(*deploy).await?;
    eyre::ensure!(task.is_completed(), "deploy completed last");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn direct_gating_ignores_indirect_dependencies(
    services: Services,
) -> Result<(), eyre::Report> {
    let top = services.create("top").await?;
    let middle = services.create("middle").await?;
    let bottom = services.create("bottom").await?;
    services.dependencies.add_dependency(top, middle).await?;
    services.record_after(0, middle, ActivityType::Completed).await?;
    services.dependencies.add_dependency(middle, bottom).await?;

    services.record_after(0, top, ActivityType::Completed).await?;

    let task = services.tasks.get(top).await?;
    eyre::ensure!(task.is_completed(), "only the direct dependency gates");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transitive_gating_blocks_on_indirect_dependencies() -> Result<(), eyre::Report> {
    let config = LifecycleConfig {
        dependency_gating: DependencyGating::Transitive,
        ..LifecycleConfig::default()
    };
    let services = Services::with_config(&config);
    let top = services.create("top").await?;
    let middle = services.create("middle").await?;
    let bottom = services.create("bottom").await?;
    services.dependencies.add_dependency(top, middle).await?;
    services.record_after(0, middle, ActivityType::Completed).await?;
    services.dependencies.add_dependency(middle, bottom).await?;

    let result = services
        .activities
        .record_activity(RecordActivityRequest::new(top, ActivityType::Completed))
        .await;

    eyre::ensure!(
        matches!(
            result,
            Err(TaskLifecycleError::Domain(TaskDomainError::IncompleteDependencies {
                ref incomplete,
                ..
            })) if incomplete.as_slice() == [bottom]
        ),
        "expected bottom to gate completion, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn racing_reverse_edges_keep_the_graph_acyclic(
    services: Services,
) -> Result<(), eyre::Report> {
    let a = services.create("a").await?;
    let b = services.create("b").await?;
    let lockstep = Arc::new(LockstepEdges {
        inner: Arc::clone(&services.store),
        barrier: Barrier::new(2),
    });
    let forward = DependencyService::new(Arc::clone(&lockstep));
    let backward = DependencyService::new(lockstep);

    let first = tokio::spawn(async move { forward.add_dependency(a, b).await });
    let second = tokio::spawn(async move { backward.add_dependency(b, a).await });
    let results = [first.await?, second.await?];

    let accepted = results.iter().filter(|result| result.is_ok()).count();
    let cyclic = results
        .iter()
        .filter(|result| {
            matches!(
                result,
                Err(TaskLifecycleError::Domain(TaskDomainError::DependencyCycle { .. }))
            )
        })
        .count();
    eyre::ensure!(accepted == 1 && cyclic == 1, "one edge wins, got {results:?}");

    let graph = DependencyGraph::from_edges(services.store.list_edges().await?);
    eyre::ensure!(graph.edge_count() == 1, "exactly one edge stored");
    eyre::ensure!(!graph.reaches(a, a), "graph stays acyclic");
    Ok(())
}
