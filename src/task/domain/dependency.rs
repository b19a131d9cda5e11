//! Dependency relation between tasks.
//!
//! Edges are stored by task identifier, never by embedded task values, so
//! cycle detection is a traversal over ids.

use super::{Task, TaskDomainError, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

/// Directed edge: `task_id` depends on `depends_on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    task_id: TaskId,
    depends_on: TaskId,
}

impl DependencyEdge {
    /// Creates an edge stating that `task_id` depends on `depends_on`.
    #[must_use]
    pub const fn new(task_id: TaskId, depends_on: TaskId) -> Self {
        Self {
            task_id,
            depends_on,
        }
    }

    /// Returns the dependent task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the dependency task.
    #[must_use]
    pub const fn depends_on(&self) -> TaskId {
        self.depends_on
    }

    /// Returns whether the edge touches `task_id` at either end.
    #[must_use]
    pub fn touches(&self, task_id: TaskId) -> bool {
        self.task_id == task_id || self.depends_on == task_id
    }
}

/// How far completion gating looks along the dependency relation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DependencyGating {
    /// Only direct dependencies must be completed.
    #[default]
    Direct,
    /// Every dependency reachable through the relation must be completed.
    Transitive,
}

/// Acyclic, irreflexive "depends on" relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    outgoing: BTreeMap<TaskId, BTreeSet<TaskId>>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from already-validated persisted edges.
    #[must_use]
    pub fn from_edges(edges: impl IntoIterator<Item = DependencyEdge>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph
                .outgoing
                .entry(edge.task_id)
                .or_default()
                .insert(edge.depends_on);
        }
        graph
    }

    /// Returns whether the exact ordered edge exists.
    #[must_use]
    pub fn contains(&self, edge: DependencyEdge) -> bool {
        self.outgoing
            .get(&edge.task_id)
            .is_some_and(|targets| targets.contains(&edge.depends_on))
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(BTreeSet::len).sum()
    }

    /// Returns all edges in identifier order.
    #[must_use]
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.outgoing
            .iter()
            .flat_map(|(task_id, targets)| {
                targets
                    .iter()
                    .map(|depends_on| DependencyEdge::new(*task_id, *depends_on))
            })
            .collect()
    }

    /// Checks that `edge` can be inserted without breaking the graph
    /// invariants.
    ///
    /// # Errors
    ///
    /// - [`TaskDomainError::SelfDependency`] for a self-loop.
    /// - [`TaskDomainError::DependencyExists`] for a duplicate edge.
    /// - [`TaskDomainError::DependencyCycle`] when `depends_on` already
    ///   reaches `task_id`.
    pub fn validate_insertion(&self, edge: DependencyEdge) -> Result<(), TaskDomainError> {
        if edge.task_id == edge.depends_on {
            return Err(TaskDomainError::SelfDependency(edge.task_id));
        }
        if self.contains(edge) {
            return Err(TaskDomainError::DependencyExists {
                task_id: edge.task_id,
                depends_on: edge.depends_on,
            });
        }
        if self.reaches(edge.depends_on, edge.task_id) {
            return Err(TaskDomainError::DependencyCycle {
                task_id: edge.task_id,
                depends_on: edge.depends_on,
            });
        }
        Ok(())
    }

    /// Inserts a validated edge.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`Self::validate_insertion`].
    pub fn insert(&mut self, edge: DependencyEdge) -> Result<(), TaskDomainError> {
        self.validate_insertion(edge)?;
        self.outgoing
            .entry(edge.task_id)
            .or_default()
            .insert(edge.depends_on);
        Ok(())
    }

    /// Removes an edge.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DependencyNotFound`] when the edge is
    /// absent.
    pub fn remove(&mut self, edge: DependencyEdge) -> Result<(), TaskDomainError> {
        let removed = self
            .outgoing
            .get_mut(&edge.task_id)
            .is_some_and(|targets| targets.remove(&edge.depends_on));
        if !removed {
            return Err(TaskDomainError::DependencyNotFound {
                task_id: edge.task_id,
                depends_on: edge.depends_on,
            });
        }
        if self
            .outgoing
            .get(&edge.task_id)
            .is_some_and(BTreeSet::is_empty)
        {
            self.outgoing.remove(&edge.task_id);
        }
        Ok(())
    }

    /// Returns whether `target` is reachable from `from` over one or more
    /// "depends on" edges.
    ///
    /// Depth-first search that stops as soon as `target` is found.
    #[must_use]
    pub fn reaches(&self, from: TaskId, target: TaskId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            let Some(targets) = self.outgoing.get(&current) else {
                continue;
            };
            for next in targets {
                if *next == target {
                    return true;
                }
                if visited.insert(*next) {
                    stack.push(*next);
                }
            }
        }
        false
    }

    /// Returns the direct dependencies of `task_id`.
    #[must_use]
    pub fn dependencies_of(&self, task_id: TaskId) -> Vec<TaskId> {
        self.outgoing
            .get(&task_id)
            .map(|targets| targets.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns every dependency reachable from `task_id`, nearest first.
    #[must_use]
    pub fn transitive_dependencies_of(&self, task_id: TaskId) -> Vec<TaskId> {
        let mut seen = HashSet::from([task_id]);
        let mut queue = VecDeque::from([task_id]);
        let mut ordered = Vec::new();
        while let Some(current) = queue.pop_front() {
            for next in self.dependencies_of(current) {
                if seen.insert(next) {
                    ordered.push(next);
                    queue.push_back(next);
                }
            }
        }
        ordered
    }

    /// Returns the tasks that directly depend on `task_id`.
    #[must_use]
    pub fn dependents_of(&self, task_id: TaskId) -> Vec<TaskId> {
        self.outgoing
            .iter()
            .filter(|(_, targets)| targets.contains(&task_id))
            .map(|(dependent, _)| *dependent)
            .collect()
    }

    /// Returns the dependencies `gating` requires to be completed before
    /// `task_id` may complete.
    #[must_use]
    pub fn gating_dependencies_of(&self, task_id: TaskId, gating: DependencyGating) -> Vec<TaskId> {
        match gating {
            DependencyGating::Direct => self.dependencies_of(task_id),
            DependencyGating::Transitive => self.transitive_dependencies_of(task_id),
        }
    }
}

/// Checks that every task in `dependencies` has completed.
///
/// # Errors
///
/// Returns [`TaskDomainError::IncompleteDependencies`] listing the pending
/// dependencies in the order given.
pub fn ensure_can_complete(task_id: TaskId, dependencies: &[Task]) -> Result<(), TaskDomainError> {
    let incomplete: Vec<TaskId> = dependencies
        .iter()
        .filter(|dependency| !dependency.is_completed())
        .map(Task::id)
        .collect();
    if incomplete.is_empty() {
        return Ok(());
    }
    Err(TaskDomainError::IncompleteDependencies {
        task_id,
        incomplete,
    })
}
