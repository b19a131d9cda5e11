//! Taskledger: a task-lifecycle engine with work-time accounting.
//!
//! The crate tracks tasks through an idle, active, paused and completed work
//! cycle, keeps an auditable ledger of the activities that drove each
//! transition, prevents cyclic task dependencies, and rolls subtask status
//! up to the parent task.
//!
//! # Architecture
//!
//! Taskledger follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: Concrete implementations of ports (in-memory store, clocks)
//!
//! # Modules
//!
//! - [`task`]: Work tracking, dependencies, subtasks and tags

pub mod task;
