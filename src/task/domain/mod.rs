//! Domain model for task lifecycle management.
//!
//! Everything here is pure: operations take explicit inputs (current state,
//! an injected clock or instant) and return new values or typed errors.
//! Persistence and orchestration live outside the domain boundary.

mod activity;
mod dependency;
mod error;
mod ids;
mod ledger;
mod subtask;
mod tag;
mod task;
pub mod work_state;
mod work_time;

pub use activity::{Activity, ActivityType, PersistedActivityData};
pub use dependency::{DependencyEdge, DependencyGating, DependencyGraph, ensure_can_complete};
pub use error::{
    DeletionRefusal, EntityRef, ParseActivityTypeError, ParsePriorityError,
    ParseSubtaskStatusError, ParseTaskStatusError, ParseWorkStateError, TaskDomainError,
    TransitionRejection,
};
pub use ids::{ActivityId, SubtaskId, TagId, TaskId, WorkPeriodId};
pub use ledger::ActivityLedger;
pub use subtask::{
    PersistedSubtaskData, Subtask, SubtaskStatus, derived_completion, next_order,
    recompute_completion, reorder_subtasks, sort_subtasks,
};
pub use tag::{Tag, TagName};
pub use task::{FieldUpdate, PersistedTaskData, Priority, Task, TaskStatus, TaskUpdate, Title};
pub use work_state::{WorkState, WorkTransition};
pub use work_time::{WorkTimeSummary, format_work_time};
