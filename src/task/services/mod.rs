//! Application services orchestrating the task domain over the ports.
//!
//! Services load the affected task, run the pure domain rules, and hand the
//! repository a single versioned write. They never retry on a concurrent
//! modification; the caller decides.

mod activity;
mod config;
mod dependency;
mod error;
mod lifecycle;
mod subtask;
mod tag;

pub use activity::{ActivityService, RecordActivityRequest};
pub use config::LifecycleConfig;
pub use dependency::DependencyService;
pub use error::{TaskLifecycleError, TaskLifecycleResult};
pub use lifecycle::{CreateTaskRequest, TaskLifecycleService};
pub use subtask::{AddSubtaskRequest, SubtaskService};
pub use tag::TagService;
