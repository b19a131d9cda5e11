//! Task aggregate root and related lifecycle types.

use super::{
    ParsePriorityError, ParseTaskStatusError, TagId, TaskDomainError, TaskId, WorkPeriodId,
    WorkState, WorkTransition,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Completion status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work tracking has not completed.
    Pending,
    /// Work tracking has completed.
    Completed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Medium priority.
    #[default]
    Medium,
    /// High priority.
    High,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

/// Validated, trimmed title shared by tasks and subtasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Title(String);

impl Title {
    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the value is blank, or
    /// [`TaskDomainError::TitleTooLong`] when it exceeds `max_length`
    /// characters after trimming.
    pub fn new(value: impl Into<String>, max_length: usize) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        let length = trimmed.chars().count();
        if length > max_length {
            return Err(TaskDomainError::TitleTooLong {
                max: max_length,
                actual: length,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Update instruction for an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Leave the field unchanged.
    #[default]
    Keep,
    /// Replace the field value.
    Set(T),
    /// Remove the field value.
    Clear,
}

impl<T> FieldUpdate<T> {
    fn apply(self, field: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Set(value) => *field = Some(value),
            Self::Clear => *field = None,
        }
    }
}

/// Explicit patch of a task's editable fields.
///
/// Absent fields are left unchanged. Work state, status, totals and derived
/// completion are never editable through a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    /// New title.
    pub title: Option<String>,
    /// Description change.
    pub description: FieldUpdate<String>,
    /// Due date change.
    pub due_date: FieldUpdate<DateTime<Utc>>,
    /// New priority.
    pub priority: Option<Priority>,
}

impl TaskUpdate {
    /// Returns whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description == FieldUpdate::Keep
            && self.due_date == FieldUpdate::Keep
            && self.priority.is_none()
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: Title,
    description: Option<String>,
    due_date: Option<DateTime<Utc>>,
    priority: Priority,
    status: TaskStatus,
    work_state: WorkState,
    total_work_time: u64,
    last_state_change_at: DateTime<Utc>,
    current_work_period: Option<WorkPeriodId>,
    subtasks_completed: bool,
    tag_ids: Vec<TagId>,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: Title,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted completion status.
    pub status: TaskStatus,
    /// Persisted work state.
    pub work_state: WorkState,
    /// Persisted accumulated work time in seconds.
    pub total_work_time: u64,
    /// Persisted timestamp of the last work-state change.
    pub last_state_change_at: DateTime<Utc>,
    /// Persisted open work period, if any.
    pub current_work_period: Option<WorkPeriodId>,
    /// Persisted subtask-derived completion flag.
    pub subtasks_completed: bool,
    /// Persisted tag references.
    pub tag_ids: Vec<TagId>,
    /// Persisted optimistic-concurrency version.
    pub version: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new idle, pending task.
    #[must_use]
    pub fn new(title: Title, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            title,
            description: None,
            due_date: None,
            priority: Priority::default(),
            status: TaskStatus::Pending,
            work_state: WorkState::Idle,
            total_work_time: 0,
            last_state_change_at: timestamp,
            current_work_period: None,
            subtasks_completed: false,
            tag_ids: Vec::new(),
            version: 0,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the task due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the task priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            due_date: data.due_date,
            priority: data.priority,
            status: data.status,
            work_state: data.work_state,
            total_work_time: data.total_work_time,
            last_state_change_at: data.last_state_change_at,
            current_work_period: data.current_work_period,
            subtasks_completed: data.subtasks_completed,
            tag_ids: data.tag_ids,
            version: data.version,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &Title {
        &self.title
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the task priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the completion status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns whether work tracking has completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.status, TaskStatus::Completed)
    }

    /// Returns the work-tracking state.
    #[must_use]
    pub const fn work_state(&self) -> WorkState {
        self.work_state
    }

    /// Returns the accumulated work time in seconds.
    #[must_use]
    pub const fn total_work_time(&self) -> u64 {
        self.total_work_time
    }

    /// Returns the timestamp of the last work-state change.
    #[must_use]
    pub const fn last_state_change_at(&self) -> DateTime<Utc> {
        self.last_state_change_at
    }

    /// Returns the open work period, if a session is in progress.
    #[must_use]
    pub const fn current_work_period(&self) -> Option<WorkPeriodId> {
        self.current_work_period
    }

    /// Returns the subtask-derived completion flag.
    #[must_use]
    pub const fn subtasks_completed(&self) -> bool {
        self.subtasks_completed
    }

    /// Returns the attached tag identifiers.
    #[must_use]
    pub fn tag_ids(&self) -> &[TagId] {
        &self.tag_ids
    }

    /// Returns the optimistic-concurrency version observed at load time.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether the task is due strictly before `now` and still
    /// pending.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed() && self.due_date.is_some_and(|due| due < now)
    }

    /// Applies an explicit field patch.
    ///
    /// The title is validated before any field is touched, so a rejected
    /// patch leaves the task unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] or
    /// [`TaskDomainError::TitleTooLong`] for an invalid title.
    pub fn apply_update(
        &mut self,
        update: TaskUpdate,
        max_title_length: usize,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let title = update
            .title
            .map(|raw| Title::new(raw, max_title_length))
            .transpose()?;
        if let Some(new_title) = title {
            self.title = new_title;
        }
        update.description.apply(&mut self.description);
        update.due_date.apply(&mut self.due_date);
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        self.touch(clock.utc());
        Ok(())
    }

    /// Attaches a tag. Returns `false` when the tag was already attached.
    pub fn attach_tag(&mut self, tag_id: TagId, clock: &impl Clock) -> bool {
        if self.tag_ids.contains(&tag_id) {
            return false;
        }
        self.tag_ids.push(tag_id);
        self.touch(clock.utc());
        true
    }

    /// Detaches a tag. Returns `false` when the tag was not attached.
    pub fn detach_tag(&mut self, tag_id: TagId, clock: &impl Clock) -> bool {
        if !self.remove_tag_reference(tag_id) {
            return false;
        }
        self.touch(clock.utc());
        true
    }

    /// Drops a tag reference without touching timestamps.
    ///
    /// Used by persistence adapters when the tag itself is deleted.
    pub fn remove_tag_reference(&mut self, tag_id: TagId) -> bool {
        let before = self.tag_ids.len();
        self.tag_ids.retain(|id| *id != tag_id);
        self.tag_ids.len() != before
    }

    /// Marks the in-memory copy as one version ahead of the persisted copy.
    ///
    /// Services call this right before a write and hand the previous value
    /// to the repository as the expected version.
    pub const fn advance_version(&mut self) {
        self.version = self.version.saturating_add(1);
    }

    /// Applies an allowed work-state transition produced for `activity`.
    pub(super) fn apply_work_transition(
        &mut self,
        transition: &WorkTransition,
        accrues_work_time: bool,
        now: DateTime<Utc>,
    ) {
        if accrues_work_time {
            let delta = transition.work_time.unwrap_or(0);
            self.total_work_time = self.total_work_time.saturating_add(delta);
        }
        if transition.changes_state() {
            self.work_state = transition.new_state;
            self.last_state_change_at = now;
            if transition.new_state == WorkState::Completed {
                self.status = TaskStatus::Completed;
            }
        }
        self.touch(now);
    }

    pub(super) const fn open_work_period(&mut self, period: WorkPeriodId) {
        self.current_work_period = Some(period);
    }

    pub(super) const fn close_work_period(&mut self) -> Option<WorkPeriodId> {
        self.current_work_period.take()
    }

    pub(super) fn set_subtasks_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        self.subtasks_completed = completed;
        self.touch(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
