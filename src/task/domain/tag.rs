//! Tags that can be attached to tasks.

use super::{TagId, TaskDomainError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trimmed, non-empty tag name. Uniqueness is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagName(String);

impl TagName {
    /// Creates a validated tag name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTagName`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTagName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as entered (trimmed).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the key used for uniqueness checks.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Label shared across tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    id: TagId,
    name: TagName,
    color: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Tag {
    /// Creates a tag.
    #[must_use]
    pub fn new(name: TagName, color: Option<String>, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TagId::new(),
            name,
            color,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Returns the tag identifier.
    #[must_use]
    pub const fn id(&self) -> TagId {
        self.id
    }

    /// Returns the tag name.
    #[must_use]
    pub const fn name(&self) -> &TagName {
        &self.name
    }

    /// Returns the display colour, if any.
    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
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

    /// Renames the tag.
    pub fn rename(&mut self, name: TagName, clock: &impl Clock) {
        self.name = name;
        self.updated_at = clock.utc();
    }
}
