//! Tunables shared by the task services.

use crate::task::domain::DependencyGating;

/// Configuration for task lifecycle services.
///
/// # Examples
///
/// ```
/// use taskledger::task::domain::DependencyGating;
/// use taskledger::task::services::LifecycleConfig;
///
/// let config = LifecycleConfig::default();
/// assert_eq!(config.dependency_gating, DependencyGating::Direct);
///
/// let strict = LifecycleConfig::strict();
/// assert_eq!(strict.dependency_gating, DependencyGating::Transitive);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Maximum title length in characters for tasks and subtasks.
    pub max_title_length: usize,
    /// How far completion gating looks along the dependency relation.
    pub dependency_gating: DependencyGating,
    /// Window used by `find_due_soon_default`, in days.
    pub due_soon_default_days: u32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_title_length: 255,
            dependency_gating: DependencyGating::Direct,
            due_soon_default_days: 3,
        }
    }
}

impl LifecycleConfig {
    /// Creates a strict configuration: shorter titles and transitive
    /// dependency gating.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            max_title_length: 120,
            dependency_gating: DependencyGating::Transitive,
            due_soon_default_days: 3,
        }
    }

    /// Creates a lenient configuration with generous title limits.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            max_title_length: 1_000,
            ..Default::default()
        }
    }
}
