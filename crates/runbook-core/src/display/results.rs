//! Result wrapper types for displaying operation outcomes.

use std::fmt;

use crate::models::{Step, StepUpdate, Task, TaskStatus};

/// Wrapper type for displaying the result of create operations.
///
/// # Examples
///
/// ```rust
/// use runbook_core::{
///     display::CreateResult,
///     models::{Task, TaskStatus},
/// };
/// use jiff::Timestamp;
///
/// let task = Task {
///     id: 1,
///     name: "Weekly release".to_string(),
///     description: None,
///     status: TaskStatus::InProgress,
///     start_time: Some(Timestamp::now()),
///     end_time: None,
///     created_at: Timestamp::now(),
///     updated_at: Timestamp::now(),
///     steps: vec![],
/// };
///
/// let output = CreateResult::new(task).to_string();
/// assert!(output.contains("Created task with ID: 1"));
/// ```
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for CreateResult<Task> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Created task with ID: {} ({} steps)",
            self.resource.id,
            self.resource.steps.len()
        )?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of update operations, with an
/// optional list of the changes made.
pub struct UpdateResult<T> {
    pub resource: T,
    pub changes: Vec<String>,
}

impl<T> UpdateResult<T> {
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            changes: Vec::new(),
        }
    }

    pub fn with_changes(resource: T, changes: Vec<String>) -> Self {
        Self { resource, changes }
    }

    fn fmt_changes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.changes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Changes made:")?;
            for change in &self.changes {
                writeln!(f, "- {change}")?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for UpdateResult<Task> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated task with ID: {}", self.resource.id)?;
        self.fmt_changes(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for UpdateResult<StepUpdate> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step: &Step = &self.resource.step;
        writeln!(f, "Updated step with ID: {}", step.id)?;
        if self.resource.task_completed {
            writeln!(f)?;
            writeln!(
                f,
                "All steps are completed: task {} is now {}.",
                step.task_id,
                TaskStatus::Completed
            )?;
        }
        self.fmt_changes(f)?;
        write!(f, "{step}")
    }
}

/// Wrapper type for displaying the result of delete operations.
pub struct DeleteResult<T> {
    pub resource: T,
}

impl<T> DeleteResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for DeleteResult<Task> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Deleted task '{}' (ID: {}) and its {} steps",
            self.resource.name,
            self.resource.id,
            self.resource.steps.len()
        )
    }
}
