//! Validated request types for updating models.

use jiff::Timestamp;

use super::{StepStatus, TaskStatus};

/// Validated partial update of a step.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpdateStepRequest {
    pub status: Option<StepStatus>,
    pub notes: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
}

impl UpdateStepRequest {
    /// Shorthand for a pure status transition.
    pub fn status(status: StepStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.notes.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
    }
}

impl TryFrom<crate::params::UpdateStep> for UpdateStepRequest {
    type Error = crate::RunbookError;

    fn try_from(params: crate::params::UpdateStep) -> Result<Self, Self::Error> {
        params.validate()
    }
}

/// Validated partial update of a task.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpdateTaskRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
}

impl UpdateTaskRequest {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

impl TryFrom<crate::params::UpdateTask> for UpdateTaskRequest {
    type Error = crate::RunbookError;

    fn try_from(params: crate::params::UpdateTask) -> Result<Self, Self::Error> {
        params.validate()
    }
}
