//! Task summary types and functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{StepStatus, Task, TaskStatus};

/// Summary information about a task with step statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSummary {
    /// Task ID
    pub id: u64,
    /// Name of the task
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Task status
    pub status: TaskStatus,
    /// Rollout start
    pub start_time: Option<Timestamp>,
    /// Rollout end
    pub end_time: Option<Timestamp>,
    /// Creation timestamp
    pub created_at: Timestamp,
    /// Last update timestamp
    pub updated_at: Timestamp,
    /// Total number of steps
    pub total_steps: u32,
    /// Number of completed steps
    pub completed_steps: u32,
    /// Number of steps not yet completed
    pub pending_steps: u32,
}

impl From<&Task> for TaskSummary {
    fn from(task: &Task) -> Self {
        let total_steps = task.steps.len() as u32;
        let completed_steps = task
            .steps
            .iter()
            .filter(|step| step.status == StepStatus::Completed)
            .count() as u32;

        Self {
            id: task.id,
            name: task.name.clone(),
            description: task.description.clone(),
            status: task.status,
            start_time: task.start_time,
            end_time: task.end_time,
            created_at: task.created_at,
            updated_at: task.updated_at,
            total_steps,
            completed_steps,
            pending_steps: total_steps - completed_steps,
        }
    }
}
