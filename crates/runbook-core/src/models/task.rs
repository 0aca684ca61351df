//! Task model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Step, StepStatus, TaskStatus};

/// A rollout task together with its materialized steps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier for the task
    pub id: u64,

    /// Name of the rollout
    pub name: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Lifecycle status
    #[serde(default)]
    pub status: TaskStatus,

    /// When the rollout started (UTC)
    pub start_time: Option<Timestamp>,

    /// When the rollout finished (UTC)
    pub end_time: Option<Timestamp>,

    /// Timestamp when the task was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the task was last modified (UTC)
    pub updated_at: Timestamp,

    /// Steps ordered by step_order
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Task {
    /// Number of steps already completed.
    pub fn completed_steps(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.status == StepStatus::Completed)
            .count()
    }

    /// Distinct flow types in step order.
    pub fn flow_types(&self) -> Vec<&str> {
        let mut flow_types: Vec<&str> = Vec::new();
        for step in &self.steps {
            if !flow_types.contains(&step.flow_type.as_str()) {
                flow_types.push(&step.flow_type);
            }
        }
        flow_types
    }
}
