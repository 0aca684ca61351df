//! Computed (never persisted) operator work items.

use serde::{Deserialize, Serialize};

/// What the operator is asked to do.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TodoAction {
    /// Start or one-click complete an unblocked pending step
    Operate,
    /// Acknowledge that an in-progress step has finished
    Confirm,
}

/// Status-derived priority label: `high` for work to start, `medium` for
/// work to confirm.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    High,
    Medium,
}

/// One actionable item for the operator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TodoItem {
    /// `step-{id}` for operate items, `confirm-{id}` for confirm items
    pub id: String,
    pub title: String,
    pub description: String,
    pub flow_type: String,
    pub flow_label: String,
    pub flow_icon: String,
    pub priority: TodoPriority,
    /// Minutes
    pub estimated_time: u32,
    pub action: TodoAction,
    pub step_id: u64,
    pub task_id: u64,
}
