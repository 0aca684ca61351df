//! Messages and finished-rollout history records.

use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Step, StepStatus, Task};

/// Kind of message attached to a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Sync message generated for the operator to paste into team chat
    Notification,
    /// Record of an explicit operator override
    Audit,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Notification => "notification",
            MessageType::Audit => "audit",
        }
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notification" => Ok(MessageType::Notification),
            "audit" => Ok(MessageType::Audit),
            _ => Err(format!("Invalid message type: {s}")),
        }
    }
}

/// Text of the sync message an operator posts about a step.
pub fn sync_notification(step: &Step) -> String {
    format!("[Release sync] {} ({})", step.step_name, step.status.as_str())
}

/// A message recorded against a task (and optionally one of its steps).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: u64,
    pub task_id: u64,
    pub step_id: Option<u64>,
    pub message_type: MessageType,
    pub content: String,
    pub is_sent: bool,
    pub created_at: Timestamp,
}

/// Aggregate figures for a finished rollout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TaskStatistics {
    pub total_steps: u32,
    pub completed_steps: u32,
    pub failed_steps: u32,
    /// Whole minutes between task start and end, 0 when either is unknown
    pub total_duration: u64,
}

impl From<&Task> for TaskStatistics {
    fn from(task: &Task) -> Self {
        let count = |status: StepStatus| {
            task.steps.iter().filter(|step| step.status == status).count() as u32
        };
        let total_duration = match (task.start_time, task.end_time) {
            (Some(start), Some(end)) if end > start => {
                (end.as_second() - start.as_second()) as u64 / 60
            }
            _ => 0,
        };

        Self {
            total_steps: task.steps.len() as u32,
            completed_steps: count(StepStatus::Completed),
            failed_steps: count(StepStatus::Failed),
            total_duration,
        }
    }
}

/// A finished task with everything recorded against it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRecord {
    pub task: Task,
    pub messages: Vec<Message>,
    pub statistics: TaskStatistics,
}

impl HistoryRecord {
    pub fn new(task: Task, messages: Vec<Message>) -> Self {
        let statistics = TaskStatistics::from(&task);
        Self {
            task,
            messages,
            statistics,
        }
    }
}

/// Paging metadata.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub page_size: u32,
    pub total: u64,
}

/// One page of history records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryPage {
    pub records: Vec<HistoryRecord>,
    pub pagination: Pagination,
}
