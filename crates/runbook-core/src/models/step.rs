//! Step model definition and related functionality.

use jiff::Timestamp;
use log::warn;
use serde::{Deserialize, Serialize};

use super::{StepStatus, StepType, TaskStatus};

/// A named reference pointer shown to the operator next to a step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct StepLink {
    pub name: String,
    pub url: String,
}

impl StepLink {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Represents one concrete step of a task's rollout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Unique identifier for the step
    pub id: u64,

    /// ID of the owning task
    pub task_id: u64,

    /// Position within the task; also the address used by `dependencies`
    pub step_order: u32,

    /// Human readable step name
    pub step_name: String,

    /// Category of work
    pub step_type: StepType,

    /// Current status of the step
    pub status: StepStatus,

    /// Flow type this step was materialized from
    pub flow_type: String,

    /// Estimated duration in minutes (advisory only)
    pub estimated_duration: Option<u32>,

    /// Measured duration in minutes, set when the step finishes
    pub actual_duration: Option<u32>,

    /// When the step was started (UTC)
    pub start_time: Option<Timestamp>,

    /// When the step finished (UTC)
    pub end_time: Option<Timestamp>,

    /// Free-form operator notes
    pub notes: Option<String>,

    /// step_order values that must all be completed before this step starts
    #[serde(default)]
    pub dependencies: Vec<u32>,

    /// Reference links for the operator
    #[serde(default)]
    pub links: Vec<StepLink>,

    /// Timestamp when the step was created (UTC)
    pub created_at: Timestamp,
}

/// Outcome of an operator update to a step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepUpdate {
    /// The step as persisted
    pub step: Step,

    /// Status of the owning task after the update
    pub task_status: TaskStatus,

    /// Whether this update completed the task
    pub task_completed: bool,
}

/// Parses stored dependency text into step_order values.
///
/// Missing, empty or malformed text yields an empty list; historical rows
/// with bad data must not block the operator.
pub fn parse_dependencies(raw: Option<&str>) -> Vec<u32> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<u32>>(raw) {
        Ok(dependencies) => dependencies,
        Err(e) => {
            warn!("Ignoring malformed dependency list {raw:?}: {e}");
            Vec::new()
        }
    }
}

/// Parses stored link JSON, recovering malformed data as no links.
pub fn parse_links(raw: Option<&str>) -> Vec<StepLink> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<StepLink>>(raw) {
        Ok(links) => links,
        Err(e) => {
            warn!("Ignoring malformed link list {raw:?}: {e}");
            Vec::new()
        }
    }
}
