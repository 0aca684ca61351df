//! Parameter structures for runbook operations
//!
//! These structures are shared by every interface (CLI, HTTP, MCP) and carry
//! no framework-specific derives beyond serde and an optional JSON schema.
//! Interface layers wrap them:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │ HTTP / MCP body │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Request bodies from older clients use camelCase keys (`flowTypes`,
//! `startTime`, ...); those are accepted as serde aliases.
//!
//! Raw strings (statuses, timestamps) are validated here, so every interface
//! reports the same `InvalidInput` errors.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, RunbookError},
    models::{
        ServiceType, StepStatus, TaskStatus, TemplateStepInput, UpdateStepRequest,
        UpdateTaskRequest,
    },
};

/// Page size used when a history query does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a history query may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Generic parameters for operations requiring just an ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Id {
    /// The ID of the resource to operate on
    pub id: u64,
}

/// Parameters for creating a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateTask {
    /// Name of the rollout (required)
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Flow types to materialize, in band order. Empty selects every
    /// built-in flow type.
    #[serde(default, alias = "flowTypes")]
    pub flow_types: Vec<String>,
}

impl CreateTask {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RunbookError::invalid_input("name").with_reason("Task name cannot be empty"));
        }
        Ok(())
    }
}

/// Parameters for listing tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListTasks {
    /// Only list tasks with this status
    pub status: Option<String>,
}

impl ListTasks {
    /// Parsed status filter.
    pub fn status(&self) -> Result<Option<TaskStatus>> {
        parse_task_status(self.status.as_deref())
    }
}

/// Parameters for updating a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateTask {
    /// Task ID to update
    #[serde(default)]
    pub id: u64,
    /// New name
    pub name: Option<String>,
    /// New description; an empty string clears it
    pub description: Option<String>,
    /// New status: 'draft', 'in_progress', 'paused' or 'failed'
    pub status: Option<String>,
    /// RFC 3339 start time
    #[serde(default, alias = "startTime")]
    pub start_time: Option<String>,
    /// RFC 3339 end time
    #[serde(default, alias = "endTime")]
    pub end_time: Option<String>,
}

impl UpdateTask {
    /// Parses and checks the raw fields.
    ///
    /// # Errors
    ///
    /// * `RunbookError::InvalidInput` - unknown status, blank name,
    ///   unparseable time, or nothing to update
    pub fn validate(&self) -> Result<UpdateTaskRequest> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(
                    RunbookError::invalid_input("name").with_reason("Task name cannot be empty")
                );
            }
        }

        let request = UpdateTaskRequest {
            name: self.name.as_ref().map(|name| name.trim().to_string()),
            description: self.description.clone(),
            status: parse_task_status(self.status.as_deref())?,
            start_time: parse_time("start_time", self.start_time.as_deref())?,
            end_time: parse_time("end_time", self.end_time.as_deref())?,
        };

        if request == UpdateTaskRequest::default() {
            return Err(RunbookError::invalid_input("task").with_reason("Nothing to update"));
        }
        check_time_order(&request.start_time, &request.end_time)?;
        Ok(request)
    }
}

/// Parameters for updating a step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateStep {
    /// Step ID to update
    #[serde(default)]
    pub id: u64,
    /// New status: 'pending', 'in_progress', 'completed', 'failed' or
    /// 'skipped'
    pub status: Option<String>,
    /// Operator notes; an empty string clears them
    pub notes: Option<String>,
    /// RFC 3339 start time, overriding the automatic stamp
    #[serde(default, alias = "startTime")]
    pub start_time: Option<String>,
    /// RFC 3339 end time, overriding the automatic stamp
    #[serde(default, alias = "endTime")]
    pub end_time: Option<String>,
}

impl UpdateStep {
    /// Parses and checks the raw fields.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use runbook_core::{models::StepStatus, params::UpdateStep};
    ///
    /// let params = UpdateStep {
    ///     id: 1,
    ///     status: Some("in_progress".to_string()),
    ///     ..Default::default()
    /// };
    /// let request = params.validate()?;
    /// assert_eq!(request.status, Some(StepStatus::InProgress));
    ///
    /// let empty = UpdateStep { id: 1, ..Default::default() };
    /// assert!(empty.validate().is_err());
    /// # Ok::<(), runbook_core::RunbookError>(())
    /// ```
    pub fn validate(&self) -> Result<UpdateStepRequest> {
        let status = match self.status.as_deref() {
            Some(raw) => Some(raw.parse::<StepStatus>().map_err(|_| {
                RunbookError::invalid_input("status").with_reason(format!(
                    "Invalid status: {raw}. Must be 'pending', 'in_progress', 'completed', 'failed' or 'skipped'"
                ))
            })?),
            None => None,
        };

        let request = UpdateStepRequest {
            status,
            notes: self.notes.clone(),
            start_time: parse_time("start_time", self.start_time.as_deref())?,
            end_time: parse_time("end_time", self.end_time.as_deref())?,
        };

        if request.is_empty() {
            return Err(RunbookError::invalid_input("step").with_reason("Nothing to update"));
        }
        check_time_order(&request.start_time, &request.end_time)?;
        Ok(request)
    }
}

/// Parameters for forcing an in-progress task to completed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ForceComplete {
    /// Task ID
    #[serde(default)]
    pub id: u64,
    /// Why the remaining steps are being bypassed; kept in the audit trail
    pub reason: Option<String>,
}

/// Parameters for listing flow templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListTemplates {
    /// Only list this flow type's template
    #[serde(default, alias = "flowType")]
    pub flow_type: Option<String>,
}

/// Parameters for replacing a flow type's template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ReplaceTemplates {
    /// Flow type whose template is replaced
    #[serde(default, alias = "flowType")]
    pub flow_type: String,
    /// The new steps, in order; step_order is assigned by position
    pub templates: Vec<TemplateStepInput>,
}

impl ReplaceTemplates {
    /// Parses a JSON payload that is either an array of step definitions or
    /// an object with a `templates` array.
    pub fn from_json(flow_type: &str, json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|e| {
            RunbookError::invalid_input("templates").with_reason(format!("Invalid JSON: {e}"))
        })?;
        Self::from_value(flow_type, value)
    }

    /// Same as [`ReplaceTemplates::from_json`] for an already parsed value.
    pub fn from_value(flow_type: &str, value: serde_json::Value) -> Result<Self> {
        let items = match value {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Object(mut object) => match object.remove("templates") {
                Some(serde_json::Value::Array(items)) => items,
                _ => return Err(not_a_step_list()),
            },
            _ => return Err(not_a_step_list()),
        };

        let templates = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value::<TemplateStepInput>(item).map_err(|e| {
                    RunbookError::invalid_input("templates")
                        .with_reason(format!("Step {}: {e}", index + 1))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            flow_type: flow_type.to_string(),
            templates,
        })
    }
}

fn not_a_step_list() -> RunbookError {
    RunbookError::invalid_input("templates")
        .with_reason("Expected an array of step definitions")
}

/// Parameters for resetting templates to their baseline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ResetTemplates {
    /// Built-in flow type to reset; all of them when omitted
    #[serde(default, alias = "flowType")]
    pub flow_type: Option<String>,
}

/// Paging parameters for the history list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct HistoryQuery {
    /// 1-based page number
    pub page: Option<u32>,
    /// Records per page
    #[serde(default, alias = "pageSize")]
    pub page_size: Option<u32>,
}

impl HistoryQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// Parameters for registering a service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateService {
    /// Technical name
    pub name: String,
    /// Name shown to operators
    #[serde(alias = "displayName")]
    pub display_name: String,
    /// 'DS', 'SERVICE' or 'API'
    #[serde(alias = "type", alias = "serviceType")]
    pub service_type: ServiceType,
    /// Region, e.g. 'domestic' or 'international'
    pub region: String,
    /// Core level, e.g. 'core' or 'non_core'
    #[serde(alias = "coreLevel")]
    pub core_level: String,
    /// Data center, e.g. 'IDC1'
    pub idc: String,
    #[serde(default, alias = "groupName")]
    pub group_name: Option<String>,
    #[serde(default, alias = "servicePath")]
    pub service_path: Option<String>,
    #[serde(default, alias = "managementUrl")]
    pub management_url: Option<String>,
}

impl CreateService {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("name", &self.name),
            ("display_name", &self.display_name),
            ("region", &self.region),
            ("core_level", &self.core_level),
            ("idc", &self.idc),
        ] {
            if value.trim().is_empty() {
                return Err(RunbookError::invalid_input(field).with_reason("Value cannot be empty"));
            }
        }
        Ok(())
    }
}

fn parse_task_status(raw: Option<&str>) -> Result<Option<TaskStatus>> {
    match raw {
        Some(raw) => raw.parse::<TaskStatus>().map(Some).map_err(|_| {
            RunbookError::invalid_input("status").with_reason(format!(
                "Invalid status: {raw}. Must be 'draft', 'in_progress', 'completed', 'failed' or 'paused'"
            ))
        }),
        None => Ok(None),
    }
}

fn parse_time(field: &str, raw: Option<&str>) -> Result<Option<jiff::Timestamp>> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => raw.parse::<jiff::Timestamp>().map(Some).map_err(|e| {
            RunbookError::invalid_input(field)
                .with_reason(format!("Expected an RFC 3339 timestamp, got {raw:?}: {e}"))
        }),
        None => Ok(None),
    }
}

fn check_time_order(
    start: &Option<jiff::Timestamp>,
    end: &Option<jiff::Timestamp>,
) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(RunbookError::invalid_input("end_time")
                .with_reason("End time cannot be earlier than start time"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StepType;

    #[test]
    fn test_create_task_accepts_camel_case_flow_types() {
        let params: CreateTask = serde_json::from_str(
            r#"{"name":"Weekly release","flowTypes":["international_crawler"]}"#,
        )
        .unwrap();
        assert_eq!(params.flow_types, vec!["international_crawler"]);
        assert!(params.validate().is_ok());

        let blank = CreateTask {
            name: "   ".into(),
            ..Default::default()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_update_step_validate_status() {
        let params = UpdateStep {
            id: 1,
            status: Some("completed".to_string()),
            ..Default::default()
        };
        assert_eq!(
            params.validate().unwrap(),
            UpdateStepRequest::status(StepStatus::Completed)
        );
    }

    #[test]
    fn test_update_step_validate_invalid_status() {
        let params = UpdateStep {
            id: 1,
            status: Some("done".to_string()),
            ..Default::default()
        };
        match params.validate().unwrap_err() {
            RunbookError::InvalidInput { field, reason } => {
                assert_eq!(field, "status");
                assert!(reason.contains("Invalid status: done"));
            }
            other => panic!("Expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn test_update_step_validate_times() {
        let params: UpdateStep = serde_json::from_str(
            r#"{"notes":"ok","startTime":"2024-03-01T10:00:00Z","endTime":"2024-03-01T10:20:00Z"}"#,
        )
        .unwrap();
        let request = params.validate().unwrap();
        assert_eq!(request.notes.as_deref(), Some("ok"));
        assert!(request.start_time.is_some());
        assert!(request.end_time.is_some());

        let reversed = UpdateStep {
            start_time: Some("2024-03-01T10:20:00Z".into()),
            end_time: Some("2024-03-01T10:00:00Z".into()),
            ..Default::default()
        };
        assert!(reversed.validate().is_err());

        let garbage = UpdateStep {
            start_time: Some("yesterday".into()),
            ..Default::default()
        };
        match garbage.validate().unwrap_err() {
            RunbookError::InvalidInput { field, .. } => assert_eq!(field, "start_time"),
            other => panic!("Expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn test_update_step_requires_a_change() {
        assert!(UpdateStep::default().validate().is_err());
    }

    #[test]
    fn test_update_task_validate() {
        let params = UpdateTask {
            id: 3,
            status: Some("paused".into()),
            ..Default::default()
        };
        assert_eq!(
            params.validate().unwrap(),
            UpdateTaskRequest::status(TaskStatus::Paused)
        );

        let blank_name = UpdateTask {
            name: Some(" ".into()),
            ..Default::default()
        };
        assert!(blank_name.validate().is_err());
        assert!(UpdateTask::default().validate().is_err());

        let bad_status = UpdateTask {
            status: Some("archived".into()),
            ..Default::default()
        };
        assert!(bad_status.validate().is_err());
    }

    #[test]
    fn test_list_tasks_status_filter() {
        assert_eq!(ListTasks::default().status().unwrap(), None);
        let params = ListTasks {
            status: Some("completed".into()),
        };
        assert_eq!(params.status().unwrap(), Some(TaskStatus::Completed));
    }

    #[test]
    fn test_replace_templates_accepts_array_or_object() {
        let from_array = ReplaceTemplates::from_json(
            "canary",
            r#"[{"stepName":"Flip flag","stepType":"config","estimatedDuration":2}]"#,
        )
        .unwrap();
        assert_eq!(from_array.flow_type, "canary");
        assert_eq!(from_array.templates.len(), 1);
        assert_eq!(from_array.templates[0].step_type, StepType::Config);

        let from_object = ReplaceTemplates::from_json(
            "canary",
            r#"{"templates":[{"step_name":"Check","step_type":"verify"}]}"#,
        )
        .unwrap();
        assert_eq!(from_object.templates[0].step_name, "Check");
    }

    #[test]
    fn test_replace_templates_rejects_non_lists() {
        for payload in [r#"{"steps":[]}"#, r#""text""#, "42", "not json"] {
            match ReplaceTemplates::from_json("canary", payload).unwrap_err() {
                RunbookError::InvalidInput { field, .. } => assert_eq!(field, "templates"),
                other => panic!("Expected InvalidInput error, got {other:?}"),
            }
        }

        let unknown_type =
            ReplaceTemplates::from_json("canary", r#"[{"stepName":"x","stepType":"restart"}]"#)
                .unwrap_err();
        assert!(unknown_type.to_string().contains("Step 1"));
    }

    #[test]
    fn test_history_query_defaults() {
        let query = HistoryQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), DEFAULT_PAGE_SIZE);

        let query = HistoryQuery {
            page: Some(0),
            page_size: Some(5_000),
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_create_service_aliases_and_validation() {
        let service: CreateService = serde_json::from_str(
            r#"{"name":"search-ds","displayName":"Search DS","type":"DS","region":"domestic","coreLevel":"non_core","idc":"IDC1"}"#,
        )
        .unwrap();
        assert_eq!(service.service_type, ServiceType::Ds);
        assert!(service.validate().is_ok());

        let mut missing = service.clone();
        missing.idc = String::new();
        assert!(missing.validate().is_err());
    }
}
