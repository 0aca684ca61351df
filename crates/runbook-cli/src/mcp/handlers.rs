//! MCP tool handlers implementation

use log::debug;
use rmcp::{
    handler::server::tool::Parameters,
    model::{CallToolResult, Content},
    ErrorData,
};
use runbook_core::{display::OperationStatus, params as core, Runbook};
use schemars::JsonSchema;
use serde::Deserialize;

use super::errors::to_mcp_error;

/// Generic MCP wrapper for core parameter types.
///
/// Passes deserialization and schema generation through to the wrapped type
/// so core parameters stay free of protocol concerns.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

pub type Id = McpParams<core::Id>;
pub type CreateTask = McpParams<core::CreateTask>;
pub type ListTasks = McpParams<core::ListTasks>;
pub type UpdateStep = McpParams<core::UpdateStep>;
pub type ForceComplete = McpParams<core::ForceComplete>;
pub type ListTemplates = McpParams<core::ListTemplates>;
pub type ResetTemplates = McpParams<core::ResetTemplates>;

pub type McpResult = Result<CallToolResult, ErrorData>;

fn text(markdown: impl Into<String>) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(markdown.into())]))
}

/// Handler implementations for the MCP server
pub struct McpHandlers {
    runbook: Runbook,
}

impl McpHandlers {
    pub fn new(runbook: Runbook) -> Self {
        Self { runbook }
    }

    pub async fn list_tasks(&self, Parameters(params): Parameters<ListTasks>) -> McpResult {
        debug!("list_tasks: {params:?}");
        let summaries = self
            .runbook
            .list_tasks_summary(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list tasks", &e))?;

        let title = match params.as_ref().status.as_deref() {
            Some(status) => format!("Tasks ({status})"),
            None => "Tasks".to_string(),
        };
        text(format!("# {title}\n\n{summaries}"))
    }

    pub async fn show_task(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_task: {params:?}");
        let task = self
            .runbook
            .show_task(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to show task", &e))?;
        text(task.to_string())
    }

    pub async fn create_task(&self, Parameters(params): Parameters<CreateTask>) -> McpResult {
        debug!("create_task: {params:?}");
        let result = self
            .runbook
            .create_task_result(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to create task", &e))?;
        text(result.to_string())
    }

    pub async fn list_todos(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("list_todos: {params:?}");
        let todos = self
            .runbook
            .list_todos(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list todos", &e))?;
        text(format!("# Todo for task {}\n\n{todos}", params.as_ref().id))
    }

    pub async fn update_step(&self, Parameters(params): Parameters<UpdateStep>) -> McpResult {
        debug!("update_step: {params:?}");
        let result = self
            .runbook
            .update_step_result(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to update step", &e))?;
        text(result.to_string())
    }

    pub async fn force_complete_task(
        &self,
        Parameters(params): Parameters<ForceComplete>,
    ) -> McpResult {
        debug!("force_complete_task: {params:?}");
        let result = self
            .runbook
            .force_complete_task_result(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to force-complete task", &e))?;
        text(result.to_string())
    }

    pub async fn list_templates(
        &self,
        Parameters(params): Parameters<ListTemplates>,
    ) -> McpResult {
        debug!("list_templates: {params:?}");
        let templates = self
            .runbook
            .list_templates(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list templates", &e))?;
        text(templates.to_string())
    }

    pub async fn reset_templates(
        &self,
        Parameters(params): Parameters<ResetTemplates>,
    ) -> McpResult {
        debug!("reset_templates: {params:?}");
        let reset = self
            .runbook
            .reset_templates(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to reset templates", &e))?;
        let status = OperationStatus::success(format!(
            "Templates reset to baseline: {}",
            reset.join(", ")
        ));
        text(status.to_string())
    }

    pub fn list_flow_types(&self) -> McpResult {
        text(self.runbook.list_flow_types().to_string())
    }
}
