//! MCP server implementation for the runbook
//!
//! Exposes task, todo and template operations as Model Context Protocol
//! tools so an assistant can walk an operator through a rollout.

use std::future::Future;

use anyhow::Result;
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use runbook_core::Runbook;
use tokio::signal::unix::{signal, SignalKind};

pub mod errors;
pub mod handlers;

pub use handlers::{
    CreateTask, ForceComplete, Id, ListTasks, ListTemplates, McpResult, ResetTemplates,
    UpdateStep,
};

const INSTRUCTIONS: &str = r#"The runbook tracks release rollouts. A task is one rollout; creating it expands the selected flow types (domestic_non_core, international_non_core, international_crawler) into ordered steps with dependencies.

## Workflow
1. `create_task` with a name and the flow types to ship (empty selects all of them). Only one task can be in progress.
2. `list_todos` shows what the operator can do now: `operate` items for unblocked pending steps, `confirm` items for steps in progress.
3. `update_step` moves a step: pending -> in_progress -> completed/failed, or pending -> skipped. A step only starts once every step it depends on is completed.
4. The task completes by itself when every step is completed. `force_complete_task` closes it early and records an audit message.

## Templates
`list_templates` and `reset_templates` inspect or restore the step templates that new tasks are built from. Existing tasks keep their steps."#;

/// MCP server for the runbook
#[derive(Clone)]
pub struct RunbookMcpServer {
    runbook: Runbook,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl RunbookMcpServer {
    pub fn new(runbook: Runbook) -> Self {
        Self {
            runbook,
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> handlers::McpHandlers {
        handlers::McpHandlers::new(self.runbook.clone())
    }

    #[tool(
        name = "list_tasks",
        description = "List rollout tasks, newest first, with step progress. Optionally filter by status: 'draft', 'in_progress', 'completed', 'failed' or 'paused'."
    )]
    async fn list_tasks(&self, params: Parameters<ListTasks>) -> McpResult {
        self.handlers().list_tasks(params).await
    }

    #[tool(
        name = "show_task",
        description = "Show a task with every step grouped by flow type, including status, dependencies, timings, notes and reference links."
    )]
    async fn show_task(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_task(params).await
    }

    #[tool(
        name = "create_task",
        description = "Start a rollout. Requires a name; flow_types lists the flow types to ship in order (empty selects all built-in ones). Fails if another task is in progress."
    )]
    async fn create_task(&self, params: Parameters<CreateTask>) -> McpResult {
        self.handlers().create_task(params).await
    }

    #[tool(
        name = "list_todos",
        description = "List what can be done now for a task: 'operate' items for pending steps whose dependencies are all completed and 'confirm' items for steps in progress."
    )]
    async fn list_todos(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().list_todos(params).await
    }

    #[tool(
        name = "update_step",
        description = "Update a step by ID. status may be 'in_progress', 'completed', 'failed' or 'skipped'; notes replaces the operator notes (empty clears them); start_time and end_time (RFC 3339) override the recorded times. Completing the last open step completes the task."
    )]
    async fn update_step(&self, params: Parameters<UpdateStep>) -> McpResult {
        self.handlers().update_step(params).await
    }

    #[tool(
        name = "force_complete_task",
        description = "Mark an in-progress task completed even though some steps are not. An optional reason is stored in the audit trail."
    )]
    async fn force_complete_task(&self, params: Parameters<ForceComplete>) -> McpResult {
        self.handlers().force_complete_task(params).await
    }

    #[tool(
        name = "list_templates",
        description = "List the stored step templates, optionally for one flow_type."
    )]
    async fn list_templates(&self, params: Parameters<ListTemplates>) -> McpResult {
        self.handlers().list_templates(params).await
    }

    #[tool(
        name = "reset_templates",
        description = "Restore a built-in flow type's template (or all of them when flow_type is omitted) to the baseline steps."
    )]
    async fn reset_templates(&self, params: Parameters<ResetTemplates>) -> McpResult {
        self.handlers().reset_templates(params).await
    }

    #[tool(
        name = "list_flow_types",
        description = "List the built-in flow types with their labels."
    )]
    async fn list_flow_types(&self) -> McpResult {
        self.handlers().list_flow_types()
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for RunbookMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "runbook".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: RunbookMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting runbook MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registers_every_tool() {
        let dir = tempfile::tempdir().unwrap();
        let runbook = runbook_core::RunbookBuilder::new()
            .with_database_path(Some(dir.path().join("mcp.db")))
            .build()
            .await
            .unwrap();

        let server = RunbookMcpServer::new(runbook);
        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "create_task",
                "force_complete_task",
                "list_flow_types",
                "list_tasks",
                "list_templates",
                "list_todos",
                "reset_templates",
                "show_task",
                "update_step",
            ]
        );
    }
}
