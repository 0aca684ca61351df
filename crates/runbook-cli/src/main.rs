//! Runbook CLI Application
//!
//! Command-line entry point: the same runbook operations as terminal
//! commands, a JSON HTTP API or an MCP server on stdio.

mod args;
mod cli;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use renderer::TerminalRenderer;
use runbook_cli::{
    http,
    mcp::{run_stdio_server, RunbookMcpServer},
};
use runbook_core::RunbookBuilder;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        command,
    } = Args::parse();

    let runbook = RunbookBuilder::new()
        .with_database_path(database_file)
        .build()
        .await
        .context("Failed to initialize runbook")?;

    info!("Runbook started with {}", runbook.database_path().display());

    let cli = || Cli::new(runbook.clone(), TerminalRenderer::new(!no_color));

    match command {
        Some(Task { command }) => cli().handle_task_command(command).await,
        Some(Step { command }) => cli().handle_step_command(command).await,
        Some(Template { command }) => cli().handle_template_command(command).await,
        Some(FlowTypes) => cli().list_flow_types(),
        Some(History { command }) => cli().handle_history_command(command).await,
        Some(Service { command }) => cli().handle_service_command(command).await,
        Some(Serve { listen }) => http::serve(runbook, listen)
            .await
            .context("HTTP server failed"),
        Some(Mcp) => {
            info!("Starting runbook MCP server");
            run_stdio_server(RunbookMcpServer::new(runbook))
                .await
                .context("MCP server failed")
        }
        None => cli().current_task().await,
    }
}
