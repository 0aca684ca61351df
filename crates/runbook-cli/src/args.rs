use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, Subcommand};

use crate::cli::{HistoryCommands, ServiceCommands, StepCommands, TaskCommands, TemplateCommands};

/// Release runbook: walk a rollout through its flow steps
///
/// A task is one rollout. Creating it expands the selected flow types into
/// ordered steps with dependencies; `task todos` then shows what can be done
/// next. The same operations are available over HTTP (`serve`) and as MCP
/// tools (`mcp`).
#[derive(Parser)]
#[command(version, about, name = "runbook")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/runbook/runbook.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Manage rollout tasks
    #[command(alias = "t")]
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Work on the steps of a task
    #[command(alias = "s")]
    Step {
        #[command(subcommand)]
        command: StepCommands,
    },
    /// Inspect and edit flow templates
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// List the built-in flow types
    FlowTypes,
    /// Browse finished tasks
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Manage the service registry
    Service {
        #[command(subcommand)]
        command: ServiceCommands,
    },
    /// Serve the JSON HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:3000")]
        listen: SocketAddr,
    },
    /// Start the MCP server on stdio
    Mcp,
}
