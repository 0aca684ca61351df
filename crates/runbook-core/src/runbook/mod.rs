//! High-level runbook API.
//!
//! [`Runbook`] is the single entry point used by every interface (CLI, HTTP,
//! MCP). It validates parameters, runs each operation on a fresh SQLite
//! connection inside [`tokio::task::spawn_blocking`] and returns either models
//! or display wrappers.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │    Handlers     │    │   Operations    │    │    Database     │
//! │ (task_handlers, │───▶│ (task_ops,      │───▶│   (via db/)     │
//! │  step_handlers) │    │  step_ops, ...) │    │                 │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for [`Runbook`] instances
//! - [`task_ops`], [`step_ops`]: task and step operations returning models
//! - [`task_handlers`], [`step_handlers`]: the same operations taking raw
//!   parameters and returning display wrappers
//! - [`template_ops`]: flow template store and flow-type catalogue
//! - [`history_ops`]: history, export and the service registry
//!
//! # Examples
//!
//! ```rust
//! use runbook_core::{
//!     params::{CreateTask, Id},
//!     RunbookBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! let runbook = RunbookBuilder::new()
//!     .with_database_path(Some(dir.path().join("runbook.db")))
//!     .build()
//!     .await?;
//!
//! let task = runbook
//!     .create_task(&CreateTask {
//!         name: "Weekly release".to_string(),
//!         description: None,
//!         flow_types: vec!["domestic_non_core".to_string()],
//!     })
//!     .await?;
//! let todos = runbook.list_todos(&Id { id: task.id }).await?;
//! println!("{todos}");
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use tokio::task;

use crate::{
    db::Database,
    error::{Result, RunbookError},
};

pub mod builder;
pub mod history_ops;
pub mod step_handlers;
pub mod step_ops;
pub mod task_handlers;
pub mod task_ops;
pub mod template_ops;

#[cfg(test)]
mod tests;

pub use builder::RunbookBuilder;

/// Main interface for managing tasks, steps and flow templates.
#[derive(Debug, Clone)]
pub struct Runbook {
    pub(crate) db_path: PathBuf,
}

impl Runbook {
    pub(crate) fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Path of the SQLite database this runbook operates on.
    pub fn database_path(&self) -> &std::path::Path {
        &self.db_path
    }

    /// Runs `operation` against a freshly opened database on the blocking
    /// thread pool.
    pub(crate) async fn with_database<T, F>(&self, operation: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            operation(&mut db)
        })
        .await
        .map_err(RunbookError::join)?
    }
}
