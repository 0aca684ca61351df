//! Core library for the runbook release tool.
//!
//! A task is one rollout. Creating it expands the selected flow types into
//! concrete steps with dependency links; operators then work through those
//! steps while the crate tracks which ones are unblocked and completes the
//! task once every step is done.
//!
//! # Layout
//!
//! - [`flows`]: built-in flow types, baseline templates and step
//!   materialization into disjoint step_order bands
//! - [`engine`]: pure dependency, todo and lifecycle rules
//! - [`db`]: SQLite persistence, one transaction per mutation
//! - [`runbook`]: the async [`Runbook`] facade used by every interface
//! - [`models`], [`params`], [`display`]: data, interface parameters and
//!   markdown formatting
//!
//! # Quick Start
//!
//! ```rust
//! use runbook_core::{
//!     params::{CreateTask, Id, UpdateStep},
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
//!         flow_types: vec!["international_crawler".to_string()],
//!     })
//!     .await?;
//!
//! // Only the first step is unblocked
//! let todos = runbook.list_todos(&Id { id: task.id }).await?;
//! assert_eq!(todos.len(), 1);
//!
//! let result = runbook
//!     .update_step_result(&UpdateStep {
//!         id: todos[0].step_id,
//!         status: Some("in_progress".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod display;
pub mod engine;
pub mod error;
pub mod flows;
pub mod models;
pub mod params;
pub mod runbook;

// Re-export commonly used types
pub use db::Database;
pub use display::{
    CreateResult, DeleteResult, OperationStatus, Steps, TaskSummaries, Todos, UpdateResult,
};
pub use error::{ErrorKind, Result, RunbookError};
pub use models::{
    Step, StepStatus, StepType, StepUpdate, Task, TaskStatus, TaskSummary, TodoItem,
    UpdateStepRequest, UpdateTaskRequest,
};
pub use params::{CreateTask, ForceComplete, Id, ListTasks, UpdateStep, UpdateTask};
pub use runbook::{Runbook, RunbookBuilder};
