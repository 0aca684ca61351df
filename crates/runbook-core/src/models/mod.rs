//! Data models for tasks, steps and flow templates.
//!
//! This module contains the core domain models of the runbook system. Display
//! implementations for these models live in [`crate::display::models`] to keep
//! data structures separate from presentation logic.
//!
//! ## Persisted models
//!
//! - [`Task`]: one rollout, owning its [`Step`]s
//! - [`Step`]: a concrete, addressable unit of work, materialized from a
//!   flow template
//! - [`TemplateStep`]: an editable step definition of a flow type
//! - [`Message`]: notifications and audit records attached to a task
//! - [`Service`]: registry of deployable services
//!
//! ## Computed models
//!
//! - [`TodoItem`]: actionable items derived from a step snapshot
//! - [`TaskSummary`], [`HistoryRecord`]: aggregate views
//!
//! # Examples
//!
//! ```rust
//! use runbook_core::models::{Step, StepStatus, StepType};
//! use jiff::Timestamp;
//!
//! let step = Step {
//!     id: 1,
//!     task_id: 1,
//!     step_order: 1,
//!     step_name: "Disable auto-loading switch".to_string(),
//!     step_type: StepType::Config,
//!     status: StepStatus::InProgress,
//! #   flow_type: "domestic_non_core".to_string(),
//! #   estimated_duration: Some(5),
//! #   actual_duration: None,
//! #   start_time: None,
//! #   end_time: None,
//! #   notes: None,
//! #   dependencies: vec![],
//! #   links: vec![],
//! #   created_at: Timestamp::now(),
//! };
//! println!("{}", step); // Shows ➤ In Progress status icon
//! ```

pub mod history;
pub mod requests;
pub mod service;
pub mod status;
pub mod step;
pub mod summary;
pub mod task;
pub mod template;
pub mod todo;


pub use history::{
    sync_notification, HistoryPage, HistoryRecord, Message, MessageType, Pagination, TaskStatistics,
};
pub use requests::{UpdateStepRequest, UpdateTaskRequest};
pub use service::{Service, ServiceType};
pub use status::{StepStatus, StepType, TaskStatus};
pub use step::{Step, StepLink, StepUpdate};
pub use summary::TaskSummary;
pub use task::Task;
pub use template::{FlowTypeInfo, TemplateStep, TemplateStepInput};
pub use todo::{TodoAction, TodoItem, TodoPriority};
