//! Display formatting for domain models and operation results.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! this module adds newtype wrappers for collections and operation results so
//! the same data reads naturally as a list, a creation confirmation or an
//! update summary. Everything renders as markdown.
//!
//! - [`collections`]: `TaskSummaries`, `Steps`, `Todos`, `Templates`, ...
//! - [`results`]: `CreateResult`, `UpdateResult`, `DeleteResult`
//! - [`status`]: one-line confirmations (`OperationStatus`)
//! - [`datetime`]: timestamp and duration formatting
//!
//! ```rust
//! use runbook_core::display::OperationStatus;
//!
//! let status = OperationStatus::success("Templates reset to baseline");
//! assert_eq!(status.to_string(), "Success: Templates reset to baseline\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{FlowTypes, Services, Steps, TaskSummaries, Templates, Todos};
pub use datetime::{LocalDateTime, Minutes};
pub use results::{CreateResult, DeleteResult, UpdateResult};
pub use status::{OperationStatus, StatusLevel};
