//! The dependency and todo rules that drive a rollout.
//!
//! Everything here is a pure function of a step snapshot: nothing reads the
//! database or the clock unless a timestamp is passed in. The database layer
//! loads the snapshot, asks the engine, and persists whatever it decides.
//!
//! - [`can_execute`] decides whether a step is actionable right now
//! - [`build_todo_list`] turns a snapshot into operator work items
//! - [`check_step_transition`] and [`apply_step_update`] guard and apply
//!   step status changes
//! - [`recompute_task_status`] is the auto-complete rule

mod eligibility;
mod lifecycle;
mod todos;


pub use eligibility::{can_execute, find_by_order};
pub use lifecycle::{
    apply_step_update, check_step_transition, check_task_transition, minutes_between,
    next_status_is_allowed, recompute_task_status,
};
pub use todos::{build_todo_list, CONFIRM_ESTIMATE_MINUTES};
