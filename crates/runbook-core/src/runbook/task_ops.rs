//! Task operations for the Runbook.

use log::{info, warn};

use super::Runbook;
use crate::{
    engine,
    error::{Result, RunbookError},
    models::{Task, TaskStatus, TaskSummary, TodoItem, UpdateTaskRequest},
    params::{CreateTask, ForceComplete},
};

impl Runbook {
    /// Creates a task in progress and materializes the steps of its flow
    /// types. Fails with `ActiveTaskExists` while another task is in
    /// progress.
    pub async fn create_task(&self, params: &CreateTask) -> Result<Task> {
        params.validate()?;
        let name = params.name.trim().to_string();
        let description = params.description.clone();
        let flow_types = params.flow_types.clone();

        let task = self
            .with_database(move |db| {
                db.create_task(&name, description.as_deref(), &flow_types)
            })
            .await?;

        info!(
            "Created task {} '{}' with {} steps ({})",
            task.id,
            task.name,
            task.steps.len(),
            task.flow_types().join(", ")
        );
        Ok(task)
    }

    /// Retrieves a task with its steps.
    pub async fn get_task(&self, id: u64) -> Result<Option<Task>> {
        self.with_database(move |db| db.get_task(id)).await
    }

    /// Lists task summaries, newest first.
    pub async fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<TaskSummary>> {
        self.with_database(move |db| db.list_tasks(status)).await
    }

    /// The task currently in progress, if any.
    pub async fn current_task(&self) -> Result<Option<Task>> {
        self.with_database(|db| db.current_task()).await
    }

    /// Applies an explicit operator update to a task.
    pub async fn update_task(&self, id: u64, request: UpdateTaskRequest) -> Result<Task> {
        self.with_database(move |db| db.update_task(id, &request))
            .await
    }

    /// Marks an in-progress task completed regardless of its steps. The
    /// override is recorded as an audit message.
    pub async fn force_complete_task(&self, params: &ForceComplete) -> Result<Task> {
        let id = params.id;
        let reason = params.reason.clone();

        let task = self
            .with_database(move |db| db.force_complete_task(id, reason.as_deref()))
            .await?;

        warn!(
            "Task {} '{}' force-completed with {}/{} steps completed",
            task.id,
            task.name,
            task.completed_steps(),
            task.steps.len()
        );
        Ok(task)
    }

    /// Permanently deletes a task with its steps and messages.
    pub async fn delete_task(&self, id: u64) -> Result<()> {
        self.with_database(move |db| db.delete_task(id)).await
    }

    /// Computes the operator's todo list for a task.
    ///
    /// A finished task has nothing left to act on, so its list is empty.
    pub async fn get_todos(&self, task_id: u64) -> Result<Vec<TodoItem>> {
        let task = self
            .get_task(task_id)
            .await?
            .ok_or(RunbookError::TaskNotFound { id: task_id })?;

        if task.status.is_finished() {
            return Ok(Vec::new());
        }
        Ok(engine::build_todo_list(task.id, &task.steps))
    }
}
