//! Task handlers that take interface parameters and return display wrappers.

use super::Runbook;
use crate::{
    display::{CreateResult, DeleteResult, TaskSummaries, Todos, UpdateResult},
    error::{Result, RunbookError},
    models::{Task, UpdateTaskRequest},
    params::{CreateTask, ForceComplete, Id, ListTasks, UpdateTask},
};

impl Runbook {
    /// Lists task summaries with an optional status filter.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use runbook_core::{params::ListTasks, RunbookBuilder};
    /// # async {
    /// let runbook = RunbookBuilder::new().build().await?;
    /// let params = ListTasks { status: Some("in_progress".to_string()) };
    /// let summaries = runbook.list_tasks_summary(&params).await?;
    /// # Result::<(), runbook_core::RunbookError>::Ok(())
    /// # };
    /// ```
    pub async fn list_tasks_summary(&self, params: &ListTasks) -> Result<TaskSummaries> {
        let status = params.status()?;
        Ok(TaskSummaries(self.list_tasks(status).await?))
    }

    /// Shows a task with its steps, failing when it does not exist.
    pub async fn show_task(&self, params: &Id) -> Result<Task> {
        self.get_task(params.id)
            .await?
            .ok_or(RunbookError::TaskNotFound { id: params.id })
    }

    pub async fn create_task_result(&self, params: &CreateTask) -> Result<CreateResult<Task>> {
        self.create_task(params).await.map(CreateResult::new)
    }

    /// Validates and applies a task update, listing what changed.
    pub async fn update_task_result(&self, params: &UpdateTask) -> Result<UpdateResult<Task>> {
        let request = UpdateTaskRequest::try_from(params.clone())?;
        let changes = describe_task_changes(&request);
        let task = self.update_task(params.id, request).await?;
        Ok(UpdateResult::with_changes(task, changes))
    }

    pub async fn force_complete_task_result(
        &self,
        params: &ForceComplete,
    ) -> Result<UpdateResult<Task>> {
        let task = self.force_complete_task(params).await?;
        let mut changes = vec!["Status: completed (forced)".to_string()];
        if let Some(reason) = params.reason.as_deref().filter(|r| !r.trim().is_empty()) {
            changes.push(format!("Reason: {}", reason.trim()));
        }
        Ok(UpdateResult::with_changes(task, changes))
    }

    /// Deletes a task, returning what was removed.
    pub async fn delete_task_result(&self, params: &Id) -> Result<DeleteResult<Task>> {
        let task = self.show_task(params).await?;
        self.delete_task(params.id).await?;
        Ok(DeleteResult::new(task))
    }

    /// The operator's todo list for a task.
    pub async fn list_todos(&self, params: &Id) -> Result<Todos> {
        Ok(Todos(self.get_todos(params.id).await?))
    }
}

fn describe_task_changes(request: &UpdateTaskRequest) -> Vec<String> {
    let mut changes = Vec::new();
    if let Some(name) = &request.name {
        changes.push(format!("Name: {name}"));
    }
    match request.description.as_deref() {
        Some(description) if description.trim().is_empty() => {
            changes.push("Description: cleared".to_string())
        }
        Some(description) => changes.push(format!("Description: {description}")),
        None => {}
    }
    if let Some(status) = request.status {
        changes.push(format!("Status: {}", status.as_str()));
    }
    if let Some(start_time) = request.start_time {
        changes.push(format!("Start time: {start_time}"));
    }
    if let Some(end_time) = request.end_time {
        changes.push(format!("End time: {end_time}"));
    }
    changes
}
