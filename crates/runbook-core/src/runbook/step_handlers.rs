//! Step handlers that take interface parameters and return display wrappers.

use super::Runbook;
use crate::{
    display::{Steps, UpdateResult},
    error::{Result, RunbookError},
    models::{Step, StepUpdate, UpdateStepRequest},
    params::{Id, UpdateStep},
};

impl Runbook {
    /// Steps of the task identified by `params`.
    pub async fn list_steps(&self, params: &Id) -> Result<Steps> {
        Ok(Steps(self.get_steps(params.id).await?))
    }

    /// Shows a step, failing when it does not exist.
    pub async fn show_step(&self, params: &Id) -> Result<Step> {
        self.get_step(params.id)
            .await?
            .ok_or(RunbookError::StepNotFound { id: params.id })
    }

    /// Validates and applies a step update, listing what changed.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use runbook_core::{params::UpdateStep, RunbookBuilder};
    /// # async {
    /// let runbook = RunbookBuilder::new().build().await?;
    /// let result = runbook
    ///     .update_step_result(&UpdateStep {
    ///         id: 1,
    ///         status: Some("in_progress".to_string()),
    ///         ..Default::default()
    ///     })
    ///     .await?;
    /// println!("{result}");
    /// # Result::<(), runbook_core::RunbookError>::Ok(())
    /// # };
    /// ```
    pub async fn update_step_result(
        &self,
        params: &UpdateStep,
    ) -> Result<UpdateResult<StepUpdate>> {
        let request = UpdateStepRequest::try_from(params.clone())?;
        let changes = describe_step_changes(&request);
        let update = self.update_step(params.id, request).await?;
        Ok(UpdateResult::with_changes(update, changes))
    }
}

fn describe_step_changes(request: &UpdateStepRequest) -> Vec<String> {
    let mut changes = Vec::new();
    if let Some(status) = request.status {
        changes.push(format!("Status: {}", status.as_str()));
    }
    match request.notes.as_deref() {
        Some(notes) if notes.trim().is_empty() => changes.push("Notes: cleared".to_string()),
        Some(notes) => changes.push(format!("Notes: {notes}")),
        None => {}
    }
    if let Some(start_time) = request.start_time {
        changes.push(format!("Start time: {start_time}"));
    }
    if let Some(end_time) = request.end_time {
        changes.push(format!("End time: {end_time}"));
    }
    changes
}
