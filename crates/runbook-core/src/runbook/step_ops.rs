//! Step operations for the Runbook.

use log::info;

use super::Runbook;
use crate::{
    error::{Result, RunbookError},
    models::{sync_notification, Message, MessageType, Step, StepUpdate, UpdateStepRequest},
};

impl Runbook {
    /// Steps of a task in step_order.
    pub async fn get_steps(&self, task_id: u64) -> Result<Vec<Step>> {
        self.with_database(move |db| db.get_steps(task_id)).await
    }

    pub async fn get_step(&self, id: u64) -> Result<Option<Step>> {
        self.with_database(move |db| db.get_step(id)).await
    }

    /// Applies an operator update to a step.
    ///
    /// Status changes are checked against the transition table and the
    /// step's dependencies. Completing the last open step completes the
    /// task.
    pub async fn update_step(&self, id: u64, request: UpdateStepRequest) -> Result<StepUpdate> {
        let update = self
            .with_database(move |db| db.update_step(id, &request))
            .await?;

        if update.task_completed {
            info!(
                "Step {} completed the last open step of task {}",
                update.step.id, update.step.task_id
            );
        }
        Ok(update)
    }

    /// Generates the release sync message for a step and stores it as a
    /// notification of the step's task.
    pub async fn copy_notification(&self, step_id: u64) -> Result<Message> {
        self.with_database(move |db| {
            let step = db
                .get_step(step_id)?
                .ok_or(RunbookError::StepNotFound { id: step_id })?;
            let content = sync_notification(&step);
            db.add_message(
                step.task_id,
                Some(step.id),
                MessageType::Notification,
                &content,
            )
        })
        .await
    }
}
