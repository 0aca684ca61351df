//! Task creation, lifecycle updates and listing.

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use super::{
    history_queries::insert_message,
    step_queries::{insert_planned_steps, query_steps},
    template_queries::resolve_template,
    utils::{id_at, optional_timestamp_at, optional_timestamp_str, parsed_at, timestamp_at},
};
use crate::{
    engine,
    error::{DatabaseResultExt, Result, RunbookError},
    flows,
    models::{MessageType, StepStatus, Task, TaskStatus, TaskSummary, UpdateTaskRequest},
};

const TASK_COLUMNS: &str =
    "id, name, description, status, start_time, end_time, created_at, updated_at";
const TASK_SUMMARY_COLUMNS: &str = "id, name, description, status, start_time, end_time, created_at, updated_at, total_steps, completed_steps";
const INSERT_TASK_SQL: &str = "INSERT INTO tasks (name, description, status, start_time, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4, ?4)";
const SELECT_ACTIVE_TASK_SQL: &str =
    "SELECT id, name FROM tasks WHERE status = 'in_progress' ORDER BY id LIMIT 1";
const UPDATE_TASK_SQL: &str = "UPDATE tasks SET name = ?1, description = ?2, status = ?3, start_time = ?4, end_time = ?5, updated_at = ?6 WHERE id = ?7";
const DELETE_TASK_SQL: &str = "DELETE FROM tasks WHERE id = ?1";

fn build_task_from_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: id_at(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        status: parsed_at(row, 3)?,
        start_time: optional_timestamp_at(row, 4)?,
        end_time: optional_timestamp_at(row, 5)?,
        created_at: timestamp_at(row, 6)?,
        updated_at: timestamp_at(row, 7)?,
        steps: Vec::new(),
    })
}

fn build_summary_from_row(row: &Row) -> rusqlite::Result<TaskSummary> {
    let total_steps = row.get::<_, i64>(8)? as u32;
    let completed_steps = row.get::<_, i64>(9)? as u32;

    Ok(TaskSummary {
        id: id_at(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        status: parsed_at(row, 3)?,
        start_time: optional_timestamp_at(row, 4)?,
        end_time: optional_timestamp_at(row, 5)?,
        created_at: timestamp_at(row, 6)?,
        updated_at: timestamp_at(row, 7)?,
        total_steps,
        completed_steps,
        pending_steps: total_steps.saturating_sub(completed_steps),
    })
}

/// Loads a task with its steps.
pub(super) fn query_task(connection: &Connection, id: u64) -> Result<Option<Task>> {
    let task = connection
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            params![id as i64],
            build_task_from_row,
        )
        .optional()
        .db_context("Failed to query task")?;

    match task {
        Some(mut task) => {
            task.steps = query_steps(connection, task.id)?;
            Ok(Some(task))
        }
        None => Ok(None),
    }
}

/// The in-progress task other than `except`, if any.
fn active_task(connection: &Connection, except: Option<u64>) -> Result<Option<(u64, String)>> {
    let active = connection
        .query_row(SELECT_ACTIVE_TASK_SQL, [], |row| {
            Ok((id_at(row, 0)?, row.get::<_, String>(1)?))
        })
        .optional()
        .db_context("Failed to query active task")?;
    Ok(active.filter(|(id, _)| Some(*id) != except))
}

fn ensure_no_active_task(connection: &Connection, except: Option<u64>) -> Result<()> {
    match active_task(connection, except)? {
        Some((id, name)) => Err(RunbookError::ActiveTaskExists { id, name }),
        None => Ok(()),
    }
}

impl super::Database {
    /// Creates a task in progress and materializes its flow types' steps.
    ///
    /// Runs as one write-locking transaction: the single active task rule is
    /// checked, the task row inserted and every step written, or nothing is.
    pub fn create_task(
        &mut self,
        name: &str,
        description: Option<&str>,
        flow_types: &[String],
    ) -> Result<Task> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        ensure_no_active_task(&tx, None)?;

        let mut planned = Vec::new();
        for (position, flow_type) in flows::normalize_selection(flow_types).iter().enumerate() {
            let template = resolve_template(&tx, flow_type)?;
            planned.extend(flows::plan_flow_steps(position, flow_type, &template)?);
        }

        let now = Timestamp::now();
        tx.execute(
            INSERT_TASK_SQL,
            params![
                name,
                description,
                TaskStatus::InProgress.as_str(),
                now.to_string()
            ],
        )
        .db_context("Failed to insert task")?;
        let id = tx.last_insert_rowid() as u64;

        insert_planned_steps(&tx, id, &planned, now)?;

        let task = query_task(&tx, id)?.ok_or(RunbookError::TaskNotFound { id })?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(task)
    }

    /// Retrieves a task with its steps eagerly loaded.
    pub fn get_task(&self, id: u64) -> Result<Option<Task>> {
        query_task(&self.connection, id)
    }

    /// Lists task summaries, newest first.
    pub fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<TaskSummary>> {
        let base = format!("SELECT {TASK_SUMMARY_COLUMNS} FROM task_summaries");
        let order = "ORDER BY id DESC";

        let rows = match status {
            Some(status) => {
                let mut stmt = self
                    .connection
                    .prepare(&format!("{base} WHERE status = ?1 {order}"))
                    .db_context("Failed to prepare task query")?;
                let rows = stmt
                    .query_map(params![status.as_str()], build_summary_from_row)
                    .db_context("Failed to query tasks")?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            }
            None => {
                let mut stmt = self
                    .connection
                    .prepare(&format!("{base} {order}"))
                    .db_context("Failed to prepare task query")?;
                let rows = stmt
                    .query_map([], build_summary_from_row)
                    .db_context("Failed to query tasks")?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            }
        };

        rows.db_context("Failed to read task rows")
    }

    /// The task currently in progress, if any.
    pub fn current_task(&self) -> Result<Option<Task>> {
        match active_task(&self.connection, None)? {
            Some((id, _)) => self.get_task(id),
            None => Ok(None),
        }
    }

    /// Applies an explicit operator update to a task.
    pub fn update_task(&mut self, id: u64, request: &UpdateTaskRequest) -> Result<Task> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let mut task = query_task(&tx, id)?.ok_or(RunbookError::TaskNotFound { id })?;
        let now = Timestamp::now();

        if let Some(status) = request.status {
            engine::check_task_transition(task.status, status)?;
            if status != task.status {
                match status {
                    TaskStatus::InProgress => {
                        ensure_no_active_task(&tx, Some(id))?;
                        task.start_time = task.start_time.or(Some(now));
                    }
                    TaskStatus::Failed => task.end_time = Some(now),
                    _ => {}
                }
                task.status = status;
            }
        }

        if let Some(name) = &request.name {
            task.name = name.clone();
        }
        if let Some(description) = &request.description {
            task.description = Some(description.clone()).filter(|d| !d.trim().is_empty());
        }
        if let Some(start_time) = request.start_time {
            task.start_time = Some(start_time);
        }
        if let Some(end_time) = request.end_time {
            task.end_time = Some(end_time);
        }

        tx.execute(
            UPDATE_TASK_SQL,
            params![
                task.name,
                task.description.as_deref(),
                task.status.as_str(),
                optional_timestamp_str(task.start_time),
                optional_timestamp_str(task.end_time),
                now.to_string(),
                id as i64
            ],
        )
        .db_context("Failed to update task")?;

        let task = query_task(&tx, id)?.ok_or(RunbookError::TaskNotFound { id })?;
        tx.commit().db_context("Failed to commit transaction")?;
        Ok(task)
    }

    /// Marks an in-progress task completed regardless of its steps and
    /// records an audit message.
    pub fn force_complete_task(&mut self, id: u64, reason: Option<&str>) -> Result<Task> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let task = query_task(&tx, id)?.ok_or(RunbookError::TaskNotFound { id })?;
        if task.status != TaskStatus::InProgress {
            return Err(RunbookError::invalid_input("status").with_reason(format!(
                "Only an in-progress task can be force-completed; task {id} is {}",
                task.status.as_str()
            )));
        }

        let now = Timestamp::now();
        tx.execute(
            UPDATE_TASK_SQL,
            params![
                task.name,
                task.description.as_deref(),
                TaskStatus::Completed.as_str(),
                optional_timestamp_str(task.start_time),
                now.to_string(),
                now.to_string(),
                id as i64
            ],
        )
        .db_context("Failed to force-complete task")?;

        let unfinished = task
            .steps
            .iter()
            .filter(|step| step.status != StepStatus::Completed)
            .count();
        let mut content = format!(
            "Task force-completed with {}/{} steps completed ({unfinished} unfinished)",
            task.completed_steps(),
            task.steps.len()
        );
        if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
            content.push_str(&format!(": {reason}"));
        }
        insert_message(&tx, id, None, MessageType::Audit, &content, now)?;

        let task = query_task(&tx, id)?.ok_or(RunbookError::TaskNotFound { id })?;
        tx.commit().db_context("Failed to commit transaction")?;
        Ok(task)
    }

    /// Deletes a task; its steps and messages cascade.
    pub fn delete_task(&mut self, id: u64) -> Result<()> {
        let deleted = self
            .connection
            .execute(DELETE_TASK_SQL, params![id as i64])
            .db_context("Failed to delete task")?;
        if deleted == 0 {
            return Err(RunbookError::TaskNotFound { id });
        }
        Ok(())
    }
}
