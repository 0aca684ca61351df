//! Step reads, materialization inserts and operator updates.

use jiff::Timestamp;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use super::utils::{
    id_at, optional_timestamp_at, optional_timestamp_str, optional_u32_at, parsed_at,
    task_exists, timestamp_at,
};
use crate::{
    engine,
    error::{DatabaseResultExt, Result, RunbookError},
    flows::PlannedStep,
    models::{
        step::{parse_dependencies, parse_links},
        Step, StepStatus, StepUpdate, TaskStatus, UpdateStepRequest,
    },
};

const STEP_COLUMNS: &str = "id, task_id, step_order, step_name, step_type, status, flow_type, estimated_duration, actual_duration, start_time, end_time, notes, dependencies, links, created_at";
const INSERT_STEP_SQL: &str = "INSERT INTO task_steps (task_id, step_order, step_name, step_type, status, flow_type, estimated_duration, dependencies, links, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";
const UPDATE_STEP_SQL: &str = "UPDATE task_steps SET status = ?1, notes = ?2, start_time = ?3, end_time = ?4, actual_duration = ?5 WHERE id = ?6";
const SELECT_TASK_STATUS_SQL: &str = "SELECT status FROM tasks WHERE id = ?1";
const UPDATE_TASK_TIMESTAMP_SQL: &str = "UPDATE tasks SET updated_at = ?1 WHERE id = ?2";
const COMPLETE_TASK_SQL: &str =
    "UPDATE tasks SET status = 'completed', end_time = ?1, updated_at = ?1 WHERE id = ?2";

fn build_step_from_row(row: &Row) -> rusqlite::Result<Step> {
    let dependencies: Option<String> = row.get(12)?;
    let links: Option<String> = row.get(13)?;

    Ok(Step {
        id: id_at(row, 0)?,
        task_id: id_at(row, 1)?,
        step_order: row.get::<_, i64>(2)? as u32,
        step_name: row.get(3)?,
        step_type: parsed_at(row, 4)?,
        status: parsed_at(row, 5)?,
        flow_type: row.get(6)?,
        estimated_duration: optional_u32_at(row, 7)?,
        actual_duration: optional_u32_at(row, 8)?,
        start_time: optional_timestamp_at(row, 9)?,
        end_time: optional_timestamp_at(row, 10)?,
        notes: row.get(11)?,
        dependencies: parse_dependencies(dependencies.as_deref()),
        links: parse_links(links.as_deref()),
        created_at: timestamp_at(row, 14)?,
    })
}

/// All steps of a task ordered by step_order.
pub(super) fn query_steps(connection: &Connection, task_id: u64) -> Result<Vec<Step>> {
    let mut stmt = connection
        .prepare(&format!(
            "SELECT {STEP_COLUMNS} FROM task_steps WHERE task_id = ?1 ORDER BY step_order"
        ))
        .db_context("Failed to prepare steps query")?;

    let rows = stmt
        .query_map(params![task_id as i64], build_step_from_row)
        .db_context("Failed to query steps")?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .db_context("Failed to read step rows")
}

fn query_step(connection: &Connection, id: u64) -> Result<Option<Step>> {
    connection
        .query_row(
            &format!("SELECT {STEP_COLUMNS} FROM task_steps WHERE id = ?1"),
            params![id as i64],
            build_step_from_row,
        )
        .optional()
        .db_context("Failed to query step")
}

/// Inserts materialized steps for a freshly created task.
pub(super) fn insert_planned_steps(
    connection: &Connection,
    task_id: u64,
    planned: &[PlannedStep],
    now: Timestamp,
) -> Result<()> {
    let now_str = now.to_string();
    let mut stmt = connection
        .prepare(INSERT_STEP_SQL)
        .db_context("Failed to prepare step insert")?;

    for step in planned {
        let dependencies = serde_json::to_string(&step.dependencies)?;
        let links = serde_json::to_string(&step.links)?;
        stmt.execute(params![
            task_id as i64,
            step.step_order as i64,
            step.step_name,
            step.step_type.as_str(),
            StepStatus::Pending.as_str(),
            step.flow_type,
            step.estimated_duration.map(i64::from),
            dependencies,
            links,
            &now_str
        ])
        .db_context("Failed to insert step")?;
    }
    Ok(())
}

impl super::Database {
    /// Returns every step of a task, ordered by step_order.
    pub fn get_steps(&self, task_id: u64) -> Result<Vec<Step>> {
        if !task_exists(&self.connection, task_id)? {
            return Err(RunbookError::TaskNotFound { id: task_id });
        }
        query_steps(&self.connection, task_id)
    }

    /// Retrieves a single step by its ID.
    pub fn get_step(&self, id: u64) -> Result<Option<Step>> {
        query_step(&self.connection, id)
    }

    /// Applies an operator update to a step and runs the auto-complete rule.
    ///
    /// The step is re-read inside a write-locking transaction so the
    /// dependency check sees the latest sibling statuses.
    pub fn update_step(&mut self, id: u64, request: &UpdateStepRequest) -> Result<StepUpdate> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let current = query_step(&tx, id)?.ok_or(RunbookError::StepNotFound { id })?;
        let task_status: TaskStatus = tx
            .query_row(
                SELECT_TASK_STATUS_SQL,
                params![current.task_id as i64],
                |row| parsed_at(row, 0),
            )
            .db_context("Failed to query task status")?;

        let status_changes = request.status.is_some_and(|status| status != current.status);
        if status_changes && task_status.is_finished() {
            return Err(RunbookError::invalid_input("status").with_reason(format!(
                "Task {} is already {}; its steps can no longer change status",
                current.task_id,
                task_status.as_str()
            )));
        }

        let mut siblings = query_steps(&tx, current.task_id)?;
        let now = Timestamp::now();
        let updated = engine::apply_step_update(&current, &siblings, request, now)?;

        tx.execute(
            UPDATE_STEP_SQL,
            params![
                updated.status.as_str(),
                updated.notes.as_deref(),
                optional_timestamp_str(updated.start_time),
                optional_timestamp_str(updated.end_time),
                updated.actual_duration.map(i64::from),
                id as i64
            ],
        )
        .db_context("Failed to update step")?;

        let now_str = now.to_string();
        tx.execute(
            UPDATE_TASK_TIMESTAMP_SQL,
            params![&now_str, current.task_id as i64],
        )
        .db_context("Failed to update task timestamp")?;

        let mut new_task_status = task_status;
        if updated.status == StepStatus::Completed && current.status != StepStatus::Completed {
            if let Some(sibling) = siblings.iter_mut().find(|sibling| sibling.id == id) {
                *sibling = updated.clone();
            }
            new_task_status = engine::recompute_task_status(task_status, &siblings);
            if new_task_status != task_status {
                tx.execute(COMPLETE_TASK_SQL, params![&now_str, current.task_id as i64])
                    .db_context("Failed to complete task")?;
                info!(
                    "Task {} completed automatically after step {} finished",
                    current.task_id, updated.step_order
                );
            }
        }

        tx.commit().db_context("Failed to commit transaction")?;

        Ok(StepUpdate {
            task_completed: new_task_status != task_status,
            task_status: new_task_status,
            step: updated,
        })
    }
}
