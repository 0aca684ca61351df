//! Messages attached to tasks and the finished-rollout history.

use jiff::Timestamp;
use rusqlite::{params, Connection, Row};

use super::{
    task_queries::query_task,
    utils::{id_at, parsed_at, task_exists, timestamp_at},
};
use crate::{
    error::{DatabaseResultExt, Result, RunbookError},
    models::{HistoryPage, HistoryRecord, Message, MessageType, Pagination},
};

const INSERT_MESSAGE_SQL: &str = "INSERT INTO messages (task_id, step_id, message_type, content, is_sent, created_at) VALUES (?1, ?2, ?3, ?4, 0, ?5)";
const SELECT_MESSAGES_SQL: &str = "SELECT id, task_id, step_id, message_type, content, is_sent, created_at FROM messages WHERE task_id = ?1 ORDER BY id";
const COUNT_FINISHED_TASKS_SQL: &str =
    "SELECT COUNT(*) FROM tasks WHERE status IN ('completed', 'failed')";
const SELECT_FINISHED_TASK_IDS_SQL: &str = "SELECT id FROM tasks WHERE status IN ('completed', 'failed') ORDER BY julianday(updated_at) DESC, id DESC LIMIT ?1 OFFSET ?2";

fn build_message_from_row(row: &Row) -> rusqlite::Result<Message> {
    Ok(Message {
        id: id_at(row, 0)?,
        task_id: id_at(row, 1)?,
        step_id: row.get::<_, Option<i64>>(2)?.map(|id| id as u64),
        message_type: parsed_at(row, 3)?,
        content: row.get(4)?,
        is_sent: row.get(5)?,
        created_at: timestamp_at(row, 6)?,
    })
}

pub(super) fn insert_message(
    connection: &Connection,
    task_id: u64,
    step_id: Option<u64>,
    message_type: MessageType,
    content: &str,
    now: Timestamp,
) -> Result<Message> {
    connection
        .execute(
            INSERT_MESSAGE_SQL,
            params![
                task_id as i64,
                step_id.map(|id| id as i64),
                message_type.as_str(),
                content,
                now.to_string()
            ],
        )
        .db_context("Failed to insert message")?;

    Ok(Message {
        id: connection.last_insert_rowid() as u64,
        task_id,
        step_id,
        message_type,
        content: content.to_string(),
        is_sent: false,
        created_at: now,
    })
}

fn query_messages(connection: &Connection, task_id: u64) -> Result<Vec<Message>> {
    let mut stmt = connection
        .prepare(SELECT_MESSAGES_SQL)
        .db_context("Failed to prepare message query")?;
    let rows = stmt
        .query_map(params![task_id as i64], build_message_from_row)
        .db_context("Failed to query messages")?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .db_context("Failed to read message rows")
}

impl super::Database {
    /// Records a message against a task.
    pub fn add_message(
        &mut self,
        task_id: u64,
        step_id: Option<u64>,
        message_type: MessageType,
        content: &str,
    ) -> Result<Message> {
        if !task_exists(&self.connection, task_id)? {
            return Err(RunbookError::TaskNotFound { id: task_id });
        }
        insert_message(
            &self.connection,
            task_id,
            step_id,
            message_type,
            content,
            Timestamp::now(),
        )
    }

    /// Messages of a task in creation order.
    pub fn list_messages(&self, task_id: u64) -> Result<Vec<Message>> {
        query_messages(&self.connection, task_id)
    }

    /// One page of finished (completed or failed) tasks, most recently
    /// updated first. `page` is 1-based.
    pub fn list_history(&self, page: u32, page_size: u32) -> Result<HistoryPage> {
        let page = page.max(1);
        let page_size = page_size.max(1);

        let total: i64 = self
            .connection
            .query_row(COUNT_FINISHED_TASKS_SQL, [], |row| row.get(0))
            .db_context("Failed to count finished tasks")?;

        let ids: Vec<u64> = {
            let mut stmt = self
                .connection
                .prepare(SELECT_FINISHED_TASK_IDS_SQL)
                .db_context("Failed to prepare history query")?;
            let offset = (page as i64 - 1) * page_size as i64;
            let rows = stmt
                .query_map(params![page_size as i64, offset], |row| id_at(row, 0))
                .db_context("Failed to query history")?;
            rows.collect::<rusqlite::Result<_>>()
                .db_context("Failed to read history rows")?
        };

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            records.push(self.get_history(id)?);
        }

        Ok(HistoryPage {
            records,
            pagination: Pagination {
                current: page,
                page_size,
                total: total as u64,
            },
        })
    }

    /// A task with its steps, messages and statistics.
    pub fn get_history(&self, task_id: u64) -> Result<HistoryRecord> {
        let task =
            query_task(&self.connection, task_id)?.ok_or(RunbookError::TaskNotFound { id: task_id })?;
        let messages = query_messages(&self.connection, task_id)?;
        Ok(HistoryRecord::new(task, messages))
    }
}
