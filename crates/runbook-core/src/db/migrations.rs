//! Database schema initialization and migrations.

use log::info;
use rusqlite::params;

use crate::{
    error::{DatabaseResultExt, Result},
    flows,
};

const COUNT_COLUMN_SQL: &str = "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2";
const SELECT_UNTAGGED_NOTES_SQL: &str =
    "SELECT DISTINCT notes FROM task_steps WHERE flow_type = '' AND notes IS NOT NULL";
const MOVE_NOTES_TO_FLOW_TYPE_SQL: &str =
    "UPDATE task_steps SET flow_type = ?1, notes = NULL WHERE flow_type = '' AND notes = ?2";
const NORMALIZE_LEGACY_MESSAGES_SQL: &str = "UPDATE messages SET message_type = 'notification' WHERE message_type NOT IN ('notification', 'audit');
UPDATE messages SET is_sent = 0 WHERE is_sent IS NULL;";
const NORMALIZE_LEGACY_SERVICES_SQL: &str =
    "UPDATE services SET is_active = 1 WHERE is_active IS NULL";

/// Columns renamed since the first release: (table, old name, new name).
const LEGACY_COLUMN_RENAMES: &[(&str, &str, &str)] = &[
    ("tasks", "created_time", "created_at"),
    ("tasks", "updated_time", "updated_at"),
    ("task_steps", "created_time", "created_at"),
    ("messages", "created_time", "created_at"),
    ("messages", "message_content", "content"),
    ("services", "created_time", "created_at"),
    ("services", "type", "service_type"),
];

/// Timestamp columns that must hold RFC 3339 text: (table, column, required).
const TIMESTAMP_COLUMNS: &[(&str, &str, bool)] = &[
    ("tasks", "created_at", true),
    ("tasks", "updated_at", true),
    ("tasks", "start_time", false),
    ("tasks", "end_time", false),
    ("task_steps", "created_at", true),
    ("task_steps", "start_time", false),
    ("task_steps", "end_time", false),
    ("messages", "created_at", true),
    ("services", "created_at", true),
];

impl super::Database {
    /// Initializes the database schema using the embedded SQL file.
    pub(super) fn initialize_schema(&mut self) -> Result<()> {
        // Enable foreign keys for this connection
        self.connection
            .execute("PRAGMA foreign_keys = ON", [])
            .db_context("Failed to enable foreign keys")?;

        // Renames must land before the schema's views refer to the new names.
        self.migrate_legacy_tables()?;

        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")?;

        self.apply_migrations()?;
        self.seed_missing_templates()?;

        Ok(())
    }

    /// Brings databases created by older releases up to the current schema.
    fn apply_migrations(&self) -> Result<()> {
        for table in ["task_steps", "flow_templates"] {
            if !self.has_column(table, "links")? {
                self.connection
                    .execute(
                        &format!("ALTER TABLE {table} ADD COLUMN links TEXT NOT NULL DEFAULT '[]'"),
                        [],
                    )
                    .db_context("Failed to add links column")?;
                info!("Added links column to {table}");
            }
        }

        if !self.has_column("task_steps", "flow_type")? {
            self.connection
                .execute(
                    "ALTER TABLE task_steps ADD COLUMN flow_type TEXT NOT NULL DEFAULT ''",
                    [],
                )
                .db_context("Failed to add flow_type column to task_steps")?;
            self.tag_flow_types_from_notes()?;
        }

        Ok(())
    }

    /// Renames first-release columns and rewrites their `YYYY-MM-DD HH:MM:SS`
    /// timestamps as RFC 3339. Does nothing on a fresh or current database.
    fn migrate_legacy_tables(&self) -> Result<()> {
        let mut renamed = false;
        for (table, old, new) in LEGACY_COLUMN_RENAMES {
            if self.has_column(table, old)? && !self.has_column(table, new)? {
                self.connection
                    .execute(&format!("ALTER TABLE {table} RENAME COLUMN {old} TO {new}"), [])
                    .db_context("Failed to rename legacy column")?;
                info!("Renamed {table}.{old} to {new}");
                renamed = true;
            }
        }
        if !renamed {
            return Ok(());
        }

        for (table, column, required) in TIMESTAMP_COLUMNS {
            if !self.has_column(table, column)? {
                continue;
            }
            self.connection
                .execute(
                    &format!(
                        "UPDATE {table} SET {column} = strftime('%Y-%m-%dT%H:%M:%SZ', {column}) \
                         WHERE {column} IS NOT NULL AND {column} NOT LIKE '%T%'"
                    ),
                    [],
                )
                .db_context("Failed to convert legacy timestamps")?;
            if *required {
                self.connection
                    .execute(
                        &format!(
                            "UPDATE {table} SET {column} = strftime('%Y-%m-%dT%H:%M:%SZ', 'now') \
                             WHERE {column} IS NULL"
                        ),
                        [],
                    )
                    .db_context("Failed to fill legacy timestamps")?;
            }
        }

        if self.has_column("messages", "content")? {
            self.connection
                .execute_batch(NORMALIZE_LEGACY_MESSAGES_SQL)
                .db_context("Failed to normalize legacy messages")?;
        }
        if self.has_column("services", "is_active")? {
            self.connection
                .execute(NORMALIZE_LEGACY_SERVICES_SQL, [])
                .db_context("Failed to normalize legacy services")?;
        }
        Ok(())
    }

    /// Older releases recorded a step's flow type in its notes field.
    fn tag_flow_types_from_notes(&self) -> Result<()> {
        let notes: Vec<String> = {
            let mut stmt = self
                .connection
                .prepare(SELECT_UNTAGGED_NOTES_SQL)
                .db_context("Failed to prepare notes query")?;
            let rows = stmt
                .query_map([], |row| row.get(0))
                .db_context("Failed to query step notes")?;
            rows.collect::<rusqlite::Result<_>>()
                .db_context("Failed to read step notes")?
        };

        for note in notes.iter().filter(|note| flows::is_builtin(note)) {
            let flow_type = flows::canonical_flow_type(note);
            let moved = self
                .connection
                .execute(MOVE_NOTES_TO_FLOW_TYPE_SQL, params![flow_type, note])
                .db_context("Failed to tag step flow types")?;
            info!("Tagged {moved} steps as {flow_type} from their notes");
        }
        Ok(())
    }

    fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        self.connection
            .query_row(COUNT_COLUMN_SQL, params![table, column], |row| {
                row.get::<_, i64>(0)
            })
            .map(|count| count > 0)
            .db_context("Failed to inspect table columns")
    }
}
