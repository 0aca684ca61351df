//! SQLite persistence for tasks, steps, templates, messages and services.
//!
//! Every operation opens its own connection through [`Database::new`], which
//! also applies the embedded schema and any pending migrations. Query
//! methods are spread across the submodules by table.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod history_queries;
pub mod migrations;
pub mod service_queries;
pub mod step_queries;
pub mod task_queries;
pub mod template_queries;
mod utils;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` and initializes the
    /// schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let mut db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
