//! Builder for creating and configuring Runbook instances.

use std::path::{Path, PathBuf};

use tokio::task;

use super::Runbook;
use crate::{
    db::Database,
    error::{Result, RunbookError},
};

const XDG_PREFIX: &str = "runbook";
const DATABASE_FILE: &str = "runbook.db";

/// Builder for creating and configuring Runbook instances.
#[derive(Debug, Clone, Default)]
pub struct RunbookBuilder {
    database_path: Option<PathBuf>,
}

impl RunbookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses the XDG Base Directory specification:
    /// `$XDG_DATA_HOME/runbook/runbook.db` or `~/.local/share/runbook/runbook.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Builds the runbook, creating the database file and schema (including
    /// baseline flow templates) when missing.
    ///
    /// # Errors
    ///
    /// Returns `RunbookError::FileSystem` if the database directory cannot be
    /// created and `RunbookError::Database` if initialization fails.
    pub async fn build(self) -> Result<Runbook> {
        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| RunbookError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let init_path = db_path.clone();
        task::spawn_blocking(move || Database::new(&init_path).map(drop))
            .await
            .map_err(RunbookError::join)??;

        Ok(Runbook::new(db_path))
    }

    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix(XDG_PREFIX)
            .place_data_file(DATABASE_FILE)
            .map_err(|e| RunbookError::XdgDirectory(e.to_string()))
    }
}
