use runbook_core::{Database, Runbook, RunbookBuilder};
use tempfile::{NamedTempFile, TempDir};

/// Helper function to create a test runbook
#[allow(dead_code)]
pub async fn create_test_runbook() -> (TempDir, Runbook) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let runbook = RunbookBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create runbook");
    (temp_dir, runbook)
}

/// Helper function to create a temporary database for testing
#[allow(dead_code)]
pub fn create_test_db() -> (NamedTempFile, Database) {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let db = Database::new(temp_file.path()).expect("Failed to create test database");
    (temp_file, db)
}
