//! Error handling utilities for MCP server

use runbook_core::{ErrorKind, RunbookError};
use rmcp::ErrorData;

/// Converts a runbook error into an MCP error, keeping caller mistakes
/// distinguishable from server failures.
pub fn to_mcp_error(message: &str, error: &RunbookError) -> ErrorData {
    let text = format!("{message}: {error}");
    match error.kind() {
        ErrorKind::Validation | ErrorKind::Conflict => ErrorData::invalid_params(text, None),
        ErrorKind::NotFound => ErrorData::resource_not_found(text, None),
        ErrorKind::Internal => ErrorData::internal_error(text, None),
    }
}
