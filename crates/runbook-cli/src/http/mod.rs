//! JSON API over HTTP.
//!
//! Every route answers with the same envelope:
//!
//! ```json
//! { "success": true, "data": { ... }, "message": "Task created" }
//! { "success": false, "message": "...", "error": { "code": "conflict", "message": "..." } }
//! ```
//!
//! Validation failures map to 400, missing tasks and steps to 404, a second
//! in-progress task to 409 and everything else to 500.

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    routing::{get, post, put},
    Router,
};
use log::info;
use runbook_core::Runbook;

mod handlers;
mod response;

pub use response::{ApiError, ApiResponse, Envelope, ErrorBody};

/// Builds the API router over `runbook`.
pub fn router(runbook: Runbook) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route("/api/tasks/current", get(handlers::current_task))
        .route("/api/tasks/flow-types", get(handlers::list_flow_types))
        .route(
            "/api/tasks/{id}",
            get(handlers::show_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route(
            "/api/tasks/{id}/force-complete",
            post(handlers::force_complete_task),
        )
        .route("/api/tasks/{id}/steps", get(handlers::list_steps))
        .route("/api/tasks/{id}/todos", get(handlers::list_todos))
        .route(
            "/api/steps/{id}",
            get(handlers::show_step).put(handlers::update_step),
        )
        .route("/api/steps/{id}/copy", post(handlers::copy_notification))
        .route("/api/templates", get(handlers::list_templates))
        .route("/api/templates/reset", post(handlers::reset_all_templates))
        .route("/api/templates/{flow_type}", put(handlers::replace_templates))
        .route(
            "/api/templates/{flow_type}/reset",
            post(handlers::reset_templates),
        )
        .route("/api/history", get(handlers::list_history))
        .route("/api/history/{id}", get(handlers::show_history))
        .route("/api/history/{id}/export", get(handlers::export_history))
        .route(
            "/api/services",
            get(handlers::list_services).post(handlers::create_service),
        )
        .with_state(runbook)
}

/// Serves the API on `listen` until Ctrl-C.
pub async fn serve(runbook: Runbook, listen: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind {listen}"))?;
    info!(
        "Serving runbook API on http://{} (database: {})",
        listener.local_addr()?,
        runbook.database_path().display()
    );

    axum::serve(listener, router(runbook))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl-C, shutting down HTTP server");
            }
        })
        .await
        .context("HTTP server terminated with error")
}
