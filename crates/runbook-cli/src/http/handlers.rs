//! Route handlers. Each one unpacks the request into core parameters and
//! delegates to [`Runbook`].

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::header,
    response::IntoResponse,
    Json,
};
use log::debug;
use runbook_core::{
    display::{FlowTypes, Services, Steps, TaskSummaries, Templates, Todos},
    models::{HistoryPage, HistoryRecord, Message, Service, Step, StepUpdate, Task},
    params::{
        CreateService, CreateTask, ForceComplete, HistoryQuery, Id, ListTasks, ListTemplates,
        ReplaceTemplates, ResetTemplates, UpdateStep, UpdateTask,
    },
    Runbook,
};
use serde_json::{json, Value};

use super::response::{ApiError, ApiResponse};

type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
type IdPath = Result<Path<u64>, PathRejection>;

pub(super) async fn health() -> ApiResponse<Value> {
    ApiResponse::ok(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

pub(super) async fn list_tasks(
    State(runbook): State<Runbook>,
    query: Result<Query<ListTasks>, QueryRejection>,
) -> ApiResult<TaskSummaries> {
    let Query(params) = query?;
    debug!("list_tasks: {params:?}");
    Ok(ApiResponse::ok(runbook.list_tasks_summary(&params).await?))
}

pub(super) async fn create_task(
    State(runbook): State<Runbook>,
    body: Result<Json<CreateTask>, JsonRejection>,
) -> ApiResult<Task> {
    let Json(params) = body?;
    debug!("create_task: {params:?}");
    let task = runbook.create_task(&params).await?;
    let message = format!("Task created with {} steps", task.steps.len());
    Ok(ApiResponse::created(task).with_message(message))
}

pub(super) async fn current_task(State(runbook): State<Runbook>) -> ApiResult<Task> {
    match runbook.current_task().await? {
        Some(task) => Ok(ApiResponse::ok(task)),
        None => Ok(ApiResponse::empty("No task in progress")),
    }
}

pub(super) async fn list_flow_types(State(runbook): State<Runbook>) -> ApiResponse<FlowTypes> {
    ApiResponse::ok(runbook.list_flow_types())
}

pub(super) async fn show_task(State(runbook): State<Runbook>, path: IdPath) -> ApiResult<Task> {
    let Path(id) = path?;
    Ok(ApiResponse::ok(runbook.show_task(&Id { id }).await?))
}

pub(super) async fn update_task(
    State(runbook): State<Runbook>,
    path: IdPath,
    body: Result<Json<UpdateTask>, JsonRejection>,
) -> ApiResult<Task> {
    let Path(id) = path?;
    let Json(mut params) = body?;
    params.id = id;
    debug!("update_task: {params:?}");
    let result = runbook.update_task_result(&params).await?;
    Ok(ApiResponse::ok(result.resource).with_message("Task updated"))
}

pub(super) async fn delete_task(State(runbook): State<Runbook>, path: IdPath) -> ApiResult<()> {
    let Path(id) = path?;
    runbook.delete_task(id).await?;
    Ok(ApiResponse::empty(format!("Task {id} deleted")))
}

/// The body is optional; `{"reason": "..."}` is recorded in the audit trail.
pub(super) async fn force_complete_task(
    State(runbook): State<Runbook>,
    path: IdPath,
    body: Bytes,
) -> ApiResult<Task> {
    let Path(id) = path?;
    let mut params = if body.iter().all(u8::is_ascii_whitespace) {
        ForceComplete::default()
    } else {
        serde_json::from_slice::<ForceComplete>(&body)
            .map_err(|e| ApiError::invalid_input(format!("Invalid request body: {e}")))?
    };
    params.id = id;
    debug!("force_complete_task: {params:?}");
    let task = runbook.force_complete_task(&params).await?;
    Ok(ApiResponse::ok(task).with_message("Task force-completed"))
}

pub(super) async fn list_steps(State(runbook): State<Runbook>, path: IdPath) -> ApiResult<Steps> {
    let Path(id) = path?;
    Ok(ApiResponse::ok(runbook.list_steps(&Id { id }).await?))
}

pub(super) async fn list_todos(State(runbook): State<Runbook>, path: IdPath) -> ApiResult<Todos> {
    let Path(id) = path?;
    Ok(ApiResponse::ok(runbook.list_todos(&Id { id }).await?))
}

pub(super) async fn show_step(State(runbook): State<Runbook>, path: IdPath) -> ApiResult<Step> {
    let Path(id) = path?;
    Ok(ApiResponse::ok(runbook.show_step(&Id { id }).await?))
}

pub(super) async fn update_step(
    State(runbook): State<Runbook>,
    path: IdPath,
    body: Result<Json<UpdateStep>, JsonRejection>,
) -> ApiResult<StepUpdate> {
    let Path(id) = path?;
    let Json(mut params) = body?;
    params.id = id;
    debug!("update_step: {params:?}");
    let result = runbook.update_step_result(&params).await?;
    let message = if result.resource.task_completed {
        "Step updated; every step is completed and the task is now completed"
    } else {
        "Step updated"
    };
    Ok(ApiResponse::ok(result.resource).with_message(message))
}

pub(super) async fn copy_notification(
    State(runbook): State<Runbook>,
    path: IdPath,
) -> ApiResult<Message> {
    let Path(id) = path?;
    let message = runbook.copy_notification(id).await?;
    Ok(ApiResponse::ok(message).with_message("Notification generated"))
}

pub(super) async fn list_templates(
    State(runbook): State<Runbook>,
    query: Result<Query<ListTemplates>, QueryRejection>,
) -> ApiResult<Templates> {
    let Query(params) = query?;
    Ok(ApiResponse::ok(runbook.list_templates(&params).await?))
}

/// Accepts `{"templates": [...]}` or a bare array of step definitions.
pub(super) async fn replace_templates(
    State(runbook): State<Runbook>,
    Path(flow_type): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Templates> {
    let Json(value) = body?;
    let params = ReplaceTemplates::from_value(&flow_type, value)?;
    debug!(
        "replace_templates: {} with {} steps",
        params.flow_type,
        params.templates.len()
    );
    let templates = runbook.replace_templates(&params).await?;
    Ok(ApiResponse::ok(templates).with_message("Templates saved"))
}

pub(super) async fn reset_all_templates(State(runbook): State<Runbook>) -> ApiResult<Vec<String>> {
    let reset = runbook.reset_templates(&ResetTemplates::default()).await?;
    Ok(ApiResponse::ok(reset).with_message("Templates reset to baseline"))
}

pub(super) async fn reset_templates(
    State(runbook): State<Runbook>,
    Path(flow_type): Path<String>,
) -> ApiResult<Vec<String>> {
    let reset = runbook
        .reset_templates(&ResetTemplates {
            flow_type: Some(flow_type),
        })
        .await?;
    Ok(ApiResponse::ok(reset).with_message("Templates reset to baseline"))
}

pub(super) async fn list_history(
    State(runbook): State<Runbook>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<HistoryPage> {
    let Query(params) = query?;
    Ok(ApiResponse::ok(runbook.list_history(&params).await?))
}

pub(super) async fn show_history(
    State(runbook): State<Runbook>,
    path: IdPath,
) -> ApiResult<HistoryRecord> {
    let Path(id) = path?;
    Ok(ApiResponse::ok(runbook.get_history(&Id { id }).await?))
}

/// Downloads the history record as a JSON file.
pub(super) async fn export_history(
    State(runbook): State<Runbook>,
    path: IdPath,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = path?;
    let export = runbook.export_history(&Id { id }).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"task-{id}-history.json\""),
            ),
        ],
        export,
    ))
}

pub(super) async fn list_services(State(runbook): State<Runbook>) -> ApiResult<Services> {
    Ok(ApiResponse::ok(runbook.list_services().await?))
}

pub(super) async fn create_service(
    State(runbook): State<Runbook>,
    body: Result<Json<CreateService>, JsonRejection>,
) -> ApiResult<Service> {
    let Json(params) = body?;
    debug!("create_service: {params:?}");
    let service = runbook.create_service(&params).await?;
    Ok(ApiResponse::created(service).with_message("Service registered"))
}
