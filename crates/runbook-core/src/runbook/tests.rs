//! Tests for the runbook facade.

use tempfile::TempDir;

use super::*;
use crate::{
    error::RunbookError,
    flows::{DOMESTIC_NON_CORE, INTERNATIONAL_CRAWLER},
    models::{MessageType, ServiceType, StepStatus, TaskStatus, TodoAction},
    params::{
        CreateService, CreateTask, ForceComplete, HistoryQuery, Id, ListTasks, ListTemplates,
        ReplaceTemplates, ResetTemplates, UpdateStep, UpdateTask,
    },
};

/// Helper function to create a test runbook
async fn create_test_runbook() -> (TempDir, Runbook) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let runbook = RunbookBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create runbook");
    (temp_dir, runbook)
}

fn create_params(name: &str, flow_types: &[&str]) -> CreateTask {
    CreateTask {
        name: name.to_string(),
        description: None,
        flow_types: flow_types.iter().map(|f| f.to_string()).collect(),
    }
}

fn status_update(id: u64, status: &str) -> UpdateStep {
    UpdateStep {
        id,
        status: Some(status.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_task_materializes_steps() {
    let (_temp_dir, runbook) = create_test_runbook().await;

    let task = runbook
        .create_task(&create_params("Weekly release", &[DOMESTIC_NON_CORE]))
        .await
        .expect("Failed to create task");

    assert_eq!(task.status, TaskStatus::InProgress);
    assert!(task.start_time.is_some());
    assert_eq!(task.steps.len(), 16);
    assert!(task.steps.iter().all(|s| s.status == StepStatus::Pending));
    assert!(task.steps.iter().all(|s| s.flow_type == DOMESTIC_NON_CORE));
    assert!(task.steps.iter().all(|s| !s.links.is_empty()));
}

#[tokio::test]
async fn test_create_task_rejects_blank_name() {
    let (_temp_dir, runbook) = create_test_runbook().await;

    let result = runbook.create_task(&create_params("   ", &[])).await;
    assert!(matches!(result, Err(RunbookError::InvalidInput { .. })));
    assert!(runbook.list_tasks(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_second_active_task_conflicts() {
    let (_temp_dir, runbook) = create_test_runbook().await;

    let first = runbook
        .create_task(&create_params("First", &[INTERNATIONAL_CRAWLER]))
        .await
        .unwrap();
    let result = runbook
        .create_task(&create_params("Second", &[INTERNATIONAL_CRAWLER]))
        .await;

    match result {
        Err(RunbookError::ActiveTaskExists { id, name }) => {
            assert_eq!(id, first.id);
            assert_eq!(name, "First");
        }
        other => panic!("Expected ActiveTaskExists, got {other:?}"),
    }
    assert_eq!(runbook.list_tasks(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_todos_follow_progress() {
    let (_temp_dir, runbook) = create_test_runbook().await;
    let task = runbook
        .create_task(&create_params("Crawler", &[INTERNATIONAL_CRAWLER]))
        .await
        .unwrap();
    let first = task.steps[0].id;

    let todos = runbook.list_todos(&Id { id: task.id }).await.unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, format!("step-{first}"));
    assert_eq!(todos[0].action, TodoAction::Operate);

    runbook
        .update_step_result(&status_update(first, "in_progress"))
        .await
        .unwrap();
    let todos = runbook.list_todos(&Id { id: task.id }).await.unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, format!("confirm-{first}"));
    assert_eq!(todos[0].estimated_time, 2);

    runbook
        .update_step_result(&status_update(first, "completed"))
        .await
        .unwrap();
    let todos = runbook.list_todos(&Id { id: task.id }).await.unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].step_id, task.steps[1].id);
}

#[tokio::test]
async fn test_todos_for_missing_task() {
    let (_temp_dir, runbook) = create_test_runbook().await;
    let result = runbook.list_todos(&Id { id: 42 }).await;
    assert!(matches!(result, Err(RunbookError::TaskNotFound { id: 42 })));
}

#[tokio::test]
async fn test_completing_every_step_completes_task() {
    let (_temp_dir, runbook) = create_test_runbook().await;
    let task = runbook
        .create_task(&create_params("Crawler", &[INTERNATIONAL_CRAWLER]))
        .await
        .unwrap();

    let mut last = None;
    for step in &task.steps {
        last = Some(
            runbook
                .update_step_result(&status_update(step.id, "completed"))
                .await
                .unwrap(),
        );
    }

    let last = last.unwrap();
    assert!(last.resource.task_completed);
    assert_eq!(last.resource.task_status, TaskStatus::Completed);
    assert!(last.to_string().contains("All steps are completed"));

    let task = runbook.show_task(&Id { id: task.id }).await.unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert!(task.end_time.is_some());
    assert!(runbook.current_task().await.unwrap().is_none());
    assert!(runbook.list_todos(&Id { id: task.id }).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blocked_step_cannot_start() {
    let (_temp_dir, runbook) = create_test_runbook().await;
    let task = runbook
        .create_task(&create_params("Crawler", &[INTERNATIONAL_CRAWLER]))
        .await
        .unwrap();

    let result = runbook
        .update_step_result(&status_update(task.steps[1].id, "in_progress"))
        .await;
    assert!(matches!(result, Err(RunbookError::InvalidInput { .. })));

    let step = runbook.show_step(&Id { id: task.steps[1].id }).await.unwrap();
    assert_eq!(step.status, StepStatus::Pending);
}

#[tokio::test]
async fn test_update_step_result_lists_changes() {
    let (_temp_dir, runbook) = create_test_runbook().await;
    let task = runbook
        .create_task(&create_params("Crawler", &[INTERNATIONAL_CRAWLER]))
        .await
        .unwrap();

    let result = runbook
        .update_step_result(&UpdateStep {
            id: task.steps[0].id,
            status: Some("in_progress".to_string()),
            notes: Some("Paused by the on-call".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(
        result.changes,
        vec!["Status: in_progress", "Notes: Paused by the on-call"]
    );
    assert!(result.resource.step.start_time.is_some());
    assert!(!result.resource.task_completed);
}

#[tokio::test]
async fn test_update_task_result_and_status_rules() {
    let (_temp_dir, runbook) = create_test_runbook().await;
    let task = runbook
        .create_task(&create_params("Release", &[INTERNATIONAL_CRAWLER]))
        .await
        .unwrap();

    let result = runbook
        .update_task_result(&UpdateTask {
            id: task.id,
            name: Some("Renamed release".to_string()),
            status: Some("paused".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(result.resource.name, "Renamed release");
    assert_eq!(result.resource.status, TaskStatus::Paused);
    assert_eq!(result.changes, vec!["Name: Renamed release", "Status: paused"]);

    let completed = runbook
        .update_task_result(&UpdateTask {
            id: task.id,
            status: Some("completed".to_string()),
            ..Default::default()
        })
        .await;
    assert!(matches!(completed, Err(RunbookError::InvalidInput { .. })));
}

#[tokio::test]
async fn test_paused_task_allows_a_new_one() {
    let (_temp_dir, runbook) = create_test_runbook().await;
    let first = runbook
        .create_task(&create_params("First", &[INTERNATIONAL_CRAWLER]))
        .await
        .unwrap();
    runbook
        .update_task_result(&UpdateTask {
            id: first.id,
            status: Some("paused".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let second = runbook
        .create_task(&create_params("Second", &[INTERNATIONAL_CRAWLER]))
        .await
        .unwrap();

    let resumed = runbook
        .update_task_result(&UpdateTask {
            id: first.id,
            status: Some("in_progress".to_string()),
            ..Default::default()
        })
        .await;
    assert!(matches!(
        resumed,
        Err(RunbookError::ActiveTaskExists { id, .. }) if id == second.id
    ));
}

#[tokio::test]
async fn test_force_complete_writes_audit_trail() {
    let (_temp_dir, runbook) = create_test_runbook().await;
    let task = runbook
        .create_task(&create_params("Crawler", &[INTERNATIONAL_CRAWLER]))
        .await
        .unwrap();
    runbook
        .update_step_result(&status_update(task.steps[0].id, "completed"))
        .await
        .unwrap();

    let result = runbook
        .force_complete_task_result(&ForceComplete {
            id: task.id,
            reason: Some("Rollout verified manually".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(result.resource.status, TaskStatus::Completed);
    assert!(result.resource.end_time.is_some());
    assert_eq!(
        result.changes,
        vec!["Status: completed (forced)", "Reason: Rollout verified manually"]
    );

    let messages = runbook.list_messages(&Id { id: task.id }).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message_type, MessageType::Audit);
    assert_eq!(
        messages[0].content,
        "Task force-completed with 1/7 steps completed (6 unfinished): Rollout verified manually"
    );

    let again = runbook
        .force_complete_task(&ForceComplete {
            id: task.id,
            reason: None,
        })
        .await;
    assert!(matches!(again, Err(RunbookError::InvalidInput { .. })));
}

#[tokio::test]
async fn test_copy_notification_stores_message() {
    let (_temp_dir, runbook) = create_test_runbook().await;
    let task = runbook
        .create_task(&create_params("Crawler", &[INTERNATIONAL_CRAWLER]))
        .await
        .unwrap();

    let message = runbook.copy_notification(task.steps[0].id).await.unwrap();
    assert_eq!(message.message_type, MessageType::Notification);
    assert_eq!(message.step_id, Some(task.steps[0].id));
    assert_eq!(
        message.content,
        "[Release sync] Pause crawler scheduling (pending)"
    );

    let missing = runbook.copy_notification(9999).await;
    assert!(matches!(missing, Err(RunbookError::StepNotFound { id: 9999 })));
}

#[tokio::test]
async fn test_delete_task_result() {
    let (_temp_dir, runbook) = create_test_runbook().await;
    let task = runbook
        .create_task(&create_params("Crawler", &[INTERNATIONAL_CRAWLER]))
        .await
        .unwrap();

    let deleted = runbook.delete_task_result(&Id { id: task.id }).await.unwrap();
    assert!(deleted.to_string().contains("Deleted task 'Crawler'"));
    assert!(runbook.get_task(task.id).await.unwrap().is_none());
    assert!(matches!(
        runbook.get_steps(task.id).await,
        Err(RunbookError::TaskNotFound { .. })
    ));

    let again = runbook.delete_task_result(&Id { id: task.id }).await;
    assert!(matches!(again, Err(RunbookError::TaskNotFound { .. })));
}

#[tokio::test]
async fn test_list_tasks_summary_filters_by_status() {
    let (_temp_dir, runbook) = create_test_runbook().await;
    let task = runbook
        .create_task(&create_params("Crawler", &[INTERNATIONAL_CRAWLER]))
        .await
        .unwrap();

    let active = runbook
        .list_tasks_summary(&ListTasks {
            status: Some("in_progress".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, task.id);
    assert_eq!(active[0].total_steps, 7);

    let finished = runbook
        .list_tasks_summary(&ListTasks {
            status: Some("completed".to_string()),
        })
        .await
        .unwrap();
    assert!(finished.is_empty());

    let invalid = runbook
        .list_tasks_summary(&ListTasks {
            status: Some("archived".to_string()),
        })
        .await;
    assert!(matches!(invalid, Err(RunbookError::InvalidInput { .. })));
}

#[tokio::test]
async fn test_template_replace_and_reset() {
    let (_temp_dir, runbook) = create_test_runbook().await;

    let replaced = runbook
        .replace_templates(
            &ReplaceTemplates::from_json(
                INTERNATIONAL_CRAWLER,
                r#"[{"step_name":"Stop","step_type":"switch"},
                    {"stepName":"Deploy","stepType":"deploy","dependencies":[1]}]"#,
            )
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(replaced.len(), 2);
    assert_eq!(replaced[1].step_order, 2);

    let listed = runbook
        .list_templates(&ListTemplates {
            flow_type: Some(INTERNATIONAL_CRAWLER.to_string()),
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);

    let task = runbook
        .create_task(&create_params("Custom", &[INTERNATIONAL_CRAWLER]))
        .await
        .unwrap();
    assert_eq!(task.steps.len(), 2);
    assert_eq!(task.steps[1].dependencies, vec![1]);

    let reset = runbook
        .reset_templates(&ResetTemplates {
            flow_type: Some(INTERNATIONAL_CRAWLER.to_string()),
        })
        .await
        .unwrap();
    assert_eq!(reset, vec![INTERNATIONAL_CRAWLER.to_string()]);

    let listed = runbook
        .list_templates(&ListTemplates {
            flow_type: Some(INTERNATIONAL_CRAWLER.to_string()),
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 7);

    // Materialized steps keep the template they were created from.
    let task = runbook.show_task(&Id { id: task.id }).await.unwrap();
    assert_eq!(task.steps.len(), 2);
}

#[tokio::test]
async fn test_reset_unknown_flow_type() {
    let (_temp_dir, runbook) = create_test_runbook().await;
    let result = runbook
        .reset_templates(&ResetTemplates {
            flow_type: Some("mainframe".to_string()),
        })
        .await;
    assert!(matches!(result, Err(RunbookError::UnknownFlowType { .. })));
}

#[tokio::test]
async fn test_list_flow_types() {
    let (_temp_dir, runbook) = create_test_runbook().await;
    let flow_types = runbook.list_flow_types();
    let keys: Vec<&str> = flow_types.iter().map(|info| info.key).collect();
    assert_eq!(
        keys,
        vec![
            "domestic_non_core",
            "international_non_core",
            "international_crawler"
        ]
    );
}

#[tokio::test]
async fn test_history_and_export() {
    let (_temp_dir, runbook) = create_test_runbook().await;
    let task = runbook
        .create_task(&create_params("Crawler", &[INTERNATIONAL_CRAWLER]))
        .await
        .unwrap();

    let page = runbook.list_history(&HistoryQuery::default()).await.unwrap();
    assert!(page.records.is_empty());
    assert_eq!(page.pagination.total, 0);

    runbook
        .force_complete_task(&ForceComplete {
            id: task.id,
            reason: None,
        })
        .await
        .unwrap();

    let page = runbook.list_history(&HistoryQuery::default()).await.unwrap();
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.pagination.current, 1);
    assert_eq!(page.pagination.page_size, 10);
    assert_eq!(page.records[0].task.id, task.id);
    assert_eq!(page.records[0].statistics.total_steps, 7);

    let export = runbook.export_history(&Id { id: task.id }).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&export).unwrap();
    assert_eq!(value["task"]["name"], "Crawler");
    assert_eq!(value["statistics"]["completed_steps"], 0);
    assert_eq!(value["messages"][0]["message_type"], "audit");
}

#[tokio::test]
async fn test_services_registry() {
    let (_temp_dir, runbook) = create_test_runbook().await;
    assert!(runbook.list_services().await.unwrap().is_empty());

    let service = runbook
        .create_service(&CreateService {
            name: "search-ds".to_string(),
            display_name: "Search DS".to_string(),
            service_type: ServiceType::Ds,
            region: "domestic".to_string(),
            core_level: "non_core".to_string(),
            idc: "IDC1".to_string(),
            group_name: Some("B".to_string()),
            service_path: None,
            management_url: None,
        })
        .await
        .unwrap();
    assert!(service.is_active);

    let services = runbook.list_services().await.unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].name, "search-ds");
}
