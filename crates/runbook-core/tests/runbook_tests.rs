mod common;

use common::create_test_runbook;
use runbook_core::{
    models::{StepStatus, TaskStatus, TodoAction},
    params::{CreateTask, Id, UpdateStep},
    RunbookError,
};

#[tokio::test]
async fn test_full_rollout_through_the_facade() {
    let (_temp_dir, runbook) = create_test_runbook().await;

    let created = runbook
        .create_task_result(&CreateTask {
            name: "Crawler release".to_string(),
            description: Some("Ship crawler 2.4".to_string()),
            flow_types: vec!["international_crawler".to_string()],
        })
        .await
        .expect("Failed to create task");
    let output = created.to_string();
    assert!(output.contains("Created task with ID"));
    assert!(output.contains("Pause crawler scheduling"));

    let task_id = created.resource.id;
    let mut completed = 0;
    loop {
        let todos = runbook.list_todos(&Id { id: task_id }).await.unwrap();
        let Some(todo) = todos.iter().next() else {
            break;
        };
        assert_eq!(todos.len(), 1, "a linear flow offers one item at a time");

        let next_status = match todo.action {
            TodoAction::Operate => "in_progress",
            TodoAction::Confirm => "completed",
        };
        let result = runbook
            .update_step_result(&UpdateStep {
                id: todo.step_id,
                status: Some(next_status.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        if result.resource.step.status == StepStatus::Completed {
            completed += 1;
        }
    }

    assert_eq!(completed, 7);
    let task = runbook.show_task(&Id { id: task_id }).await.unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert!(task
        .steps
        .iter()
        .all(|s| s.start_time.is_some() && s.end_time.is_some() && s.actual_duration.is_some()));
}

#[tokio::test]
async fn test_failed_step_stops_the_flow() {
    let (_temp_dir, runbook) = create_test_runbook().await;
    let task = runbook
        .create_task(&CreateTask {
            name: "Crawler release".to_string(),
            description: None,
            flow_types: vec!["international_crawler".to_string()],
        })
        .await
        .unwrap();
    let first = task.steps[0].id;

    for status in ["in_progress", "failed"] {
        runbook
            .update_step_result(&UpdateStep {
                id: first,
                status: Some(status.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    assert!(runbook.list_todos(&Id { id: task.id }).await.unwrap().is_empty());
    let task = runbook.show_task(&Id { id: task.id }).await.unwrap();
    assert_eq!(task.status, TaskStatus::InProgress);

    // A failed step cannot be retried in place.
    let retry = runbook
        .update_step_result(&UpdateStep {
            id: first,
            status: Some("in_progress".to_string()),
            ..Default::default()
        })
        .await;
    assert!(matches!(retry, Err(RunbookError::InvalidInput { .. })));
}

#[tokio::test]
async fn test_builder_creates_missing_directories() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("dir").join("runbook.db");

    let runbook = runbook_core::RunbookBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to build runbook");

    assert!(db_path.exists());
    assert_eq!(runbook.database_path(), db_path.as_path());
}
