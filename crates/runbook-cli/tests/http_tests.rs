use reqwest::{Client, StatusCode};
use runbook_core::RunbookBuilder;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Serves the API over a fresh database and returns its base URL.
async fn spawn_server() -> (String, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let runbook = RunbookBuilder::new()
        .with_database_path(Some(temp_dir.path().join("http_test.db")))
        .build()
        .await
        .expect("Failed to build runbook");

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, runbook_cli::http::router(runbook))
            .await
            .expect("Server failed");
    });

    (format!("http://{addr}/api"), temp_dir)
}

async fn create_crawler_task(client: &Client, base: &str, name: &str) -> Value {
    let response = client
        .post(format!("{base}/tasks"))
        .json(&json!({ "name": name, "flowTypes": ["international_crawler"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

#[tokio::test]
async fn test_health() {
    let (base, _dir) = spawn_server().await;
    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_create_task_envelope() {
    let (base, _dir) = spawn_server().await;
    let client = Client::new();

    let body = create_crawler_task(&client, &base, "Crawler rollout").await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Task created with 7 steps");
    assert_eq!(body["data"]["status"], "in_progress");
    assert_eq!(body["data"]["steps"].as_array().unwrap().len(), 7);
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_error_status_codes() {
    let (base, _dir) = spawn_server().await;
    let client = Client::new();

    // Blank name
    let response = client
        .post(format!("{base}/tasks"))
        .json(&json!({ "name": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "invalid_input");

    // Malformed JSON
    let response = client
        .post(format!("{base}/tasks"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing task
    let response = client.get(format!("{base}/tasks/99")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(body["message"], "Task with ID 99 not found");

    // Second active task
    create_crawler_task(&client, &base, "First").await;
    let response = client
        .post(format!("{base}/tasks"))
        .json(&json!({ "name": "Second" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "conflict");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("'First' (ID 1) is already in progress"));
}

#[tokio::test]
async fn test_step_progression_and_auto_complete() {
    let (base, _dir) = spawn_server().await;
    let client = Client::new();

    let created = create_crawler_task(&client, &base, "Crawler rollout").await;
    let task_id = created["data"]["id"].as_u64().unwrap();

    let todos: Value = client
        .get(format!("{base}/tasks/{task_id}/todos"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let todos = todos["data"].as_array().unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0]["action"], "operate");

    // Blocked steps are rejected by the server
    let step_ids: Vec<u64> = created["data"]["steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|step| step["id"].as_u64().unwrap())
        .collect();
    let response = client
        .put(format!("{base}/steps/{}", step_ids[1]))
        .json(&json!({ "status": "in_progress" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut last = Value::Null;
    for id in &step_ids {
        last = client
            .put(format!("{base}/steps/{id}"))
            .json(&json!({ "status": "completed" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(last["success"], true);
    }
    assert_eq!(last["data"]["task_completed"], true);
    assert_eq!(last["data"]["task_status"], "completed");

    let current: Value = client
        .get(format!("{base}/tasks/current"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(current["success"], true);
    assert!(current.get("data").is_none());
    assert_eq!(current["message"], "No task in progress");

    let history: Value = client
        .get(format!("{base}/history?page=1&pageSize=5"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history["data"]["records"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_force_complete_without_body() {
    let (base, _dir) = spawn_server().await;
    let client = Client::new();

    let created = create_crawler_task(&client, &base, "Crawler rollout").await;
    let task_id = created["data"]["id"].as_u64().unwrap();

    let response = client
        .post(format!("{base}/tasks/{task_id}/force-complete"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["status"], "completed");

    // Only in-progress tasks can be forced
    let response = client
        .post(format!("{base}/tasks/{task_id}/force-complete"))
        .json(&json!({ "reason": "again" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_templates_replace_and_reset() {
    let (base, _dir) = spawn_server().await;
    let client = Client::new();

    let response = client
        .put(format!("{base}/templates/international_crawler"))
        .json(&json!({
            "templates": [
                { "stepName": "Pause scheduling", "stepType": "config", "estimatedDuration": 2 },
                { "stepName": "Deploy crawler", "stepType": "deploy", "dependencies": [1] }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let response = client
        .put(format!("{base}/templates/international_crawler"))
        .json(&json!([{ "stepName": "Ahead", "stepType": "config", "dependencies": [2] }]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{base}/templates/international_crawler/reset"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let templates: Value = client
        .get(format!("{base}/templates?flowType=international_crawler"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(templates["data"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_export_is_attachment() {
    let (base, _dir) = spawn_server().await;
    let client = Client::new();

    let created = create_crawler_task(&client, &base, "Crawler rollout").await;
    let task_id = created["data"]["id"].as_u64().unwrap();

    let response = client
        .get(format!("{base}/history/{task_id}/export"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains(&format!("task-{task_id}-history.json")));
    let export: Value = response.json().await.unwrap();
    assert_eq!(export["task"]["name"], "Crawler rollout");
}

#[tokio::test]
async fn test_invalid_path_id() {
    let (base, _dir) = spawn_server().await;
    let response = reqwest::get(format!("{base}/steps/not-a-number"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "invalid_input");
}
