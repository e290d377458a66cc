use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

const CHECKLIST_TODO: &str = r#"{
    "userId": 1, "title": "Pack", "deadline": "2025-08-01", "priority": "high",
    "progressMode": false, "subtasks": [{"text": "socks", "completed": false}]
}"#;

// --- list ---

#[tokio::test]
async fn list_items_empty() {
    let resp = app().oneshot(empty_request("GET", "/api/item/user/1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let items = body_json(resp).await;
    assert_eq!(items, Value::Array(Vec::new()));
}

// --- create ---

#[tokio::test]
async fn create_item_defaults_status_and_order() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/item",
            r#"{"userId":1,"type":"HABIT","title":"Stretch"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let item = body_json(resp).await;
    assert_eq!(item["id"], 1);
    assert_eq!(item["status"], "active");
    assert_eq!(item["sortOrder"], 0);
    assert!(item["createdAt"].is_string());
}

#[tokio::test]
async fn create_item_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/api/item", r#"{"not_title":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- get ---

#[tokio::test]
async fn get_item_not_found() {
    let resp = app().oneshot(empty_request("GET", "/api/item/41")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn get_item_bad_id_returns_400() {
    let resp = app().oneshot(empty_request("GET", "/api/item/abc")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- subtask operations ---

#[tokio::test]
async fn subtask_on_unknown_item_is_structured_404() {
    let resp = app()
        .oneshot(json_request("POST", "/api/item/9/subtask", r#"{"text":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], "item not found");
}

// --- todo update ---

#[tokio::test]
async fn todo_update_on_habit_is_rejected_without_changes() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/item",
            r#"{"userId":1,"type":"HABIT","title":"Stretch"}"#,
        ))
        .await
        .unwrap();
    let id = body_json(resp).await["id"].as_i64().unwrap();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/api/item/todo/{id}"),
            r#"{"title":"Renamed","deadline":"2025-01-01","priority":"low"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"], true);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/api/item/{id}")))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["title"], "Stretch");
}

// --- delete ---

#[tokio::test]
async fn delete_unknown_item_reports_failure() {
    let resp = app().oneshot(empty_request("DELETE", "/api/item/3")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
}

// --- full TODO lifecycle ---

#[tokio::test]
async fn todo_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // Create a checklist TODO.
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/item/todo", CHECKLIST_TODO))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created = body_json(resp).await;
    assert_eq!(created["type"], "TODO");
    let id = created["id"].as_i64().unwrap();

    // Detail embeds the TODO fields with string-encoded subtasks.
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/api/item/{id}")))
        .await
        .unwrap();
    let detail = body_json(resp).await;
    assert_eq!(detail["todoItem"]["progressMode"], false);
    assert_eq!(
        detail["todoItem"]["subtasks"],
        r#"[{"text":"socks","completed":false}]"#
    );

    // Add a subtask; the reply is the flattened TODO record.
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", &format!("/api/item/{id}/subtask"), r#"{"text":"shoes"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let reply = body_json(resp).await;
    assert_eq!(reply["id"], id);
    assert!(reply["subtasks"].as_str().unwrap().contains("shoes"));

    // Toggle both subtasks; the item becomes completed.
    for index in 0..2 {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(empty_request("PUT", &format!("/api/item/{id}/subtask/{index}/toggle")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/api/item/user/1/status/completed"))
        .await
        .unwrap();
    let completed = body_json(resp).await;
    assert_eq!(completed.as_array().unwrap().len(), 1);
    assert!(completed[0].get("todoItem").is_none());

    // Progress endpoints refuse a checklist TODO.
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("PUT", &format!("/api/item/{id}/progress/increment")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], true);

    // Toggle status flips it back to active.
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("PUT", &format!("/api/item/{id}/toggle")))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["status"], "active");

    // Delete, then the item is gone.
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/api/item/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["success"], true);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/api/item/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
