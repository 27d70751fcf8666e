mod common;

use common::{app, json, request};
use serde_json::json;

#[tokio::test]
async fn acceptance_create_list_update_delete() {
    let app = app(false).await;

    // create
    let payload = json!({ "title": "Buy milk", "assignedTo": "Mom", "assignedToColor": "#ec4899", "priority": "high", "dueDate": "2025-10-16" });
    let res = request(&app, "POST", "/todos", Some(payload)).await;
    assert_eq!(res.status(), 201);
    let body = json(res).await;
    let id = body["todo"]["id"].as_str().unwrap().to_string();

    // list
    let res = request(&app, "GET", "/todos", None).await;
    assert_eq!(res.status(), 200);
    let body = json(res).await;
    let todos = body["todos"].as_array().unwrap();
    assert_eq!(todos.len(), 1);
    let todo = &todos[0];
    assert_eq!(todo["id"], id.as_str());
    assert_eq!(todo["title"], "Buy milk");
    assert_eq!(todo["assignedTo"], "Mom");
    assert_eq!(todo["assignedToColor"], "#ec4899");
    assert_eq!(todo["priority"], "high");
    assert_eq!(todo["dueDate"], "2025-10-16");
    assert_eq!(todo["completed"], false);
    assert!(todo["createdAt"].is_string() && todo["updatedAt"].is_string());

    // update by path
    let res = request(&app, "PUT", &format!("/todos/{id}"), Some(json!({ "completed": true }))).await;
    assert_eq!(res.status(), 200);
    let updated = json(res).await["todo"].clone();
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["title"], "Buy milk");
    assert_eq!(updated["priority"], "high");
    assert_eq!(updated["createdAt"], todo["createdAt"]);

    // update by body
    let res = request(&app, "PUT", "/todos", Some(json!({ "id": id, "priority": "normal", "category": "shopping" }))).await;
    assert_eq!(res.status(), 200);
    let updated = json(res).await["todo"].clone();
    assert_eq!(updated["priority"], "normal");
    assert_eq!(updated["category"], "shopping");
    assert_eq!(updated["completed"], true);

    // get
    let res = request(&app, "GET", &format!("/todos/{id}"), None).await;
    assert_eq!(res.status(), 200);

    // delete
    let res = request(&app, "DELETE", &format!("/todos/{id}"), None).await;
    assert_eq!(res.status(), 200);
    assert_eq!(json(res).await, json!({ "success": true }));

    // repeat delete is a 404, not a crash
    let res = request(&app, "DELETE", &format!("/todos/{id}"), None).await;
    assert_eq!(res.status(), 404);

    let res = request(&app, "GET", &format!("/todos/{id}"), None).await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn create_requires_title_and_assignee() {
    let app = app(false).await;
    for payload in [
        json!({ "assignedTo": "Mom", "assignedToColor": "#ec4899" }),
        json!({ "title": "", "assignedTo": "Mom", "assignedToColor": "#ec4899" }),
        json!({ "title": "x", "assignedToColor": "#ec4899" }),
        json!({ "title": "x", "assignedTo": "Mom" }),
    ] {
        let res = request(&app, "POST", "/todos", Some(payload)).await;
        assert_eq!(res.status(), 400);
        assert!(json(res).await["error"].is_string());
    }

    let res = request(&app, "POST", "/todos", Some(json!({ "title": "x", "assignedTo": "Mom", "assignedToColor": "#ec4899", "priority": "urgent" }))).await;
    assert_eq!(res.status(), 400);
    let body = json(res).await;
    assert!(body["details"].is_string());

    let res = request(&app, "GET", "/todos", None).await;
    assert!(json(res).await["todos"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn create_treats_blank_due_date_and_category_as_absent() {
    let app = app(false).await;
    let payload = json!({ "title": "Water plants", "assignedTo": "Dad", "assignedToColor": "#3b82f6", "dueDate": "", "category": "" });
    let res = request(&app, "POST", "/todos", Some(payload)).await;
    assert_eq!(res.status(), 201);
    let todo = json(res).await["todo"].clone();
    assert!(todo.get("dueDate").is_none());
    assert!(todo.get("category").is_none());

    let id = todo["id"].as_str().unwrap().to_string();
    let stored = json(request(&app, "GET", &format!("/todos/{id}"), None).await).await["todo"].clone();
    assert!(stored.get("dueDate").is_none());
    assert!(stored.get("category").is_none());
}

#[tokio::test]
async fn update_errors() {
    let app = app(true).await;
    let res = request(&app, "PUT", "/todos/1", Some(json!({}))).await;
    assert_eq!(res.status(), 400);
    assert_eq!(json(res).await["error"], "No fields to update");

    let res = request(&app, "PUT", "/todos/nonexistent-id", Some(json!({ "completed": true }))).await;
    assert_eq!(res.status(), 404);

    let res = request(&app, "PUT", "/todos", Some(json!({ "completed": true }))).await;
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn delete_missing_id_leaves_list_alone() {
    let app = app(true).await;
    let before = json(request(&app, "GET", "/todos", None).await).await["todos"].as_array().unwrap().len();
    assert_eq!(before, 5);

    let res = request(&app, "DELETE", "/todos/nonexistent-id", None).await;
    assert_eq!(res.status(), 404);
    let res = request(&app, "DELETE", "/todos?id=nonexistent-id", None).await;
    assert_eq!(res.status(), 404);
    let res = request(&app, "DELETE", "/todos", None).await;
    assert_eq!(res.status(), 400);

    let after = json(request(&app, "GET", "/todos", None).await).await["todos"].as_array().unwrap().len();
    assert_eq!(after, before);

    let res = request(&app, "DELETE", "/todos?id=3", None).await;
    assert_eq!(res.status(), 200);
    let after = json(request(&app, "GET", "/todos", None).await).await["todos"].as_array().unwrap().len();
    assert_eq!(after, before - 1);
}

#[tokio::test]
async fn list_is_newest_first() {
    let app = app(true).await;
    let payload = json!({ "title": "Newest", "assignedTo": "Dad", "assignedToColor": "#3b82f6" });
    assert_eq!(request(&app, "POST", "/todos", Some(payload)).await.status(), 201);
    let body = json(request(&app, "GET", "/todos", None).await).await;
    let ids: Vec<_> = body["todos"].as_array().unwrap().iter().map(|t| t["id"].as_str().unwrap().to_string()).collect();
    assert_eq!(ids.len(), 6);
    assert_eq!(&ids[1..], ["1", "2", "3", "4", "5"]);
    assert_eq!(body["todos"][0]["title"], "Newest");
}

#[tokio::test]
async fn options_and_cors_headers() {
    let app = app(false).await;
    for path in ["/todos", "/todos/1", "/family-members", "/anything"] {
        let res = request(&app, "OPTIONS", path, None).await;
        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["access-control-allow-origin"], "*");
        assert_eq!(res.headers()["access-control-allow-methods"], "GET, POST, PUT, DELETE, OPTIONS");
        assert_eq!(res.headers()["access-control-allow-headers"], "Content-Type, Authorization");
    }
    let res = request(&app, "GET", "/todos", None).await;
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    let res = request(&app, "GET", "/health", None).await;
    assert_eq!(res.status(), 200);
}
