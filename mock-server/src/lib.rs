//! In-memory stand-in for the jot item backend.
//!
//! Serves every `/api/item` endpoint the client core consumes. Rejected
//! operations answer with `{"error": true, "message": ...}`.

pub mod store;

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};

pub use store::{Item, NewItem, NewTodo, ProgressInput, Rejection, Store, Subtask, TodoItem};

pub type Db = Arc<RwLock<Store>>;

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        tracing::debug!(status = %self.status, message = %self.message, "rejecting request");
        (self.status, Json(json!({ "error": true, "message": self.message }))).into_response()
    }
}

#[derive(Serialize)]
struct DeleteReply {
    success: bool,
    message: String,
}

#[derive(Deserialize)]
struct SubtaskText {
    text: String,
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/item", post(create_item))
        .route("/api/item/todo", post(create_todo))
        .route("/api/item/todo/{id}", put(update_todo))
        .route("/api/item/user/{user_id}", get(list_items))
        .route("/api/item/user/{user_id}/type/{item_type}", get(list_items_by_type))
        .route("/api/item/user/{user_id}/status/{status}", get(list_items_by_status))
        .route("/api/item/{id}", get(get_item).put(update_item).delete(delete_item))
        .route("/api/item/{id}/toggle", put(toggle_status))
        .route("/api/item/{id}/progress", put(set_progress))
        .route("/api/item/{id}/progress/increment", put(increment_progress))
        .route("/api/item/{id}/progress/decrement", put(decrement_progress))
        .route("/api/item/{id}/subtask", post(add_subtask))
        .route("/api/item/{id}/subtask/{index}", put(update_subtask).delete(delete_subtask))
        .route("/api/item/{id}/subtask/{index}/toggle", put(toggle_subtask))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn create_item(State(db): State<Db>, Json(input): Json<NewItem>) -> Json<Item> {
    Json(db.write().await.create_item(input))
}

async fn create_todo(State(db): State<Db>, Json(input): Json<NewTodo>) -> Json<Item> {
    Json(db.write().await.create_todo(input))
}

async fn list_items(State(db): State<Db>, Path(user_id): Path<i64>) -> Json<Vec<Item>> {
    Json(db.read().await.list(user_id, |_| true))
}

async fn list_items_by_type(
    State(db): State<Db>,
    Path((user_id, item_type)): Path<(i64, String)>,
) -> Json<Vec<Item>> {
    Json(db.read().await.list(user_id, |item| item.item_type == item_type))
}

async fn list_items_by_status(
    State(db): State<Db>,
    Path((user_id, status)): Path<(i64, String)>,
) -> Json<Vec<Item>> {
    Json(db.read().await.list(user_id, |item| item.status == status))
}

async fn get_item(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Item>, StatusCode> {
    db.read().await.get(id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<NewItem>,
) -> Result<Json<Item>, Rejection> {
    db.write().await.update_item(id, input).map(Json)
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<NewTodo>,
) -> Result<Json<Item>, Rejection> {
    db.write().await.update_todo(id, input).map(Json)
}

async fn toggle_status(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Item>, Rejection> {
    db.write().await.toggle_status(id).map(Json)
}

async fn delete_item(State(db): State<Db>, Path(id): Path<i64>) -> (StatusCode, Json<DeleteReply>) {
    if db.write().await.delete(id) {
        let reply = DeleteReply {
            success: true,
            message: "deleted".to_string(),
        };
        (StatusCode::OK, Json(reply))
    } else {
        let reply = DeleteReply {
            success: false,
            message: format!("item {id} does not exist"),
        };
        (StatusCode::BAD_REQUEST, Json(reply))
    }
}

async fn increment_progress(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<TodoItem>, Rejection> {
    db.write().await.increment_progress(id).map(Json)
}

async fn decrement_progress(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<TodoItem>, Rejection> {
    db.write().await.decrement_progress(id).map(Json)
}

async fn set_progress(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<ProgressInput>,
) -> Result<Json<TodoItem>, Rejection> {
    db.write().await.set_progress(id, input).map(Json)
}

async fn toggle_subtask(
    State(db): State<Db>,
    Path((id, index)): Path<(i64, usize)>,
) -> Result<Json<TodoItem>, Rejection> {
    db.write().await.toggle_subtask(id, index).map(Json)
}

async fn add_subtask(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<SubtaskText>,
) -> Result<Json<TodoItem>, Rejection> {
    db.write().await.add_subtask(id, input.text).map(Json)
}

async fn update_subtask(
    State(db): State<Db>,
    Path((id, index)): Path<(i64, usize)>,
    Json(input): Json<SubtaskText>,
) -> Result<Json<TodoItem>, Rejection> {
    db.write().await.update_subtask(id, index, input.text).map(Json)
}

async fn delete_subtask(
    State(db): State<Db>,
    Path((id, index)): Path<(i64, usize)>,
) -> Result<Json<TodoItem>, Rejection> {
    db.write().await.delete_subtask(id, index).map(Json)
}
