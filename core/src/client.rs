//! Stateless HTTP request builder and response parser for the item API.
//!
//! # Design
//! `ItemClient` holds the base URL and the current user id and carries no
//! mutable state between calls. Each endpoint is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! an `HttpResponse`. Progress and subtask endpoints answer with loosely
//! specified bodies, so they share `parse_loose`; callers reload the item to
//! observe their effect.

use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{DeleteResponse, Item, ItemFilter, Priority, Subtask, TodoDraft};

const ITEM_PATH: &str = "/api/item";

/// Wire body for the TODO create and update endpoints.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TodoPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<i64>,
    title: &'a str,
    content: Option<&'a str>,
    sort_order: Option<i32>,
    deadline: &'a str,
    priority: Priority,
    progress_mode: Option<bool>,
    progress_total: Option<i32>,
    subtasks: Option<Vec<Subtask>>,
}

impl<'a> TodoPayload<'a> {
    fn project(draft: &'a TodoDraft, subtasks: Option<Vec<Subtask>>) -> Self {
        Self {
            user_id: None,
            title: &draft.title,
            content: draft.content.as_deref(),
            sort_order: draft.sort_order,
            deadline: &draft.deadline,
            priority: draft.priority,
            progress_mode: draft.progress_mode,
            progress_total: draft.progress_total,
            subtasks,
        }
    }
}

#[derive(Serialize)]
struct ProgressPayload {
    current: i32,
    total: i32,
}

#[derive(Serialize)]
struct SubtaskTextPayload<'a> {
    text: &'a str,
}

/// Subtasks sent when creating a TODO: only a checklist-mode TODO with at
/// least one entry carries them, with `completed` defaulted.
pub fn creation_subtasks(draft: &TodoDraft) -> Option<Vec<Subtask>> {
    match (draft.progress_mode, draft.subtasks.as_deref()) {
        (Some(false), Some(entries)) if !entries.is_empty() => {
            Some(entries.iter().map(|entry| entry.to_subtask()).collect())
        }
        _ => None,
    }
}

/// Subtasks sent when updating a TODO: passed through whenever present,
/// regardless of `progress_mode`.
pub fn update_subtasks(draft: &TodoDraft) -> Option<Vec<Subtask>> {
    draft
        .subtasks
        .as_deref()
        .map(|entries| entries.iter().map(|entry| entry.to_subtask()).collect())
}

/// Synchronous, stateless client for the item API.
#[derive(Debug, Clone)]
pub struct ItemClient {
    base_url: String,
    user_id: i64,
}

impl ItemClient {
    pub fn new(base_url: &str, user_id: i64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url, config.user_id)
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}{ITEM_PATH}{suffix}", self.base_url)
    }

    // -- listing and lookup ------------------------------------------------

    pub fn build_list_items(&self, filter: Option<ItemFilter>) -> HttpRequest {
        let user = self.user_id;
        let suffix = match filter {
            None => format!("/user/{user}"),
            Some(ItemFilter::Type(item_type)) => format!("/user/{user}/type/{}", item_type.as_str()),
            Some(ItemFilter::Status(status)) => format!("/user/{user}/status/{}", status.as_str()),
        };
        HttpRequest::bare(HttpMethod::Get, self.url(&suffix))
    }

    pub fn build_get_item(&self, id: i64) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Get, self.url(&format!("/{id}")))
    }

    // -- generic CRUD --------------------------------------------------------

    /// The outgoing payload always carries this client's user id.
    pub fn build_create_item(&self, item: &Item) -> Result<HttpRequest, ApiError> {
        let mut owned = item.clone();
        owned.user_id = self.user_id;
        let body = to_json(&owned)?;
        Ok(HttpRequest::json(HttpMethod::Post, self.url(""), body))
    }

    pub fn build_update_item(&self, id: i64, item: &Item) -> Result<HttpRequest, ApiError> {
        let body = to_json(item)?;
        Ok(HttpRequest::json(HttpMethod::Put, self.url(&format!("/{id}")), body))
    }

    pub fn build_toggle_status(&self, id: i64) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Put, self.url(&format!("/{id}/toggle")))
    }

    pub fn build_delete_item(&self, id: i64) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Delete, self.url(&format!("/{id}")))
    }

    // -- TODO-specific -------------------------------------------------------

    pub fn build_create_todo(&self, draft: &TodoDraft) -> Result<HttpRequest, ApiError> {
        let mut payload = TodoPayload::project(draft, creation_subtasks(draft));
        payload.user_id = Some(self.user_id);
        let body = to_json(&payload)?;
        Ok(HttpRequest::json(HttpMethod::Post, self.url("/todo"), body))
    }

    pub fn build_update_todo(&self, id: i64, draft: &TodoDraft) -> Result<HttpRequest, ApiError> {
        let payload = TodoPayload::project(draft, update_subtasks(draft));
        let body = to_json(&payload)?;
        Ok(HttpRequest::json(HttpMethod::Put, self.url(&format!("/todo/{id}")), body))
    }

    pub fn build_increment_progress(&self, id: i64) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Put, self.url(&format!("/{id}/progress/increment")))
    }

    pub fn build_decrement_progress(&self, id: i64) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Put, self.url(&format!("/{id}/progress/decrement")))
    }

    pub fn build_set_progress(&self, id: i64, current: i32, total: i32) -> Result<HttpRequest, ApiError> {
        let body = to_json(&ProgressPayload { current, total })?;
        Ok(HttpRequest::json(HttpMethod::Put, self.url(&format!("/{id}/progress")), body))
    }

    pub fn build_toggle_subtask(&self, id: i64, index: usize) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Put, self.url(&format!("/{id}/subtask/{index}/toggle")))
    }

    pub fn build_add_subtask(&self, id: i64, text: &str) -> Result<HttpRequest, ApiError> {
        subtask_add_request(self.url(&format!("/{id}/subtask")), text)
    }

    pub fn build_update_subtask(&self, id: i64, index: usize, text: &str) -> Result<HttpRequest, ApiError> {
        let body = to_json(&SubtaskTextPayload { text })?;
        Ok(HttpRequest::json(HttpMethod::Put, self.url(&format!("/{id}/subtask/{index}")), body))
    }

    pub fn build_delete_subtask(&self, id: i64, index: usize) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Delete, self.url(&format!("/{id}/subtask/{index}")))
    }

    // -- parsing -------------------------------------------------------------

    pub fn parse_list_items(&self, response: HttpResponse) -> Result<Vec<Item>, ApiError> {
        check_status(&response)?;
        from_json(&response.body)
    }

    /// Parses every endpoint that answers with a single item: get, create,
    /// update, toggle and the TODO create/update.
    pub fn parse_item(&self, response: HttpResponse) -> Result<Item, ApiError> {
        check_status(&response)?;
        from_json(&response.body)
    }

    pub fn parse_delete_item(&self, response: HttpResponse) -> Result<DeleteResponse, ApiError> {
        check_status(&response)?;
        from_json(&response.body)
    }

    /// Parses progress and subtask responses without assuming a shape.
    /// An empty body yields `Value::Null`; a body that is not JSON is kept
    /// as `Value::String`.
    pub fn parse_loose(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&response.body).unwrap_or(Value::String(response.body)))
    }
}

/// Build the add-subtask request against an arbitrary absolute URL.
pub(crate) fn subtask_add_request(url: String, text: &str) -> Result<HttpRequest, ApiError> {
    let body = to_json(&SubtaskTextPayload { text })?;
    Ok(HttpRequest::json(HttpMethod::Post, url, body))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
pub(crate) fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ItemStatus, ItemType, SubtaskDraft};

    fn client() -> ItemClient {
        ItemClient::new("http://localhost:8080", 1)
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn body_of(req: &HttpRequest) -> Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    fn draft(progress_mode: Option<bool>, subtasks: Option<Vec<SubtaskDraft>>) -> TodoDraft {
        TodoDraft {
            title: "Write report".to_string(),
            deadline: "2025-03-01".to_string(),
            progress_mode,
            subtasks,
            ..TodoDraft::default()
        }
    }

    #[test]
    fn list_paths_follow_filter() {
        let c = client();
        assert_eq!(c.build_list_items(None).path, "http://localhost:8080/api/item/user/1");
        assert_eq!(
            c.build_list_items(Some(ItemFilter::Type(ItemType::Todo))).path,
            "http://localhost:8080/api/item/user/1/type/TODO"
        );
        assert_eq!(
            c.build_list_items(Some(ItemFilter::Status(ItemStatus::Completed))).path,
            "http://localhost:8080/api/item/user/1/status/completed"
        );
    }

    #[test]
    fn build_get_item_produces_correct_request() {
        let req = client().build_get_item(42);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8080/api/item/42");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn create_item_injects_user_id() {
        let mut item = Item::new(ItemType::Todo, "Buy milk");
        item.user_id = 99;
        let req = client().build_create_item(&item).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8080/api/item");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body = body_of(&req);
        assert_eq!(body["userId"], 1);
        assert_eq!(body["title"], "Buy milk");
    }

    #[test]
    fn create_todo_without_mode_sends_null_subtasks() {
        let req = client()
            .build_create_todo(&draft(None, Some(vec![SubtaskDraft::new("a")])))
            .unwrap();
        assert_eq!(req.path, "http://localhost:8080/api/item/todo");
        let body = body_of(&req);
        assert!(body["subtasks"].is_null());
        assert!(body["progressMode"].is_null());
        assert_eq!(body["userId"], 1);
    }

    #[test]
    fn create_todo_in_checklist_mode_defaults_completion() {
        let req = client()
            .build_create_todo(&draft(Some(false), Some(vec![SubtaskDraft::new("a")])))
            .unwrap();
        let body = body_of(&req);
        assert_eq!(body["subtasks"], serde_json::json!([{"text": "a", "completed": false}]));
    }

    #[test]
    fn create_todo_in_progress_mode_drops_subtasks() {
        let req = client()
            .build_create_todo(&draft(Some(true), Some(vec![SubtaskDraft::new("a")])))
            .unwrap();
        assert!(body_of(&req)["subtasks"].is_null());
    }

    #[test]
    fn create_todo_with_empty_checklist_sends_null() {
        let req = client().build_create_todo(&draft(Some(false), Some(Vec::new()))).unwrap();
        assert!(body_of(&req)["subtasks"].is_null());
    }

    #[test]
    fn update_todo_passes_subtasks_through_without_mode() {
        let req = client()
            .build_update_todo(7, &draft(None, Some(vec![SubtaskDraft::new("a")])))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:8080/api/item/todo/7");
        let body = body_of(&req);
        assert_eq!(body["subtasks"], serde_json::json!([{"text": "a", "completed": false}]));
        assert!(body.get("userId").is_none());
        assert_eq!(body["priority"], "medium");
    }

    #[test]
    fn progress_and_subtask_paths() {
        let c = client();
        assert_eq!(
            c.build_increment_progress(5).path,
            "http://localhost:8080/api/item/5/progress/increment"
        );
        assert_eq!(
            c.build_decrement_progress(5).path,
            "http://localhost:8080/api/item/5/progress/decrement"
        );
        let set = c.build_set_progress(5, 2, 10).unwrap();
        assert_eq!(set.path, "http://localhost:8080/api/item/5/progress");
        assert_eq!(body_of(&set), serde_json::json!({"current": 2, "total": 10}));

        let toggle = c.build_toggle_subtask(5, 1);
        assert_eq!(toggle.method, HttpMethod::Put);
        assert_eq!(toggle.path, "http://localhost:8080/api/item/5/subtask/1/toggle");
        assert!(toggle.body.is_none());

        let delete = c.build_delete_subtask(5, 0);
        assert_eq!(delete.method, HttpMethod::Delete);
        assert_eq!(delete.path, "http://localhost:8080/api/item/5/subtask/0");

        let add = c.build_add_subtask(5, "new").unwrap();
        assert_eq!(add.method, HttpMethod::Post);
        assert_eq!(body_of(&add), serde_json::json!({"text": "new"}));

        let rename = c.build_update_subtask(5, 2, "renamed").unwrap();
        assert_eq!(rename.method, HttpMethod::Put);
        assert_eq!(rename.path, "http://localhost:8080/api/item/5/subtask/2");
    }

    #[test]
    fn toggle_status_has_no_body() {
        let req = client().build_toggle_status(3);
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:8080/api/item/3/toggle");
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_delete_item_success() {
        let resp = client()
            .parse_delete_item(ok(r#"{"success":true,"message":"deleted"}"#))
            .unwrap();
        assert!(resp.success);
        assert_eq!(resp.message, "deleted");
    }

    #[test]
    fn parse_item_not_found() {
        let response = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: String::new(),
        };
        let err = client().parse_item(response).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_item_server_error() {
        let response = HttpResponse {
            status: 500,
            headers: Vec::new(),
            body: "internal error".to_string(),
        };
        let err = client().parse_item(response).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn parse_list_items_bad_json() {
        let err = client().parse_list_items(ok("not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_loose_accepts_empty_and_arbitrary_bodies() {
        assert_eq!(client().parse_loose(ok("")).unwrap(), Value::Null);
        assert_eq!(client().parse_loose(ok(r#"{"x":1}"#)).unwrap()["x"], 1);
        assert_eq!(client().parse_loose(ok("OK")).unwrap(), Value::String("OK".to_string()));
    }

    #[test]
    fn parse_loose_still_rejects_error_status() {
        let response = HttpResponse {
            status: 400,
            headers: Vec::new(),
            body: "OK".to_string(),
        };
        let err = client().parse_loose(response).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 400, .. }));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = ItemClient::new("http://localhost:8080/", 1);
        assert_eq!(client.build_get_item(1).path, "http://localhost:8080/api/item/1");
    }
}
