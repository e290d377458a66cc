//! View-state coordinator for TODO items.
//!
//! # Design
//! `TodoOperations` owns two maps: item id → normalized [`TodoDetail`] and
//! item id → expanded flag. Every mutation performs its remote call and then
//! reloads the item's detail from the server and marks it expanded; nothing
//! is applied optimistically. Operations that can change an item's
//! completion status on the server also fire the registered refresh callback
//! so a summary list can re-fetch.
//!
//! All operations take `&mut self`, so calls against one coordinator are
//! serialized and a reload can never be overtaken by an older one.

use std::collections::HashMap;
use std::thread;

use serde_json::Value;

use crate::client::{subtask_add_request, ItemClient};
use crate::config::ClientConfig;
use crate::detail::{decode_subtasks, TodoDetail};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::TodoEdit;

const LOAD_FAILED_MESSAGE: &str = "failed to load details";
const ADD_SUBTASK_FAILED_MESSAGE: &str = "failed to add subtask";

/// Receives failures that should be shown to the user.
pub trait Notifier {
    fn error(&self, message: &str);
}

/// Reports user-visible failures through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

pub struct TodoOperations<T> {
    client: ItemClient,
    config: ClientConfig,
    transport: T,
    notifier: Box<dyn Notifier>,
    item_details: HashMap<i64, TodoDetail>,
    expanded: HashMap<i64, bool>,
    on_refresh: Option<Box<dyn FnMut()>>,
}

impl<T: Transport> TodoOperations<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            client: ItemClient::from_config(&config),
            config,
            transport,
            notifier: Box::new(TracingNotifier),
            item_details: HashMap::new(),
            expanded: HashMap::new(),
            on_refresh: None,
        }
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    /// Register the callback fired after operations that may change an
    /// item's completion status. Replaces any previous callback.
    pub fn set_refresh_callback(&mut self, callback: impl FnMut() + 'static) {
        self.on_refresh = Some(Box::new(callback));
    }

    pub fn client(&self) -> &ItemClient {
        &self.client
    }

    pub fn detail(&self, id: i64) -> Option<&TodoDetail> {
        self.item_details.get(&id)
    }

    pub fn details(&self) -> &HashMap<i64, TodoDetail> {
        &self.item_details
    }

    pub fn is_expanded(&self, id: i64) -> bool {
        self.expanded.get(&id).copied().unwrap_or(false)
    }

    /// Fetch `id` and store its normalized detail, replacing any cached one.
    ///
    /// Non-TODO items store nothing. On failure the user is notified and the
    /// cached detail, if any, is left as it was.
    pub fn load_item_details(&mut self, id: i64) {
        match self.fetch_detail(id) {
            Ok(Some(detail)) => {
                self.item_details.insert(id, detail);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(id, error = %err, "loading todo details failed");
                self.notifier.error(LOAD_FAILED_MESSAGE);
            }
        }
    }

    /// Collapse an expanded item, or expand a collapsed one, loading its
    /// detail first only when none is cached.
    pub fn toggle_details(&mut self, id: i64) {
        if self.is_expanded(id) {
            self.expanded.insert(id, false);
            return;
        }
        if !self.item_details.contains_key(&id) {
            self.load_item_details(id);
        }
        self.expanded.insert(id, true);
    }

    /// Apply field edits on top of the cached detail. Does nothing when the
    /// item has no cached detail.
    pub fn update_todo_item(&mut self, id: i64, edit: TodoEdit) -> Result<(), ApiError> {
        let Some(todo) = self.item_details.get(&id) else {
            return Ok(());
        };
        let mut draft = todo.to_draft();
        draft.title = edit.title;
        if edit.content.is_some() {
            draft.content = edit.content;
        }
        draft.priority = edit.priority;
        draft.deadline = edit.deadline;

        let request = self.client.build_update_todo(id, &draft)?;
        self.call(request)?;
        self.reload_expanded(id, false);
        Ok(())
    }

    pub fn increment_progress(&mut self, id: i64) -> Result<(), ApiError> {
        let request = self.client.build_increment_progress(id);
        self.call(request)?;
        self.reload_expanded(id, true);
        Ok(())
    }

    pub fn decrement_progress(&mut self, id: i64) -> Result<(), ApiError> {
        let request = self.client.build_decrement_progress(id);
        self.call(request)?;
        self.reload_expanded(id, true);
        Ok(())
    }

    /// Set a new progress total, keeping the cached current value. Does
    /// nothing when the item has no cached detail.
    pub fn save_progress_total(&mut self, id: i64, total: i32) -> Result<(), ApiError> {
        let Some(todo) = self.item_details.get(&id) else {
            return Ok(());
        };
        let request = self.client.build_set_progress(id, todo.progress_current, total)?;
        self.call(request)?;
        self.reload_expanded(id, true);
        Ok(())
    }

    pub fn toggle_subtask(&mut self, id: i64, index: usize) -> Result<(), ApiError> {
        let request = self.client.build_toggle_subtask(id, index);
        self.call(request)?;
        self.reload_expanded(id, true);
        Ok(())
    }

    pub fn delete_subtask(&mut self, id: i64, index: usize) -> Result<(), ApiError> {
        let request = self.client.build_delete_subtask(id, index);
        self.call(request)?;
        self.reload_expanded(id, true);
        Ok(())
    }

    /// Rename a subtask. Completion cannot change, so no refresh.
    pub fn update_subtask_text(&mut self, id: i64, index: usize, text: &str) -> Result<(), ApiError> {
        let request = self.client.build_update_subtask(id, index, text)?;
        self.call(request)?;
        self.reload_expanded(id, false);
        Ok(())
    }

    /// Append a subtask through the configured absolute endpoint.
    ///
    /// Every failure is flattened into `ApiError::Rejected` carrying a
    /// message fit for the user. An empty reply is not an error: the detail
    /// is reloaded after `empty_reply_reload_delay`.
    pub fn add_subtask(&mut self, id: i64, text: &str) -> Result<(), ApiError> {
        let request = subtask_add_request(self.config.subtask_url(id), text)?;
        let Some(reply) = self.post_subtask(request)? else {
            thread::sleep(self.config.empty_reply_reload_delay());
            self.load_item_details(id);
            self.expanded.insert(id, true);
            return Ok(());
        };

        let subtasks = decode_subtasks(reply.get("subtasks"));
        if let Some(todo) = self.item_details.get_mut(&id) {
            todo.subtasks = subtasks;
        }
        self.reload_expanded(id, true);
        Ok(())
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(method = request.method.as_str(), path = %request.path, "sending request");
        self.transport.execute(request)
    }

    fn call(&self, request: HttpRequest) -> Result<Value, ApiError> {
        let response = self.send(request)?;
        self.client.parse_loose(response)
    }

    fn fetch_detail(&self, id: i64) -> Result<Option<TodoDetail>, ApiError> {
        let response = self.send(self.client.build_get_item(id))?;
        let item = self.client.parse_item(response)?;
        Ok(TodoDetail::from_item(item))
    }

    fn reload_expanded(&mut self, id: i64, refresh: bool) {
        self.load_item_details(id);
        self.expanded.insert(id, true);
        if refresh {
            if let Some(callback) = self.on_refresh.as_mut() {
                callback();
            }
        }
    }

    /// Returns the decoded reply, or `None` when the server sent nothing.
    fn post_subtask(&self, request: HttpRequest) -> Result<Option<Value>, ApiError> {
        let response = self
            .send(request)
            .map_err(|err| ApiError::Rejected(transport_message(&err)))?;
        let reply = decode_reply(&response.body);

        if !response.is_success() {
            let message = reply
                .as_ref()
                .and_then(structured_error)
                .unwrap_or_else(|| format!("request failed with status code {}", response.status));
            return Err(ApiError::Rejected(message));
        }

        if let Some(body) = &reply {
            if is_truthy(body.get("error")) {
                let message = non_empty_str(body.get("message"))
                    .unwrap_or_else(|| ADD_SUBTASK_FAILED_MESSAGE.to_string());
                return Err(ApiError::Rejected(message));
            }
        }
        Ok(reply)
    }
}

fn decode_reply(body: &str) -> Option<Value> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str(trimmed) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(body.to_string())),
    }
}

/// `{error, message}` carried in an error response body.
fn structured_error(body: &Value) -> Option<String> {
    if is_truthy(body.get("error")) {
        non_empty_str(body.get("message"))
    } else {
        None
    }
}

fn transport_message(err: &ApiError) -> String {
    let message = match err {
        ApiError::Transport(message) => message.clone(),
        other => other.to_string(),
    };
    if message.is_empty() {
        ADD_SUBTASK_FAILED_MESSAGE.to_string()
    } else {
        message
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Servers flag errors with `true` or with a status phrase.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::Array(_) | Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    }
}
