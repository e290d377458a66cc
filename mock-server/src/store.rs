//! In-memory item store with the backend's TODO rules.
//!
//! Items are keyed by a monotonically assigned id. TODO extension data lives
//! on the item and is serialized under `todoItem`, with `subtasks` encoded as
//! a JSON string the way the real backend stores it.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize, Serializer};

/// A refused operation: HTTP status plus a message for the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: StatusCode,
    pub message: String,
}

impl Rejection {
    fn not_found(what: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("{what} not found"),
        }
    }

    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: i64,
    pub deadline: String,
    pub priority: String,
    pub progress_mode: Option<bool>,
    pub progress_current: Option<i32>,
    pub progress_total: Option<i32>,
    #[serde(serialize_with = "encode_subtasks")]
    pub subtasks: Option<Vec<Subtask>>,
}

fn encode_subtasks<S: Serializer>(subtasks: &Option<Vec<Subtask>>, serializer: S) -> Result<S::Ok, S::Error> {
    match subtasks {
        Some(list) => {
            let encoded = serde_json::to_string(list).map_err(serde::ser::Error::custom)?;
            serializer.serialize_some(&encoded)
        }
        None => serializer.serialize_none(),
    }
}

impl TodoItem {
    fn checklist(&mut self) -> Result<&mut Vec<Subtask>, Rejection> {
        if self.progress_mode != Some(false) {
            return Err(Rejection::bad_request("todo is not in subtask mode"));
        }
        Ok(self.subtasks.get_or_insert_with(Vec::new))
    }

    fn require_progress_mode(&self) -> Result<(), Rejection> {
        if self.progress_mode == Some(true) {
            Ok(())
        } else {
            Err(Rejection::bad_request("todo is not in progress mode"))
        }
    }

    /// Completion implied by the current progress or checklist; `None` for a
    /// plain TODO.
    fn implied_completion(&self) -> Option<bool> {
        match self.progress_mode {
            Some(true) => Some(match (self.progress_current, self.progress_total) {
                (Some(current), Some(total)) => current >= total,
                _ => false,
            }),
            Some(false) => {
                let subtasks = self.subtasks.as_deref().unwrap_or_default();
                Some(!subtasks.is_empty() && subtasks.iter().all(|s| s.completed))
            }
            None => None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub item_type: String,
    pub title: String,
    pub content: Option<String>,
    pub status: String,
    pub sort_order: i32,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todo_item: Option<TodoItem>,
}

impl Item {
    /// The item without its extension data, as listings return it.
    fn summary(&self) -> Self {
        Self {
            todo_item: None,
            ..self.clone()
        }
    }

    fn todo_mut(&mut self) -> Result<&mut TodoItem, Rejection> {
        self.todo_item.as_mut().ok_or_else(|| Rejection::not_found("todo"))
    }

    fn touch(&mut self) {
        self.updated_at = now();
    }

    fn sync_status(&mut self) {
        if let Some(completed) = self.todo_item.as_ref().and_then(TodoItem::implied_completion) {
            self.status = if completed { "completed" } else { "active" }.to_string();
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    #[serde(default)]
    pub user_id: i64,
    #[serde(rename = "type")]
    pub item_type: String,
    pub title: String,
    pub content: Option<String>,
    pub status: Option<String>,
    pub sort_order: Option<i32>,
}

/// Body of the TODO create and update endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    #[serde(default)]
    pub user_id: i64,
    pub title: String,
    pub content: Option<String>,
    pub sort_order: Option<i32>,
    pub deadline: String,
    pub priority: String,
    pub progress_mode: Option<bool>,
    pub progress_total: Option<i32>,
    pub subtasks: Option<Vec<Subtask>>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressInput {
    pub current: i32,
    pub total: Option<i32>,
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: i64,
    items: BTreeMap<i64, Item>,
}

impl Store {
    fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn item_mut(&mut self, id: i64) -> Result<&mut Item, Rejection> {
        self.items.get_mut(&id).ok_or_else(|| Rejection::not_found("item"))
    }

    pub fn create_item(&mut self, input: NewItem) -> Item {
        let id = self.allocate();
        let stamp = now();
        let item = Item {
            id,
            user_id: input.user_id,
            item_type: input.item_type,
            title: input.title,
            content: input.content,
            status: input.status.unwrap_or_else(|| "active".to_string()),
            sort_order: input.sort_order.unwrap_or(0),
            created_at: stamp.clone(),
            updated_at: stamp,
            todo_item: None,
        };
        self.items.insert(id, item.clone());
        item
    }

    pub fn create_todo(&mut self, input: NewTodo) -> Item {
        let id = self.allocate();
        let stamp = now();
        let (progress_current, progress_total, subtasks) = match input.progress_mode {
            Some(true) => (Some(0), input.progress_total, None),
            Some(false) => (None, None, Some(input.subtasks.unwrap_or_default())),
            None => (None, None, None),
        };
        let item = Item {
            id,
            user_id: input.user_id,
            item_type: "TODO".to_string(),
            title: input.title,
            content: input.content,
            status: "active".to_string(),
            sort_order: input.sort_order.unwrap_or(0),
            created_at: stamp.clone(),
            updated_at: stamp,
            todo_item: Some(TodoItem {
                id,
                deadline: input.deadline,
                priority: input.priority,
                progress_mode: input.progress_mode,
                progress_current,
                progress_total,
                subtasks,
            }),
        };
        self.items.insert(id, item.clone());
        item.summary()
    }

    /// Items of one user ordered by `sortOrder`, narrowed by `keep`.
    pub fn list(&self, user_id: i64, keep: impl Fn(&Item) -> bool) -> Vec<Item> {
        let mut items: Vec<Item> = self
            .items
            .values()
            .filter(|item| item.user_id == user_id && keep(item))
            .map(Item::summary)
            .collect();
        items.sort_by_key(|item| item.sort_order);
        items
    }

    pub fn get(&self, id: i64) -> Option<Item> {
        self.items.get(&id).cloned()
    }

    pub fn update_item(&mut self, id: i64, input: NewItem) -> Result<Item, Rejection> {
        let item = self.item_mut(id)?;
        if input.user_id != 0 {
            item.user_id = input.user_id;
        }
        if input.item_type != "TODO" {
            item.todo_item = None;
        }
        item.item_type = input.item_type;
        item.title = input.title;
        item.content = input.content;
        if let Some(status) = input.status {
            item.status = status;
        }
        if let Some(sort_order) = input.sort_order {
            item.sort_order = sort_order;
        }
        item.touch();
        Ok(item.summary())
    }

    pub fn update_todo(&mut self, id: i64, input: NewTodo) -> Result<Item, Rejection> {
        let item = self.item_mut(id)?;
        item.todo_mut()?;
        item.title = input.title;
        item.content = input.content;
        if let Some(sort_order) = input.sort_order {
            item.sort_order = sort_order;
        }
        let todo = item.todo_mut()?;
        todo.deadline = input.deadline;
        todo.priority = input.priority;
        todo.progress_mode = input.progress_mode;
        if input.progress_total.is_some() {
            todo.progress_total = input.progress_total;
        }
        if input.subtasks.is_some() {
            todo.subtasks = input.subtasks;
        }
        item.sync_status();
        item.touch();
        Ok(item.clone())
    }

    pub fn toggle_status(&mut self, id: i64) -> Result<Item, Rejection> {
        let item = self.item_mut(id)?;
        item.status = if item.status == "active" { "completed" } else { "active" }.to_string();
        item.touch();
        Ok(item.summary())
    }

    pub fn delete(&mut self, id: i64) -> bool {
        self.items.remove(&id).is_some()
    }

    /// Run `change` against the TODO of `id`, then resync the item status.
    fn mutate_todo(
        &mut self,
        id: i64,
        change: impl FnOnce(&mut TodoItem) -> Result<(), Rejection>,
    ) -> Result<TodoItem, Rejection> {
        let item = self.item_mut(id)?;
        change(item.todo_mut()?)?;
        item.sync_status();
        item.touch();
        item.todo_mut().cloned()
    }

    pub fn increment_progress(&mut self, id: i64) -> Result<TodoItem, Rejection> {
        self.mutate_todo(id, |todo| {
            todo.require_progress_mode()?;
            let current = todo.progress_current.unwrap_or(0);
            if current < todo.progress_total.unwrap_or(0) {
                todo.progress_current = Some(current + 1);
            }
            Ok(())
        })
    }

    pub fn decrement_progress(&mut self, id: i64) -> Result<TodoItem, Rejection> {
        self.mutate_todo(id, |todo| {
            todo.require_progress_mode()?;
            let current = todo.progress_current.unwrap_or(0);
            if current > 0 {
                todo.progress_current = Some(current - 1);
            }
            Ok(())
        })
    }

    pub fn set_progress(&mut self, id: i64, input: ProgressInput) -> Result<TodoItem, Rejection> {
        self.mutate_todo(id, |todo| {
            todo.require_progress_mode()?;
            if input.total.is_some() {
                todo.progress_total = input.total;
            }
            let ceiling = todo.progress_total.unwrap_or(0).max(0);
            todo.progress_current = Some(input.current.clamp(0, ceiling));
            Ok(())
        })
    }

    pub fn toggle_subtask(&mut self, id: i64, index: usize) -> Result<TodoItem, Rejection> {
        self.mutate_todo(id, |todo| {
            let subtask = todo
                .checklist()?
                .get_mut(index)
                .ok_or_else(|| Rejection::bad_request("subtask index out of range"))?;
            subtask.completed = !subtask.completed;
            Ok(())
        })
    }

    pub fn add_subtask(&mut self, id: i64, text: String) -> Result<TodoItem, Rejection> {
        self.mutate_todo(id, |todo| {
            todo.checklist()?.push(Subtask { text, completed: false });
            Ok(())
        })
    }

    pub fn update_subtask(&mut self, id: i64, index: usize, text: String) -> Result<TodoItem, Rejection> {
        self.mutate_todo(id, |todo| {
            let subtask = todo
                .checklist()?
                .get_mut(index)
                .ok_or_else(|| Rejection::bad_request("subtask index out of range"))?;
            subtask.text = text;
            Ok(())
        })
    }

    pub fn delete_subtask(&mut self, id: i64, index: usize) -> Result<TodoItem, Rejection> {
        self.mutate_todo(id, |todo| {
            let subtasks = todo.checklist()?;
            if index >= subtasks.len() {
                return Err(Rejection::bad_request("subtask index out of range"));
            }
            subtasks.remove(index);
            Ok(())
        })
    }
}
