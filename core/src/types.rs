//! Domain DTOs for the item API.
//!
//! # Design
//! These types mirror the backend's JSON schema (camelCase keys) but are
//! defined independently from the mock-server crate; integration tests catch
//! schema drift between the two.
//!
//! `Item` keeps every type-specific field it does not model in `extra`,
//! because the backend is free to nest TODO fields under `todoItem` or
//! flatten them onto the item. Turning that into one canonical shape is the
//! job of [`crate::detail::TodoDetail`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemType {
    Todo,
    Habit,
    Reminder,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Todo => "TODO",
            ItemType::Habit => "HABIT",
            ItemType::Reminder => "REMINDER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Active,
    Completed,
    Deleted,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Active => "active",
            ItemStatus::Completed => "completed",
            ItemStatus::Deleted => "deleted",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Parse the wire token, returning `None` for anything unrecognised.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// Narrows a user listing to one type or one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFilter {
    Type(ItemType),
    Status(ItemStatus),
}

/// One entry of a TODO's checklist. Its position in the list is the index
/// used by the toggle and delete endpoints.
///
/// Missing or null fields decode to their defaults so that no entry is ever
/// dropped and positions stay aligned with the server's list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A subtask as entered by the user, before `completed` is defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskDraft {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl SubtaskDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: None,
        }
    }

    pub(crate) fn to_subtask(&self) -> Subtask {
        Subtask {
            text: self.text.clone(),
            completed: self.completed.unwrap_or(false),
        }
    }
}

impl From<&Subtask> for SubtaskDraft {
    fn from(subtask: &Subtask) -> Self {
        Self {
            text: subtask.text.clone(),
            completed: Some(subtask.completed),
        }
    }
}

/// An item as stored by the backend.
///
/// `id` is absent until the server assigns one. `extra` holds whatever
/// type-specific data came with the item (`todoItem`, `habitItem`,
/// flattened TODO fields, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: i64,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    pub fn new(item_type: ItemType, title: impl Into<String>) -> Self {
        Self {
            id: None,
            user_id: 0,
            item_type,
            title: title.into(),
            content: None,
            status: None,
            sort_order: None,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    /// HABIT extension fields, when the server embedded them.
    pub fn habit_fields(&self) -> Option<HabitFields> {
        self.nested("habitItem")
    }

    /// REMINDER extension fields, when the server embedded them.
    pub fn reminder_fields(&self) -> Option<ReminderFields> {
        self.nested("reminderItem")
    }

    fn nested<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.extra.get(key) {
            Some(value @ Value::Object(_)) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        }
    }
}

/// Placeholder shape for HABIT items; nothing in this crate populates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitFields {
    pub repeat_rule: Option<String>,
    pub streak_days: Option<i32>,
    pub target_days: Option<i32>,
    pub last_check_date: Option<String>,
    pub check_history: Option<String>,
}

/// Placeholder shape for REMINDER items; nothing in this crate populates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderFields {
    pub remind_time: Option<String>,
    pub repeat_type: Option<String>,
    pub advance_minutes: Option<i32>,
    pub notified: Option<bool>,
    pub next_remind_time: Option<String>,
}

/// Caller-side description of a TODO for the create and update endpoints.
///
/// `progress_mode`: `None` is a plain TODO, `Some(true)` a progress counter,
/// `Some(false)` a subtask checklist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoDraft {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    pub deadline: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub progress_mode: Option<bool>,
    #[serde(default)]
    pub progress_total: Option<i32>,
    #[serde(default)]
    pub subtasks: Option<Vec<SubtaskDraft>>,
}

/// Field edits accepted by `TodoOperations::update_todo_item`. A `None`
/// content keeps the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoEdit {
    pub title: String,
    pub content: Option<String>,
    pub priority: Priority,
    pub deadline: String,
}

/// Body returned by the delete endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
