//! Normalization of a fetched item into the canonical TODO detail record.
//!
//! # Design
//! The backend may embed TODO fields under `todoItem` or flatten them onto
//! the item, and may send `subtasks` as a JSON-encoded string or as an array.
//! Both ambiguities are resolved here and nowhere else: [`TodoSource`] and
//! [`SubtaskEncoding`] name the shapes explicitly, and [`TodoDetail`] is the
//! only shape the rest of the crate sees.

use serde_json::{Map, Value};

use crate::types::{Item, ItemType, Priority, Subtask, SubtaskDraft, TodoDraft};

/// Which sub-model a TODO uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoMode {
    Plain,
    Progress,
    Subtasks,
}

/// A TODO item with its extension fields resolved and defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoDetail {
    pub item: Item,
    pub deadline: String,
    pub priority: Priority,
    pub progress_mode: Option<bool>,
    pub progress_current: i32,
    pub progress_total: Option<i32>,
    pub subtasks: Vec<Subtask>,
}

/// Where the TODO extension fields live in a server response.
enum TodoSource<'a> {
    Nested(&'a Map<String, Value>),
    Flattened(&'a Map<String, Value>),
    Missing,
}

impl<'a> TodoSource<'a> {
    fn locate(item: &'a Item) -> Self {
        match item.extra.get("todoItem") {
            Some(Value::Object(nested)) => TodoSource::Nested(nested),
            _ if item.extra.contains_key("deadline") => TodoSource::Flattened(&item.extra),
            _ => TodoSource::Missing,
        }
    }

    fn fields(&self) -> Option<&'a Map<String, Value>> {
        match *self {
            TodoSource::Nested(fields) | TodoSource::Flattened(fields) => Some(fields),
            TodoSource::Missing => None,
        }
    }
}

/// How a `subtasks` value arrived on the wire.
enum SubtaskEncoding<'a> {
    Encoded(&'a str),
    Structured(&'a [Value]),
    Absent,
}

impl<'a> SubtaskEncoding<'a> {
    fn classify(value: Option<&'a Value>) -> Self {
        match value {
            Some(Value::String(encoded)) => SubtaskEncoding::Encoded(encoded),
            Some(Value::Array(entries)) => SubtaskEncoding::Structured(entries),
            _ => SubtaskEncoding::Absent,
        }
    }
}

/// Decode a `subtasks` value in either wire encoding.
///
/// Malformed JSON and non-list values decode to nothing; this never fails.
/// Every list entry yields exactly one subtask (an unreadable entry becomes
/// an empty one) so indices match the server's.
pub fn decode_subtasks(value: Option<&Value>) -> Vec<Subtask> {
    match SubtaskEncoding::classify(value) {
        SubtaskEncoding::Encoded(encoded) => match serde_json::from_str::<Vec<Value>>(encoded) {
            Ok(entries) => decode_entries(&entries),
            Err(err) => {
                if !encoded.is_empty() {
                    tracing::trace!(error = %err, "discarding undecodable subtasks");
                }
                Vec::new()
            }
        },
        SubtaskEncoding::Structured(entries) => decode_entries(entries),
        SubtaskEncoding::Absent => Vec::new(),
    }
}

fn decode_entries(entries: &[Value]) -> Vec<Subtask> {
    entries
        .iter()
        .map(|entry| serde_json::from_value(entry.clone()).unwrap_or_default())
        .collect()
}

impl TodoDetail {
    /// Normalize a fetched item. Returns `None` unless it is a TODO.
    pub fn from_item(item: Item) -> Option<Self> {
        if item.item_type != ItemType::Todo {
            return None;
        }

        let fields = TodoSource::locate(&item).fields();
        let field = |key: &str| fields.and_then(|map| map.get(key));

        let deadline = field("deadline")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let priority = field("priority")
            .and_then(Value::as_str)
            .and_then(Priority::parse)
            .unwrap_or_default();
        let progress_mode = field("progressMode").and_then(Value::as_bool);
        let progress_current = field("progressCurrent")
            .and_then(Value::as_i64)
            .map_or(0, saturate);
        let progress_total = field("progressTotal").and_then(Value::as_i64).map(saturate);
        let subtasks = decode_subtasks(field("subtasks"));

        Some(Self {
            item,
            deadline,
            priority,
            progress_mode,
            progress_current,
            progress_total,
            subtasks,
        })
    }

    pub fn id(&self) -> Option<i64> {
        self.item.id
    }

    pub fn mode(&self) -> TodoMode {
        match self.progress_mode {
            None => TodoMode::Plain,
            Some(true) => TodoMode::Progress,
            Some(false) => TodoMode::Subtasks,
        }
    }

    /// The detail as an update payload for the TODO endpoint.
    pub fn to_draft(&self) -> TodoDraft {
        TodoDraft {
            title: self.item.title.clone(),
            content: self.item.content.clone(),
            sort_order: self.item.sort_order,
            deadline: self.deadline.clone(),
            priority: self.priority,
            progress_mode: self.progress_mode,
            progress_total: self.progress_total,
            subtasks: Some(self.subtasks.iter().map(SubtaskDraft::from).collect()),
        }
    }
}

fn saturate(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}
