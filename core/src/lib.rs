//! Client core for the jot item service.
//!
//! # Overview
//! `ItemClient` builds `HttpRequest` values and parses `HttpResponse` values
//! for every item endpoint without touching the network (host-does-IO
//! pattern). `TodoOperations` layers the TODO view state on top: it executes
//! requests through a `Transport`, keeps normalized TODO details and
//! expand/collapse flags, and reloads an item after every change.
//!
//! # Design
//! - `ItemClient` is stateless; it holds only the base URL and user id.
//! - Every endpoint is split into `build_*` and `parse_*` so the I/O
//!   boundary stays explicit and testable.
//! - Server responses are duck-typed (nested vs. flattened TODO fields,
//!   string vs. array subtasks); `detail` is the one place that resolves it.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod detail;
pub mod error;
pub mod http;
pub mod todos;
pub mod transport;
pub mod types;

pub use client::ItemClient;
pub use config::ClientConfig;
pub use detail::{decode_subtasks, TodoDetail, TodoMode};
pub use error::{ApiError, ConfigError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use todos::{Notifier, TodoOperations, TracingNotifier};
pub use transport::{Transport, UreqTransport};
pub use types::{
    DeleteResponse, HabitFields, Item, ItemFilter, ItemStatus, ItemType, Priority, ReminderFields, Subtask,
    SubtaskDraft, TodoDraft, TodoEdit,
};
