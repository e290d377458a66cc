//! Client configuration: where the backend lives and who the user is.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Settings shared by `ItemClient` and `TodoOperations`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Injected into listing paths and creation payloads.
    pub user_id: i64,
    /// Absolute URL template for adding a subtask; `{id}` is replaced with
    /// the item id. Derived from `base_url` when unset.
    pub subtask_endpoint: Option<String>,
    pub empty_reply_reload_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_id: 1,
            subtask_endpoint: None,
            empty_reply_reload_delay_ms: 300,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str, user_id: i64) -> Self {
        Self {
            base_url: base_url.to_string(),
            user_id,
            ..Self::default()
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// The add-subtask URL for `id`.
    pub fn subtask_url(&self, id: i64) -> String {
        match &self.subtask_endpoint {
            Some(template) => template.replace("{id}", &id.to_string()),
            None => format!("{}/api/item/{id}/subtask", self.base_url.trim_end_matches('/')),
        }
    }

    pub fn empty_reply_reload_delay(&self) -> Duration {
        Duration::from_millis(self.empty_reply_reload_delay_ms)
    }
}
