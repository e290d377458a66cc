//! Error types for the item API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the item does not exist" from "the server returned an unexpected status."
//! All other non-2xx responses land in `HttpError` with the raw status code
//! and body. `Rejected` carries the already-unwrapped, human-readable message
//! produced by the subtask-add path.

use thiserror::Error;

/// Errors returned by `ItemClient` parse methods, transports and the
/// `TodoOperations` coordinator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced an HTTP response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server refused an operation; the message is meant for the user.
    #[error("{0}")]
    Rejected(String),
}

/// Errors raised while loading a `ClientConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
