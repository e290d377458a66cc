//! Executes `HttpRequest` values.
//!
//! `ItemClient` never touches the network; `TodoOperations` needs to, so it
//! goes through this trait. `UreqTransport` is the blocking implementation;
//! tests substitute scripted transports.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport {
    /// Perform one round-trip. Non-2xx statuses are returned as data; only
    /// failures that produced no response are errors (`ApiError::Transport`).
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        // Status interpretation belongs to the caller, so 4xx/5xx come back
        // as responses rather than `Err`.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = &self.agent;
        let path = request.path.as_str();
        let result = match (request.method, request.body) {
            (HttpMethod::Get, _) => agent.get(path).call(),
            (HttpMethod::Delete, _) => agent.delete(path).call(),
            (HttpMethod::Post, Some(body)) => {
                agent.post(path).content_type("application/json").send(body.as_bytes())
            }
            (HttpMethod::Post, None) => agent.post(path).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                agent.put(path).content_type("application/json").send(body.as_bytes())
            }
            (HttpMethod::Put, None) => agent.put(path).send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
