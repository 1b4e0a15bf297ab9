//! Typed API request wrapper.
//!
//! Composes category + endpoint into a full URL via the endpoint table and
//! URL resolver, attaches a bearer token when one is stored, and gates each
//! call on a cached liveness probe. A failed probe degrades to a warning,
//! never a refusal: the real request surfaces its own failure, and a
//! transient probe miss must not block legitimate traffic.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use ureq::Agent;

use crate::endpoints;
use crate::ports::{UrlResolver, api_path};
use crate::status::BackendStatus;

/// Liveness probe timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Error from client API operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Category/endpoint pair not present in the endpoint table, or an
    /// identifier-taking endpoint rendered without an identifier.
    #[error("unknown API endpoint: {category}.{endpoint}")]
    Endpoint {
        /// Requested category.
        category: String,
        /// Requested endpoint name.
        endpoint: String,
    },

    /// Network-level failure; no HTTP status was received (reported as
    /// status zero for callers that branch on codes).
    #[error("transport error (status 0)")]
    Transport(#[from] ureq::Error),

    /// Server answered with an error status.
    #[error("HTTP error: {status} - {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Token storage I/O error.
    #[error("token storage error")]
    TokenStore(#[from] std::io::Error),
}

/// Typed request wrapper over the endpoint table.
pub struct ApiClient {
    agent: Agent,
    resolver: UrlResolver,
    status: Mutex<BackendStatus>,
    token_path: Option<PathBuf>,
    check_backend: bool,
}

impl ApiClient {
    /// Create a client for a location.
    #[must_use]
    pub fn new(resolver: UrlResolver) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            resolver,
            status: Mutex::new(BackendStatus::default()),
            token_path: None,
            check_backend: true,
        }
    }

    /// Persist bearer tokens at the given file path.
    #[must_use]
    pub fn with_token_store(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = Some(path.into());
        self
    }

    /// Disable the pre-request liveness check.
    #[must_use]
    pub fn without_backend_check(mut self) -> Self {
        self.check_backend = false;
        self
    }

    /// The most recent liveness status.
    #[must_use]
    pub fn backend_status(&self) -> BackendStatus {
        self.lock_status().clone()
    }

    /// GET a table endpoint.
    pub fn get(
        &self,
        category: &str,
        endpoint: &str,
        id: Option<&str>,
    ) -> Result<serde_json::Value, ClientError> {
        self.request("GET", category, endpoint, id, None)
    }

    /// POST a JSON body to a table endpoint.
    pub fn post(
        &self,
        category: &str,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        self.request("POST", category, endpoint, None, Some(body))
    }

    /// PUT a JSON body to a table endpoint.
    pub fn put(
        &self,
        category: &str,
        endpoint: &str,
        id: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        self.request("PUT", category, endpoint, id, Some(body))
    }

    /// DELETE a table endpoint.
    pub fn delete(
        &self,
        category: &str,
        endpoint: &str,
        id: Option<&str>,
    ) -> Result<serde_json::Value, ClientError> {
        self.request("DELETE", category, endpoint, id, None)
    }

    /// Issue a request against a table endpoint.
    ///
    /// # Errors
    ///
    /// [`ClientError::Endpoint`] when the table has no such entry,
    /// [`ClientError::Transport`] on network failure, [`ClientError::Http`]
    /// for error statuses, [`ClientError::Json`] for undecodable bodies.
    pub fn request(
        &self,
        method: &str,
        category: &str,
        endpoint: &str,
        id: Option<&str>,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, ClientError> {
        let path = endpoints::lookup(category, endpoint)
            .and_then(|entry| entry.render(id))
            .ok_or_else(|| ClientError::Endpoint {
                category: category.to_owned(),
                endpoint: endpoint.to_owned(),
            })?;

        if self.check_backend {
            self.ensure_backend();
        }

        self.request_path(method, &path, body)
    }

    /// Issue a request against a table endpoint with query parameters.
    pub fn request_with_query(
        &self,
        method: &str,
        category: &str,
        endpoint: &str,
        id: Option<&str>,
        query: &[(&str, &str)],
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, ClientError> {
        let path = endpoints::lookup(category, endpoint)
            .and_then(|entry| entry.render(id))
            .ok_or_else(|| ClientError::Endpoint {
                category: category.to_owned(),
                endpoint: endpoint.to_owned(),
            })?;

        if self.check_backend {
            self.ensure_backend();
        }

        self.request_path(method, &with_query(&path, query), body)
    }

    /// Issue a request against a literal API path, bypassing the table.
    pub fn request_path(
        &self,
        method: &str,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.resolver.resource_url("api", &api_path(path));
        let token = self.auth_token();

        tracing::debug!(%method, %url, "API request");

        let response = match method {
            "GET" | "DELETE" => {
                let mut builder = if method == "GET" {
                    self.agent.get(&url)
                } else {
                    self.agent.delete(&url)
                };
                builder = builder.header("Accept", "application/json");
                if let Some(token) = &token {
                    builder = builder.header("Authorization", format!("Bearer {token}"));
                }
                builder.call()?
            }
            _ => {
                let mut builder = match method {
                    "PUT" => self.agent.put(&url),
                    "PATCH" => self.agent.patch(&url),
                    _ => self.agent.post(&url),
                };
                builder = builder
                    .header("Content-Type", "application/json")
                    .header("Accept", "application/json");
                if let Some(token) = &token {
                    builder = builder.header("Authorization", format!("Bearer {token}"));
                }
                match body {
                    Some(json) => builder.send_json(json)?,
                    None => builder.send_empty()?,
                }
            }
        };

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ClientError::Http {
                status,
                body: error_body,
            });
        }

        body_reader.read_json().map_err(decode_error)
    }

    /// Probe the built-in liveness endpoint and record the outcome.
    ///
    /// Returns whether the backend answered. The probe uses its own bounded
    /// timeout so a hung server cannot stall the caller indefinitely.
    pub fn verify_backend(&self) -> bool {
        let url = self.resolver.resource_url("api", "/api/test");

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(PROBE_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();

        let status = match agent.get(&url).call() {
            Ok(response) => {
                let code = response.status().as_u16();
                if (200..300).contains(&code) {
                    BackendStatus::connected(code)
                } else {
                    BackendStatus::disconnected(
                        Some(code),
                        format!("Backend answered with status {code}"),
                    )
                }
            }
            Err(err) => BackendStatus::disconnected(
                None,
                format!("Backend not reachable at {url}: {err}"),
            ),
        };

        let connected = status.connected;
        *self.lock_status() = status;
        connected
    }

    /// Re-probe a stale or disconnected backend before a request.
    ///
    /// Logs the outcome but never blocks the request: the network call that
    /// follows surfaces its own failure.
    fn ensure_backend(&self) {
        if self.lock_status().connected {
            return;
        }

        if self.verify_backend() {
            tracing::debug!("Backend connection verified");
        } else {
            let status = self.backend_status();
            tracing::warn!(
                message = %status.message,
                status_code = ?status.status_code,
                "Backend check failed, proceeding with request anyway"
            );
        }
    }

    /// Stored bearer token, if the token store holds one.
    #[must_use]
    pub fn auth_token(&self) -> Option<String> {
        let path = self.token_path.as_ref()?;
        let token = std::fs::read_to_string(path).ok()?;
        let token = token.trim();
        (!token.is_empty()).then(|| token.to_owned())
    }

    /// Store a bearer token, or clear it with `None`.
    pub fn set_auth_token(&self, token: Option<&str>) -> Result<(), ClientError> {
        let Some(path) = self.token_path.as_ref() else {
            return Ok(());
        };
        match token {
            Some(token) => std::fs::write(path, token)?,
            None => {
                if path.exists() {
                    std::fs::remove_file(path)?;
                }
            }
        }
        Ok(())
    }

    fn lock_status(&self) -> std::sync::MutexGuard<'_, BackendStatus> {
        self.status
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Characters percent-encoded in query components.
const QUERY_ENCODE: &percent_encoding::AsciiSet = &percent_encoding::CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'&')
    .add(b'+')
    .add(b'=')
    .add(b'?');

/// Classify a body-read failure: an undecodable payload is a JSON error,
/// anything else stays a transport fault.
fn decode_error(err: ureq::Error) -> ClientError {
    match err {
        ureq::Error::Json(err) => ClientError::Json(err),
        err => ClientError::Transport(err),
    }
}

/// Append encoded query parameters to a path.
fn with_query(path: &str, query: &[(&str, &str)]) -> String {
    if query.is_empty() {
        return path.to_owned();
    }
    let encoded: Vec<String> = query
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                percent_encoding::utf8_percent_encode(key, QUERY_ENCODE),
                percent_encoding::utf8_percent_encode(value, QUERY_ENCODE)
            )
        })
        .collect();
    format!("{path}?{}", encoded.join("&"))
}
