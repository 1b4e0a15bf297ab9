//! API route dispatch.
//!
//! # Data Flow
//! ```text
//! /api/<endpoint>
//!     → dispatch.rs (CORS, OPTIONS short-circuit, prefix strip)
//!     → registry.rs (admin-family → exact → parent-segment lookup)
//!     → RouteHandler::handle, or built-in test/health, or 404 envelope
//! ```
//!
//! # Design Decisions
//! - Handler families are registered at startup; no load-from-disk at
//!   request time. Sticky families keep one instance for the process
//!   lifetime; volatile families are reconstructed per request.
//! - The administrative family is consulted before exact matching. This can
//!   shadow an endpoint whose name merely starts with the family name; the
//!   precedence is intentional and pinned by tests.
//! - A single `RouteHandler` trait is the calling convention; handlers own
//!   their full response.

mod admin;
mod dispatch;
mod registry;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use axum::response::Response;

pub use admin::AdminHandler;
pub(crate) use dispatch::dispatch;
pub use registry::{CachePolicy, HandlerRegistry};

/// Request handed to a route handler.
#[derive(Debug)]
pub struct ApiRequest {
    /// Endpoint string with the `/api/` prefix stripped (e.g. `admin/login`).
    pub endpoint: String,
    /// Endpoint split on `/`.
    pub segments: Vec<String>,
    /// Request method.
    pub method: Method,
    /// Request headers.
    pub headers: HeaderMap,
    /// Raw query string, if any.
    pub query: Option<String>,
    /// Request body.
    pub body: Bytes,
}

impl ApiRequest {
    /// Parse the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`HandlerError`] carrying the parse failure.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| HandlerError::new(format!("Invalid JSON body: {e}")))
    }
}

/// Error raised by a route handler.
///
/// Dispatch reports it as a 500 envelope carrying this message; it never
/// crashes the front door.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Create a handler error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Calling convention for every route family.
///
/// The handler is fully responsible for status, headers, and body of its
/// response; dispatch adds nothing beyond the CORS layers.
pub trait RouteHandler: Send + Sync {
    /// Handle one API request.
    ///
    /// # Errors
    ///
    /// Returns a [`HandlerError`] for faults the handler cannot turn into a
    /// response itself; dispatch converts it to a 500 envelope.
    fn handle(&self, request: &ApiRequest) -> Result<Response, HandlerError>;
}
