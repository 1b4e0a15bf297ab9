//! JSON response envelope for API endpoints.
//!
//! Every API response uses the same shape:
//! `{ success, message | error, data?, endpoint?, method?, timestamp }`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;

/// Consistent JSON body for API responses.
#[derive(Debug, Serialize)]
pub struct ApiEnvelope {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable message (success responses).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error summary (failure responses).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Endpoint string the request addressed (diagnostics).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Request method (diagnostics).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Payload data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// RFC 3339 timestamp of the response.
    pub timestamp: String,
}

impl ApiEnvelope {
    /// Successful envelope with a message.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
            endpoint: None,
            method: None,
            data: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Failure envelope with an error summary.
    #[must_use]
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            endpoint: None,
            method: None,
            data: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Attach the addressed endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Attach the request method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Attach a detail message (usable on failures too).
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach payload data.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Turn the envelope into a JSON response with the given status.
    #[must_use]
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}
