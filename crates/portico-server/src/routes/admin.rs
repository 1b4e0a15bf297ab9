//! Administrative route family.
//!
//! The one sticky family: registered once and held for the process
//! lifetime, because its in-memory session table must survive across
//! requests. All `admin/*` sub-paths route through this single handler.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use axum::http::{StatusCode, header};
use axum::response::Response;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::envelope::ApiEnvelope;

use super::{ApiRequest, HandlerError, RouteHandler};

/// Session lifetime.
const SESSION_HOURS: i64 = 24;

/// One live administrative session.
#[derive(Debug, Clone, Serialize)]
struct Session {
    username: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Sticky handler for the `admin` family.
///
/// Register with [`HandlerRegistry::register_sticky`] behind an `Arc`; a
/// volatile registration would discard the session table on every request.
///
/// [`HandlerRegistry::register_sticky`]: super::HandlerRegistry::register_sticky
#[derive(Debug, Default)]
pub struct AdminHandler {
    sessions: Mutex<HashMap<String, Session>>,
}

impl AdminHandler {
    /// Create a handler with an empty session table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn login(&self, request: &ApiRequest) -> Result<Response, HandlerError> {
        #[derive(serde::Deserialize)]
        struct LoginBody {
            username: String,
        }

        let body: LoginBody = request.json()?;
        if body.username.trim().is_empty() {
            return Ok(ApiEnvelope::error("Username is required")
                .into_response_with(StatusCode::BAD_REQUEST));
        }

        let session_id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let session = Session {
            username: body.username,
            created_at: now,
            expires_at: now + Duration::hours(SESSION_HOURS),
        };

        let expires_at = session.expires_at;
        self.lock().insert(session_id.clone(), session);
        tracing::info!(session = %session_id, "Administrative session created");

        Ok(ApiEnvelope::ok("Login successful")
            .with_data(serde_json::json!({
                "sessionId": session_id,
                "expiresAt": expires_at.to_rfc3339(),
            }))
            .into_response_with(StatusCode::OK))
    }

    /// Logout is idempotent: an unknown or missing session still succeeds.
    fn logout(&self, request: &ApiRequest) -> Response {
        if let Some(session_id) = bearer_token(request)
            && self.lock().remove(&session_id).is_some()
        {
            tracing::info!(session = %session_id, "Administrative session ended");
        }
        ApiEnvelope::ok("Logout successful").into_response_with(StatusCode::OK)
    }

    fn status(&self) -> Response {
        let active = self.prune_expired();
        ApiEnvelope::ok("Admin API is online")
            .with_data(serde_json::json!({ "activeSessions": active }))
            .into_response_with(StatusCode::OK)
    }

    fn sessions(&self) -> Response {
        self.prune_expired();
        let sessions: Vec<serde_json::Value> = self
            .lock()
            .iter()
            .map(|(id, session)| {
                serde_json::json!({
                    "sessionId": id,
                    "username": session.username,
                    "createdAt": session.created_at.to_rfc3339(),
                    "expiresAt": session.expires_at.to_rfc3339(),
                })
            })
            .collect();
        ApiEnvelope::ok("Active sessions")
            .with_data(serde_json::json!({ "sessions": sessions }))
            .into_response_with(StatusCode::OK)
    }

    /// Drop expired sessions, returning the count that remain.
    fn prune_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.lock();
        sessions.retain(|_, session| session.expires_at > now);
        sessions.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RouteHandler for AdminHandler {
    fn handle(&self, request: &ApiRequest) -> Result<Response, HandlerError> {
        // Sub-endpoint after the family name ("admin/login" -> "login").
        let action = request.segments.get(1).map_or("", String::as_str);

        match (request.method.as_str(), action) {
            ("POST", "login") => self.login(request),
            ("POST", "logout") => Ok(self.logout(request)),
            ("GET", "" | "status") => Ok(self.status()),
            ("GET", "sessions") => Ok(self.sessions()),
            _ => Ok(ApiEnvelope::error("Unknown admin endpoint")
                .with_endpoint(&request.endpoint)
                .with_method(request.method.as_str())
                .into_response_with(StatusCode::NOT_FOUND)),
        }
    }
}

/// Extract a bearer token from the Authorization header.
fn bearer_token(request: &ApiRequest) -> Option<String> {
    let value = request.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_owned())
}

#[cfg(test)]
mod tests {
    use axum::body::Bytes;
    use axum::http::{HeaderMap, Method};
    use http_body_util::BodyExt;

    use super::*;

    fn request(method: Method, endpoint: &str, body: &str) -> ApiRequest {
        ApiRequest {
            endpoint: endpoint.to_owned(),
            segments: endpoint.split('/').map(ToOwned::to_owned).collect(),
            method,
            headers: HeaderMap::new(),
            query: None,
            body: Bytes::from(body.to_owned()),
        }
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_login_creates_session_visible_to_next_request() {
        let handler = AdminHandler::new();

        let login = handler
            .handle(&request(
                Method::POST,
                "admin/login",
                r#"{"username":"root"}"#,
            ))
            .unwrap();
        assert_eq!(login.status(), StatusCode::OK);
        let login_json = json_body(login).await;
        assert_eq!(login_json["success"], true);
        assert!(login_json["data"]["sessionId"].is_string());

        // Second request against the same instance observes the session.
        let status = handler
            .handle(&request(Method::GET, "admin/status", ""))
            .unwrap();
        let status_json = json_body(status).await;
        assert_eq!(status_json["data"]["activeSessions"], 1);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let handler = AdminHandler::new();

        let first = handler
            .handle(&request(Method::POST, "admin/logout", ""))
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = handler
            .handle(&request(Method::POST, "admin/logout", ""))
            .unwrap();
        assert_eq!(second.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_logout_removes_session() {
        let handler = AdminHandler::new();

        let login = handler
            .handle(&request(
                Method::POST,
                "admin/login",
                r#"{"username":"root"}"#,
            ))
            .unwrap();
        let session_id = json_body(login).await["data"]["sessionId"]
            .as_str()
            .unwrap()
            .to_owned();

        let mut logout = request(Method::POST, "admin/logout", "");
        logout.headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {session_id}").parse().unwrap(),
        );
        handler.handle(&logout).unwrap();

        let status = handler
            .handle(&request(Method::GET, "admin/status", ""))
            .unwrap();
        assert_eq!(json_body(status).await["data"]["activeSessions"], 0);
    }

    #[tokio::test]
    async fn test_login_without_username_is_rejected() {
        let handler = AdminHandler::new();
        let response = handler
            .handle(&request(Method::POST, "admin/login", r#"{"username":""}"#))
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_admin_action_is_404_envelope() {
        let handler = AdminHandler::new();
        let response = handler
            .handle(&request(Method::DELETE, "admin/everything", ""))
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["endpoint"], "admin/everything");
    }
}
