//! API dispatch handler.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::extract::{Path, Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::envelope::ApiEnvelope;
use crate::state::AppState;

use super::ApiRequest;

/// Maximum accepted request body, in bytes.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Dispatch one `/api/{endpoint}` request through the handler registry.
///
/// `OPTIONS` is answered immediately with an empty 200 so preflights never
/// reach a handler; the CORS layers on the API router still decorate the
/// response.
pub(crate) async fn dispatch(
    State(state): State<Arc<AppState>>,
    Path(endpoint): Path<String>,
    request: Request<Body>,
) -> Response {
    let method = request.method().clone();
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    let query = request.uri().query().map(ToOwned::to_owned);
    let headers = request.headers().clone();

    let body = match to_bytes(request.into_body(), BODY_LIMIT).await {
        Ok(body) => body,
        Err(err) => {
            tracing::warn!(%endpoint, error = %err, "Failed to read request body");
            return ApiEnvelope::error("Failed to read request body")
                .with_endpoint(&endpoint)
                .with_method(method.as_str())
                .into_response_with(StatusCode::BAD_REQUEST);
        }
    };

    let api_request = ApiRequest {
        segments: endpoint.split('/').map(ToOwned::to_owned).collect(),
        endpoint,
        method,
        headers,
        query,
        body,
    };

    let Some(resolution) = state.registry.resolve(&api_request.endpoint) else {
        return built_in(&api_request);
    };

    tracing::debug!(
        endpoint = %api_request.endpoint,
        family = %resolution.family,
        policy = ?resolution.policy,
        "Dispatching API request"
    );

    match resolution.handle(&api_request) {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(
                endpoint = %api_request.endpoint,
                family = %resolution.family,
                error = %err,
                "Route handler failed"
            );
            ApiEnvelope::error("Internal server error")
                .with_message(err.to_string())
                .with_endpoint(&api_request.endpoint)
                .with_method(api_request.method.as_str())
                .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Endpoints answered without any registration: the `test`/`health`
/// liveness probe, and the 404 envelope for everything else.
fn built_in(request: &ApiRequest) -> Response {
    if request.endpoint == "test" || request.endpoint == "health" {
        return ApiEnvelope::ok("API connection test successful")
            .with_endpoint(&request.endpoint)
            .with_method(request.method.as_str())
            .with_data(serde_json::json!({
                "server": "portico",
                "version": env!("CARGO_PKG_VERSION"),
            }))
            .into_response_with(StatusCode::OK);
    }

    tracing::debug!(endpoint = %request.endpoint, "No route family for endpoint");
    ApiEnvelope::error("API endpoint not found")
        .with_endpoint(&request.endpoint)
        .with_method(request.method.as_str())
        .into_response_with(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::routing::any;
    use http_body_util::BodyExt;
    use portico_paths::Namespace;
    use tower::ServiceExt;

    use crate::cors::CorsState;
    use crate::routes::{HandlerError, HandlerRegistry, RouteHandler};

    use super::*;

    fn test_state(registry: HandlerRegistry) -> Arc<AppState> {
        Arc::new(AppState {
            namespace: Namespace::new(std::path::PathBuf::from(".")),
            registry,
            cors: CorsState::new("*").ok(),
        })
    }

    fn api_router(state: Arc<AppState>) -> Router {
        let cors = state.cors.clone().unwrap();
        Router::new()
            .route("/api/{*endpoint}", any(dispatch))
            .layer(cors.allow_origin_layer())
            .layer(cors.allow_methods_layer())
            .layer(cors.allow_headers_layer())
            .with_state(state)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_probe_answers_without_registration() {
        let app = api_router(test_state(HandlerRegistry::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        // Every API response carries the CORS headers, not just preflight.
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(
            headers["access-control-allow-methods"],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            headers["access-control-allow-headers"],
            "Content-Type, Authorization"
        );

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "API connection test successful");
        assert_eq!(json["endpoint"], "health");
        assert_eq!(json["method"], "GET");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_endpoint_gets_404_envelope() {
        let app = api_router(test_state(HandlerRegistry::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/unknown-thing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "API endpoint not found");
        assert_eq!(json["endpoint"], "unknown-thing");
    }

    #[tokio::test]
    async fn test_options_preflight_is_200_with_cors_headers() {
        let app = api_router(test_state(HandlerRegistry::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/anything")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(
            headers["access-control-allow-methods"],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            headers["access-control-allow-headers"],
            "Content-Type, Authorization"
        );
    }

    #[tokio::test]
    async fn test_handler_error_becomes_500_envelope() {
        struct Failing;
        impl RouteHandler for Failing {
            fn handle(&self, _request: &ApiRequest) -> Result<Response, HandlerError> {
                Err(HandlerError::new("database unreachable"))
            }
        }

        let mut registry = HandlerRegistry::new();
        registry.register_volatile("contact", || Failing);
        let app = api_router(test_state(registry));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/contact")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Internal server error");
        assert_eq!(json["message"], "database unreachable");
        assert_eq!(json["method"], "POST");
    }

    #[tokio::test]
    async fn test_handler_receives_query_and_body() {
        struct Echo;
        impl RouteHandler for Echo {
            fn handle(&self, request: &ApiRequest) -> Result<Response, HandlerError> {
                let body: serde_json::Value = request.json()?;
                Ok(ApiEnvelope::ok("echo")
                    .with_data(serde_json::json!({
                        "query": request.query,
                        "name": body["name"],
                        "segments": request.segments,
                    }))
                    .into_response_with(StatusCode::OK))
            }
        }

        let mut registry = HandlerRegistry::new();
        registry.register_volatile("users", || Echo);
        let app = api_router(test_state(registry));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/users/42?verbose=1")
                    .body(Body::from(r#"{"name":"ada"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["query"], "verbose=1");
        assert_eq!(json["data"]["name"], "ada");
        assert_eq!(json["data"]["segments"][0], "users");
        assert_eq!(json["data"]["segments"][1], "42");
    }
}
