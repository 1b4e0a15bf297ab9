//! Router construction.
//!
//! Builds the axum router: entry document at `/`, API dispatch under
//! `/api/`, static resolution for everything else.

use std::sync::Arc;

use axum::Router;
use axum::routing::{any, get};
use tower_http::trace::TraceLayer;

use crate::routes;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    // API routes. The CORS layers sit on this sub-router only, so they
    // decorate every dispatch branch including the OPTIONS short-circuit.
    let mut api_routes = Router::new().route("/api/{*endpoint}", any(routes::dispatch));

    if let Some(cors) = &state.cors {
        api_routes = api_routes
            .layer(cors.allow_origin_layer())
            .layer(cors.allow_methods_layer())
            .layer(cors.allow_headers_layer());
        if let Some(credentials) = cors.allow_credentials_layer() {
            api_routes = api_routes.layer(credentials);
        }
    }

    Router::new()
        .route("/", get(static_files::serve_entry))
        .merge(api_routes)
        .fallback(static_files::serve_static)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
