//! Application state.
//!
//! Shared state for all request handlers.

use portico_paths::Namespace;

use crate::cors::CorsState;
use crate::routes::HandlerRegistry;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Resource namespace built once from the process root.
    pub(crate) namespace: Namespace,
    /// Route families registered at startup.
    pub(crate) registry: HandlerRegistry,
    /// CORS headers for API responses (`None` disables them).
    pub(crate) cors: Option<CorsState>,
}
