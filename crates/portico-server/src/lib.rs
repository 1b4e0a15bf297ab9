//! HTTP front door and request dispatch for the Portico content server.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - API endpoints dispatched through an explicit handler registry
//! - Static assets and HTML pages resolved by a multi-directory fallback search
//! - A fixed entry document for the root path
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use portico_server::{HandlerRegistry, ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         host: "0.0.0.0".to_owned(),
//!         port: 8000,
//!         root: PathBuf::from("."),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config, HandlerRegistry::new()).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Request ──► axum front door (portico-server)
//!                  │
//!                  ├─► "/"          entry document (probe order bypassed)
//!                  │
//!                  ├─► "/api/*"     dispatch ──► HandlerRegistry
//!                  │                  (admin-family → exact → parent,
//!                  │                   built-in test/health, 404 envelope)
//!                  │
//!                  └─► everything else ──► static resolver
//!                        (asset tree ⇄ page tree precedence, root fallback)
//! ```

mod app;
mod cors;
mod error;
mod state;
mod static_files;

pub mod envelope;
pub mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use portico_paths::Namespace;

pub use crate::error::ServerError;
pub use crate::routes::{
    AdminHandler, ApiRequest, HandlerError, HandlerRegistry, RouteHandler,
};
use crate::state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Process root the resource namespace is built from.
    pub root: PathBuf,
    /// Emit CORS headers on API responses.
    pub cors_enabled: bool,
    /// Allowed CORS origin (`*` or a single origin).
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8000,
            root: PathBuf::from("."),
            cors_enabled: true,
            cors_origin: "*".to_owned(),
        }
    }
}

/// Run the server.
///
/// The registry holds every route family the server will dispatch to; an
/// empty registry still serves static files and the built-in `test`/`health`
/// endpoints.
///
/// # Errors
///
/// Returns an error if the bind address is invalid, the CORS origin is not a
/// legal header value, or the listener fails to bind.
pub async fn run_server(
    config: ServerConfig,
    registry: HandlerRegistry,
) -> Result<(), ServerError> {
    let namespace = Namespace::new(config.root.clone());

    let cors = if config.cors_enabled {
        Some(cors::CorsState::new(&config.cors_origin)?)
    } else {
        None
    };

    let state = Arc::new(AppState {
        namespace,
        registry,
        cors,
    });

    let app = app::create_router(state);

    let address = format!("{}:{}", config.host, config.port);
    let addr = SocketAddr::from_str(&address)
        .map_err(|_| ServerError::InvalidAddress(address.clone()))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { address, source })?;

    tracing::info!(address = %addr, root = %config.root.display(), "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from Portico config.
///
/// # Arguments
///
/// * `config` - Portico configuration
#[must_use]
pub fn server_config_from_config(config: &portico_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        root: config.content_resolved.root.clone(),
        cors_enabled: config.cors.enabled,
        cors_origin: config.cors.origin.clone(),
    }
}
