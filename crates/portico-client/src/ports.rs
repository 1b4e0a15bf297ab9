//! Port and base-URL derivation.
//!
//! The consuming side reconstructs `base_url(category)` and
//! `resource_url(category, path)` deterministically, without a server round
//! trip, so no caller ever hardcodes a host or port.

use std::collections::HashMap;

/// Default server port when the location provides none.
pub const DEFAULT_PORT: u16 = 8000;

/// Environment variable overriding the base URL outside a browsing context.
pub const BASE_URL_ENV: &str = "PORTICO_BASE_URL";

/// Fixed port assignments per logical category.
///
/// All public categories share the server port; the reserved block names
/// sidecar services that never answer HTTP content requests.
#[derive(Debug, Clone)]
pub struct PortMap {
    server: u16,
    reserved: HashMap<&'static str, u16>,
}

impl Default for PortMap {
    fn default() -> Self {
        Self::new(DEFAULT_PORT)
    }
}

impl PortMap {
    /// Build a port map around one server port.
    #[must_use]
    pub fn new(server: u16) -> Self {
        Self {
            server,
            reserved: HashMap::from([
                ("websocket", 8001),
                ("database", 8002),
                ("redis", 8003),
                ("elasticsearch", 8004),
            ]),
        }
    }

    /// Port for a logical category. Unknown categories get the server port.
    #[must_use]
    pub fn port(&self, category: &str) -> u16 {
        match category {
            "server" | "api" | "frontend" | "backend" | "shared" => self.server,
            other => self.reserved.get(other).copied().unwrap_or(self.server),
        }
    }

    /// Port for a reserved sidecar service, if one is named.
    #[must_use]
    pub fn reserved(&self, service: &str) -> Option<u16> {
        self.reserved.get(service).copied()
    }
}

/// Where the mirror is running, as far as URL derivation cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Inside a browsing context: reuse the document's own protocol,
    /// hostname, and (optional) port.
    Document {
        /// `http` or `https`.
        protocol: String,
        /// Document hostname.
        hostname: String,
        /// Document port; `None` falls back to the fixed default.
        port: Option<u16>,
    },
    /// Outside a browsing context (scripts, tests, tooling).
    Standalone,
}

/// Deterministic URL derivation for one location.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    location: Location,
    ports: PortMap,
}

impl UrlResolver {
    /// Build a resolver for a location.
    #[must_use]
    pub fn new(location: Location) -> Self {
        let ports = match &location {
            Location::Document {
                port: Some(port), ..
            } => PortMap::new(*port),
            _ => PortMap::default(),
        };
        Self { location, ports }
    }

    /// The port map in effect.
    #[must_use]
    pub fn ports(&self) -> &PortMap {
        &self.ports
    }

    /// Base URL for a category.
    ///
    /// Under `https` the base URL is empty: requests stay origin-relative
    /// and travel through the fronting reverse proxy rather than a direct
    /// port. Standalone locations honor the [`BASE_URL_ENV`] override and
    /// otherwise default to localhost on the fixed port.
    #[must_use]
    pub fn base_url(&self, category: &str) -> String {
        match &self.location {
            Location::Document {
                protocol, hostname, ..
            } => {
                if protocol == "https" {
                    return String::new();
                }
                format!("{protocol}://{hostname}:{}", self.ports.port(category))
            }
            Location::Standalone => std::env::var(BASE_URL_ENV).unwrap_or_else(|_| {
                format!("http://localhost:{}", self.ports.port(category))
            }),
        }
    }

    /// Full URL for a resource path within a category.
    #[must_use]
    pub fn resource_url(&self, category: &str, path: &str) -> String {
        let base = self.base_url(category);
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

/// Client-side namespace: logical categories mapped to URL path prefixes.
///
/// Mirrors the server's resource namespace in URL space, so callers build
/// `/components/nav.html` style paths from a category name instead of
/// hand-written prefixes.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlMap;

impl UrlMap {
    /// URL prefix for a logical category. Unknown categories map to the
    /// site root.
    #[must_use]
    pub fn prefix(self, category: &str) -> &'static str {
        match category {
            "pages" => "/pages",
            "components" => "/components",
            "assets" => "/assets",
            "services" => "/services",
            "api" => "/api",
            _ => "",
        }
    }

    /// Absolute URL path for a resource within a category.
    #[must_use]
    pub fn path(self, category: &str, rest: &str) -> String {
        let prefix = self.prefix(category);
        if rest.starts_with('/') {
            format!("{prefix}{rest}")
        } else {
            format!("{prefix}/{rest}")
        }
    }

    /// Normalize an endpoint string to an absolute `/api/...` path.
    #[must_use]
    pub fn api(self, endpoint: &str) -> String {
        api_path(endpoint)
    }
}

/// Normalize an endpoint string to an absolute `/api/...` path.
#[must_use]
pub fn api_path(endpoint: &str) -> String {
    if endpoint.starts_with("/api/") {
        endpoint.to_owned()
    } else if endpoint.starts_with("api/") {
        format!("/{endpoint}")
    } else if endpoint.starts_with('/') {
        format!("/api{endpoint}")
    } else {
        format!("/api/{endpoint}")
    }
}
