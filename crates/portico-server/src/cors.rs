//! CORS headers for API responses.
//!
//! The three response headers are applied to every `/api` response via
//! `tower_http::set_header` layers, so they are present before any dispatch
//! branch runs — including the `OPTIONS` preflight short-circuit.

use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::error::ServerError;

/// Methods advertised to preflight requests.
const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Request headers accepted from cross-origin callers.
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Validated CORS configuration.
#[derive(Clone, Debug)]
pub(crate) struct CorsState {
    origin: HeaderValue,
    /// Credentials are only allowed for a concrete origin, never `*`.
    allow_credentials: bool,
}

impl CorsState {
    /// Validate the configured origin into a header value.
    pub(crate) fn new(origin: &str) -> Result<Self, ServerError> {
        let value = HeaderValue::from_str(origin)
            .map_err(|_| ServerError::InvalidCorsOrigin(origin.to_owned()))?;
        Ok(Self {
            origin: value,
            allow_credentials: origin != "*",
        })
    }

    /// Layer that adds Access-Control-Allow-Origin.
    pub(crate) fn allow_origin_layer(&self) -> SetResponseHeaderLayer<HeaderValue> {
        SetResponseHeaderLayer::overriding(
            HeaderName::from_static("access-control-allow-origin"),
            self.origin.clone(),
        )
    }

    /// Layer that adds Access-Control-Allow-Methods.
    pub(crate) fn allow_methods_layer(&self) -> SetResponseHeaderLayer<HeaderValue> {
        SetResponseHeaderLayer::overriding(
            HeaderName::from_static("access-control-allow-methods"),
            HeaderValue::from_static(ALLOW_METHODS),
        )
    }

    /// Layer that adds Access-Control-Allow-Headers.
    pub(crate) fn allow_headers_layer(&self) -> SetResponseHeaderLayer<HeaderValue> {
        SetResponseHeaderLayer::overriding(
            HeaderName::from_static("access-control-allow-headers"),
            HeaderValue::from_static(ALLOW_HEADERS),
        )
    }

    /// Layer that adds Access-Control-Allow-Credentials for concrete origins.
    pub(crate) fn allow_credentials_layer(&self) -> Option<SetResponseHeaderLayer<HeaderValue>> {
        self.allow_credentials.then(|| {
            SetResponseHeaderLayer::overriding(
                HeaderName::from_static("access-control-allow-credentials"),
                HeaderValue::from_static("true"),
            )
        })
    }
}
