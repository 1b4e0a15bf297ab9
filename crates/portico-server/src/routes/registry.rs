//! Handler registry and three-tier endpoint resolution.
//!
//! The registry replaces on-disk handler lookup with an explicit mapping
//! from route family to handler, populated at startup. Resolution order for
//! an endpoint like `admin/login`:
//!
//! 1. Administrative family shortcut: an endpoint beginning with the
//!    designated administrative family name resolves to that family's
//!    handler no matter how many segments follow.
//! 2. Exact match on the full endpoint string.
//! 3. Parent match on the first segment, when there is more than one.

use std::collections::HashMap;
use std::sync::Arc;

use axum::response::Response;

use super::{ApiRequest, HandlerError, RouteHandler};

/// Default administrative family name.
const DEFAULT_ADMIN_FAMILY: &str = "admin";

/// Retention policy for a registered family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// One instance for the process lifetime; the handler owns long-lived
    /// state (e.g. a session table) that must survive across requests.
    Sticky,
    /// A fresh instance per request; the handler is stateless and safe to
    /// reconstruct, the registry equivalent of reload-on-every-request.
    Volatile,
}

/// Factory for volatile handler instances.
type HandlerFactory = Box<dyn Fn() -> Box<dyn RouteHandler> + Send + Sync>;

/// How a family was registered.
enum Registration {
    Sticky(Arc<dyn RouteHandler>),
    Volatile(HandlerFactory),
}

/// A handler instance resolved for one request.
pub struct Resolution {
    /// Registry key that matched (family or full endpoint).
    pub family: String,
    /// Policy the family was registered under.
    pub policy: CachePolicy,
    instance: Instance,
}

enum Instance {
    Shared(Arc<dyn RouteHandler>),
    Owned(Box<dyn RouteHandler>),
}

impl Resolution {
    /// Invoke the resolved handler.
    ///
    /// # Errors
    ///
    /// Propagates the handler's [`HandlerError`].
    pub fn handle(&self, request: &ApiRequest) -> Result<Response, HandlerError> {
        match &self.instance {
            Instance::Shared(handler) => handler.handle(request),
            Instance::Owned(handler) => handler.handle(request),
        }
    }
}

/// Mapping from route family to handler, immutable after startup.
pub struct HandlerRegistry {
    admin_family: String,
    families: HashMap<String, Registration>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry {
    /// Create an empty registry with the default administrative family.
    #[must_use]
    pub fn new() -> Self {
        Self::with_admin_family(DEFAULT_ADMIN_FAMILY)
    }

    /// Create an empty registry with a custom administrative family name.
    #[must_use]
    pub fn with_admin_family(admin_family: impl Into<String>) -> Self {
        Self {
            admin_family: admin_family.into(),
            families: HashMap::new(),
        }
    }

    /// The designated administrative family name.
    #[must_use]
    pub fn admin_family(&self) -> &str {
        &self.admin_family
    }

    /// Register a sticky family: one instance retained for the process
    /// lifetime.
    pub fn register_sticky(
        &mut self,
        family: impl Into<String>,
        handler: Arc<dyn RouteHandler>,
    ) {
        self.families
            .insert(family.into(), Registration::Sticky(handler));
    }

    /// Register a volatile family: the factory runs once per request.
    pub fn register_volatile<H, F>(&mut self, family: impl Into<String>, factory: F)
    where
        H: RouteHandler + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.families.insert(
            family.into(),
            Registration::Volatile(Box::new(move || Box::new(factory()))),
        );
    }

    /// Whether any family is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Resolve an endpoint string to a handler instance, applying the
    /// three-tier fallback. Returns `None` when no registered family
    /// answers the endpoint.
    #[must_use]
    pub fn resolve(&self, endpoint: &str) -> Option<Resolution> {
        // Tier 1: administrative family shortcut. A plain prefix test on
        // purpose — `adminanything` routes to the administrative handler
        // when one is registered.
        if endpoint.starts_with(&self.admin_family)
            && let Some(resolution) = self.instantiate(&self.admin_family)
        {
            return Some(resolution);
        }

        // Tier 2: exact match on the full endpoint string.
        if let Some(resolution) = self.instantiate(endpoint) {
            return Some(resolution);
        }

        // Tier 3: parent match on the first segment.
        let mut segments = endpoint.split('/');
        let first = segments.next().unwrap_or(endpoint);
        if segments.next().is_some()
            && let Some(resolution) = self.instantiate(first)
        {
            return Some(resolution);
        }

        None
    }

    /// Instantiate the handler for an exactly-named family, if registered.
    fn instantiate(&self, family: &str) -> Option<Resolution> {
        let registration = self.families.get(family)?;
        let (policy, instance) = match registration {
            Registration::Sticky(handler) => {
                (CachePolicy::Sticky, Instance::Shared(Arc::clone(handler)))
            }
            Registration::Volatile(factory) => {
                (CachePolicy::Volatile, Instance::Owned(factory()))
            }
        };
        Some(Resolution {
            family: family.to_owned(),
            policy,
            instance,
        })
    }
}
