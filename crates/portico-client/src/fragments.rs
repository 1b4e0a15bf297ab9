//! Component fragment fetch/cache layer.
//!
//! Fragments are HTML bodies fetched by logical name through the URL
//! resolver, at most once per name. Injection marks the target with the
//! loaded name; re-injecting the same name into the same target is a no-op,
//! so duplicate loads are prevented by marking, not by cancelling fetches.

use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use ureq::Agent;

use crate::api::ClientError;
use crate::ports::{UrlMap, UrlResolver};

/// Embedded script elements stripped at injection time.
static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap());

/// How many error-body bytes appear in diagnostics.
const BODY_PREVIEW: usize = 200;

/// Source of fragment bodies by logical name.
pub trait FragmentSource {
    /// Fetch the raw fragment body.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] for network or HTTP failures.
    fn fetch(&self, name: &str) -> Result<String, ClientError>;
}

/// HTTP-backed fragment source resolving `/components/{name}.html`.
pub struct HttpFragmentSource {
    agent: Agent,
    resolver: UrlResolver,
    urls: UrlMap,
}

impl HttpFragmentSource {
    /// Create a source for a location.
    #[must_use]
    pub fn new(resolver: UrlResolver) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            resolver,
            urls: UrlMap,
        }
    }
}

impl FragmentSource for HttpFragmentSource {
    fn fetch(&self, name: &str) -> Result<String, ClientError> {
        let path = self.urls.path("components", &format!("{name}.html"));
        let url = self.resolver.resource_url("frontend", &path);

        let response = self.agent.get(&url).call()?;
        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            let preview: String = body.chars().take(BODY_PREVIEW).collect();
            tracing::error!(%name, status, body = %preview, "Failed to load component");
            return Err(ClientError::Http { status, body });
        }

        Ok(body_reader.read_to_string()?)
    }
}

/// A DOM-target stand-in: which component it holds, and the markup held.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Target {
    /// Name of the component currently injected, if any.
    pub loaded: Option<String>,
    /// Injected markup.
    pub content: String,
}

/// Fragment loader with a per-name body cache.
pub struct FragmentLoader<S> {
    source: S,
    cache: HashMap<String, String>,
}

impl<S: FragmentSource> FragmentLoader<S> {
    /// Create a loader over a fragment source.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: HashMap::new(),
        }
    }

    /// Load a component into a target.
    ///
    /// Returns `true` when an injection happened, `false` when the target
    /// already held the component. The body is fetched at most once per
    /// name; later loads reuse the cached copy. Script elements never reach
    /// the target.
    ///
    /// # Errors
    ///
    /// Propagates fetch failures; the target is left untouched.
    pub fn load_component(&mut self, name: &str, target: &mut Target) -> Result<bool, ClientError> {
        if target.loaded.as_deref() == Some(name) {
            return Ok(false);
        }

        if !self.cache.contains_key(name) {
            let body = self.source.fetch(name)?;
            self.cache.insert(name.to_owned(), body);
        }

        // Present after the insert above.
        let body = self.cache.get(name).map(String::as_str).unwrap_or_default();
        target.content = SCRIPT_RE.replace_all(body, "").into_owned();
        target.loaded = Some(name.to_owned());

        tracing::debug!(%name, "Component injected");
        Ok(true)
    }

    /// Whether a fragment body is cached.
    #[must_use]
    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }
}
