//! Client-side mirror of the Portico namespace.
//!
//! Reconstructs, on the consuming side, the same logical path and port
//! mapping the server resolves — base URLs, endpoint paths, component
//! locations — so no caller ever hardcodes a host, port, or absolute URL.
//! On top of that mapping sit a typed request wrapper with backend-liveness
//! gating and a fragment fetch/cache layer.
//!
//! ```no_run
//! use portico_client::{ApiClient, Location, UrlResolver};
//!
//! let resolver = UrlResolver::new(Location::Standalone);
//! let client = ApiClient::new(resolver);
//! if client.verify_backend() {
//!     let users = client.get("users", "list", None);
//! }
//! ```

pub mod api;
pub mod endpoints;
pub mod fragments;
pub mod ports;
pub mod status;

pub use api::{ApiClient, ClientError};
pub use endpoints::Endpoint;
pub use fragments::{FragmentLoader, FragmentSource, HttpFragmentSource, Target};
pub use ports::{DEFAULT_PORT, Location, PortMap, UrlMap, UrlResolver, api_path};
pub use status::BackendStatus;
