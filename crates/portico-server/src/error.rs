//! Server error types.

/// Error starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Host/port did not form a valid socket address.
    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),

    /// Configured CORS origin is not a legal header value.
    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),

    /// Listener failed to bind.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        /// Address that could not be bound.
        address: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error while serving.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Whether this error is a bind failure caused by the address already
    /// being in use. The CLI prints a specific alternate-port suggestion
    /// for this case.
    #[must_use]
    pub fn is_addr_in_use(&self) -> bool {
        matches!(
            self,
            Self::Bind { source, .. } if source.kind() == std::io::ErrorKind::AddrInUse
        )
    }
}
