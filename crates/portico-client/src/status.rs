//! Backend liveness status.

use chrono::{DateTime, Utc};

/// Outcome of the most recent liveness probe.
///
/// Mutated only by the probe; read by the request wrapper before each call
/// when backend checking is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStatus {
    /// Whether the last probe reached the server.
    pub connected: bool,
    /// When the last probe ran.
    pub last_check: Option<DateTime<Utc>>,
    /// HTTP status of the last probe, if a response arrived.
    pub status_code: Option<u16>,
    /// Human-readable outcome.
    pub message: String,
}

impl Default for BackendStatus {
    fn default() -> Self {
        Self {
            connected: false,
            last_check: None,
            status_code: None,
            message: "Backend not checked yet".to_owned(),
        }
    }
}

impl BackendStatus {
    /// Status for a successful probe.
    #[must_use]
    pub fn connected(status_code: u16) -> Self {
        Self {
            connected: true,
            last_check: Some(Utc::now()),
            status_code: Some(status_code),
            message: "Backend connection verified".to_owned(),
        }
    }

    /// Status for a failed probe.
    #[must_use]
    pub fn disconnected(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            connected: false,
            last_check: Some(Utc::now()),
            status_code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unchecked() {
        let status = BackendStatus::default();
        assert!(!status.connected);
        assert!(status.last_check.is_none());
    }

    #[test]
    fn test_probe_outcomes_record_check_time() {
        assert!(BackendStatus::connected(200).last_check.is_some());
        let failed = BackendStatus::disconnected(None, "timeout");
        assert!(failed.last_check.is_some());
        assert!(!failed.connected);
    }
}
