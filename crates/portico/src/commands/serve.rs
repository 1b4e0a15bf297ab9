//! `portico serve` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use portico_config::{CliSettings, Config};
use portico_server::{AdminHandler, HandlerRegistry, run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover portico.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content root directory (overrides config).
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Enable CORS headers (default: enabled).
    #[arg(long)]
    cors: Option<bool>,

    /// Disable CORS headers.
    #[arg(long, conflicts_with = "cors")]
    no_cors: bool,

    /// Enable verbose output (request and resolution logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        // Resolve flags before moving into CliSettings
        let cors_enabled = self.resolve_cors_enabled();

        // Build CLI settings from args
        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            root: self.root,
            cors_enabled,
        };

        // Load config
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        // Print startup info
        output.separator();
        output.highlight("Portico content server");
        output.separator();
        output.info(&format!(
            "Server running at: http://{}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Content root: {}",
            config.content_resolved.root.display()
        ));
        output.info(&format!(
            "CORS: {}",
            if config.cors.enabled {
                "enabled"
            } else {
                "disabled"
            }
        ));
        output.separator();
        output.info("Press Ctrl+C to stop the server");

        // Build server config and run
        let server_config = server_config_from_config(&config);
        let port = server_config.port;

        match run_server(server_config, default_registry()).await {
            Ok(()) => Ok(()),
            Err(err) => {
                if err.is_addr_in_use() {
                    output.error(&format!("Port {port} is already in use."));
                    output.warning(&format!(
                        "Stop the other process or use: portico serve --port {}",
                        port.wrapping_add(1)
                    ));
                }
                Err(CliError::Server(err.to_string()))
            }
        }
    }

    /// Resolve `cors_enabled` from --cors/--no-cors flags.
    fn resolve_cors_enabled(&self) -> Option<bool> {
        self.no_cors.then_some(false).or(self.cors)
    }
}

/// Registry with the default route families.
///
/// The administrative family is the one sticky registration: its session
/// table must survive across requests.
fn default_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register_sticky("admin", Arc::new(AdminHandler::new()));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_cors_flag_wins() {
        let args = ServeArgs {
            config: None,
            root: None,
            host: None,
            port: None,
            cors: None,
            no_cors: true,
            verbose: false,
        };
        assert_eq!(args.resolve_cors_enabled(), Some(false));
    }

    #[test]
    fn test_cors_flag_passthrough() {
        let args = ServeArgs {
            config: None,
            root: None,
            host: None,
            port: None,
            cors: Some(true),
            no_cors: false,
            verbose: false,
        };
        assert_eq!(args.resolve_cors_enabled(), Some(true));
    }

    #[test]
    fn test_default_registry_has_admin_family() {
        let registry = default_registry();
        assert!(registry.resolve("admin/login").is_some());
        assert!(!registry.is_empty());
    }
}
