//! Server configuration module

use clap::Parser;

use crate::config::{
    db::DatabaseConfig,
    import::ImportSettings,
    observability::{LoggingConfig, ObservabilityConfig},
    server::ServerRuntimeConfig,
};

pub(crate) mod db;
pub(crate) mod import;
pub(crate) mod observability;
pub(crate) mod server;

/// Catalog JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "catalog-json", about = "Product Catalog JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Request observability settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Bulk import settings.
    #[command(flatten)]
    pub import: ImportSettings,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_defaults_apply_when_only_database_url_is_given() -> TestResult {
        let config =
            ServerConfig::try_parse_from(["catalog-json", "--database-url", "postgres://db"])?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8080");
        assert_eq!(config.database.database_url, "postgres://db");
        assert_eq!(config.import.import_timeout(), Duration::from_secs(300));
        assert_eq!(config.import.import_batch_size, 1000);
        assert_eq!(config.observability.slow_request_threshold_ms, 1_000);

        Ok(())
    }

    #[test]
    fn test_import_settings_can_be_overridden() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "catalog-json",
            "--database-url",
            "postgres://db",
            "--import-timeout-seconds",
            "5",
            "--import-batch-size",
            "250",
            "--import-max-bytes",
            "1024",
        ])?;

        let import = config.import.to_import_config();

        assert_eq!(import.timeout, Duration::from_secs(5));
        assert_eq!(import.batch_size, 250);
        assert_eq!(config.import.import_max_bytes, 1024);

        Ok(())
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let result = ServerConfig::try_parse_from([
            "catalog-json",
            "--database-url",
            "postgres://db",
            "--import-batch-size",
            "0",
        ]);

        assert!(result.is_err(), "a zero batch size should not parse");
    }
}
