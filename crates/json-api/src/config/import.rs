//! Import Config

use std::time::Duration;

use clap::Args;

use catalog_app::imports::ImportConfig;

/// Bulk product import settings.
#[derive(Debug, Args)]
pub struct ImportSettings {
    /// Upper bound for staging and merging one import, in seconds.
    #[arg(long, env = "IMPORT_TIMEOUT_SECONDS", default_value_t = 300_u64)]
    pub import_timeout_seconds: u64,

    /// Rows written to the staging table per flush.
    #[arg(
        long,
        env = "IMPORT_BATCH_SIZE",
        default_value_t = 1000_usize,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub import_batch_size: usize,

    /// Largest accepted import request body, in bytes.
    #[arg(long, env = "IMPORT_MAX_BYTES", default_value_t = 64 * 1024 * 1024)]
    pub import_max_bytes: usize,
}

impl ImportSettings {
    #[must_use]
    pub fn import_timeout(&self) -> Duration {
        Duration::from_secs(self.import_timeout_seconds)
    }

    #[must_use]
    pub fn to_import_config(&self) -> ImportConfig {
        ImportConfig {
            batch_size: self.import_batch_size,
            timeout: self.import_timeout(),
        }
    }
}
