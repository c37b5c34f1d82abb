//! Database Config

use clap::Args;

/// Catalog database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string; migrations are applied on startup
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,
}
