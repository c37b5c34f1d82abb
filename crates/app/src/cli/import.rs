use std::{fs::File, io::BufReader, path::PathBuf, sync::Arc, time::Duration};

use catalog_app::{
    clock::SystemClock,
    database::{self, Db},
    imports::{ImportConfig, ProductImportPipeline},
};
use clap::Args;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Debug, Args)]
pub(crate) struct ImportArgs {
    /// Path of the CSV file to import
    #[arg(long)]
    file: PathBuf,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Upper bound in seconds for staging and merging
    #[arg(long, env = "IMPORT_TIMEOUT_SECONDS", default_value_t = 300)]
    timeout_seconds: u64,

    /// Records per COPY flush
    #[arg(long, env = "IMPORT_BATCH_SIZE", default_value_t = 1000)]
    batch_size: usize,
}

pub(crate) async fn run(args: ImportArgs) -> Result<(), String> {
    let file = File::open(&args.file)
        .map_err(|error| format!("failed to open {}: {error}", args.file.display()))?;

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    database::migrate(&pool)
        .await
        .map_err(|error| format!("failed to apply migrations: {error}"))?;

    let pipeline = ProductImportPipeline::new(
        Db::new(pool),
        Arc::new(SystemClock),
        ImportConfig {
            batch_size: args.batch_size,
            timeout: Duration::from_secs(args.timeout_seconds),
        },
    );

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling import");
            interrupt.cancel();
        }
    });

    let summary = pipeline
        .run(BufReader::new(file), &cancel)
        .await
        .map_err(|error| format!("import failed: {error}"))?;

    if summary.is_rejected() {
        for error in &summary.errors {
            println!("{error}");
        }

        return Err(format!("import rejected: {} invalid rows", summary.errors.len()));
    }

    println!("inserted: {}", summary.merged.inserted);
    println!("updated: {}", summary.merged.updated);

    Ok(())
}
