//! Pipeline Orchestrator
//!
//! Sequences one import run:
//!
//! ```text
//! Idle -> Parsing -> Validating -> Rejected
//!                              \-> Staging -> Merging -> Cleanup -> Completed
//!                                                             \-> Failed
//! ```
//!
//! Parsing and validation run on a blocking worker. Staging and merging share one
//! transaction on one checked-out connection, bounded by [`ImportConfig::timeout`]: staging
//! is abandoned at the deadline, the merge gets whatever time is left as a server-side
//! statement timeout, and `COMMIT` runs unbounded. The
//! staging table is dropped before the run returns; when that cannot be confirmed the
//! connection is closed rather than returned to the pool.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    io::Read,
    sync::Arc,
    time::Duration,
};

use sqlx::{Connection, PgConnection, Postgres, pool::PoolConnection};
use tokio::{
    task,
    time::{Instant, timeout_at},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    clock::Clock,
    database::Db,
    domain::imports::{
        errors::ImportError,
        merge::{self, MergeStats},
        parser::{ParseError, read_products},
        records::CandidateProduct,
        staging::{self, DEFAULT_BATCH_SIZE},
        validator::ValidationReport,
    },
};

pub const DEFAULT_IMPORT_TIMEOUT: Duration = Duration::from_secs(300);

const QUERY_CANCELED: &str = "57014";

/// Stages of an import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    Idle,
    Parsing,
    Validating,
    Rejected,
    Staging,
    Merging,
    Cleanup,
    Completed,
    Failed,
}

impl ImportState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Parsing => "parsing",
            Self::Validating => "validating",
            Self::Rejected => "rejected",
            Self::Staging => "staging",
            Self::Merging => "merging",
            Self::Cleanup => "cleanup",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl Display for ImportState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
struct Transitions {
    state: ImportState,
}

impl Transitions {
    fn new() -> Self {
        Self {
            state: ImportState::Idle,
        }
    }

    fn advance(&mut self, next: ImportState) {
        debug!(from = %self.state, to = %next, "import state changed");

        self.state = next;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportConfig {
    /// Records per `COPY` flush.
    pub batch_size: usize,

    /// Upper bound for staging plus merge.
    pub timeout: Duration,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: DEFAULT_IMPORT_TIMEOUT,
        }
    }
}

/// What a finished run produced. A non-empty `errors` list means nothing was written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub errors: Vec<String>,
    pub merged: MergeStats,
}

impl ImportSummary {
    pub fn is_rejected(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ProductImportPipeline {
    db: Db,
    clock: Arc<dyn Clock>,
    config: ImportConfig,
}

impl ProductImportPipeline {
    #[must_use]
    pub fn new(db: Db, clock: Arc<dyn Clock>, config: ImportConfig) -> Self {
        Self { db, clock, config }
    }

    /// Import every row of `source`, or none of them.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] when the source cannot be read, the store rejects the
    /// merge, the run exceeds its timeout or `cancel` fires before the merge starts.
    #[tracing::instrument(name = "import_products", skip_all, fields(batch_size = self.config.batch_size))]
    pub async fn run<R>(
        &self,
        source: R,
        cancel: &CancellationToken,
    ) -> Result<ImportSummary, ImportError>
    where
        R: Read + Send + 'static,
    {
        let mut transitions = Transitions::new();
        transitions.advance(ImportState::Parsing);

        let (mut transitions, parsed) = task::spawn_blocking(move || {
            let parsed = parse_and_validate(source, &mut transitions);
            (transitions, parsed)
        })
        .await
        .map_err(ImportError::Worker)?;

        let (accepted, errors) = match parsed {
            Ok(parts) => parts,
            Err(error) => {
                transitions.advance(ImportState::Failed);
                return Err(ImportError::Read(error));
            }
        };

        if !errors.is_empty() {
            transitions.advance(ImportState::Rejected);
            info!(rejected = errors.len(), accepted = accepted.len(), "import rejected");

            return Ok(ImportSummary {
                errors,
                merged: MergeStats::default(),
            });
        }

        if cancel.is_cancelled() {
            transitions.advance(ImportState::Failed);
            return Err(ImportError::Cancelled);
        }

        let mut conn = match self.db.acquire().await {
            Ok(conn) => conn,
            Err(error) => {
                transitions.advance(ImportState::Failed);
                return Err(error.into());
            }
        };

        let deadline = Instant::now() + self.config.timeout;

        let outcome = self
            .stage_and_merge(&mut conn, &accepted, deadline, cancel, &mut transitions)
            .await;

        transitions.advance(ImportState::Cleanup);

        match &outcome {
            Err(ImportError::Timeout(_)) => {
                warn!(timeout = ?self.config.timeout, "import timed out, closing connection");
                conn.close_on_drop();
            }
            _ => release(&mut conn).await,
        }

        match outcome {
            Ok(merged) => {
                transitions.advance(ImportState::Completed);
                info!(inserted = merged.inserted, updated = merged.updated, "import completed");

                Ok(ImportSummary {
                    errors: Vec::new(),
                    merged,
                })
            }
            Err(error) => {
                transitions.advance(ImportState::Failed);
                warn!(%error, "import failed");

                Err(error)
            }
        }
    }

    /// A merge that has started is only ever ended by the server, never by dropping it here.
    async fn stage_and_merge(
        &self,
        conn: &mut PgConnection,
        accepted: &[CandidateProduct],
        deadline: Instant,
        cancel: &CancellationToken,
        transitions: &mut Transitions,
    ) -> Result<MergeStats, ImportError> {
        let timed_out = || ImportError::Timeout(self.config.timeout);

        let Ok(begun) = timeout_at(deadline, conn.begin()).await else {
            return Err(timed_out());
        };

        let mut tx = begun?;

        transitions.advance(ImportState::Staging);

        let load = async {
            staging::create_staging_table(&mut tx).await?;

            let staged =
                staging::load_staging_table(&mut tx, accepted, self.config.batch_size).await?;

            Ok::<_, sqlx::Error>(staged)
        };

        let Ok(staged) = timeout_at(deadline, load).await else {
            return Err(timed_out());
        };

        let staged = staged?;

        debug!(staged, "staging table loaded");

        let merged_at = self.clock.now();

        if cancel.is_cancelled() {
            tx.rollback().await?;
            return Err(ImportError::Cancelled);
        }

        let remaining = deadline.saturating_duration_since(Instant::now());

        if remaining.is_zero() {
            tx.rollback().await?;
            return Err(timed_out());
        }

        transitions.advance(ImportState::Merging);

        merge::limit_statement_time(&mut tx, remaining).await?;

        let merged = match merge::merge_staged_products(&mut tx, merged_at).await {
            Ok(merged) => merged,
            Err(error) if is_statement_timeout(&error) => {
                tx.rollback().await?;
                return Err(timed_out());
            }
            Err(error) => return Err(error.into()),
        };

        tx.commit().await?;

        Ok(merged)
    }
}

/// `query_canceled`, raised when `statement_timeout` expires.
fn is_statement_timeout(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(|error| error.code())
        .is_some_and(|code| code == QUERY_CANCELED)
}

fn parse_and_validate<R: Read>(
    source: R,
    transitions: &mut Transitions,
) -> Result<(Vec<CandidateProduct>, Vec<String>), ParseError> {
    let rows = match read_products(source) {
        Ok(rows) => rows,
        Err(error) if error.is_read_failure() => return Err(error),
        Err(error) => return Ok((Vec::new(), vec![error.to_string()])),
    };

    transitions.advance(ImportState::Validating);

    Ok(ValidationReport::from_rows(rows)?.into_parts())
}

async fn release(conn: &mut PoolConnection<Postgres>) {
    if let Err(error) = staging::drop_staging_table(conn).await {
        warn!(%error, "could not confirm staging cleanup, closing connection");
        conn.close_on_drop();
    }
}
