//! Merge Engine

use std::time::Duration;

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Postgres, Transaction, query, query_scalar};

const COUNT_MATCHED_PRODUCTS_SQL: &str = include_str!("sql/count_matched_products.sql");
const MERGE_STAGED_PRODUCTS_SQL: &str = include_str!("sql/merge_staged_products.sql");
const SET_STATEMENT_TIMEOUT_SQL: &str = include_str!("sql/set_statement_timeout.sql");

/// Row counts reported by a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub inserted: u64,
    pub updated: u64,
}

/// Bound every later statement in the transaction to `limit`, at least one millisecond.
pub(crate) async fn limit_statement_time(
    tx: &mut Transaction<'_, Postgres>,
    limit: Duration,
) -> Result<(), sqlx::Error> {
    let millis = limit.as_millis().max(1);

    query(SET_STATEMENT_TIMEOUT_SQL)
        .bind(millis.to_string())
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Upsert the staged rows into `products` keyed on identity.
///
/// Matched rows keep their identity and `created_at`, get `updated_at = now` and a bumped
/// version. Unmatched rows are inserted at version 1. Must run in the staging transaction.
pub(crate) async fn merge_staged_products(
    tx: &mut Transaction<'_, Postgres>,
    now: Timestamp,
) -> Result<MergeStats, sqlx::Error> {
    let matched: i64 = query_scalar(COUNT_MATCHED_PRODUCTS_SQL)
        .fetch_one(&mut **tx)
        .await?;

    let merged = query(MERGE_STAGED_PRODUCTS_SQL)
        .bind(SqlxTimestamp::from(now))
        .execute(&mut **tx)
        .await?
        .rows_affected();

    let updated = u64::try_from(matched).unwrap_or_default();

    Ok(MergeStats {
        inserted: merged.saturating_sub(updated),
        updated,
    })
}
