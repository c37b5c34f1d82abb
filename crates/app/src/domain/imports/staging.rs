//! Staging Loader

use sqlx::{PgConnection, Postgres, Transaction, query};
use tracing::{debug, warn};

use crate::domain::imports::records::CandidateProduct;

const CREATE_STAGING_TABLE_SQL: &str = include_str!("sql/create_staging_table.sql");
const COPY_STAGED_PRODUCTS_SQL: &str = include_str!("sql/copy_staged_products.sql");
const DROP_STAGING_TABLE_SQL: &str = include_str!("sql/drop_staging_table.sql");

/// Records sent per `COPY` chunk unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

const NULL_MARKER: &str = "\\N";

/// Create the run's staging table. It is dropped when the transaction ends.
pub(crate) async fn create_staging_table(
    tx: &mut Transaction<'_, Postgres>,
) -> Result<(), sqlx::Error> {
    query(CREATE_STAGING_TABLE_SQL).execute(&mut **tx).await?;

    Ok(())
}

/// Stream `records` into the staging table, flushing every `batch_size` records.
///
/// Returns the number of rows the server accepted.
pub(crate) async fn load_staging_table(
    tx: &mut Transaction<'_, Postgres>,
    records: &[CandidateProduct],
    batch_size: usize,
) -> Result<u64, sqlx::Error> {
    let batch_size = batch_size.max(1);
    let mut copy = tx.copy_in_raw(COPY_STAGED_PRODUCTS_SQL).await?;
    let mut buffer = String::new();

    for (batch, chunk) in records.chunks(batch_size).enumerate() {
        buffer.clear();

        for record in chunk {
            write_copy_row(&mut buffer, record);
        }

        let sent = copy.send(buffer.as_bytes()).await.map(|_| ());

        if let Err(error) = sent {
            if let Err(abort_error) = copy.abort("staging load failed").await {
                warn!(error = %abort_error, "failed to abort staging copy");
            }

            return Err(error);
        }

        debug!(batch, rows = chunk.len(), "flushed staging batch");
    }

    copy.finish().await
}

/// Drop the staging table if it outlived its transaction.
pub(crate) async fn drop_staging_table(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    query(DROP_STAGING_TABLE_SQL).execute(conn).await?;

    Ok(())
}

/// Append one row in `COPY` text format.
fn write_copy_row(buffer: &mut String, record: &CandidateProduct) {
    let uuid = record.uuid.map(|uuid| uuid.to_string());
    let created_at = record.created_at.map(|created_at| created_at.to_string());

    push_field(buffer, uuid.as_deref());
    buffer.push('\t');
    push_field(buffer, Some(&record.name));
    buffer.push('\t');
    push_field(buffer, record.description.as_deref());
    buffer.push('\t');
    buffer.push_str(&record.price.to_string());
    buffer.push('\t');
    buffer.push_str(&record.inventory_level.to_string());
    buffer.push('\t');
    buffer.push_str(&record.category_uuid.to_string());
    buffer.push('\t');
    push_field(buffer, record.image_url.as_deref());
    buffer.push('\t');
    push_field(buffer, created_at.as_deref());
    buffer.push('\n');
}

fn push_field(buffer: &mut String, value: Option<&str>) {
    let Some(value) = value else {
        buffer.push_str(NULL_MARKER);
        return;
    };

    for ch in value.chars() {
        match ch {
            '\\' => buffer.push_str("\\\\"),
            '\t' => buffer.push_str("\\t"),
            '\n' => buffer.push_str("\\n"),
            '\r' => buffer.push_str("\\r"),
            _ => buffer.push(ch),
        }
    }
}
