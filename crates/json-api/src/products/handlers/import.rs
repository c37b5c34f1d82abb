//! Import Products Handler
//!
//! Accepts a CSV file as the raw request body and upserts every row, or none of them.
//! Rejected files answer `400` with one message per invalid row; faults map to `500`,
//! `504` on timeout and `503` once the server is shutting down.

use std::io::Cursor;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::warn;

use catalog_app::imports::ImportSummary;

use crate::{extensions::*, observability, products::errors::import_status_error};

/// Import Result
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ImportResponse {
    /// One entry per rejected row; empty when the file was merged
    pub errors: Vec<String>,

    /// Products created by this import
    pub inserted: u64,

    /// Existing products overwritten by this import
    pub updated: u64,
}

impl From<ImportSummary> for ImportResponse {
    fn from(summary: ImportSummary) -> Self {
        ImportResponse {
            errors: summary.errors,
            inserted: summary.merged.inserted,
            updated: summary.merged.updated,
        }
    }
}

/// Import Products Handler
#[endpoint(
    tags("products"),
    summary = "Import Products",
    responses(
        (status_code = StatusCode::OK, description = "File merged"),
        (status_code = StatusCode::BAD_REQUEST, description = "File rejected, nothing written"),
        (status_code = StatusCode::PAYLOAD_TOO_LARGE, description = "File too large"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Server shutting down"),
        (status_code = StatusCode::GATEWAY_TIMEOUT, description = "Import timed out"),
    ),
)]
#[tracing::instrument(
    name = "products.import",
    skip_all,
    fields(
        bytes = tracing::field::Empty,
        rejected = tracing::field::Empty,
        inserted = tracing::field::Empty,
        updated = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ImportResponse>, StatusError> {
    let state = depot.state_or_500()?;

    let body = req
        .payload_with_max_size(state.import_max_bytes)
        .await
        .map_err(|error| {
            warn!(max_bytes = state.import_max_bytes, "could not read import body: {error}");

            StatusError::payload_too_large().brief("Import file could not be read within the size limit")
        })?
        .to_vec();

    let span = tracing::Span::current();

    span.record("bytes", body.len());

    let result = state
        .app
        .imports
        .import_products(Box::new(Cursor::new(body)))
        .await;

    observability::observe_import(&result);

    let summary = result.map_err(import_status_error)?;

    span.record("rejected", summary.errors.len());
    span.record("inserted", summary.merged.inserted);
    span.record("updated", summary.merged.updated);

    if summary.is_rejected() {
        res.status_code(StatusCode::BAD_REQUEST);
    }

    Ok(Json(summary.into()))
}
