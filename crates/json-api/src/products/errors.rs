//! Product Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use catalog_app::{imports::ImportError, products::ProductsServiceError};

pub(crate) fn into_status_error(error: ProductsServiceError) -> StatusError {
    match error {
        ProductsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Product already exists")
        }
        ProductsServiceError::Conflict => StatusError::conflict()
            .brief("Product was modified by another request, reload it and retry"),
        ProductsServiceError::InvalidReference => {
            StatusError::bad_request().brief("Category does not exist")
        }
        ProductsServiceError::MissingRequiredData | ProductsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid product payload")
        }
        ProductsServiceError::Sql(source) => {
            error!("product storage error: {source}");

            StatusError::internal_server_error()
        }
        ProductsServiceError::NotFound => StatusError::not_found(),
    }
}

/// Import faults; rejected files are answered by the handler itself.
pub(crate) fn import_status_error(error: ImportError) -> StatusError {
    match error {
        ImportError::Timeout(limit) => {
            warn!(?limit, "product import timed out");

            StatusError::gateway_timeout().brief("Import did not finish in time")
        }
        ImportError::Cancelled => {
            warn!("product import cancelled");

            StatusError::service_unavailable().brief("Server is shutting down")
        }
        ImportError::Read(_) | ImportError::Worker(_) | ImportError::Storage(_) => {
            error!("product import failed: {error:?}");

            StatusError::internal_server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn test_stale_version_maps_to_conflict() {
        let error = into_status_error(ProductsServiceError::Conflict);

        assert_eq!(error.code, StatusCode::CONFLICT);
    }

    #[test]
    fn test_storage_faults_map_to_server_errors() {
        let error = into_status_error(ProductsServiceError::Sql(sqlx::Error::PoolTimedOut));

        assert_eq!(error.code, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_import_faults_map_to_their_status_codes() {
        let cases = [
            (
                ImportError::Storage(sqlx::Error::PoolClosed),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ImportError::Timeout(Duration::from_secs(300)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (ImportError::Cancelled, StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (error, expected) in cases {
            assert_eq!(import_status_error(error).code, expected);
        }
    }
}
