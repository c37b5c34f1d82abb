//! App Router

use salvo::Router;

use crate::{categories, healthcheck, observability, products};

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(observability::metrics_handler))
        .push(
            Router::with_path("products")
                .get(products::index::handler)
                .post(products::create::handler)
                .push(Router::with_path("import").post(products::import::handler))
                .push(
                    Router::with_path("{product}")
                        .get(products::get::handler)
                        .put(products::update::handler)
                        .delete(products::delete::handler),
                ),
        )
        .push(
            Router::with_path("categories")
                .get(categories::index::handler)
                .post(categories::create::handler)
                .push(
                    Router::with_path("{category}")
                        .get(categories::get::handler)
                        .put(categories::update::handler)
                        .delete(categories::delete::handler)
                        .push(Router::with_path("products").get(categories::products::handler)),
                ),
        )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use salvo::{
        affix_state::inject,
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use catalog_app::{
        context::AppContext,
        imports::{ImportSummary, MockImportsService},
    };

    use crate::{
        state::State,
        test_helpers::{TEST_IMPORT_MAX_BYTES, strict_categories_mock, strict_products_mock},
    };

    use super::*;

    #[tokio::test]
    async fn test_import_route_is_not_captured_by_product_uuid() -> TestResult {
        let mut imports = MockImportsService::new();

        imports
            .expect_import_products()
            .once()
            .return_once(|_| Ok(ImportSummary::default()));

        let app = AppContext {
            products: Arc::new(strict_products_mock()),
            categories: Arc::new(strict_categories_mock()),
            imports: Arc::new(imports),
        };

        let service = Service::new(
            Router::new()
                .hoop(inject(State::shared(app, TEST_IMPORT_MAX_BYTES)))
                .push(app_router()),
        );

        let res = TestClient::post("http://example.com/products/import")
            .text("Id,Name\n")
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_healthcheck_is_mounted() -> TestResult {
        let body = TestClient::get("http://example.com/healthcheck")
            .send(&Service::new(app_router()))
            .await
            .take_string()
            .await?;

        assert!(body.contains("\"ok\""), "unexpected healthcheck body: {body}");

        Ok(())
    }
}
