//! Update Product Handler

use std::str::FromStr;

use rust_decimal::Decimal;
use salvo::{
    http::header::LOCATION,
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use catalog_app::products::data::ProductUpdate;

use crate::{extensions::*, products::errors::into_status_error, products::get::ProductResponse};

/// Update Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Decimal price, e.g. `"19.99"`
    pub price: String,
    pub inventory_level: i32,
    pub category_uuid: Uuid,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Version returned by the last read of this product
    pub version: i64,
}

impl TryFrom<UpdateProductRequest> for ProductUpdate {
    type Error = StatusError;

    fn try_from(request: UpdateProductRequest) -> Result<Self, Self::Error> {
        Ok(ProductUpdate {
            name: request.name,
            description: request.description,
            price: Decimal::from_str(request.price.trim()).or_400("price is not a valid decimal")?,
            inventory_level: request.inventory_level,
            category_uuid: request.category_uuid.into(),
            image_url: request.image_url,
            version: request.version,
        })
    }
}

/// Product Update Handler
#[endpoint(
    tags("products"),
    summary = "Update Product",
    responses(
        (status_code = StatusCode::OK, description = "Product updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::CONFLICT, description = "Version is stale"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "products.update",
    skip(product, json, depot, res),
    fields(
        product_uuid = tracing::field::Empty,
        version = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<UpdateProductRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.state_or_500()?;
    let update = ProductUpdate::try_from(json.into_inner())?;
    let product = product.into_inner();

    let span = tracing::Span::current();

    span.record("product_uuid", tracing::field::display(product));
    span.record("version", update.version);

    let updated = state
        .app
        .products
        .update_product(product.into(), update)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/products/{product}"), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::OK);

    tracing::info!(product_uuid = %product, version = updated.version, "updated product");

    Ok(Json(updated.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use catalog_app::{
        categories::records::CategoryUuid,
        products::{MockProductsService, ProductsServiceError, records::ProductUuid},
    };

    use crate::test_helpers::{make_product, products_service, strict_products_mock};

    use super::*;

    fn make_service(repo: MockProductsService) -> Service {
        products_service(repo, Router::with_path("products/{product}").put(handler))
    }

    fn body(category: CategoryUuid, version: i64) -> Value {
        json!({
            "name": "Desk Lamp",
            "price": "24.50",
            "inventory_level": 3,
            "category_uuid": category.into_uuid(),
            "version": version,
        })
    }

    #[tokio::test]
    async fn test_update_product_success() -> TestResult {
        let uuid = ProductUuid::new();
        let category = CategoryUuid::new();

        let mut product = make_product(uuid);

        product.price = Decimal::new(2450, 2);
        product.version = 4;

        let mut repo = MockProductsService::new();

        repo.expect_update_product()
            .once()
            .withf(move |u, update| {
                *u == uuid
                    && *update
                        == ProductUpdate {
                            name: "Desk Lamp".to_owned(),
                            description: None,
                            price: Decimal::new(2450, 2),
                            inventory_level: 3,
                            category_uuid: category,
                            image_url: None,
                            version: 3,
                        }
            })
            .return_once(move |_, _| Ok(product));

        repo.expect_get_product().never();
        repo.expect_create_product().never();
        repo.expect_list_products().never();
        repo.expect_delete_product().never();

        let mut res = TestClient::put(format!("http://example.com/products/{uuid}"))
            .json(&body(category, 3))
            .send(&make_service(repo))
            .await;

        let response: ProductResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(location, Some(format!("/products/{uuid}").as_str()));
        assert_eq!(response.price, "24.50");
        assert_eq!(response.version, 4);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_invalid_uuid_returns_400() -> TestResult {
        let res = TestClient::put("http://example.com/products/123")
            .json(&body(CategoryUuid::new(), 1))
            .send(&make_service(strict_products_mock()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_stale_version_returns_409() -> TestResult {
        let uuid = ProductUuid::new();

        let mut repo = MockProductsService::new();

        repo.expect_update_product()
            .once()
            .withf(move |u, update| *u == uuid && update.version == 1)
            .return_once(|_, _| Err(ProductsServiceError::Conflict));

        repo.expect_get_product().never();
        repo.expect_create_product().never();
        repo.expect_list_products().never();
        repo.expect_delete_product().never();

        let res = TestClient::put(format!("http://example.com/products/{uuid}"))
            .json(&body(CategoryUuid::new(), 1))
            .send(&make_service(repo))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_product_returns_404() -> TestResult {
        let uuid = ProductUuid::new();

        let mut repo = MockProductsService::new();

        repo.expect_update_product()
            .once()
            .return_once(|_, _| Err(ProductsServiceError::NotFound));

        repo.expect_get_product().never();
        repo.expect_create_product().never();
        repo.expect_list_products().never();
        repo.expect_delete_product().never();

        let res = TestClient::put(format!("http://example.com/products/{uuid}"))
            .json(&body(CategoryUuid::new(), 1))
            .send(&make_service(repo))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
