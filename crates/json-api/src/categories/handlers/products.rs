//! Category Products Handler

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use catalog_app::categories::records::CategoryWithProducts;

use crate::{
    categories::{errors::into_status_error, get::CategoryResponse},
    extensions::*,
    products::get::ProductResponse,
};

/// A category together with every product in it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CategoryProductsResponse {
    pub category: CategoryResponse,
    pub products: Vec<ProductResponse>,
}

impl From<CategoryWithProducts> for CategoryProductsResponse {
    fn from(value: CategoryWithProducts) -> Self {
        CategoryProductsResponse {
            category: value.category.into(),
            products: value.products.into_iter().map(Into::into).collect(),
        }
    }
}

#[endpoint(
    tags("categories"),
    summary = "Get Category With Products",
    responses(
        (status_code = StatusCode::OK, description = "Category found"),
        (status_code = StatusCode::NOT_FOUND, description = "Category not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    category: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CategoryProductsResponse>, StatusError> {
    let state = depot.state_or_500()?;

    let category = state
        .app
        .categories
        .get_category_with_products(category.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(category.into()))
}
