//! Product Index Handler

use std::str::FromStr;

use rust_decimal::Decimal;
use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use catalog_app::products::data::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, ProductFilter};

use crate::{extensions::*, products::get::ProductResponse};

/// Largest page a client may request.
pub(crate) const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductsResponse {
    /// The requested page of products
    pub products: Vec<ProductResponse>,

    /// 1-based page number
    pub page: u32,

    pub page_size: u32,
}

fn parse_price(value: Option<String>, brief: &str) -> Result<Option<Decimal>, StatusError> {
    value
        .map(|value| Decimal::from_str(value.trim()))
        .transpose()
        .or_400(brief)
}

/// Product Index Handler
///
/// Returns one page of products, optionally filtered by name, price range and category.
#[endpoint(
    tags("products"),
    summary = "List Products",
    responses(
        (status_code = StatusCode::OK, description = "Products listed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "products.index", skip_all, err)]
pub(crate) async fn handler(
    name: QueryParam<String, false>,
    min_price: QueryParam<String, false>,
    max_price: QueryParam<String, false>,
    category: QueryParam<Uuid, false>,
    page: QueryParam<u32, false>,
    page_size: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<ProductsResponse>, StatusError> {
    let state = depot.state_or_500()?;

    let page = page.into_inner().unwrap_or(DEFAULT_PAGE);
    let page_size = page_size.into_inner().unwrap_or(DEFAULT_PAGE_SIZE);

    if page == 0 || page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(StatusError::bad_request()
            .brief(format!("page must be at least 1 and page_size between 1 and {MAX_PAGE_SIZE}")));
    }

    let filter = ProductFilter {
        name: name.into_inner().filter(|name| !name.trim().is_empty()),
        min_price: parse_price(min_price.into_inner(), "could not parse \"min_price\" query parameter")?,
        max_price: parse_price(max_price.into_inner(), "could not parse \"max_price\" query parameter")?,
        category: category.into_inner().map(Into::into),
        page,
        page_size,
    };

    let products = state
        .app
        .products
        .list_products(filter)
        .await
        .or_500("failed to fetch products")?;

    Ok(Json(ProductsResponse {
        products: products.into_iter().map(Into::into).collect(),
        page,
        page_size,
    }))
}
