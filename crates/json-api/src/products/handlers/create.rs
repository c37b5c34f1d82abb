//! Create Product Handler

use std::str::FromStr;

use rust_decimal::Decimal;
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use catalog_app::products::{data::NewProduct, records::ProductUuid};

use crate::{extensions::*, products::errors::into_status_error, products::get::ProductResponse};

/// Create Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateProductRequest {
    /// Client-chosen identifier; generated when omitted
    #[serde(default)]
    pub uuid: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Decimal price, e.g. `"19.99"`
    pub price: String,
    pub inventory_level: i32,
    pub category_uuid: Uuid,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CreateProductRequest {
    fn into_new_product(self) -> Result<NewProduct, StatusError> {
        let price = Decimal::from_str(self.price.trim()).or_400("price is not a valid decimal")?;

        Ok(NewProduct {
            uuid: self.uuid.map_or_else(ProductUuid::new, Into::into),
            name: self.name,
            description: self.description,
            price,
            inventory_level: self.inventory_level,
            category_uuid: self.category_uuid.into(),
            image_url: self.image_url,
        })
    }
}

/// Create Product Handler
#[endpoint(
    tags("products"),
    summary = "Create Product",
    responses(
        (status_code = StatusCode::CREATED, description = "Product created"),
        (status_code = StatusCode::CONFLICT, description = "Product already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "products.create",
    skip(json, depot, res),
    fields(product_uuid = tracing::field::Empty, category_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateProductRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.state_or_500()?;
    let product = json.into_inner().into_new_product()?;

    let span = tracing::Span::current();

    span.record("product_uuid", tracing::field::display(product.uuid));
    span.record("category_uuid", tracing::field::display(product.category_uuid));

    let product = state
        .app
        .products
        .create_product(product)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/products/{}", product.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(product.into()))
}
