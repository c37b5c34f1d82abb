//! Update Category Handler

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use catalog_app::categories::data::CategoryUpdate;

use crate::{
    categories::{errors::into_status_error, get::CategoryResponse},
    extensions::*,
};

/// Update Category Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Version returned by the last read of this category
    pub version: i64,
}

impl From<UpdateCategoryRequest> for CategoryUpdate {
    fn from(request: UpdateCategoryRequest) -> Self {
        CategoryUpdate {
            name: request.name,
            description: request.description,
            version: request.version,
        }
    }
}

/// Update Category Handler
#[endpoint(
    tags("categories"),
    summary = "Update Category",
    responses(
        (status_code = StatusCode::OK, description = "Category updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Category not found"),
        (status_code = StatusCode::CONFLICT, description = "Version is stale"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "categories.update",
    skip_all,
    fields(category_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    category: PathParam<Uuid>,
    json: JsonBody<UpdateCategoryRequest>,
    depot: &mut Depot,
) -> Result<Json<CategoryResponse>, StatusError> {
    let state = depot.state_or_500()?;
    let category = category.into_inner();

    tracing::Span::current().record("category_uuid", tracing::field::display(category));

    let category = state
        .app
        .categories
        .update_category(category.into(), json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(category.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use catalog_app::categories::{
        CategoriesServiceError, MockCategoriesService, records::CategoryUuid,
    };

    use crate::test_helpers::{categories_service, make_category};

    use super::*;

    fn make_service(repo: MockCategoriesService) -> Service {
        categories_service(repo, Router::with_path("categories/{category}").put(handler))
    }

    fn expect_update(
        uuid: CategoryUuid,
        result: Result<catalog_app::categories::records::CategoryRecord, CategoriesServiceError>,
    ) -> MockCategoriesService {
        let mut repo = MockCategoriesService::new();

        repo.expect_update_category()
            .once()
            .withf(move |u, update| {
                *u == uuid
                    && *update
                        == CategoryUpdate {
                            name: "Outdoor Lighting".to_owned(),
                            description: None,
                            version: 1,
                        }
            })
            .return_once(move |_, _| result);

        repo.expect_list_categories().never();
        repo.expect_get_category().never();
        repo.expect_get_category_with_products().never();
        repo.expect_create_category().never();
        repo.expect_delete_category().never();

        repo
    }

    #[tokio::test]
    async fn test_update_category_success() -> TestResult {
        let uuid = CategoryUuid::new();

        let mut updated = make_category(uuid);

        updated.name = "Outdoor Lighting".to_owned();
        updated.version = 2;

        let mut res = TestClient::put(format!("http://example.com/categories/{uuid}"))
            .json(&json!({ "name": "Outdoor Lighting", "version": 1 }))
            .send(&make_service(expect_update(uuid, Ok(updated))))
            .await;

        let body: CategoryResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.name, "Outdoor Lighting");
        assert_eq!(body.version, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_category_stale_version_returns_409() -> TestResult {
        let uuid = CategoryUuid::new();

        let res = TestClient::put(format!("http://example.com/categories/{uuid}"))
            .json(&json!({ "name": "Outdoor Lighting", "version": 1 }))
            .send(&make_service(expect_update(
                uuid,
                Err(CategoriesServiceError::Conflict),
            )))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
