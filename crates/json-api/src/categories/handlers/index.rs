//! Category Index Handler

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{categories::get::CategoryResponse, extensions::*};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CategoriesResponse {
    pub categories: Vec<CategoryResponse>,
}

/// Category Index Handler
///
/// Returns every category.
#[endpoint(tags("categories"), summary = "List Categories")]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CategoriesResponse>, StatusError> {
    let state = depot.state_or_500()?;

    let categories = state
        .app
        .categories
        .list_categories()
        .await
        .or_500("failed to fetch categories")?;

    Ok(Json(CategoriesResponse {
        categories: categories.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use catalog_app::categories::{MockCategoriesService, records::CategoryUuid};

    use crate::test_helpers::{categories_service, make_category};

    use super::*;

    #[tokio::test]
    async fn test_index_returns_categories() -> TestResult {
        let first = CategoryUuid::new();
        let second = CategoryUuid::new();

        let mut repo = MockCategoriesService::new();

        repo.expect_list_categories()
            .once()
            .return_once(move || Ok(vec![make_category(first), make_category(second)]));

        repo.expect_get_category().never();
        repo.expect_get_category_with_products().never();
        repo.expect_create_category().never();
        repo.expect_update_category().never();
        repo.expect_delete_category().never();

        let response: CategoriesResponse = TestClient::get("http://example.com/categories")
            .send(&categories_service(
                repo,
                Router::with_path("categories").get(handler),
            ))
            .await
            .take_json()
            .await?;

        let uuids: Vec<_> = response.categories.iter().map(|c| c.uuid).collect();

        assert_eq!(uuids, vec![first.into_uuid(), second.into_uuid()]);

        Ok(())
    }
}
