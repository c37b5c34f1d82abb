//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::{affix_state::inject, prelude::*};

use catalog_app::{
    categories::{
        MockCategoriesService,
        records::{CategoryRecord, CategoryUuid},
    },
    context::AppContext,
    imports::MockImportsService,
    products::{
        MockProductsService,
        records::{ProductRecord, ProductUuid},
    },
};

use crate::state::State;

pub(crate) const TEST_IMPORT_MAX_BYTES: usize = 4 * 1024;

pub(crate) fn strict_products_mock() -> MockProductsService {
    let mut products = MockProductsService::new();

    products.expect_list_products().never();
    products.expect_get_product().never();
    products.expect_create_product().never();
    products.expect_update_product().never();
    products.expect_delete_product().never();

    products
}

pub(crate) fn strict_categories_mock() -> MockCategoriesService {
    let mut categories = MockCategoriesService::new();

    categories.expect_list_categories().never();
    categories.expect_get_category().never();
    categories.expect_get_category_with_products().never();
    categories.expect_create_category().never();
    categories.expect_update_category().never();
    categories.expect_delete_category().never();

    categories
}

pub(crate) fn strict_imports_mock() -> MockImportsService {
    let mut imports = MockImportsService::new();

    imports.expect_import_products().never();

    imports
}

fn service(
    products: MockProductsService,
    categories: MockCategoriesService,
    imports: MockImportsService,
    route: Router,
) -> Service {
    let app = AppContext {
        products: Arc::new(products),
        categories: Arc::new(categories),
        imports: Arc::new(imports),
    };

    Service::new(
        Router::new()
            .hoop(inject(State::shared(app, TEST_IMPORT_MAX_BYTES)))
            .push(route),
    )
}

pub(crate) fn products_service(products: MockProductsService, route: Router) -> Service {
    service(
        products,
        strict_categories_mock(),
        strict_imports_mock(),
        route,
    )
}

pub(crate) fn categories_service(categories: MockCategoriesService, route: Router) -> Service {
    service(
        strict_products_mock(),
        categories,
        strict_imports_mock(),
        route,
    )
}

pub(crate) fn imports_service(imports: MockImportsService, route: Router) -> Service {
    service(
        strict_products_mock(),
        strict_categories_mock(),
        imports,
        route,
    )
}

pub(crate) fn make_product(uuid: ProductUuid) -> ProductRecord {
    ProductRecord {
        uuid,
        name: "Desk Lamp".to_owned(),
        description: None,
        price: Decimal::new(1999, 2),
        inventory_level: 5,
        category_uuid: CategoryUuid::nil(),
        image_url: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: None,
        version: 1,
    }
}

pub(crate) fn make_category(uuid: CategoryUuid) -> CategoryRecord {
    CategoryRecord {
        uuid,
        name: "Lighting".to_owned(),
        description: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: None,
        version: 1,
    }
}
