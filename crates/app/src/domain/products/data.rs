//! Products Data

use rust_decimal::Decimal;

use crate::domain::{categories::records::CategoryUuid, products::records::ProductUuid};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub inventory_level: i32,
    pub category_uuid: CategoryUuid,
    pub image_url: Option<String>,
}

/// Product Update Data
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub inventory_level: i32,
    pub category_uuid: CategoryUuid,
    pub image_url: Option<String>,

    /// Version the caller last read.
    pub version: i64,
}

/// Product listing filter. Unset fields do not constrain the result.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFilter {
    /// Case-insensitive substring of the product name.
    pub name: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub category: Option<CategoryUuid>,

    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
}

impl ProductFilter {
    pub(crate) fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page.max(1) - 1) * i64::from(self.page_size)
    }
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            name: None,
            min_price: None,
            max_price: None,
            category: None,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_starts_at_first_page() {
        let filter = ProductFilter::default();

        assert_eq!(filter.offset(), 0);
        assert_eq!(filter.limit(), 10);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let filter = ProductFilter {
            page: 3,
            page_size: 25,
            ..ProductFilter::default()
        };

        assert_eq!(filter.offset(), 50);
    }

    #[test]
    fn page_zero_is_treated_as_first_page() {
        let filter = ProductFilter {
            page: 0,
            ..ProductFilter::default()
        };

        assert_eq!(filter.offset(), 0);
    }
}
