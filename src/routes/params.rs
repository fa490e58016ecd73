use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    CreatedAt,
    Price,
    Name,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub category_id: Option<i64>,
    pub store_id: Option<i64>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort_by: Option<ProductSortBy>,
    pub sort_order: Option<SortOrder>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    /// Page size, default 10, at most 100.
    pub limit: Option<i64>,
    /// 1-based page number.
    pub page: Option<i64>,
}

impl OrderListQuery {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    pub fn normalize(&self) -> (i64, i64, i64) {
        limit_window(self.page, self.limit, Self::DEFAULT_LIMIT, Self::MAX_LIMIT)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct StoreQuery {
    /// Case-insensitive substring match on the store name.
    pub name: Option<String>,
    /// Page size, default 10, at most 100.
    pub limit: Option<i64>,
    /// 1-based page number.
    pub page: Option<i64>,
}

impl StoreQuery {
    pub fn normalize(&self) -> (i64, i64, i64) {
        limit_window(
            self.page,
            self.limit,
            OrderListQuery::DEFAULT_LIMIT,
            OrderListQuery::MAX_LIMIT,
        )
    }
}

/// `(page, limit, offset)` for a `limit`/`page` query; non-positive limits
/// fall back to the default.
fn limit_window(page: Option<i64>, limit: Option<i64>, default: i64, max: i64) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = match limit {
        Some(limit) if limit > 0 => limit.min(max),
        _ => default,
    };
    (page, limit, (page - 1).saturating_mul(limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_query_defaults() {
        let (page, limit, offset) = OrderListQuery::default().normalize();
        assert_eq!((page, limit, offset), (1, 10, 0));
    }

    #[test]
    fn order_query_clamps_limit_and_page() {
        let query = OrderListQuery {
            limit: Some(500),
            page: Some(0),
        };
        assert_eq!(query.normalize(), (1, 100, 0));

        let query = OrderListQuery {
            limit: Some(-3),
            page: Some(3),
        };
        assert_eq!(query.normalize(), (3, 10, 20));
    }

    #[test]
    fn huge_page_saturates_offset() {
        let query = OrderListQuery {
            limit: Some(100),
            page: Some(i64::MAX),
        };
        assert_eq!(query.normalize(), (i64::MAX, 100, i64::MAX));

        let pagination = Pagination {
            page: Some(i64::MAX),
            per_page: Some(20),
        };
        let (_, _, offset) = pagination.normalize();
        assert_eq!(offset, i64::MAX);
    }

    #[test]
    fn store_query_shares_order_limits() {
        let query = StoreQuery {
            name: None,
            limit: Some(1000),
            page: Some(2),
        };
        assert_eq!(query.normalize(), (2, 100, 100));
    }

    #[test]
    fn pagination_offsets_by_page() {
        let pagination = Pagination {
            page: Some(2),
            per_page: Some(25),
        };
        assert_eq!(pagination.normalize(), (2, 25, 25));
    }
}
