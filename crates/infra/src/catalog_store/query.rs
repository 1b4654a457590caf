//! Catalog SQL statements.
//!
//! Every statement selects products joined to their category in one query.
//! Optional filters are expressed as `$n IS NULL OR ...` so a single
//! parameterized statement covers every combination of constraints.

use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

use catalog_core::{CategoryId, ProductId};
use catalog_products::ProductFilter;

pub const SEARCH_PRODUCTS_SQL: &str = r#"
    SELECT
        p.id, p.sku, p.name, p.description, p.price, p.is_active, p.category_id, p.created_at,
        c.name AS category_name,
        c.description AS category_description,
        c.is_active AS category_is_active,
        c.created_at AS category_created_at
    FROM products p
    INNER JOIN categories c ON c.id = p.category_id
    WHERE ($1::boolean IS FALSE OR p.is_active = TRUE)
        AND ($2::bigint IS NULL OR p.category_id = $2)
        AND ($3::numeric IS NULL OR p.price >= $3)
        AND ($4::numeric IS NULL OR p.price <= $4)
    ORDER BY p.created_at DESC, p.id DESC
    LIMIT $5 OFFSET $6
"#;

pub const PRODUCT_BY_ID_SQL: &str = r#"
    SELECT
        p.id, p.sku, p.name, p.description, p.price, p.is_active, p.category_id, p.created_at,
        c.name AS category_name,
        c.description AS category_description,
        c.is_active AS category_is_active,
        c.created_at AS category_created_at
    FROM products p
    INNER JOIN categories c ON c.id = p.category_id
    WHERE p.id = $1
"#;

/// Bind values for [`SEARCH_PRODUCTS_SQL`], in parameter order.
///
/// `None` disables the matching condition; a `None` limit is `LIMIT NULL`,
/// which Postgres treats as no limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBinds {
    pub active_only: bool,
    pub category_id: Option<i64>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub limit: Option<i64>,
    pub offset: i64,
}

impl From<&ProductFilter> for SearchBinds {
    fn from(filter: &ProductFilter) -> Self {
        Self {
            active_only: filter.active_only,
            category_id: filter.category_id.map(CategoryId::get),
            min_price: filter.price.min.map(|p| p.amount()),
            max_price: filter.price.max.map(|p| p.amount()),
            limit: filter.page.limit.map(i64::from),
            offset: i64::from(filter.page.offset),
        }
    }
}

/// Search statement with `filter` bound.
pub fn search_query(filter: &ProductFilter) -> Query<'static, Postgres, PgArguments> {
    let binds = SearchBinds::from(filter);
    sqlx::query(SEARCH_PRODUCTS_SQL)
        .bind(binds.active_only)
        .bind(binds.category_id)
        .bind(binds.min_price)
        .bind(binds.max_price)
        .bind(binds.limit)
        .bind(binds.offset)
}

pub fn product_by_id_query(id: ProductId) -> Query<'static, Postgres, PgArguments> {
    sqlx::query(PRODUCT_BY_ID_SQL).bind(id.get())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    use catalog_products::{Page, Price};

    fn price(raw: &str) -> Price {
        Price::new(Decimal::from_str(raw).unwrap()).unwrap()
    }

    #[test]
    fn statements_join_categories_once() {
        for sql in [SEARCH_PRODUCTS_SQL, PRODUCT_BY_ID_SQL] {
            assert_eq!(sql.matches("INNER JOIN categories c ON c.id = p.category_id").count(), 1);
            assert!(sql.contains("c.name AS category_name"));
        }
        assert!(SEARCH_PRODUCTS_SQL.contains("ORDER BY p.created_at DESC, p.id DESC"));
    }

    #[test]
    fn unfiltered_search_binds_only_active_flag() {
        let binds = SearchBinds::from(&ProductFilter::active());
        assert_eq!(
            binds,
            SearchBinds {
                active_only: true,
                category_id: None,
                min_price: None,
                max_price: None,
                limit: None,
                offset: 0,
            }
        );
    }

    #[test]
    fn all_constraints_become_bind_values() {
        let filter = ProductFilter::active()
            .with_category(CategoryId::new(4).unwrap())
            .with_price_range(Some(price("10.50")), Some(price("99.99")))
            .with_page(Page { limit: Some(25), offset: 50 });

        let binds = SearchBinds::from(&filter);
        assert_eq!(binds.category_id, Some(4));
        assert_eq!(binds.min_price, Some(Decimal::from_str("10.50").unwrap()));
        assert_eq!(binds.max_price, Some(Decimal::from_str("99.99").unwrap()));
        assert_eq!(binds.limit, Some(25));
        assert_eq!(binds.offset, 50);

        // Values never end up in the statement text.
        assert!(!SEARCH_PRODUCTS_SQL.contains("99.99"));
    }

    #[test]
    fn single_price_bound_leaves_the_other_open() {
        let binds = SearchBinds::from(&ProductFilter::active().with_price_range(None, Some(price("30"))));
        assert_eq!(binds.min_price, None);
        assert_eq!(binds.max_price, Some(Decimal::from(30)));
    }
}
