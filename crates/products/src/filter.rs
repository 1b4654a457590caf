//! Filter resolution: raw search parameters -> validated product predicate.
//!
//! The resolver owns all parsing so that malformed input surfaces as a
//! `DomainError::Validation` naming the offending parameter, and so that the
//! resulting `ProductFilter` can be executed by any store without re-checking.

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use catalog_core::{CategoryId, DomainError, DomainResult};

use crate::product::{Price, Product};

/// Upper bound for `limit` unless configured otherwise.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 1000;

/// Raw search parameters as received from the query string.
///
/// Every field is kept as a string; empty or whitespace-only values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchParams {
    pub category_id: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Inclusive price bounds. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Option<Price>,
    pub max: Option<Price>,
}

impl PriceRange {
    pub fn contains(&self, price: Price) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Slice of the ordered result set. `limit: None` returns everything after `offset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Predicate over the product collection.
///
/// This is the single description of a search handed to a store; stores
/// compile it to SQL or evaluate it in memory via [`ProductFilter::matches`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    pub active_only: bool,
    pub category_id: Option<CategoryId>,
    pub price: PriceRange,
    pub page: Page,
}

impl ProductFilter {
    /// The unconstrained "all active products" predicate.
    pub fn active() -> Self {
        Self {
            active_only: true,
            category_id: None,
            price: PriceRange::default(),
            page: Page::default(),
        }
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_price_range(mut self, min: Option<Price>, max: Option<Price>) -> Self {
        self.price = PriceRange { min, max };
        self
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    /// Evaluate the row-level conditions (paging is applied by the caller).
    pub fn matches(&self, product: &Product) -> bool {
        if self.active_only && !product.is_active() {
            return false;
        }
        if let Some(category_id) = self.category_id {
            if product.category_id != category_id {
                return false;
            }
        }
        self.price.contains(product.price)
    }
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self::active()
    }
}

/// Turns [`SearchParams`] into a [`ProductFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterResolver {
    max_page_size: u32,
}

impl Default for FilterResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAGE_SIZE)
    }
}

impl FilterResolver {
    pub fn new(max_page_size: u32) -> Self {
        Self {
            max_page_size: max_page_size.max(1),
        }
    }

    pub fn resolve(&self, params: &SearchParams) -> DomainResult<ProductFilter> {
        let category_id = present(&params.category_id)
            .map(|raw| {
                CategoryId::from_str(raw)
                    .map_err(|_| DomainError::validation("category_id must be a positive integer"))
            })
            .transpose()?;

        let min = present(&params.min_price)
            .map(|raw| parse_price("min_price", raw))
            .transpose()?;
        let max = present(&params.max_price)
            .map(|raw| parse_price("max_price", raw))
            .transpose()?;

        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(DomainError::validation(
                    "min_price cannot be greater than max_price",
                ));
            }
        }

        let limit = present(&params.limit)
            .map(|raw| self.parse_limit(raw))
            .transpose()?;
        let offset = present(&params.offset)
            .map(|raw| {
                raw.parse::<u32>()
                    .map_err(|_| DomainError::validation("offset must be a non-negative integer"))
            })
            .transpose()?
            .unwrap_or(0);

        let mut filter = ProductFilter::active()
            .with_price_range(min, max)
            .with_page(Page { limit, offset });
        if let Some(category_id) = category_id {
            filter = filter.with_category(category_id);
        }
        Ok(filter)
    }

    fn parse_limit(&self, raw: &str) -> DomainResult<u32> {
        let invalid = || {
            DomainError::validation(format!(
                "limit must be an integer between 1 and {}",
                self.max_page_size
            ))
        };
        let limit = raw.parse::<u32>().map_err(|_| invalid())?;
        if limit == 0 || limit > self.max_page_size {
            return Err(invalid());
        }
        Ok(limit)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_price(field: &str, raw: &str) -> DomainResult<Price> {
    let invalid = || DomainError::validation(format!("{field} must be a valid non-negative amount"));
    let amount = Decimal::from_str(raw).map_err(|_| invalid())?;
    Price::new(amount).map_err(|_| invalid())
}
