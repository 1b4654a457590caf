use catalog_infra::ProductRecord;
use catalog_products::ProductFilter;

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn filters_to_json(filter: &ProductFilter) -> serde_json::Value {
    serde_json::json!({
        "category_id": filter.category_id,
        "min_price": filter.price.min,
        "max_price": filter.price.max,
        "limit": filter.page.limit,
        "offset": filter.page.offset,
    })
}

pub fn search_to_json(filter: &ProductFilter, products: Vec<ProductRecord>) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "count": products.len(),
        "products": products,
        "filters_applied": filters_to_json(filter),
    })
}

pub fn product_to_json(product: ProductRecord) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "product": product,
    })
}
