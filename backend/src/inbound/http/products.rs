//! Public catalogue endpoints.
//!
//! ```text
//! GET /api/v1/products?brand=Seiko&condition=brand_new&page=1&limit=12
//! GET /api/v1/products/brands
//! GET /api/v1/products/{productId}
//! GET /api/v1/products/sku/{sku}
//! ```

use actix_web::{HttpResponse, get, web};

use crate::domain::{ApiResult, Error, ProductFilter};
use crate::inbound::http::dto::{Paged, ProductListQuery, ProductResponse};
use crate::inbound::http::envelope::{Envelope, ok};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_optional_field, parse_page, parse_product_id, parse_sku,
};

fn product_filter(query: &ProductListQuery) -> Result<ProductFilter, Error> {
    Ok(ProductFilter {
        brand: query
            .brand
            .as_deref()
            .map(str::trim)
            .filter(|brand| !brand.is_empty())
            .map(str::to_owned),
        condition: parse_optional_field(query.condition.as_deref(), FieldName::new("condition"))?,
        min_price: parse_optional_field(query.min_price.as_deref(), FieldName::new("minPrice"))?,
        max_price: parse_optional_field(query.max_price.as_deref(), FieldName::new("maxPrice"))?,
        search: query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_owned),
    })
}

/// List active products.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Page of products", body = Envelope<Paged<ProductResponse>>),
        (status = 400, description = "Invalid filter or paging", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["products"],
    operation_id = "listProducts",
    security([])
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    query: web::Query<ProductListQuery>,
) -> ApiResult<HttpResponse> {
    let page = parse_page(query.page, query.limit)?;
    let filter = product_filter(&query)?;
    let products = state.catalogue.list_products(filter, page).await?;
    Ok(ok(Paged::from_page(products, ProductResponse::from)))
}

/// Distinct brands of active products.
#[utoipa::path(
    get,
    path = "/api/v1/products/brands",
    responses(
        (status = 200, description = "Brand names", body = Envelope<Vec<String>>),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["products"],
    operation_id = "listBrands",
    security([])
)]
#[get("/products/brands")]
pub async fn list_brands(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    Ok(ok(state.catalogue.list_brands().await?))
}

/// Look up a product by SKU.
#[utoipa::path(
    get,
    path = "/api/v1/products/sku/{sku}",
    params(("sku" = String, Path, description = "Stock keeping unit")),
    responses(
        (status = 200, description = "Product", body = Envelope<ProductResponse>),
        (status = 400, description = "Malformed SKU", body = Error),
        (status = 404, description = "Unknown or inactive product", body = Error)
    ),
    tags = ["products"],
    operation_id = "getProductBySku",
    security([])
)]
#[get("/products/sku/{sku}")]
pub async fn get_product_by_sku(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let sku = parse_sku(&path, FieldName::new("sku"))?;
    let product = state.catalogue.get_product_by_sku(sku).await?;
    Ok(ok(ProductResponse::from(product)))
}

/// Look up a product by id.
#[utoipa::path(
    get,
    path = "/api/v1/products/{productId}",
    params(("productId" = String, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product", body = Envelope<ProductResponse>),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown or inactive product", body = Error)
    ),
    tags = ["products"],
    operation_id = "getProduct",
    security([])
)]
#[get("/products/{product_id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_product_id(&path, FieldName::new("productId"))?;
    let product = state.catalogue.get_product(id).await?;
    Ok(ok(ProductResponse::from(product)))
}

#[cfg(test)]
#[path = "products_tests.rs"]
mod tests;
