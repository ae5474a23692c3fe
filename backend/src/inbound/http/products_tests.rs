//! Tests for the public catalogue endpoints.

use actix_web::http::StatusCode;
use actix_web::{App, test};
use rstest::{fixture, rstest};
use serde_json::Value;

use crate::Trace;
use crate::domain::Product;
use crate::test_support::{TestStorefront, product};

struct Catalogue {
    shop: TestStorefront,
    seiko: Product,
    hidden: Product,
}

#[fixture]
fn catalogue() -> Catalogue {
    let seiko = product("SEI-SRPD55", "895.00", 4).expect("valid product");
    let mut casio = product("CAS-GA2100", "320.00", 9).expect("valid product");
    casio.brand = "Casio".to_owned();
    casio.name = "G-Shock GA-2100".to_owned();
    let mut hidden = product("SEI-HIDDEN", "100.00", 1).expect("valid product");
    hidden.is_active = false;
    let shop = TestStorefront::new([seiko.clone(), casio, hidden.clone()]);
    Catalogue {
        shop,
        seiko,
        hidden,
    }
}

async fn get_json(shop: &TestStorefront, uri: &str) -> (StatusCode, Value) {
    let app = test::init_service(App::new().wrap(Trace).configure(|cfg| shop.register(cfg))).await;
    let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    let status = res.status();
    (status, test::read_body_json(res).await)
}

fn skus(body: &Value) -> Vec<String> {
    body.pointer("/data/items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("sku").and_then(Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

#[rstest]
#[actix_web::test]
async fn listing_hides_inactive_products(catalogue: Catalogue) {
    let (status, body) = get_json(&catalogue.shop, "/api/v1/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.pointer("/success"), Some(&Value::Bool(true)));
    let mut found = skus(&body);
    found.sort();
    assert_eq!(found, vec!["CAS-GA2100", "SEI-SRPD55"]);
    assert_eq!(
        body.pointer("/data/pagination/total").and_then(Value::as_u64),
        Some(2)
    );
}

#[rstest]
#[case("/api/v1/products?brand=Casio", vec!["CAS-GA2100"])]
#[case("/api/v1/products?search=srpd", vec!["SEI-SRPD55"])]
#[case("/api/v1/products?minPrice=500", vec!["SEI-SRPD55"])]
#[case("/api/v1/products?maxPrice=320.00&condition=brand_new", vec!["CAS-GA2100"])]
#[actix_web::test]
async fn listing_applies_filters(
    catalogue: Catalogue,
    #[case] uri: &str,
    #[case] expected: Vec<&str>,
) {
    let (status, body) = get_json(&catalogue.shop, uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(skus(&body), expected);
}

#[rstest]
#[case("/api/v1/products?limit=0", "limit")]
#[case("/api/v1/products?condition=mint", "condition")]
#[case("/api/v1/products?minPrice=abc", "minPrice")]
#[actix_web::test]
async fn bad_filters_are_rejected(
    catalogue: Catalogue,
    #[case] uri: &str,
    #[case] field: &str,
) {
    let (status, body) = get_json(&catalogue.shop, uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.pointer("/success"), Some(&Value::Bool(false)));
    assert_eq!(
        body.pointer("/error/details/field").and_then(Value::as_str),
        Some(field)
    );
}

#[rstest]
#[actix_web::test]
async fn products_are_found_by_id_and_sku(catalogue: Catalogue) {
    let by_id = format!("/api/v1/products/{}", catalogue.seiko.id);
    let (status, body) = get_json(&catalogue.shop, &by_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body.pointer("/data/price").and_then(Value::as_str),
        Some("895.00")
    );

    let (status, body) = get_json(&catalogue.shop, "/api/v1/products/sku/SEI-SRPD55").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body.pointer("/data/id").and_then(Value::as_str),
        Some(catalogue.seiko.id.to_string().as_str())
    );
}

#[rstest]
#[actix_web::test]
async fn inactive_products_are_not_found(catalogue: Catalogue) {
    let uri = format!("/api/v1/products/{}", catalogue.hidden.id);

    let (status, body) = get_json(&catalogue.shop, &uri).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body.pointer("/error/code").and_then(Value::as_str),
        Some("not_found")
    );
}

#[rstest]
#[actix_web::test]
async fn malformed_ids_are_rejected_before_lookup(catalogue: Catalogue) {
    let (status, body) = get_json(&catalogue.shop, "/api/v1/products/not-a-uuid").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.pointer("/error/details/code").and_then(Value::as_str),
        Some("invalid_uuid")
    );
}

#[rstest]
#[actix_web::test]
async fn brands_are_listed(catalogue: Catalogue) {
    let (status, body) = get_json(&catalogue.shop, "/api/v1/products/brands").await;

    assert_eq!(status, StatusCode::OK);
    let brands: Vec<&str> = body
        .pointer("/data")
        .and_then(Value::as_array)
        .map(|values| values.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    assert_eq!(brands, vec!["Casio", "Seiko"]);
}
