//! Tests for the catalogue service.

use std::sync::Arc;

use pagination::{Page, PageRequest};
use rstest::rstest;

use super::*;
use crate::domain::ports::{MockProductRepository, NewProduct, ProductRepositoryError};
use crate::domain::{ErrorCode, Money, ProductCondition};
use crate::domain::test_fixtures::{fixture_clock, fixture_now, product};
use crate::domain::UserId;

fn make_service(repo: MockProductRepository) -> CatalogueService<MockProductRepository> {
    CatalogueService::new(Arc::new(repo), fixture_clock())
}

#[tokio::test]
async fn get_product_returns_active_product() {
    let item = product(1_000, 5);
    let id = item.id;
    let mut repo = MockProductRepository::new();
    let found = item.clone();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(found)));

    let fetched = make_service(repo).get_product(id).await.expect("product");
    assert_eq!(fetched, item);
}

#[tokio::test]
async fn inactive_products_are_hidden_from_reads() {
    let mut item = product(1_000, 5);
    item.is_active = false;
    let id = item.id;
    let mut repo = MockProductRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(item)));

    let error = make_service(repo).get_product(id).await.expect_err("hidden");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn list_products_passes_filter_through() {
    let item = product(2_500, 1);
    let mut repo = MockProductRepository::new();
    let listed = vec![item.clone()];
    repo.expect_list()
        .withf(|filter, _| filter.brand.as_deref() == Some("Seiko"))
        .times(1)
        .return_once(move |_, request| Ok(Page::new(listed, 1, *request)));

    let filter = ProductFilter {
        brand: Some("Seiko".to_owned()),
        ..ProductFilter::default()
    };
    let page = make_service(repo)
        .list_products(filter, PageRequest::default())
        .await
        .expect("page");
    assert_eq!(page.items(), &[item]);
    assert_eq!(page.total(), 1);
}

#[tokio::test]
async fn adjust_stock_requires_operator() {
    let repo = MockProductRepository::new();
    let error = make_service(repo)
        .adjust_stock(&Actor::customer(UserId::random()), ProductId::random(), 3)
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn adjust_stock_uses_the_clock() {
    let mut item = product(1_000, 8);
    let id = item.id;
    item.updated_at = fixture_now();
    let mut repo = MockProductRepository::new();
    repo.expect_adjust_stock()
        .withf(move |candidate, delta, now| *candidate == id && *delta == 3 && *now == fixture_now())
        .times(1)
        .return_once(move |_, _, _| Ok(Some(item)));

    let adjusted = make_service(repo)
        .adjust_stock(&Actor::operator(UserId::random()), id, 3)
        .await
        .expect("adjusted");
    assert_eq!(adjusted.quantity_on_hand, 8);
}

#[rstest]
#[case(ProductRepositoryError::insufficient_stock(ProductId::random(), 2_u32), ErrorCode::Conflict)]
#[case(ProductRepositoryError::connection("down"), ErrorCode::ServiceUnavailable)]
#[tokio::test]
async fn adjust_stock_maps_repository_errors(
    #[case] failure: ProductRepositoryError,
    #[case] code: ErrorCode,
) {
    let mut repo = MockProductRepository::new();
    repo.expect_adjust_stock()
        .times(1)
        .return_once(move |_, _, _| Err(failure));

    let error = make_service(repo)
        .adjust_stock(&Actor::operator(UserId::random()), ProductId::random(), -5)
        .await
        .expect_err("failure");
    assert_eq!(error.code(), code);
}

#[tokio::test]
async fn set_active_reports_unknown_products() {
    let mut repo = MockProductRepository::new();
    repo.expect_set_active()
        .times(1)
        .return_once(|_, _, _| Ok(None));

    let error = make_service(repo)
        .set_active(&Actor::operator(UserId::random()), ProductId::random(), false)
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

fn watch_details() -> ProductDetails {
    ProductDetails::new(
        Sku::new("sei-srpd55").expect("valid sku"),
        "Seiko 5 Sports",
        "Seiko",
        ProductCondition::BrandNew,
        Money::from_minor(18_000),
    )
    .expect("valid details")
}

fn new_watch() -> NewProduct {
    NewProduct {
        details: watch_details(),
        quantity_on_hand: 4,
        is_active: true,
    }
}

#[tokio::test]
async fn create_product_requires_operator() {
    let mut repo = MockProductRepository::new();
    repo.expect_insert().never();
    let error = make_service(repo)
        .create_product(&Actor::customer(UserId::random()), new_watch())
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn create_product_stamps_the_clock() {
    let mut repo = MockProductRepository::new();
    repo.expect_insert()
        .withf(|product| {
            product.sku.as_str() == "SEI-SRPD55"
                && product.quantity_on_hand == 4
                && product.created_at == fixture_now()
                && product.updated_at == fixture_now()
        })
        .times(1)
        .return_once(|_| Ok(()));

    let created = make_service(repo)
        .create_product(&Actor::operator(UserId::random()), new_watch())
        .await
        .expect("created");
    assert!(created.is_active);
    assert_eq!(created.price, Money::from_minor(18_000));
}

#[tokio::test]
async fn duplicate_skus_conflict() {
    let mut repo = MockProductRepository::new();
    repo.expect_insert()
        .times(1)
        .return_once(|product| Err(ProductRepositoryError::duplicate_sku(product.sku.as_str())));

    let error = make_service(repo)
        .create_product(&Actor::operator(UserId::random()), new_watch())
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::Conflict);
    let details = error.details().expect("details attached");
    assert_eq!(details["sku"], "SEI-SRPD55");
}

#[tokio::test]
async fn update_product_reports_unknown_products() {
    let mut repo = MockProductRepository::new();
    repo.expect_update_details()
        .withf(|_, _, now| *now == fixture_now())
        .times(1)
        .return_once(|_, _, _| Ok(None));

    let error = make_service(repo)
        .update_product(
            &Actor::operator(UserId::random()),
            ProductId::random(),
            watch_details(),
        )
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_product_hides_it() {
    let mut item = product(1_000, 2);
    item.is_active = false;
    let id = item.id;
    let mut repo = MockProductRepository::new();
    repo.expect_set_active()
        .withf(move |candidate, active, _| *candidate == id && !*active)
        .times(1)
        .return_once(move |_, _, _| Ok(Some(item)));

    let hidden = make_service(repo)
        .delete_product(&Actor::operator(UserId::random()), id)
        .await
        .expect("hidden");
    assert!(!hidden.is_active);
}
