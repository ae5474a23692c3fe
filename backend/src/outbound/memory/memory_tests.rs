//! Regression coverage for the in-memory adapter.

use rstest::{fixture, rstest};

use super::*;
use crate::domain::test_fixtures::{fixture_now, placed_order, product, qty};
use crate::domain::{PaymentMethod, PaymentRecordStatus};

struct Seeded {
    store: InMemoryStore,
    product: Product,
    user: UserId,
}

#[fixture]
fn seeded() -> Seeded {
    let product = product(1_000, 5);
    Seeded {
        store: InMemoryStore::with_products([product.clone()]),
        product,
        user: UserId::random(),
    }
}

async fn stock_of(store: &InMemoryStore, id: &ProductId) -> u32 {
    ProductRepository::find_by_id(store, id)
        .await
        .expect("lookup succeeds")
        .expect("product exists")
        .quantity_on_hand
}

#[rstest]
#[tokio::test]
async fn placement_reserves_stock_and_clears_cart(seeded: Seeded) {
    let Seeded {
        store,
        product,
        user,
    } = seeded;
    store
        .upsert_line(&CartLine::new(user, &product, qty(2), fixture_now()))
        .await
        .expect("cart line stored");
    let order = placed_order(user, &product, 2, PaymentMethod::CashOnDelivery);

    store
        .place(&OrderPlacement {
            order: order.clone(),
            payment: None,
            cart_products: vec![product.id],
        })
        .await
        .expect("placement succeeds");

    assert_eq!(stock_of(&store, &product.id).await, 3);
    assert!(store.lines_for_user(&user).await.expect("cart read").is_empty());
    let stored = OrderRepository::find_by_id(&store, &order.id)
        .await
        .expect("order read");
    assert_eq!(stored, Some(order));
}

#[rstest]
#[tokio::test]
async fn placement_keeps_cart_lines_it_did_not_order(seeded: Seeded) {
    let Seeded {
        store,
        product,
        user,
    } = seeded;
    let late = crate::domain::test_fixtures::product(2_000, 1);
    store.seed(&[late.clone()]).expect("seeded");
    for item in [&product, &late] {
        store
            .upsert_line(&CartLine::new(user, item, qty(1), fixture_now()))
            .await
            .expect("cart line stored");
    }
    let order = placed_order(user, &product, 1, PaymentMethod::CashOnDelivery);

    store
        .place(&OrderPlacement {
            order,
            payment: None,
            cart_products: vec![product.id],
        })
        .await
        .expect("placement succeeds");

    let remaining = store.lines_for_user(&user).await.expect("cart read");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].product_id, late.id);
}

#[rstest]
#[tokio::test]
async fn insufficient_stock_changes_nothing(seeded: Seeded) {
    let Seeded {
        store,
        product,
        user,
    } = seeded;
    let order = placed_order(user, &product, 6, PaymentMethod::CashOnDelivery);

    let error = store
        .place(&OrderPlacement {
            order: order.clone(),
            payment: None,
            cart_products: Vec::new(),
        })
        .await
        .expect_err("placement must fail");

    assert_eq!(
        error,
        OrderRepositoryError::insufficient_stock(product.id, 6_u32, 5_u32)
    );
    assert_eq!(stock_of(&store, &product.id).await, 5);
    let stored = OrderRepository::find_by_id(&store, &order.id)
        .await
        .expect("order read");
    assert!(stored.is_none());
}

#[rstest]
#[tokio::test]
async fn inactive_products_are_unavailable(seeded: Seeded) {
    let Seeded {
        store,
        product,
        user,
    } = seeded;
    store
        .set_active(&product.id, false, fixture_now())
        .await
        .expect("toggle succeeds");
    let order = placed_order(user, &product, 1, PaymentMethod::CashOnDelivery);

    let error = store
        .place(&OrderPlacement {
            order,
            payment: None,
            cart_products: Vec::new(),
        })
        .await
        .expect_err("placement must fail");

    assert_eq!(error, OrderRepositoryError::product_unavailable(product.id));
}

#[rstest]
#[tokio::test]
async fn stale_revision_is_rejected(seeded: Seeded) {
    let Seeded {
        store,
        product,
        user,
    } = seeded;
    let order = placed_order(user, &product, 1, PaymentMethod::CashOnDelivery);
    store
        .place(&OrderPlacement {
            order: order.clone(),
            payment: None,
            cart_products: Vec::new(),
        })
        .await
        .expect("placement succeeds");
    let cancelled = order.cancel(None, fixture_now()).expect("cancellable");

    let error = store
        .update(&OrderUpdate {
            order: cancelled,
            expected_revision: order.revision + 1,
            restock: true,
            payments: Vec::new(),
        })
        .await
        .expect_err("stale update must fail");

    assert_eq!(
        error,
        OrderRepositoryError::revision_mismatch(order.id, order.revision + 1)
    );
    assert_eq!(stock_of(&store, &product.id).await, 4);
}

#[rstest]
#[tokio::test]
async fn restocking_update_returns_units(seeded: Seeded) {
    let Seeded {
        store,
        product,
        user,
    } = seeded;
    let order = placed_order(user, &product, 2, PaymentMethod::CashOnDelivery);
    store
        .place(&OrderPlacement {
            order: order.clone(),
            payment: None,
            cart_products: Vec::new(),
        })
        .await
        .expect("placement succeeds");

    store
        .update(&OrderUpdate {
            order: order.cancel(None, fixture_now()).expect("cancellable"),
            expected_revision: order.revision,
            restock: true,
            payments: Vec::new(),
        })
        .await
        .expect("update succeeds");

    assert_eq!(stock_of(&store, &product.id).await, 5);
}

#[rstest]
#[tokio::test]
async fn payment_references_are_unique(seeded: Seeded) {
    let Seeded { store, product, user } = seeded;
    let order = placed_order(user, &product, 1, PaymentMethod::CardGatewayA);
    let first = PaymentRecord::for_gateway(
        &order,
        crate::domain::Gateway::CardGatewayA,
        "TXN-1",
        fixture_now(),
    );
    store.upsert(&first).await.expect("first insert");
    let replay = PaymentRecord {
        status: PaymentRecordStatus::Completed,
        ..first.clone()
    };
    store.upsert(&replay).await.expect("same id updates in place");
    let rival = PaymentRecord::for_gateway(
        &order,
        crate::domain::Gateway::CardGatewayA,
        "TXN-1",
        fixture_now(),
    );

    let error = store.upsert(&rival).await.expect_err("duplicate reference");

    assert_eq!(error, PaymentRepositoryError::duplicate_reference("TXN-1"));
    let records = store.find_by_order(&order.id).await.expect("ledger read");
    assert_eq!(records.len(), 1);
    assert_eq!(
        records.first().map(|r| r.status),
        Some(PaymentRecordStatus::Completed)
    );
}

#[rstest]
#[tokio::test]
async fn stock_adjustment_never_goes_negative(seeded: Seeded) {
    let Seeded { store, product, .. } = seeded;

    let error = store
        .adjust_stock(&product.id, -6, fixture_now())
        .await
        .expect_err("would go negative");

    assert_eq!(
        error,
        ProductRepositoryError::insufficient_stock(product.id, 5_u32)
    );
    let restocked = store
        .adjust_stock(&product.id, 3, fixture_now())
        .await
        .expect("increment succeeds");
    assert_eq!(restocked.map(|p| p.quantity_on_hand), Some(8));
}

#[rstest]
#[tokio::test]
async fn seeding_skips_known_skus(seeded: Seeded) {
    let Seeded { store, product, .. } = seeded;
    let fresh = crate::domain::test_fixtures::product(2_500, 1);

    let added = store
        .seed(&[product.clone(), fresh.clone()])
        .expect("seed succeeds");

    assert_eq!(added, 1);
    let brands = store.list_brands().await.expect("brands read");
    assert_eq!(brands, vec!["Seiko".to_owned()]);
}

#[rstest]
fn demo_catalogue_is_valid() {
    let catalogue = demo_catalogue(fixture_now()).expect("demo SKUs are valid");
    assert!(!catalogue.is_empty());
    assert!(catalogue.iter().all(|p| p.is_active));
}

#[rstest]
#[tokio::test]
async fn skus_stay_unique_across_products(seeded: Seeded) {
    let Seeded { store, product, .. } = seeded;
    let mut clash = crate::domain::test_fixtures::product(500, 1);
    clash.sku = product.sku.clone();

    let error = store.insert(&clash).await.expect_err("duplicate sku");
    assert_eq!(
        error,
        ProductRepositoryError::duplicate_sku(product.sku.as_str())
    );

    let other = crate::domain::test_fixtures::product(500, 1);
    store.insert(&other).await.expect("distinct sku stored");
    let details = ProductDetails::new(
        product.sku.clone(),
        "Renamed",
        "Seiko",
        other.condition,
        other.price,
    )
    .expect("valid details");
    let error = store
        .update_details(&other.id, &details, fixture_now())
        .await
        .expect_err("sku belongs to another product");
    assert!(matches!(error, ProductRepositoryError::DuplicateSku { .. }));
}

#[rstest]
#[tokio::test]
async fn detail_updates_leave_stock_alone(seeded: Seeded) {
    let Seeded { store, product, .. } = seeded;
    let details = ProductDetails::new(
        product.sku.clone(),
        "Seiko Presage",
        "Seiko",
        product.condition,
        crate::domain::Money::from_minor(4_200),
    )
    .expect("valid details");

    let updated = store
        .update_details(&product.id, &details, fixture_now())
        .await
        .expect("update succeeds")
        .expect("product exists");

    assert_eq!(updated.name, "Seiko Presage");
    assert_eq!(updated.quantity_on_hand, product.quantity_on_hand);
    assert!(
        store
            .update_details(&ProductId::random(), &details, fixture_now())
            .await
            .expect("lookup succeeds")
            .is_none()
    );
}
