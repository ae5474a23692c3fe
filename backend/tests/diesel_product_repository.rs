//! Integration tests for `DieselProductRepository`.
//!
//! Exercises the stock guard and SKU uniqueness against the migrated schema.

use chrono::Utc;
use rstest::{fixture, rstest};
use storefront::domain::ports::{ProductRepository, ProductRepositoryError};
use storefront::domain::{Money, Product, ProductCondition, ProductDetails, ProductId, Sku};
use storefront::outbound::persistence::DieselProductRepository;
use storefront::test_support::product;

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use embedded_postgres::{Database, handle_cluster_setup_failure, setup_database};

struct TestContext {
    products: DieselProductRepository,
    watch: Product,
    diver: Product,
    database: Database,
}

fn setup_context() -> Result<TestContext, String> {
    let database = setup_database(2)?;
    let products = DieselProductRepository::new(database.pool.clone());
    let watch = product("CIT-NJ0150", "240.00", 2).map_err(|err| err.to_string())?;
    let diver = product("SEI-SPB143", "1100.00", 1).map_err(|err| err.to_string())?;
    database
        .runtime
        .block_on(products.seed(&[watch.clone(), diver.clone()]))
        .map_err(|err| err.to_string())?;
    Ok(TestContext {
        products,
        watch,
        diver,
        database,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn details(sku: &str, name: &str) -> ProductDetails {
    ProductDetails::new(
        Sku::new(sku).expect("valid sku"),
        name,
        "Citizen",
        ProductCondition::PreOwned,
        Money::from_minor(19_500),
    )
    .expect("valid details")
}

#[rstest]
fn stock_never_drops_below_zero(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: stock_never_drops_below_zero skipped");
        return;
    };
    let TestContext {
        products,
        watch,
        database,
        ..
    } = context;

    database.runtime.block_on(async {
        let error = products
            .adjust_stock(&watch.id, -3, Utc::now())
            .await
            .expect_err("only two on hand");
        assert_eq!(error, ProductRepositoryError::insufficient_stock(watch.id, 2_u32));

        let drained = products
            .adjust_stock(&watch.id, -2, Utc::now())
            .await
            .expect("adjustment succeeds")
            .expect("product exists");
        assert_eq!(drained.quantity_on_hand, 0);

        let restocked = products
            .adjust_stock(&watch.id, 7, Utc::now())
            .await
            .expect("adjustment succeeds")
            .expect("product exists");
        assert_eq!(restocked.quantity_on_hand, 7);

        assert!(
            products
                .adjust_stock(&ProductId::random(), 1, Utc::now())
                .await
                .expect("lookup succeeds")
                .is_none()
        );
    });
}

#[rstest]
fn inserting_a_taken_sku_is_rejected(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: inserting_a_taken_sku_is_rejected skipped");
        return;
    };

    context.database.runtime.block_on(async {
        let fresh = Product::create(details("CIT-BN0150", "Promaster"), 3, true, Utc::now());
        context.products.insert(&fresh).await.expect("insert succeeds");
        let stored = context
            .products
            .find_by_sku(&fresh.sku)
            .await
            .expect("lookup succeeds")
            .expect("product stored");
        assert_eq!(stored.id, fresh.id);
        assert_eq!(stored.quantity_on_hand, 3);

        let clash = Product::create(details("CIT-NJ0150", "Tsuyosa"), 1, true, Utc::now());
        let error = context
            .products
            .insert(&clash)
            .await
            .expect_err("sku taken");
        assert_eq!(error, ProductRepositoryError::duplicate_sku("CIT-NJ0150"));
    });
}

#[rstest]
fn detail_updates_keep_stock_and_guard_skus(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: detail_updates_keep_stock_and_guard_skus skipped");
        return;
    };

    context.database.runtime.block_on(async {
        let renamed = context
            .products
            .update_details(&context.watch.id, &details("CIT-NJ0150", "Tsuyosa"), Utc::now())
            .await
            .expect("update succeeds")
            .expect("product exists");
        assert_eq!(renamed.name, "Tsuyosa");
        assert_eq!(renamed.brand, "Citizen");
        assert_eq!(renamed.price, Money::from_minor(19_500));
        assert_eq!(renamed.quantity_on_hand, 2);

        let error = context
            .products
            .update_details(&context.watch.id, &details("SEI-SPB143", "Tsuyosa"), Utc::now())
            .await
            .expect_err("sku belongs to the diver");
        assert_eq!(error, ProductRepositoryError::duplicate_sku("SEI-SPB143"));
        let diver = context
            .products
            .find_by_id(&context.diver.id)
            .await
            .expect("lookup succeeds")
            .expect("product exists");
        assert_eq!(diver.name, context.diver.name);

        assert!(
            context
                .products
                .update_details(&ProductId::random(), &details("CIT-AW1750", "Eco"), Utc::now())
                .await
                .expect("update runs")
                .is_none()
        );
    });
}
