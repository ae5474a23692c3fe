//! Integration tests for `DieselOrderRepository`.
//!
//! Runs placement and lifecycle updates against embedded PostgreSQL so the
//! transactional guarantees are checked on the real schema.

use chrono::Utc;
use futures::future::join_all;
use rstest::{fixture, rstest};
use storefront::domain::ports::{
    CartRepository, OrderPlacement, OrderRepository, OrderRepositoryError, OrderUpdate,
    PaymentRepository, ProductRepository,
};
use storefront::domain::{
    CartLine, Money, Order, OrderDraft, OrderLine, OrderStatus, PaymentMethod, PaymentRecord,
    Product, ProductId, Quantity, ShippingAddress, UserId,
};
use storefront::outbound::persistence::{
    DieselCartRepository, DieselOrderRepository, DieselPaymentRepository, DieselProductRepository,
};
use storefront::test_support::product;

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use embedded_postgres::{Database, handle_cluster_setup_failure, setup_database};

struct TestContext {
    orders: DieselOrderRepository,
    products: DieselProductRepository,
    carts: DieselCartRepository,
    payments: DieselPaymentRepository,
    watch: Product,
    strap: Product,
    database: Database,
}

fn setup_context() -> Result<TestContext, String> {
    let database = setup_database(8)?;
    let pool = database.pool.clone();
    let products = DieselProductRepository::new(pool.clone());
    let watch = product("SEI-SRPD55", "180.00", 5).map_err(|err| err.to_string())?;
    let strap = product("BND-NATO-20", "15.00", 1).map_err(|err| err.to_string())?;
    database
        .runtime
        .block_on(products.seed(&[watch.clone(), strap.clone()]))
        .map_err(|err| err.to_string())?;
    Ok(TestContext {
        orders: DieselOrderRepository::new(pool.clone()),
        products,
        carts: DieselCartRepository::new(pool.clone()),
        payments: DieselPaymentRepository::new(pool),
        watch,
        strap,
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

fn order_for(user_id: UserId, items: &[(&Product, u32)], payment_method: PaymentMethod) -> Order {
    let lines = items
        .iter()
        .map(|(item, quantity)| {
            let quantity = Quantity::new(*quantity).expect("valid quantity");
            OrderLine::new(item.id, quantity, item.price).expect("valid line")
        })
        .collect();
    Order::place(
        OrderDraft {
            user_id,
            lines,
            payment_method,
            shipping: ShippingAddress::new("12 Temple Road", "Kandy", "Central", "20000")
                .expect("valid address"),
            payment_proof: payment_method
                .requires_manual_proof()
                .then(|| "SLIP-100".to_owned()),
            notes: None,
        },
        Utc::now(),
    )
    .expect("valid order")
}

async fn stock(products: &DieselProductRepository, id: &ProductId) -> u32 {
    ProductRepository::find_by_id(products, id)
        .await
        .expect("product read")
        .expect("product exists")
        .quantity_on_hand
}

#[rstest]
fn insufficient_stock_rolls_back_every_write(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: insufficient_stock_rolls_back_every_write skipped");
        return;
    };
    let TestContext {
        orders,
        products,
        carts,
        payments,
        watch,
        strap,
        database,
    } = context;
    let user = UserId::random();

    database.runtime.block_on(async {
        for (item, quantity) in [(&watch, 2), (&strap, 3)] {
            let quantity = Quantity::new(quantity).expect("valid quantity");
            carts
                .upsert_line(&CartLine::new(user, item, quantity, Utc::now()))
                .await
                .expect("cart line stored");
        }
        let order = order_for(user, &[(&watch, 2), (&strap, 3)], PaymentMethod::BankTransfer);
        let proof = PaymentRecord::for_manual_proof(&order, "SLIP-100", Utc::now());

        let error = orders
            .place(&OrderPlacement {
                order: order.clone(),
                payment: Some(proof),
                cart_products: vec![watch.id, strap.id],
            })
            .await
            .expect_err("strap is short");

        assert_eq!(
            error,
            OrderRepositoryError::insufficient_stock(strap.id, 3_u32, 1_u32)
        );
        assert_eq!(stock(&products, &watch.id).await, 5);
        assert_eq!(stock(&products, &strap.id).await, 1);
        assert!(
            OrderRepository::find_by_id(&orders, &order.id)
                .await
                .expect("order read")
                .is_none()
        );
        assert!(
            payments
                .find_by_order(&order.id)
                .await
                .expect("ledger read")
                .is_empty()
        );
        assert_eq!(carts.lines_for_user(&user).await.expect("cart read").len(), 2);
    });
}

#[rstest]
fn placement_removes_only_the_ordered_cart_lines(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: placement_removes_only_the_ordered_cart_lines skipped");
        return;
    };
    let user = UserId::random();

    context.database.runtime.block_on(async {
        for item in [&context.watch, &context.strap] {
            let one = Quantity::new(1).expect("valid quantity");
            context
                .carts
                .upsert_line(&CartLine::new(user, item, one, Utc::now()))
                .await
                .expect("cart line stored");
        }
        let order = order_for(user, &[(&context.watch, 1)], PaymentMethod::CashOnDelivery);

        context
            .orders
            .place(&OrderPlacement {
                order: order.clone(),
                payment: None,
                cart_products: vec![context.watch.id],
            })
            .await
            .expect("placement succeeds");

        let remaining = context.carts.lines_for_user(&user).await.expect("cart read");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].product_id, context.strap.id);
        assert_eq!(stock(&context.products, &context.watch.id).await, 4);
        let stored = OrderRepository::find_by_id(&context.orders, &order.id)
            .await
            .expect("order read")
            .expect("order stored");
        assert_eq!(stored.lines, order.lines);
        assert_eq!(stored.total_amount, Money::from_minor(18_000));
    });
}

#[rstest]
fn stale_revisions_are_rejected(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: stale_revisions_are_rejected skipped");
        return;
    };

    context.database.runtime.block_on(async {
        let order = order_for(
            UserId::random(),
            &[(&context.watch, 2)],
            PaymentMethod::CashOnDelivery,
        );
        context
            .orders
            .place(&OrderPlacement {
                order: order.clone(),
                payment: None,
                cart_products: Vec::new(),
            })
            .await
            .expect("placement succeeds");
        let cancelled = order.cancel(None, Utc::now()).expect("cancellable");

        let error = context
            .orders
            .update(&OrderUpdate {
                order: cancelled,
                expected_revision: order.revision + 1,
                restock: true,
                payments: Vec::new(),
            })
            .await
            .expect_err("stale revision");

        assert_eq!(
            error,
            OrderRepositoryError::revision_mismatch(order.id, order.revision + 1)
        );
        assert_eq!(stock(&context.products, &context.watch.id).await, 3);
        let stored = OrderRepository::find_by_id(&context.orders, &order.id)
            .await
            .expect("order read")
            .expect("order stored");
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(stored.revision, order.revision);
    });
}

#[rstest]
fn cancellation_returns_stock(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: cancellation_returns_stock skipped");
        return;
    };

    context.database.runtime.block_on(async {
        let order = order_for(
            UserId::random(),
            &[(&context.strap, 1), (&context.watch, 3)],
            PaymentMethod::CashOnDelivery,
        );
        context
            .orders
            .place(&OrderPlacement {
                order: order.clone(),
                payment: None,
                cart_products: Vec::new(),
            })
            .await
            .expect("placement succeeds");
        assert_eq!(stock(&context.products, &context.watch.id).await, 2);
        assert_eq!(stock(&context.products, &context.strap.id).await, 0);

        let cancelled = order
            .cancel(Some("changed my mind"), Utc::now())
            .expect("cancellable");
        context
            .orders
            .update(&OrderUpdate {
                order: cancelled.clone(),
                expected_revision: order.revision,
                restock: true,
                payments: Vec::new(),
            })
            .await
            .expect("update succeeds");

        assert_eq!(stock(&context.products, &context.watch.id).await, 5);
        assert_eq!(stock(&context.products, &context.strap.id).await, 1);
        let stored = OrderRepository::find_by_id(&context.orders, &order.id)
            .await
            .expect("order read")
            .expect("order stored");
        assert_eq!(stored.status, OrderStatus::Cancelled);
        assert_eq!(stored.revision, cancelled.revision);
    });
}

#[rstest]
fn opposite_line_orders_do_not_deadlock(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: opposite_line_orders_do_not_deadlock skipped");
        return;
    };
    const PLACEMENTS: usize = 16;

    context.database.runtime.block_on(async {
        let left = product("CAS-GA2100", "320.00", 40).expect("valid product");
        let right = product("CAS-F91W", "25.00", 40).expect("valid product");
        context
            .products
            .seed(&[left.clone(), right.clone()])
            .await
            .expect("seeded");

        let placements: Vec<OrderPlacement> = (0..PLACEMENTS)
            .map(|index| {
                let items = if index % 2 == 0 {
                    [(&left, 1), (&right, 1)]
                } else {
                    [(&right, 1), (&left, 1)]
                };
                OrderPlacement {
                    order: order_for(UserId::random(), &items, PaymentMethod::CashOnDelivery),
                    payment: None,
                    cart_products: Vec::new(),
                }
            })
            .collect();

        let results = join_all(placements.iter().map(|placement| {
            let orders = context.orders.clone();
            async move { orders.place(placement).await }
        }))
        .await;

        let mut placed = 0;
        for result in results {
            match result {
                Ok(()) => placed += 1,
                Err(OrderRepositoryError::LockConflict { .. }) => {}
                Err(other) => panic!("placement failed unexpectedly: {other}"),
            }
        }
        assert_eq!(stock(&context.products, &left.id).await, 40 - placed);
        assert_eq!(stock(&context.products, &right.id).await, 40 - placed);
        assert_eq!(placed, PLACEMENTS as u32);
    });
}
