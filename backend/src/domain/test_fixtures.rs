//! Shared builders for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::{
    Money, Order, OrderDraft, OrderLine, PaymentMethod, Product, ProductCondition, ProductId,
    Quantity, ShippingAddress, Sku, UserId,
};

pub(crate) struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_now(),
    })
}

pub(crate) fn product(price_minor: i64, quantity_on_hand: u32) -> Product {
    let id = ProductId::random();
    Product {
        id,
        sku: Sku::new(format!("SKU-{}", &id.to_string()[..8])).expect("valid sku"),
        name: "Fixture watch".to_owned(),
        brand: "Seiko".to_owned(),
        condition: ProductCondition::BrandNew,
        price: Money::from_minor(price_minor),
        quantity_on_hand,
        is_active: true,
        created_at: fixture_now(),
        updated_at: fixture_now(),
    }
}

pub(crate) fn shipping() -> ShippingAddress {
    ShippingAddress::new("12 Galle Road", "Colombo", "Western", "00300").expect("valid address")
}

pub(crate) fn qty(value: u32) -> Quantity {
    Quantity::new(value).expect("valid quantity")
}

pub(crate) fn placed_order(
    user_id: UserId,
    product: &Product,
    quantity: u32,
    payment_method: PaymentMethod,
) -> Order {
    let line = OrderLine::new(product.id, qty(quantity), product.price).expect("valid line");
    let payment_proof = payment_method
        .requires_manual_proof()
        .then(|| "SLIP-0001".to_owned());
    Order::place(
        OrderDraft {
            user_id,
            lines: vec![line],
            payment_method,
            shipping: shipping(),
            payment_proof,
            notes: None,
        },
        fixture_now(),
    )
    .expect("valid order")
}
