//! Demo catalogue served when the service runs without a database.

use chrono::{DateTime, Utc};

use crate::domain::{Money, Product, ProductCondition, ProductId, ProductValidationError, Sku};

struct DemoItem {
    sku: &'static str,
    name: &'static str,
    brand: &'static str,
    condition: ProductCondition,
    price_minor: i64,
    stock: u32,
}

const DEMO_ITEMS: &[DemoItem] = &[
    DemoItem {
        sku: "SEI-SRPD55",
        name: "Seiko 5 Sports Automatic",
        brand: "Seiko",
        condition: ProductCondition::BrandNew,
        price_minor: 8_950_000,
        stock: 12,
    },
    DemoItem {
        sku: "CAS-GA2100",
        name: "Casio G-Shock GA-2100",
        brand: "Casio",
        condition: ProductCondition::BrandNew,
        price_minor: 3_200_000,
        stock: 25,
    },
    DemoItem {
        sku: "ORI-RA-AA0002",
        name: "Orient Bambino Version 2",
        brand: "Orient",
        condition: ProductCondition::PreOwned,
        price_minor: 4_100_000,
        stock: 3,
    },
    DemoItem {
        sku: "CIT-BN0150",
        name: "Citizen Promaster Diver",
        brand: "Citizen",
        condition: ProductCondition::BrandNew,
        price_minor: 7_450_000,
        stock: 8,
    },
    DemoItem {
        sku: "TIS-T120407",
        name: "Tissot Seastar 1000",
        brand: "Tissot",
        condition: ProductCondition::PreOwned,
        price_minor: 15_500_000,
        stock: 1,
    },
];

/// Build the demo catalogue stamped with `now`.
///
/// # Errors
///
/// Returns [`ProductValidationError`] if a built-in SKU is rejected.
pub fn demo_catalogue(now: DateTime<Utc>) -> Result<Vec<Product>, ProductValidationError> {
    DEMO_ITEMS
        .iter()
        .map(|item| {
            Ok(Product {
                id: ProductId::random(),
                sku: Sku::new(item.sku)?,
                name: item.name.to_owned(),
                brand: item.brand.to_owned(),
                condition: item.condition,
                price: Money::from_minor(item.price_minor),
                quantity_on_hand: item.stock,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
        })
        .collect()
}
