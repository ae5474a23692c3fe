//! Internal Diesel row structs and their conversions to domain types.
//!
//! These types are implementation details of the persistence layer and never
//! leave it.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::{
    CartLine, Money, Order, OrderId, OrderLine, OrderStatus, PaymentId, PaymentMethod,
    PaymentRecord, PaymentRecordStatus, PaymentStatus, Product, ProductCondition, ProductId,
    Quantity, ShippingAddress, Sku, UserId,
};

use super::schema::{cart_lines, order_lines, orders, payments, products};

/// A stored value the domain rejects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {column} value in storage: {value}")]
pub(crate) struct RowError {
    column: &'static str,
    value: String,
}

impl RowError {
    fn new(column: &'static str, value: impl ToString) -> Self {
        Self {
            column,
            value: value.to_string(),
        }
    }
}

fn parse<T: FromStr>(column: &'static str, raw: &str) -> Result<T, RowError> {
    raw.parse().map_err(|_| RowError::new(column, raw))
}

fn quantity(column: &'static str, raw: i32) -> Result<Quantity, RowError> {
    u32::try_from(raw)
        .ok()
        .and_then(|value| Quantity::new(value).ok())
        .ok_or_else(|| RowError::new(column, raw))
}

/// Widen a domain count into an `INTEGER` column.
pub(crate) fn to_db_int(column: &'static str, value: u32) -> Result<i32, RowError> {
    i32::try_from(value).map_err(|_| RowError::new(column, value))
}

fn revision(raw: i32) -> Result<u32, RowError> {
    u32::try_from(raw).map_err(|_| RowError::new("revision", raw))
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// Row struct for the products table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub brand: String,
    pub condition: String,
    pub price_minor: i64,
    pub quantity_on_hand: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RowError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let sku = Sku::new(&row.sku).map_err(|_| RowError::new("sku", &row.sku))?;
        let condition: ProductCondition = parse("condition", &row.condition)?;
        let quantity_on_hand = u32::try_from(row.quantity_on_hand)
            .map_err(|_| RowError::new("quantity_on_hand", row.quantity_on_hand))?;
        Ok(Self {
            id: ProductId::from_uuid(row.id),
            sku,
            name: row.name,
            brand: row.brand,
            condition,
            price: Money::from_minor(row.price_minor),
            quantity_on_hand,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable product, used by seeding and operator creation.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = products)]
pub(crate) struct NewProductRow<'a> {
    pub id: Uuid,
    pub sku: &'a str,
    pub name: &'a str,
    pub brand: &'a str,
    pub condition: &'a str,
    pub price_minor: i64,
    pub quantity_on_hand: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewProductRow<'a> {
    pub(crate) fn from_product(product: &'a Product) -> Result<Self, RowError> {
        Ok(Self {
            id: *product.id.as_uuid(),
            sku: product.sku.as_str(),
            name: &product.name,
            brand: &product.brand,
            condition: product.condition.as_str(),
            price_minor: product.price.minor_units(),
            quantity_on_hand: to_db_int("quantity_on_hand", product.quantity_on_hand)?,
            is_active: product.is_active,
            created_at: product.created_at,
            updated_at: product.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Cart lines
// ---------------------------------------------------------------------------

/// Row struct for the cart_lines table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = cart_lines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CartLineRow {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_add_minor: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RowError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::from_uuid(row.user_id),
            product_id: ProductId::from_uuid(row.product_id),
            quantity: quantity("cart_lines.quantity", row.quantity)?,
            price_at_add: Money::from_minor(row.price_at_add_minor),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<&CartLine> for CartLineRow {
    type Error = RowError;

    fn try_from(line: &CartLine) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: *line.user_id.as_uuid(),
            product_id: *line.product_id.as_uuid(),
            quantity: to_db_int("cart_lines.quantity", line.quantity.get())?,
            price_at_add_minor: line.price_at_add.minor_units(),
            created_at: line.created_at,
            updated_at: line.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Row struct for the orders table; also used for inserts and full updates.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount_minor: i64,
    pub status: String,
    pub payment_method: String,
    pub payment_status: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_province: String,
    pub shipping_postal_code: String,
    pub payment_proof: Option<String>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&Order> for OrderRow {
    type Error = RowError;

    fn try_from(order: &Order) -> Result<Self, Self::Error> {
        Ok(Self {
            id: *order.id.as_uuid(),
            user_id: *order.user_id.as_uuid(),
            total_amount_minor: order.total_amount.minor_units(),
            status: order.status.as_str().to_owned(),
            payment_method: order.payment_method.as_str().to_owned(),
            payment_status: order.payment_status.as_str().to_owned(),
            shipping_address: order.shipping.address().to_owned(),
            shipping_city: order.shipping.city().to_owned(),
            shipping_province: order.shipping.province().to_owned(),
            shipping_postal_code: order.shipping.postal_code().to_owned(),
            payment_proof: order.payment_proof.clone(),
            tracking_number: order.tracking_number.clone(),
            notes: order.notes.clone(),
            revision: to_db_int("revision", order.revision)?,
            created_at: order.created_at,
            updated_at: order.updated_at,
        })
    }
}

/// Row struct for the order_lines table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = order_lines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderLineRow {
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_per_unit_minor: i64,
    pub subtotal_minor: i64,
}

impl OrderLineRow {
    pub(crate) fn for_order(order: &Order) -> Result<Vec<Self>, RowError> {
        order
            .lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let position = u32::try_from(index).map_err(|_| RowError::new("position", index))?;
                Ok(Self {
                    order_id: *order.id.as_uuid(),
                    position: to_db_int("position", position)?,
                    product_id: *line.product_id.as_uuid(),
                    quantity: to_db_int("order_lines.quantity", line.quantity.get())?,
                    price_per_unit_minor: line.price_per_unit.minor_units(),
                    subtotal_minor: line.subtotal.minor_units(),
                })
            })
            .collect()
    }

    fn into_line(self) -> Result<OrderLine, RowError> {
        Ok(OrderLine {
            product_id: ProductId::from_uuid(self.product_id),
            quantity: quantity("order_lines.quantity", self.quantity)?,
            price_per_unit: Money::from_minor(self.price_per_unit_minor),
            subtotal: Money::from_minor(self.subtotal_minor),
        })
    }
}

/// Assemble an order from its row and its lines sorted by position.
pub(crate) fn order_from_rows(row: OrderRow, lines: Vec<OrderLineRow>) -> Result<Order, RowError> {
    let shipping = ShippingAddress::new(
        &row.shipping_address,
        &row.shipping_city,
        &row.shipping_province,
        &row.shipping_postal_code,
    )
    .map_err(|err| RowError::new("shipping", err))?;
    let status: OrderStatus = parse("status", &row.status)?;
    let payment_method: PaymentMethod = parse("payment_method", &row.payment_method)?;
    let payment_status: PaymentStatus = parse("payment_status", &row.payment_status)?;
    let lines = lines
        .into_iter()
        .map(OrderLineRow::into_line)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Order {
        id: OrderId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        total_amount: Money::from_minor(row.total_amount_minor),
        status,
        payment_method,
        payment_status,
        shipping,
        payment_proof: row.payment_proof,
        tracking_number: row.tracking_number,
        notes: row.notes,
        lines,
        revision: revision(row.revision)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

/// Row struct for the payments table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PaymentRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub amount_minor: i64,
    pub method: String,
    pub status: String,
    pub external_reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&PaymentRecord> for PaymentRow {
    fn from(record: &PaymentRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            order_id: *record.order_id.as_uuid(),
            amount_minor: record.amount.minor_units(),
            method: record.method.as_str().to_owned(),
            status: record.status.as_str().to_owned(),
            external_reference: record.external_reference.clone(),
            paid_at: record.paid_at,
            metadata: Value::Object(record.metadata.clone()),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = RowError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let method: PaymentMethod = parse("payments.method", &row.method)?;
        let status: PaymentRecordStatus = parse("payments.status", &row.status)?;
        let metadata = match row.metadata {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => return Err(RowError::new("payments.metadata", other)),
        };
        Ok(Self {
            id: PaymentId::from_uuid(row.id),
            order_id: OrderId::from_uuid(row.order_id),
            amount: Money::from_minor(row.amount_minor),
            method,
            status,
            external_reference: row.external_reference,
            paid_at: row.paid_at,
            metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversions.
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
            .single()
            .expect("valid timestamp")
    }

    fn product_row() -> ProductRow {
        ProductRow {
            id: Uuid::new_v4(),
            sku: "seiko-5".to_owned(),
            name: "Seiko 5".to_owned(),
            brand: "Seiko".to_owned(),
            condition: "pre_owned".to_owned(),
            price_minor: 12_500,
            quantity_on_hand: 3,
            is_active: true,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    #[rstest]
    fn product_rows_convert_to_domain() {
        let product = Product::try_from(product_row()).expect("valid row");
        assert_eq!(product.sku.as_str(), "SEIKO-5");
        assert_eq!(product.condition, ProductCondition::PreOwned);
        assert_eq!(product.price, Money::from_minor(12_500));
    }

    #[rstest]
    fn negative_stock_is_rejected() {
        let mut row = product_row();
        row.quantity_on_hand = -1;
        let error = Product::try_from(row).expect_err("invalid row");
        assert!(error.to_string().contains("quantity_on_hand"));
    }

    #[rstest]
    fn unknown_order_status_is_rejected() {
        let row = OrderRow {
            id: Uuid::now_v7(),
            user_id: Uuid::new_v4(),
            total_amount_minor: 1_000,
            status: "lost".to_owned(),
            payment_method: "cash_on_delivery".to_owned(),
            payment_status: "unpaid".to_owned(),
            shipping_address: "1 Main St".to_owned(),
            shipping_city: "Kandy".to_owned(),
            shipping_province: "Central".to_owned(),
            shipping_postal_code: "20000".to_owned(),
            payment_proof: None,
            tracking_number: None,
            notes: None,
            revision: 1,
            created_at: timestamp(),
            updated_at: timestamp(),
        };
        let error = order_from_rows(row, Vec::new()).expect_err("invalid status");
        assert!(error.to_string().contains("status"));
    }

    #[rstest]
    fn payment_metadata_must_be_an_object() {
        let row = PaymentRow {
            id: Uuid::now_v7(),
            order_id: Uuid::now_v7(),
            amount_minor: 1_000,
            method: "card_gateway_a".to_owned(),
            status: "completed".to_owned(),
            external_reference: Some("pi_1".to_owned()),
            paid_at: Some(timestamp()),
            metadata: Value::Array(Vec::new()),
            created_at: timestamp(),
            updated_at: timestamp(),
        };
        assert!(PaymentRecord::try_from(row).is_err());
    }
}
