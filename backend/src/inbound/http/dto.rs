//! Request and response bodies for the storefront HTTP API.
//!
//! Domain aggregates never leave the adapter directly; handlers convert them
//! into these camelCase shapes. Amounts travel as decimal strings.

use chrono::{DateTime, Utc};
use pagination::Page;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    CheckoutRequest, DirectOrderRequest, NewProduct, PaymentOverview, ReconciliationOutcome,
};
use crate::domain::{
    Cart, CartItem, Error, Order, OrderLine, OrderStatus, PaymentMethod, PaymentRecord,
    PaymentRecordStatus, PaymentStatus, Product, ProductCondition, ProductDetails,
};

use super::validation::{
    FieldName, parse_field, parse_product_id, parse_quantity, parse_sku,
    product_validation_error, shipping_address,
};

/// Pagination metadata returned with every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Paged<T> {
    /// Convert a domain page, mapping each item.
    pub fn from_page<U>(page: Page<U>, f: impl FnMut(U) -> T) -> Self {
        let pagination = PaginationMeta {
            total: page.total(),
            page: page.request().page(),
            limit: page.request().limit(),
            total_pages: page.total_pages(),
        };
        Self {
            items: page.into_items().into_iter().map(f).collect(),
            pagination,
        }
    }
}

/// Catalogue entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub brand: String,
    /// `brand_new` or `pre_owned`.
    pub condition: String,
    #[schema(example = "1000.00")]
    pub price: String,
    pub quantity_on_hand: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            sku: product.sku.to_string(),
            name: product.name,
            brand: product.brand,
            condition: product.condition.as_str().to_owned(),
            price: product.price.to_string(),
            quantity_on_hand: product.quantity_on_hand,
            is_active: product.is_active,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Product fields shown next to a cart line.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub sku: String,
    pub name: String,
    pub brand: String,
    pub price: String,
    pub quantity_on_hand: u32,
    pub is_active: bool,
}

impl From<Product> for ProductSummary {
    fn from(product: Product) -> Self {
        Self {
            sku: product.sku.to_string(),
            name: product.name,
            brand: product.brand,
            price: product.price.to_string(),
            quantity_on_hand: product.quantity_on_hand,
            is_active: product.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    pub product_id: String,
    pub quantity: u32,
    /// Unit price captured when the product was first added.
    pub price_at_add: String,
    pub subtotal: String,
    /// Absent when the product has since been removed from the catalogue.
    pub product: Option<ProductSummary>,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            product_id: item.line.product_id.to_string(),
            quantity: item.line.quantity.get(),
            price_at_add: item.line.price_at_add.to_string(),
            subtotal: item.subtotal.to_string(),
            product: item.product.map(ProductSummary::from),
        }
    }
}

/// The caller's cart.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub item_count: usize,
    pub total: String,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            item_count: cart.items.len(),
            total: cart.total.to_string(),
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineResponse {
    pub product_id: String,
    pub quantity: u32,
    pub price_per_unit: String,
    pub subtotal: String,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(line: OrderLine) -> Self {
        Self {
            product_id: line.product_id.to_string(),
            quantity: line.quantity.get(),
            price_per_unit: line.price_per_unit.to_string(),
            subtotal: line.subtotal.to_string(),
        }
    }
}

/// An order with its lines.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    #[schema(example = "ORD-0190f3a0c2b47c3d9a1e2f3b4c5d6e7f")]
    pub order_number: String,
    pub user_id: String,
    pub total_amount: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_province: String,
    pub shipping_postal_code: String,
    pub payment_proof: Option<String>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub lines: Vec<OrderLineResponse>,
    /// Bumped on every change.
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            order_number: order.order_number().to_string(),
            user_id: order.user_id.to_string(),
            total_amount: order.total_amount.to_string(),
            status: order.status,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            shipping_address: order.shipping.address().to_owned(),
            shipping_city: order.shipping.city().to_owned(),
            shipping_province: order.shipping.province().to_owned(),
            shipping_postal_code: order.shipping.postal_code().to_owned(),
            payment_proof: order.payment_proof,
            tracking_number: order.tracking_number,
            notes: order.notes,
            lines: order.lines.into_iter().map(OrderLineResponse::from).collect(),
            revision: order.revision,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Ledger record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecordResponse {
    pub id: String,
    pub order_id: String,
    pub amount: String,
    pub method: PaymentMethod,
    pub status: PaymentRecordStatus,
    pub external_reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    #[schema(value_type = Object)]
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentRecord> for PaymentRecordResponse {
    fn from(record: PaymentRecord) -> Self {
        Self {
            id: record.id.to_string(),
            order_id: record.order_id.to_string(),
            amount: record.amount.to_string(),
            method: record.method,
            status: record.status,
            external_reference: record.external_reference,
            paid_at: record.paid_at,
            metadata: record.metadata,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Settlement state of one order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOverviewResponse {
    pub order_id: String,
    pub order_number: String,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub total_amount: String,
    pub records: Vec<PaymentRecordResponse>,
}

impl From<PaymentOverview> for PaymentOverviewResponse {
    fn from(overview: PaymentOverview) -> Self {
        let PaymentOverview { order, records } = overview;
        Self {
            order_id: order.id.to_string(),
            order_number: order.order_number().to_string(),
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            total_amount: order.total_amount.to_string(),
            records: records.into_iter().map(PaymentRecordResponse::from).collect(),
        }
    }
}

/// Result of applying a gateway notification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResponse {
    pub order: OrderResponse,
    pub payment: PaymentRecordResponse,
    pub order_changed: bool,
}

impl From<ReconciliationOutcome> for ReconciliationResponse {
    fn from(outcome: ReconciliationOutcome) -> Self {
        Self {
            order: outcome.order.into(),
            payment: outcome.payment.into(),
            order_changed: outcome.order_changed,
        }
    }
}

/// Query string for `GET /api/v1/products`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// One-based page number.
    pub page: Option<u32>,
    /// Page size, at most 100.
    pub limit: Option<u32>,
    pub brand: Option<String>,
    /// `brand_new` or `pre_owned`.
    pub condition: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<String>,
    /// Inclusive upper price bound.
    pub max_price: Option<String>,
    /// Case-insensitive match on name, brand or SKU.
    pub search: Option<String>,
}

/// Query string for the caller's order history.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Query string for the operator order listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AdminOrderListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Fulfilment status filter.
    pub status: Option<String>,
    /// Payment status filter.
    pub payment_status: Option<String>,
}

/// Body for `POST /api/v1/cart`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub product_id: String,
    /// Defaults to one unit.
    pub quantity: Option<u32>,
}

/// Body for `PUT /api/v1/cart/{productId}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SetCartQuantityRequest {
    pub quantity: u32,
}

/// Body for `POST /api/v1/orders/checkout`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_province: String,
    pub shipping_postal_code: String,
    /// `cash_on_delivery`, `bank_transfer`, `card_gateway_a` or `card_gateway_b`.
    pub payment_method: String,
    /// Slip reference; required for bank transfers.
    pub payment_proof: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<CheckoutBody> for CheckoutRequest {
    type Error = Error;

    fn try_from(body: CheckoutBody) -> Result<Self, Self::Error> {
        Ok(Self {
            shipping: shipping_address(
                &body.shipping_address,
                &body.shipping_city,
                &body.shipping_province,
                &body.shipping_postal_code,
            )?,
            payment_method: parse_field(&body.payment_method, FieldName::new("paymentMethod"))?,
            payment_proof: body.payment_proof,
            notes: body.notes,
        })
    }
}

/// Body for `POST /api/v1/orders`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectOrderBody {
    pub product_id: String,
    pub quantity: u32,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_province: String,
    pub shipping_postal_code: String,
    pub payment_method: String,
    pub payment_proof: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<DirectOrderBody> for DirectOrderRequest {
    type Error = Error;

    fn try_from(body: DirectOrderBody) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: parse_product_id(&body.product_id, FieldName::new("productId"))?,
            quantity: parse_quantity(body.quantity, FieldName::new("quantity"))?,
            shipping: shipping_address(
                &body.shipping_address,
                &body.shipping_city,
                &body.shipping_province,
                &body.shipping_postal_code,
            )?,
            payment_method: parse_field(&body.payment_method, FieldName::new("paymentMethod"))?,
            payment_proof: body.payment_proof,
            notes: body.notes,
        })
    }
}

/// Optional body for `PUT /api/v1/orders/{orderId}/cancel`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CancelOrderBody {
    pub reason: Option<String>,
}

/// Body for `PUT /api/v1/admin/orders/{orderId}/status`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct StatusUpdateBody {
    /// Target status; case and separators are ignored.
    #[schema(example = "shipped")]
    pub status: String,
    pub reason: Option<String>,
}

/// Body for `PUT /api/v1/admin/orders/{orderId}/tracking`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingUpdateBody {
    pub tracking_number: String,
}

/// Body for `PUT /api/v1/admin/orders/{orderId}/payment`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PaymentDecisionBody {
    /// `approve` or `reject`.
    pub action: String,
    /// Recorded on rejection.
    pub reason: Option<String>,
}

/// Body for `PUT /api/v1/admin/products/{productId}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ProductDetailsBody {
    #[schema(example = "SEI-SRPD55")]
    pub sku: String,
    pub name: String,
    pub brand: String,
    /// `brand_new` or `pre_owned`.
    pub condition: String,
    #[schema(example = "180.00")]
    pub price: String,
}

impl TryFrom<ProductDetailsBody> for ProductDetails {
    type Error = Error;

    fn try_from(body: ProductDetailsBody) -> Result<Self, Self::Error> {
        let condition: ProductCondition = parse_field(&body.condition, FieldName::new("condition"))?;
        ProductDetails::new(
            parse_sku(&body.sku, FieldName::new("sku"))?,
            &body.name,
            &body.brand,
            condition,
            parse_field(&body.price, FieldName::new("price"))?,
        )
        .map_err(product_validation_error)
    }
}

/// Body for `POST /api/v1/admin/products`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductBody {
    #[serde(flatten)]
    pub details: ProductDetailsBody,
    /// Opening stock; defaults to zero.
    pub quantity_on_hand: Option<u32>,
    /// Defaults to listed.
    pub is_active: Option<bool>,
}

impl TryFrom<CreateProductBody> for NewProduct {
    type Error = Error;

    fn try_from(body: CreateProductBody) -> Result<Self, Self::Error> {
        Ok(Self {
            details: body.details.try_into()?,
            quantity_on_hand: body.quantity_on_hand.unwrap_or_default(),
            is_active: body.is_active.unwrap_or(true),
        })
    }
}

/// Body for `PUT /api/v1/admin/products/{productId}/stock`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct StockAdjustmentBody {
    /// Signed change to the stock level.
    pub delta: i64,
}

/// Body for `PUT /api/v1/admin/products/{productId}/active`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFlagBody {
    pub is_active: bool,
}

/// Gateway notification body; the raw bytes are signed.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentNotificationBody {
    /// Order UUID or order number.
    pub order_id: String,
    /// Gateway status code, e.g. `succeeded` or `-2`.
    pub status: String,
    /// Gateway transaction reference.
    pub transaction_reference: String,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Map<String, Value>>,
}
