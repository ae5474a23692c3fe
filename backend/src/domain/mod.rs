//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed storefront entities and the services that
//! drive the order lifecycle. Types stay transport agnostic; inbound and
//! outbound adapters translate at the edges.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Product, Cart, Order, PaymentRecord: the storefront aggregates.
//! - CatalogueService, CartService, OrderService: driving port
//!   implementations.

pub mod cart;
mod cart_service;
mod catalogue_service;
pub mod error;
pub mod money;
pub mod order;
mod order_service;
pub mod ports;
pub mod product;
pub mod quantity;
mod service_support;
#[cfg(test)]
pub(crate) mod test_fixtures;
pub mod trace_id;
pub mod user;

pub use self::cart::{Cart, CartItem, CartLine, CartTotalOverflow};
pub use self::cart_service::CartService;
pub use self::catalogue_service::CatalogueService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::money::{Money, MoneyParseError};
pub use self::order::{
    ADDRESS_MAX, Gateway, GatewayError, GatewayOutcome, LOCALITY_MAX, NOTE_MAX, Order,
    OrderDraft, OrderId, OrderLine, OrderNumber, OrderStatus, OrderTransitionError,
    OrderValidationError, PaymentId, PaymentMethod, PaymentRecord, PaymentRecordStatus,
    PaymentStatus, ShippingAddress, TRACKING_NUMBER_MAX, optional_text, rejection_reason,
};
pub use self::order_service::OrderService;
pub use self::product::{
    BRAND_MAX, PRODUCT_NAME_MAX, Product, ProductCondition, ProductDetails, ProductFilter,
    ProductId, ProductValidationError, SKU_MAX, Sku,
};
pub use self::quantity::{MAX_LINE_QUANTITY, Quantity, QuantityError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Actor, Role, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use storefront::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
