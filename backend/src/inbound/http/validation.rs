//! Shared validation helpers for inbound HTTP adapters.
//!
//! Path segments, query strings and request bodies arrive as loose text;
//! these helpers turn them into domain values and report failures as
//! `invalid_request` errors naming the offending field.

use std::fmt::Display;
use std::str::FromStr;

use pagination::{PageRequest, PageRequestError};
use serde_json::json;

use crate::domain::{
    Error, OrderId, OrderValidationError, ProductId, ProductValidationError, Quantity,
    ShippingAddress, Sku,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    EmptyField,
    FieldTooLong,
    InvalidUuid,
    InvalidOrderId,
    InvalidValue,
    OutOfRange,
}

impl ErrorCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::EmptyField => "empty_field",
            Self::FieldTooLong => "field_too_long",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidOrderId => "invalid_order_id",
            Self::InvalidValue => "invalid_value",
            Self::OutOfRange => "out_of_range",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    const fn as_str(self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("missing required field: {name}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("{name} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

/// Require an optional body field.
pub(crate) fn required<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Parse a product identifier from a path segment or body field.
pub(crate) fn parse_product_id(value: &str, field: FieldName) -> Result<ProductId, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid_uuid_error(field, value))
}

/// Parse an order reference: either the UUID or the `ORD-…` number.
pub(crate) fn parse_order_id(value: &str, field: FieldName) -> Result<OrderId, Error> {
    value.parse().map_err(|err: OrderValidationError| {
        ValidationError::new(field, err.to_string()).with_value(ErrorCode::InvalidOrderId, value)
    })
}

pub(crate) fn parse_sku(value: &str, field: FieldName) -> Result<Sku, Error> {
    Sku::new(value).map_err(|err| {
        ValidationError::new(field, err.to_string()).with_value(ErrorCode::InvalidValue, value)
    })
}

pub(crate) fn parse_quantity(value: u32, field: FieldName) -> Result<Quantity, Error> {
    Quantity::new(value).map_err(|err| {
        ValidationError::new(field, err.to_string())
            .with_value(ErrorCode::OutOfRange, value.to_string())
    })
}

/// Parse any `FromStr` domain value, reporting the parser's message.
pub(crate) fn parse_field<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|err: T::Err| {
        ValidationError::new(field, err.to_string()).with_value(ErrorCode::InvalidValue, value)
    })
}

pub(crate) fn parse_optional_field<T>(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_field(raw, field))
        .transpose()
}

/// Validate `page`/`limit` query parameters.
pub(crate) fn parse_page(page: Option<u32>, limit: Option<u32>) -> Result<PageRequest, Error> {
    PageRequest::new(page, limit).map_err(|err| {
        let field = match err {
            PageRequestError::ZeroPage => FieldName::new("page"),
            PageRequestError::ZeroLimit | PageRequestError::LimitTooLarge { .. } => {
                FieldName::new("limit")
            }
        };
        ValidationError::new(field, err.to_string()).with_code(ErrorCode::OutOfRange)
    })
}

/// Map order input validation failures onto field-scoped errors.
pub(crate) fn order_validation_error(err: OrderValidationError) -> Error {
    let message = err.to_string();
    match err {
        OrderValidationError::EmptyField { field } => {
            ValidationError::new(FieldName::new(field), message).with_code(ErrorCode::EmptyField)
        }
        OrderValidationError::FieldTooLong { field, max } => {
            Error::invalid_request(message).with_details(json!({
                "field": field,
                "max": max,
                "code": ErrorCode::FieldTooLong.as_str(),
            }))
        }
        OrderValidationError::MissingPaymentProof { .. } => {
            ValidationError::new(FieldName::new("paymentProof"), message)
                .with_code(ErrorCode::MissingField)
        }
        OrderValidationError::InvalidOrderId => {
            ValidationError::new(FieldName::new("orderId"), message)
                .with_code(ErrorCode::InvalidOrderId)
        }
        OrderValidationError::UnknownStatus(value) => {
            ValidationError::new(FieldName::new("status"), message)
                .with_value(ErrorCode::InvalidValue, value)
        }
        OrderValidationError::UnknownPaymentMethod(value) => {
            ValidationError::new(FieldName::new("paymentMethod"), message)
                .with_value(ErrorCode::InvalidValue, value)
        }
        OrderValidationError::UnknownPaymentStatus(value) => {
            ValidationError::new(FieldName::new("paymentStatus"), message)
                .with_value(ErrorCode::InvalidValue, value)
        }
        OrderValidationError::NoLines | OrderValidationError::TotalOverflow => {
            Error::invalid_request(message)
        }
    }
}

/// Map catalogue input validation failures onto field-scoped errors.
pub(crate) fn product_validation_error(err: ProductValidationError) -> Error {
    let message = err.to_string();
    match err {
        ProductValidationError::EmptyField { field } => {
            ValidationError::new(FieldName::new(field), message).with_code(ErrorCode::EmptyField)
        }
        ProductValidationError::FieldTooLong { field, max } => {
            Error::invalid_request(message).with_details(json!({
                "field": field,
                "max": max,
                "code": ErrorCode::FieldTooLong.as_str(),
            }))
        }
        ProductValidationError::NegativePrice => {
            ValidationError::new(FieldName::new("price"), message).with_code(ErrorCode::OutOfRange)
        }
        ProductValidationError::EmptySku
        | ProductValidationError::SkuTooLong { .. }
        | ProductValidationError::SkuInvalidCharacters => {
            ValidationError::new(FieldName::new("sku"), message).with_code(ErrorCode::InvalidValue)
        }
        ProductValidationError::InvalidId => {
            ValidationError::new(FieldName::new("productId"), message)
                .with_code(ErrorCode::InvalidUuid)
        }
        ProductValidationError::UnknownCondition(value) => {
            ValidationError::new(FieldName::new("condition"), message)
                .with_value(ErrorCode::InvalidValue, value)
        }
    }
}

/// Build a validated shipping address from body fields.
pub(crate) fn shipping_address(
    address: &str,
    city: &str,
    province: &str,
    postal_code: &str,
) -> Result<ShippingAddress, Error> {
    ShippingAddress::new(address, city, province, postal_code).map_err(order_validation_error)
}
