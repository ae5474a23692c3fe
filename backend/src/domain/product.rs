//! Catalogue product records and listing filters.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Money, Quantity};

/// Longest accepted SKU.
pub const SKU_MAX: usize = 64;
/// Longest accepted product name.
pub const PRODUCT_NAME_MAX: usize = 255;
/// Longest accepted brand.
pub const BRAND_MAX: usize = 100;

/// Validation errors for catalogue values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductValidationError {
    /// The product id was not a UUID.
    #[error("product id must be a valid UUID")]
    InvalidId,
    /// The SKU was blank.
    #[error("sku must not be empty")]
    EmptySku,
    /// The SKU was too long.
    #[error("sku must be at most {max} characters")]
    SkuTooLong {
        /// Upper bound.
        max: usize,
    },
    /// The SKU contained characters outside `[A-Za-z0-9_-]`.
    #[error("sku may only contain letters, digits, hyphens and underscores")]
    SkuInvalidCharacters,
    /// The condition is not one the catalogue tracks.
    #[error("unknown product condition: {0}")]
    UnknownCondition(String),
    /// A required text field was blank.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Offending field.
        field: &'static str,
    },
    /// A text field exceeded its limit.
    #[error("{field} must be at most {max} characters")]
    FieldTooLong {
        /// Offending field.
        field: &'static str,
        /// Upper bound.
        max: usize,
    },
    /// Prices cannot be negative.
    #[error("price must not be negative")]
    NegativePrice,
}

/// Product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = ProductValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ProductValidationError::InvalidId)
    }
}

/// Stock keeping unit; unique across the catalogue and matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    /// Validate and normalise a SKU to upper case.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ProductValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ProductValidationError::EmptySku);
        }
        if trimmed.chars().count() > SKU_MAX {
            return Err(ProductValidationError::SkuTooLong { max: SKU_MAX });
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ProductValidationError::SkuInvalidCharacters);
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// The normalised text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Sku> for String {
    fn from(value: Sku) -> Self {
        value.0
    }
}

impl TryFrom<String> for Sku {
    type Error = ProductValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Physical condition of the stocked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCondition {
    /// Factory sealed.
    BrandNew,
    /// Previously owned.
    PreOwned,
}

impl ProductCondition {
    /// Storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BrandNew => "brand_new",
            Self::PreOwned => "pre_owned",
        }
    }
}

impl FromStr for ProductCondition {
    type Err = ProductValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        match normalised.as_str() {
            "brand_new" | "new" => Ok(Self::BrandNew),
            "pre_owned" | "used" => Ok(Self::PreOwned),
            _ => Err(ProductValidationError::UnknownCondition(s.to_owned())),
        }
    }
}

impl fmt::Display for ProductCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalogue product.
///
/// ## Invariants
/// - `quantity_on_hand` never goes below zero; it is unsigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Identifier.
    pub id: ProductId,
    /// Unique stock keeping unit.
    pub sku: Sku,
    /// Display name.
    pub name: String,
    /// Manufacturer or label.
    pub brand: String,
    /// Physical condition.
    pub condition: ProductCondition,
    /// Current unit price.
    pub price: Money,
    /// Units available for sale.
    pub quantity_on_hand: u32,
    /// Inactive products are hidden from listings and cannot be ordered.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// A new catalogue entry with a fresh id.
    pub fn create(
        details: ProductDetails,
        quantity_on_hand: u32,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ProductId::random(),
            sku: details.sku,
            name: details.name,
            brand: details.brand,
            condition: details.condition,
            price: details.price,
            quantity_on_hand,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the operator-editable details; stock and visibility are kept.
    #[must_use]
    pub fn revised(self, details: ProductDetails, now: DateTime<Utc>) -> Self {
        Self {
            sku: details.sku,
            name: details.name,
            brand: details.brand,
            condition: details.condition,
            price: details.price,
            updated_at: now,
            ..self
        }
    }

    /// Whether `quantity` units can be reserved right now.
    pub fn can_supply(&self, quantity: Quantity) -> bool {
        self.is_active && self.quantity_on_hand >= quantity.get()
    }

    /// Stock level after applying a signed delta, or `None` when it would go
    /// negative or overflow.
    pub fn stock_after(&self, delta: i64) -> Option<u32> {
        let next = i64::from(self.quantity_on_hand).checked_add(delta)?;
        u32::try_from(next).ok()
    }
}

/// Operator-editable product fields, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetails {
    /// Unique stock keeping unit.
    pub sku: Sku,
    /// Display name.
    pub name: String,
    /// Manufacturer or label.
    pub brand: String,
    /// Physical condition.
    pub condition: ProductCondition,
    /// Unit price.
    pub price: Money,
}

fn required_text(
    raw: &str,
    field: &'static str,
    max: usize,
) -> Result<String, ProductValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ProductValidationError::EmptyField { field });
    }
    if trimmed.chars().count() > max {
        return Err(ProductValidationError::FieldTooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

impl ProductDetails {
    /// Validate operator input; names and brands are trimmed.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::{Money, ProductCondition, ProductDetails, Sku};
    ///
    /// let details = ProductDetails::new(
    ///     Sku::new("sei-srpd55")?,
    ///     " Seiko 5 Sports ",
    ///     "Seiko",
    ///     ProductCondition::BrandNew,
    ///     Money::from_minor(18_000),
    /// )?;
    /// assert_eq!(details.name, "Seiko 5 Sports");
    /// # Ok::<(), storefront::domain::ProductValidationError>(())
    /// ```
    pub fn new(
        sku: Sku,
        name: &str,
        brand: &str,
        condition: ProductCondition,
        price: Money,
    ) -> Result<Self, ProductValidationError> {
        if price.is_negative() {
            return Err(ProductValidationError::NegativePrice);
        }
        Ok(Self {
            sku,
            name: required_text(name, "name", PRODUCT_NAME_MAX)?,
            brand: required_text(brand, "brand", BRAND_MAX)?,
            condition,
            price,
        })
    }
}

/// Listing filters; every populated field narrows the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact brand, case-insensitive.
    pub brand: Option<String>,
    /// Condition.
    pub condition: Option<ProductCondition>,
    /// Inclusive lower price bound.
    pub min_price: Option<Money>,
    /// Inclusive upper price bound.
    pub max_price: Option<Money>,
    /// Case-insensitive substring of name, brand or SKU.
    pub search: Option<String>,
}

impl ProductFilter {
    /// Apply the filter to a product. Inactive products never match.
    pub fn matches(&self, product: &Product) -> bool {
        if !product.is_active {
            return false;
        }
        if self
            .brand
            .as_ref()
            .is_some_and(|brand| !product.brand.eq_ignore_ascii_case(brand))
        {
            return false;
        }
        if self.condition.is_some_and(|c| c != product.condition) {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        match &self.search {
            Some(term) => {
                let needle = term.to_lowercase();
                [product.name.as_str(), product.brand.as_str(), product.sku.as_str()]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn phone() -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::random(),
            sku: Sku::new("iph-13-128").expect("valid sku"),
            name: "iPhone 13".to_owned(),
            brand: "Apple".to_owned(),
            condition: ProductCondition::PreOwned,
            price: Money::from_minor(150_000),
            quantity_on_hand: 3,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn sku_is_normalised_to_upper_case() {
        let sku = Sku::new(" abc-1 ").expect("valid sku");
        assert_eq!(sku.as_str(), "ABC-1");
    }

    #[rstest]
    #[case("", ProductValidationError::EmptySku)]
    #[case("has space", ProductValidationError::SkuInvalidCharacters)]
    fn sku_rejects_invalid_values(#[case] raw: &str, #[case] expected: ProductValidationError) {
        assert_eq!(Sku::new(raw), Err(expected));
    }

    #[rstest]
    #[case("Brand New", ProductCondition::BrandNew)]
    #[case("pre-owned", ProductCondition::PreOwned)]
    #[case("PRE_OWNED", ProductCondition::PreOwned)]
    fn condition_parsing_is_lenient(#[case] raw: &str, #[case] expected: ProductCondition) {
        assert_eq!(raw.parse::<ProductCondition>(), Ok(expected));
    }

    #[rstest]
    fn stock_after_rejects_negative_results(phone: Product) {
        assert_eq!(phone.stock_after(-3), Some(0));
        assert_eq!(phone.stock_after(-4), None);
        assert_eq!(phone.stock_after(2), Some(5));
    }

    #[rstest]
    fn can_supply_requires_active_and_enough_stock(mut phone: Product) {
        let three = Quantity::new(3).expect("valid quantity");
        let four = Quantity::new(4).expect("valid quantity");
        assert!(phone.can_supply(three));
        assert!(!phone.can_supply(four));
        phone.is_active = false;
        assert!(!phone.can_supply(three));
    }

    fn details(name: &str, minor: i64) -> Result<ProductDetails, ProductValidationError> {
        ProductDetails::new(
            Sku::new("iph-13-256").expect("valid sku"),
            name,
            "Apple",
            ProductCondition::BrandNew,
            Money::from_minor(minor),
        )
    }

    #[rstest]
    #[case("  ", 100, ProductValidationError::EmptyField { field: "name" })]
    #[case("iPhone 13", -1, ProductValidationError::NegativePrice)]
    fn details_reject_invalid_input(
        #[case] name: &str,
        #[case] minor: i64,
        #[case] expected: ProductValidationError,
    ) {
        assert_eq!(details(name, minor), Err(expected));
    }

    #[rstest]
    fn long_names_are_rejected() {
        let name = "x".repeat(PRODUCT_NAME_MAX + 1);
        assert_eq!(
            details(&name, 100),
            Err(ProductValidationError::FieldTooLong {
                field: "name",
                max: PRODUCT_NAME_MAX,
            })
        );
    }

    #[rstest]
    fn revision_keeps_stock_and_identity(phone: Product) {
        let later = phone.updated_at + chrono::Duration::minutes(5);
        let revised = phone
            .clone()
            .revised(details("iPhone 13 (256GB)", 180_000).expect("valid"), later);
        assert_eq!(revised.id, phone.id);
        assert_eq!(revised.quantity_on_hand, phone.quantity_on_hand);
        assert_eq!(revised.created_at, phone.created_at);
        assert_eq!(revised.updated_at, later);
        assert_eq!(revised.sku.as_str(), "IPH-13-256");
        assert_eq!(revised.condition, ProductCondition::BrandNew);
    }

    #[rstest]
    fn filter_matches_search_across_fields(phone: Product) {
        let by_sku = ProductFilter {
            search: Some("iph-13".to_owned()),
            ..ProductFilter::default()
        };
        let by_brand = ProductFilter {
            brand: Some("apple".to_owned()),
            ..ProductFilter::default()
        };
        let too_cheap = ProductFilter {
            max_price: Some(Money::from_minor(1_000)),
            ..ProductFilter::default()
        };
        assert!(by_sku.matches(&phone));
        assert!(by_brand.matches(&phone));
        assert!(!too_cheap.matches(&phone));
    }
}
