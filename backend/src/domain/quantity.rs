//! Positive item quantities for cart and order lines.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest quantity accepted on a single line.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

/// Validation errors for [`Quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QuantityError {
    /// Lines must carry at least one unit.
    #[error("quantity must be at least 1")]
    Zero,
    /// The quantity exceeds [`MAX_LINE_QUANTITY`].
    #[error("quantity must not exceed {max}")]
    TooLarge {
        /// Upper bound.
        max: u32,
    },
}

/// Number of units on a line; always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// Validate a raw quantity.
    pub const fn new(value: u32) -> Result<Self, QuantityError> {
        if value == 0 {
            return Err(QuantityError::Zero);
        }
        if value > MAX_LINE_QUANTITY {
            return Err(QuantityError::TooLarge {
                max: MAX_LINE_QUANTITY,
            });
        }
        Ok(Self(value))
    }

    /// The raw count.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Combine two quantities, enforcing the same bounds.
    pub fn checked_add(self, other: Self) -> Result<Self, QuantityError> {
        let total = self.0.saturating_add(other.0);
        Self::new(total)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_and_oversized() {
        assert_eq!(Quantity::new(0), Err(QuantityError::Zero));
        assert_eq!(
            Quantity::new(MAX_LINE_QUANTITY + 1),
            Err(QuantityError::TooLarge {
                max: MAX_LINE_QUANTITY
            })
        );
    }

    #[test]
    fn checked_add_respects_upper_bound() {
        let half = Quantity::new(MAX_LINE_QUANTITY / 2).expect("valid quantity");
        assert!(half.checked_add(half).is_ok());
        let one = Quantity::new(1).expect("valid quantity");
        let full = Quantity::new(MAX_LINE_QUANTITY).expect("valid quantity");
        assert!(full.checked_add(one).is_err());
    }
}
