//! Fixed-point currency amounts.
//!
//! Amounts are stored as integer minor units (cents) and rendered with exactly
//! two fractional digits, so totals never need rounding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const MINOR_PER_MAJOR: i64 = 100;

/// Errors raised while parsing a decimal amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyParseError {
    /// The input was blank.
    #[error("amount must not be empty")]
    Empty,
    /// The input was not a plain decimal number.
    #[error("amount must be a decimal number: {0}")]
    Malformed(String),
    /// More than two fractional digits were supplied.
    #[error("amount must have at most two decimal places: {0}")]
    TooPrecise(String),
    /// The value does not fit the supported range.
    #[error("amount is out of range: {0}")]
    OutOfRange(String),
}

/// A currency amount in minor units.
///
/// # Examples
/// ```
/// use storefront::domain::Money;
///
/// let price: Money = "1000".parse()?;
/// assert_eq!(price.minor_units(), 100_000);
/// assert_eq!(price.to_string(), "1000.00");
/// # Ok::<(), storefront::domain::MoneyParseError>(())
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Money(i64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Wrap a value already expressed in minor units.
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Amount in minor units.
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Whether the amount is below zero.
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Add two amounts, returning `None` on overflow.
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Multiply by a quantity, returning `None` on overflow.
    pub const fn checked_mul(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as i64) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Sum amounts, returning `None` on overflow.
    pub fn checked_sum<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |acc, amount| acc.checked_add(amount))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let per_major = MINOR_PER_MAJOR.unsigned_abs();
        write!(
            f,
            "{sign}{}.{:02}",
            magnitude / per_major,
            magnitude % per_major
        )
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(MoneyParseError::Empty);
        }
        let (negative, unsigned) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !is_digits(whole) || !is_digits(fraction) {
            return Err(MoneyParseError::Malformed(raw.to_owned()));
        }
        if unsigned.ends_with('.') {
            return Err(MoneyParseError::Malformed(raw.to_owned()));
        }
        if fraction.len() > 2 {
            return Err(MoneyParseError::TooPrecise(raw.to_owned()));
        }

        let out_of_range = || MoneyParseError::OutOfRange(raw.to_owned());
        let whole: i64 = whole.parse().map_err(|_| out_of_range())?;
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| out_of_range())? * 10,
            _ => fraction.parse().map_err(|_| out_of_range())?,
        };
        let magnitude = whole
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|value| value.checked_add(cents))
            .ok_or_else(out_of_range)?;
        Ok(Self(if negative { -magnitude } else { magnitude }))
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
