//! Decimal price amounts for visit line items and totals.
//!
//! Prices travel over the wire as plain JSON numbers (`10`, `2.5`) but are
//! held as [`Decimal`] so running totals never accumulate float error.
//! Strings such as `"10"` are rejected on input.
//!
//! Amounts are capped at [`Price::MAX_AMOUNT`]; arithmetic is checked so a
//! running total can never leave that range.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("price cannot be negative")]
    Negative,
    #[error("price is not a finite number")]
    NotFinite,
    #[error("price exceeds {}", Price::MAX_AMOUNT)]
    TooLarge,
}

/// A non-currency-tagged amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest amount a single price or a visit total may hold.
    pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` for amounts below zero and
    /// `PriceError::TooLarge` for amounts above [`Price::MAX_AMOUNT`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount > Decimal::from(Self::MAX_AMOUNT) {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount.normalize()))
    }

    /// Wrap a decimal without the sign or range checks.
    ///
    /// Used when reading values the storage layer already accepted.
    #[must_use]
    pub fn from_stored(amount: Decimal) -> Self {
        Self(amount.normalize())
    }

    /// Convert a JSON float.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is NaN/infinite, negative or too large.
    pub fn from_f64(value: f64) -> Result<Self, PriceError> {
        let amount = Decimal::from_f64(value).ok_or(PriceError::NotFinite)?;
        Self::new(amount)
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Add two prices, or `None` if the result would exceed
    /// [`Price::MAX_AMOUNT`].
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0
            .checked_add(rhs.0)
            .and_then(|sum| Self::new(sum).ok())
    }

    /// Sum prices, or `None` if any partial sum leaves the allowed range.
    #[must_use]
    pub fn checked_sum<I: IntoIterator<Item = Self>>(prices: I) -> Option<Self> {
        prices
            .into_iter()
            .try_fold(Self::ZERO, Self::checked_add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Price {
    fn from(value: u32) -> Self {
        Self(Decimal::from(value))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let amount = self.0.normalize();
        if amount.scale() == 0
            && let Some(whole) = amount.to_i64()
        {
            return serializer.serialize_i64(whole);
        }
        let float = amount
            .to_f64()
            .ok_or_else(|| serde::ser::Error::custom("price out of range"))?;
        serializer.serialize_f64(float)
    }
}

struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON number")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
        Ok(Price::from_stored(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
        Ok(Price::from_stored(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
        Decimal::from_f64(v)
            .map(Price::from_stored)
            .ok_or_else(|| E::custom(PriceError::NotFinite))
    }
}

// The sign is checked by the workflows, not here, so storage can round-trip
// whatever it holds.
impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}
