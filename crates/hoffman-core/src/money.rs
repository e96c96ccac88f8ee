//! # Money
//!
//! Service prices as integer cents.
//!
//! ```text
//! catalog / draft     Money(cents)   exact sums: 10.00 + 25.50 + 0.00 = $35.50
//!        │
//!        ▼
//! wire payload        f64 dollars    `price` / `total` are JSON numbers
//! ```
//!
//! Floats appear only at the wire boundary, through [`as_dollars`].
//!
//! ## Usage
//! ```rust
//! use hoffman_core::money::Money;
//!
//! let sofa = Money::from_cents(40_00);
//! let rug = Money::from_cents(50_00);
//!
//! let total: Money = [sofa, rug].into_iter().sum();
//! assert_eq!(total.to_string(), "$90.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// An amount in cents. Signed so that differences stay representable;
/// the draft rejects negative prices.
///
/// Arithmetic saturates at the `i64` bounds instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// `Money::from_cents(2550)` is $25.50.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn from_dollars(dollars: i64) -> Self {
        Money(dollars * 100)
    }

    /// Converts a decimal dollar amount into cents, rounding to the nearest cent.
    ///
    /// ## Note
    /// Only for values arriving over the wire (JSON numbers). Prices inside
    /// the workspace are always built from cents.
    ///
    /// ```rust
    /// use hoffman_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal_dollars(25.5).cents(), 2550);
    /// assert_eq!(Money::from_decimal_dollars(0.1 + 0.2).cents(), 30);
    /// ```
    pub fn from_decimal_dollars(amount: f64) -> Self {
        Money((amount * 100.0).round() as i64)
    }

    /// Like [`Money::from_decimal_dollars`], but `None` for NaN, infinities
    /// and anything beyond [`MAX_WIRE_DOLLARS`] either way.
    pub fn try_from_decimal_dollars(amount: f64) -> Option<Self> {
        if amount.is_finite() && amount.abs() <= MAX_WIRE_DOLLARS {
            Some(Money::from_decimal_dollars(amount))
        } else {
            None
        }
    }

    /// Decimal dollars, for the wire payload.
    pub fn to_decimal_dollars(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole dollars, truncated toward zero.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Cents past the dollar, 0-99.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// `$D.CC`, with a leading `-` for negative amounts.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Wire Serialization
// =============================================================================

/// Serde adapter that writes Money as a decimal dollar number.
///
/// ## Usage
/// ```rust,ignore
/// #[serde(with = "crate::money::as_dollars")]
/// pub total: Money,
/// ```
/// Amounts read from JSON outside this range are rejected.
pub const MAX_WIRE_DOLLARS: f64 = 1_000_000_000_000.0;

pub mod as_dollars {
    use super::{Money, MAX_WIRE_DOLLARS};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Money, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.to_decimal_dollars())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        let amount = f64::deserialize(deserializer)?;
        Money::try_from_decimal_dollars(amount).ok_or_else(|| {
            D::Error::custom(format!(
                "amount {amount} is outside +/-{MAX_WIRE_DOLLARS} dollars"
            ))
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dollar_and_cent_parts() {
        let rug = Money::from_cents(4_999);
        assert_eq!(rug.cents(), 4_999);
        assert_eq!(rug.dollars(), 49);
        assert_eq!(rug.cents_part(), 99);
        assert!(Money::default().is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(3550)), "$35.50");
        assert_eq!(format!("{}", Money::from_dollars(135)), "$135.00");
        assert_eq!(Money::from_cents(-5).to_string(), "-$0.05");
        assert_eq!(format!("{}", Money::zero()), "$0.00");
    }

    #[test]
    fn test_sum_is_exact() {
        let prices = [
            Money::from_cents(10_00),
            Money::from_cents(25_50),
            Money::zero(),
        ];
        let total: Money = prices.iter().sum();
        assert_eq!(total.cents(), 35_50);
    }

    #[test]
    fn test_decimal_dollars_rounds_to_cent() {
        assert_eq!(Money::from_decimal_dollars(135.0).cents(), 13500);
        assert_eq!(Money::from_decimal_dollars(19.999).cents(), 2000);
        assert!((Money::from_cents(3550).to_decimal_dollars() - 35.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_as_dollars_adapter() {
        #[derive(Serialize, Deserialize)]
        struct Line {
            #[serde(with = "as_dollars")]
            price: Money,
        }

        let json = serde_json::to_string(&Line {
            price: Money::from_cents(2550),
        })
        .unwrap();
        assert_eq!(json, r#"{"price":25.5}"#);

        let line: Line = serde_json::from_str(r#"{"price":150}"#).unwrap();
        assert_eq!(line.price, Money::from_dollars(150));

        assert!(serde_json::from_str::<Line>(r#"{"price":1e20}"#).is_err());
        assert!(serde_json::from_str::<Line>(r#"{"price":-1e13}"#).is_err());
    }

    #[test]
    fn test_out_of_range_dollars() {
        assert!(Money::try_from_decimal_dollars(f64::NAN).is_none());
        assert!(Money::try_from_decimal_dollars(f64::INFINITY).is_none());
        assert!(Money::try_from_decimal_dollars(MAX_WIRE_DOLLARS * 2.0).is_none());
        assert_eq!(
            Money::try_from_decimal_dollars(MAX_WIRE_DOLLARS),
            Some(Money::from_dollars(1_000_000_000_000))
        );
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Money::from_cents(i64::MAX - 1);
        assert_eq!((huge + Money::from_cents(10)).cents(), i64::MAX);

        let total: Money = [huge, huge, huge].iter().sum();
        assert_eq!(total.cents(), i64::MAX);

        let mut running = Money::from_cents(i64::MIN + 1);
        running += Money::from_cents(-5);
        assert_eq!(running.cents(), i64::MIN);
        assert_eq!((Money::from_cents(i64::MIN) - Money::from_cents(1)).cents(), i64::MIN);
    }
}
