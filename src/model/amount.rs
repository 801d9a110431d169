//! Amount type for handling monetary values with optional dollar signs.
//!
//! This module provides the `Amount` type which wraps a finite `f64` and handles parsing values
//! that may or may not include a dollar sign and commas. Amounts are stored in the snapshot as
//! plain JSON numbers, so every amount survives a write and a reload unchanged.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::num::ParseFloatError;
use std::str::FromStr;

/// Represents the cost of an expense.
///
/// Zero and negative values are allowed and the range is that of `f64`; the only values refused
/// are NaN and the infinities. Equality and ordering are numeric, so `4.5` and `4.50` are the
/// same amount, and `-0` is the same as `0`.
///
/// # Examples
///
/// Parsing with dollar sign and commas:
/// ```
/// # use expense_tracker::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-$1,050.00").unwrap();
/// assert_eq!(amount.to_string(), "-$1,050.00");
/// ```
///
/// Parsing a bare number:
/// ```
/// # use expense_tracker::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("4.5").unwrap();
/// let b = Amount::from_str("$4.50").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "$4.50");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Amount(f64);

impl Amount {
    /// The zero amount, used when the add form leaves the amount empty.
    pub const ZERO: Amount = Amount(0.0);

    /// Returns `None` for NaN and the infinities.
    pub fn new(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // Adding zero turns -0.0 into 0.0
        Some(Self(value + 0.0))
    }

    /// Returns the underlying value.
    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0.0
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Amount {}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Amount {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// An error that can occur when parsing strings into `Amount` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    Invalid(ParseFloatError),
    NotFinite,
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Invalid(e) => write!(f, "invalid amount: {e}"),
            AmountError::NotFinite => f.write_str("the amount must be a finite number"),
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AmountError::Invalid(e) => Some(e),
            AmountError::NotFinite => None,
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // An empty amount field means zero
        if trimmed.is_empty() {
            return Ok(Amount::ZERO);
        }

        let without_dollar = if let Some(after_minus) = trimmed.strip_prefix('-') {
            match after_minus.strip_prefix('$') {
                Some(after_dollar) => format!("-{after_dollar}"),
                None => trimmed.to_string(),
            }
        } else if let Some(after_dollar) = trimmed.strip_prefix('$') {
            after_dollar.to_string()
        } else {
            trimmed.to_string()
        };

        let without_commas = without_dollar.replace(',', "");
        let value = f64::from_str(&without_commas).map_err(AmountError::Invalid)?;
        Amount::new(value).ok_or(AmountError::NotFinite)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{sign}${}", format_num::format_num!(",.2", self.0.abs()))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Accepts JSON numbers, and numeric strings such as `"$4.50"`.
struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        self.visit_f64(v as f64)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        self.visit_f64(v as f64)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Amount::new(v).ok_or_else(|| E::custom(format!("{v} is not a valid amount")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_with_dollar_sign() {
        assert_eq!(amount("$50.00").value(), 50.0);
    }

    #[test]
    fn test_parse_negative_with_dollar_sign() {
        assert_eq!(amount("-$50.00").value(), -50.0);
    }

    #[test]
    fn test_parse_empty_string() {
        assert!(amount("   ").is_zero());
    }

    #[test]
    fn test_parse_with_commas() {
        assert_eq!(amount("-$60,000.00").value(), -60000.0);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            Amount::from_str("four fifty"),
            Err(AmountError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_finite() {
        assert_eq!(Amount::from_str("inf"), Err(AmountError::NotFinite));
        assert_eq!(Amount::from_str("-infinity"), Err(AmountError::NotFinite));
        assert_eq!(Amount::from_str("NaN"), Err(AmountError::NotFinite));
        assert!(Amount::new(f64::NAN).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(amount("4.5").to_string(), "$4.50");
        assert_eq!(amount("-1234.5").to_string(), "-$1,234.50");
        assert_eq!(Amount::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_numeric_equality() {
        assert_eq!(amount("350"), amount("$350.00"));
    }

    #[test]
    fn test_ordering() {
        let a1 = amount("-$30.00");
        let a2 = amount("$0");
        let a3 = amount("$4.50");
        assert!(a1 < a2);
        assert!(a2 < a3);
    }

    #[test]
    fn test_negative_zero_is_zero() {
        let zero = amount("-0.00");
        assert!(zero.is_zero());
        assert!(!zero.is_negative());
        assert_eq!(zero, Amount::ZERO);
        assert_eq!(zero.cmp(&Amount::ZERO), Ordering::Equal);
    }

    #[test]
    fn test_serialize_as_number() {
        assert_eq!(serde_json::to_string(&amount("4.50")).unwrap(), "4.5");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let a: Amount = serde_json::from_str("4.5").unwrap();
        let b: Amount = serde_json::from_str("350").unwrap();
        let c: Amount = serde_json::from_str("\"-$12.25\"").unwrap();
        let d: Amount = serde_json::from_str("-7").unwrap();
        assert_eq!(a.value(), 4.5);
        assert_eq!(b.value(), 350.0);
        assert_eq!(c.value(), -12.25);
        assert_eq!(d.value(), -7.0);
    }

    #[test]
    fn test_deserialize_rejects_non_numbers() {
        assert!(serde_json::from_str::<Amount>("true").is_err());
        assert!(serde_json::from_str::<Amount>("\"lots\"").is_err());
    }

    #[test]
    fn test_wide_range_from_other_producers() {
        let big: Amount = serde_json::from_str("1e30").unwrap();
        assert_eq!(big.value(), 1e30);
        let tiny: Amount = serde_json::from_str("-2.5e-300").unwrap();
        assert!(tiny.is_negative());
    }

    #[test]
    fn test_precision_survives_json() {
        for input in ["12345678901234567.89", "0.1", "82.10", "-0.3", "1e30"] {
            let original = amount(input);
            let json = serde_json::to_string(&original).unwrap();
            let back: Amount = serde_json::from_str(&json).unwrap();
            assert_eq!(back, original, "{input} changed to {json}");
            assert_eq!(back.value().to_bits(), original.value().to_bits());
        }
    }
}
