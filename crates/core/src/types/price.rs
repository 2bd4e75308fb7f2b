//! Type-safe price representation using decimal arithmetic.
//!
//! Cart items store a bare unit price (currency-agnostic). Display goes
//! through [`Price`], which formats amounts the way the marketplace pages do:
//! French locale, West African CFA franc by default.
//!
//! ```rust
//! # use kanty_core::{CurrencyCode, Price};
//! # use rust_decimal::Decimal;
//! let price = Price::new(Decimal::from(2500), CurrencyCode::XOF);
//! assert_eq!(price.display(), "2\u{202f}500\u{a0}F CFA");
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Group separator used by the French locale.
const GROUP_SEPARATOR: char = '\u{202f}';

/// Separator between the amount and the currency symbol.
const SYMBOL_SEPARATOR: char = '\u{a0}';

/// Error parsing a price amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceParseError {
    #[error("invalid price amount: {0}")]
    Invalid(String),
    #[error("price must not be negative: {0}")]
    Negative(String),
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the marketplace currency (XOF).
    #[must_use]
    pub const fn xof(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::XOF)
    }

    /// Parse a non-negative unit price typed by a user or read from markup.
    ///
    /// Accepts a French decimal comma (`"12,50"`) as well as a dot.
    ///
    /// # Errors
    ///
    /// Returns `PriceParseError` if the value is not a decimal number or is negative.
    pub fn parse_amount(input: &str) -> Result<Decimal, PriceParseError> {
        let normalized: String = input
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != GROUP_SEPARATOR)
            .map(|c| if c == ',' { '.' } else { c })
            .collect();

        let amount = Decimal::from_str(&normalized)
            .map_err(|_| PriceParseError::Invalid(input.to_string()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceParseError::Negative(input.to_string()));
        }
        Ok(amount)
    }

    /// Format for display in the French locale (e.g., `2 500 F CFA`).
    ///
    /// Amounts are rounded half away from zero to the currency's minor unit.
    #[must_use]
    pub fn display(&self) -> String {
        let digits = self.currency_code.fraction_digits();
        let rounded = self
            .amount
            .round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);

        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let plain = format!("{:.*}", digits as usize, rounded.abs());
        let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), ""));

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&group_thousands(integer));
        if !fraction.is_empty() {
            out.push(',');
            out.push_str(fraction);
        }
        out.push(SYMBOL_SEPARATOR);
        out.push_str(self.currency_code.symbol());
        out
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Insert the French group separator every three digits.
fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3 * GROUP_SEPARATOR.len_utf8());
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(c);
    }
    out
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// West African CFA franc.
    #[default]
    XOF,
    EUR,
    USD,
}

impl CurrencyCode {
    /// Symbol used by the French locale.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::XOF => "F CFA",
            Self::EUR => "€",
            Self::USD => "$US",
        }
    }

    /// Number of digits after the decimal separator.
    #[must_use]
    pub const fn fraction_digits(&self) -> u32 {
        match self {
            Self::XOF => 0,
            Self::EUR | Self::USD => 2,
        }
    }

    /// ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::XOF => "XOF",
            Self::EUR => "EUR",
            Self::USD => "USD",
        }
    }
}

/// Serde helpers for unit prices stored in browser JSON.
///
/// The browser writes prices as JSON numbers; older carts may carry strings.
/// Both are accepted, and whole amounts are written back as integers.
pub mod json_number {
    use std::fmt;
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    /// Serialize a decimal as a JSON number.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error if the amount cannot be represented.
    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        if value.fract().is_zero()
            && let Some(whole) = value.to_i64()
        {
            return serializer.serialize_i64(whole);
        }
        value.to_f64().map_or_else(
            || Err(<S::Error as serde::ser::Error>::custom("price out of range")),
            |f| serializer.serialize_f64(f),
        )
    }

    /// Deserialize a decimal from a JSON number or numeric string.
    ///
    /// # Errors
    ///
    /// Returns the deserializer's error if the value is not numeric.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        deserializer.deserialize_any(DecimalVisitor)
    }

    struct DecimalVisitor;

    impl Visitor<'_> for DecimalVisitor {
        type Value = Decimal;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a numeric price")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
            Ok(Decimal::from(v))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
            Decimal::from_f64(v).ok_or_else(|| E::custom(format!("invalid price: {v}")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
            Decimal::from_str(v.trim()).map_err(|_| E::custom(format!("invalid price: {v}")))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_xof() {
        let price = Price::xof(Decimal::from(2500));
        assert_eq!(price.display(), "2\u{202f}500\u{a0}F CFA");
    }

    #[test]
    fn test_display_small_and_large() {
        assert_eq!(Price::xof(Decimal::from(0)).display(), "0\u{a0}F CFA");
        assert_eq!(Price::xof(Decimal::from(999)).display(), "999\u{a0}F CFA");
        assert_eq!(
            Price::xof(Decimal::from(1_234_567)).display(),
            "1\u{202f}234\u{202f}567\u{a0}F CFA"
        );
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        assert_eq!(
            Price::xof(Decimal::new(25005, 1)).display(),
            "2\u{202f}501\u{a0}F CFA"
        );
        assert_eq!(
            Price::xof(Decimal::new(-25005, 1)).display(),
            "-2\u{202f}501\u{a0}F CFA"
        );
    }

    #[test]
    fn test_display_eur() {
        let price = Price::new(Decimal::new(123_450, 2), CurrencyCode::EUR);
        assert_eq!(price.display(), "1\u{202f}234,50\u{a0}€");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(Price::parse_amount("2500").unwrap(), Decimal::from(2500));
        assert_eq!(Price::parse_amount("12,50").unwrap(), Decimal::new(1250, 2));
        assert_eq!(Price::parse_amount(" 2 500 ").unwrap(), Decimal::from(2500));
        assert!(matches!(
            Price::parse_amount("abc"),
            Err(PriceParseError::Invalid(_))
        ));
        assert!(matches!(
            Price::parse_amount("-3"),
            Err(PriceParseError::Negative(_))
        ));
    }

    #[derive(Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "json_number")]
        price: Decimal,
    }

    #[test]
    fn test_json_number_accepts_numbers_and_strings() {
        let w: Wrapper = serde_json::from_str(r#"{"price": 2500}"#).unwrap();
        assert_eq!(w.price, Decimal::from(2500));

        let w: Wrapper = serde_json::from_str(r#"{"price": "1500.50"}"#).unwrap();
        assert_eq!(w.price, Decimal::new(150_050, 2));

        let w: Wrapper = serde_json::from_str(r#"{"price": 12.5}"#).unwrap();
        assert_eq!(w.price, Decimal::new(125, 1));
    }

    #[test]
    fn test_json_number_writes_whole_amounts_as_integers() {
        let w = Wrapper {
            price: Decimal::from(2500),
        };
        assert_eq!(serde_json::to_string(&w).unwrap(), r#"{"price":2500}"#);
    }
}
