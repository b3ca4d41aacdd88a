//! Fixed-point ledger amounts and offer prices
//!
//! Ledger amounts carry seven fractional digits and are encoded as signed
//! 64-bit stroop counts (1 unit = 10^7 stroops). Prices are encoded as an
//! `n/d` pair of positive 32-bit integers.

use crate::errors::RequestError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

/// Fractional digits of ledger amounts
pub const AMOUNT_SCALE: u32 = 7;

const STROOPS_PER_UNIT: i64 = 10_000_000;

/// Largest trustline limit, `i64::MAX` stroops
pub const MAX_TRUST_LIMIT: i64 = i64::MAX;

/// Parse a decimal amount as typed by the operator
pub fn parse_amount(text: &str) -> Result<Decimal, RequestError> {
    let value = Decimal::from_str(text.trim())
        .map_err(|e| RequestError::Parse(format!("invalid amount '{}': {}", text, e)))?;
    if value.is_sign_negative() {
        return Err(RequestError::Parse(format!("amount '{}' is negative", text)));
    }
    Ok(value)
}

/// Round toward zero to ledger precision
pub fn truncate(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::ToZero);
    rounded.rescale(AMOUNT_SCALE);
    rounded
}

/// Format with exactly seven fractional digits, e.g. `200.0000000`
pub fn format_amount(value: Decimal) -> String {
    truncate(value).to_string()
}

/// Convert to stroops. The value must be positive and representable
/// without losing digits.
pub fn to_stroops(value: Decimal) -> Result<i64, RequestError> {
    if value <= Decimal::ZERO {
        return Err(RequestError::InvalidOperation(format!(
            "amount must be positive, got {}",
            value
        )));
    }
    let scaled = value
        .checked_mul(Decimal::from(STROOPS_PER_UNIT))
        .ok_or_else(|| RequestError::InvalidOperation(format!("amount {} is too large", value)))?;
    if !scaled.fract().is_zero() {
        return Err(RequestError::InvalidOperation(format!(
            "amount {} has more than {} decimal places",
            value, AMOUNT_SCALE
        )));
    }
    scaled
        .to_i64()
        .ok_or_else(|| RequestError::InvalidOperation(format!("amount {} is too large", value)))
}

/// Parse a decimal string straight into stroops
pub fn parse_stroops(text: &str) -> Result<i64, RequestError> {
    to_stroops(parse_amount(text)?)
}

/// Offer price as a rational number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price {
    pub n: i32,
    pub d: i32,
}

impl Price {
    /// Best rational approximation with 32-bit terms, by continued fractions
    pub fn from_decimal(value: Decimal) -> Result<Self, RequestError> {
        if value <= Decimal::ZERO {
            return Err(RequestError::InvalidOperation(format!(
                "price must be positive, got {}",
                value
            )));
        }
        let max = Decimal::from(i32::MAX);
        let mut number = value;
        // Convergents h/k, seeded with 0/1 and 1/0
        let (mut h2, mut h1) = (Decimal::ZERO, Decimal::ONE);
        let (mut k2, mut k1) = (Decimal::ONE, Decimal::ZERO);

        loop {
            if number > max {
                break;
            }
            let a = number.floor();
            let f = number - a;
            let h = a * h1 + h2;
            let k = a * k1 + k2;
            if h > max || k > max {
                break;
            }
            h2 = h1;
            h1 = h;
            k2 = k1;
            k1 = k;
            if f.is_zero() {
                break;
            }
            number = match Decimal::ONE.checked_div(f) {
                Some(next) => next,
                None => break,
            };
        }

        match (h1.to_i32(), k1.to_i32()) {
            (Some(n), Some(d)) if n > 0 && d > 0 => Ok(Price { n, d }),
            _ => Err(RequestError::InvalidOperation(format!(
                "price {} cannot be represented",
                value
            ))),
        }
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::from(self.n) / Decimal::from(self.d)
    }
}

impl FromStr for Price {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| RequestError::Parse(format!("invalid price '{}': {}", s, e)))?;
        Price::from_decimal(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.n, self.d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_amount_seven_digits() {
        assert_eq!(format_amount(dec("200")), "200.0000000");
        assert_eq!(format_amount(dec("1.23456789")), "1.2345678");
        assert_eq!(format_amount(dec("0.00000001")), "0.0000000");
    }

    #[test]
    fn test_to_stroops() {
        assert_eq!(parse_stroops("20").unwrap(), 200_000_000);
        assert_eq!(parse_stroops("0.0000001").unwrap(), 1);
        assert_eq!(
            parse_stroops("922337203685.4775807").unwrap(),
            MAX_TRUST_LIMIT
        );
        assert!(matches!(
            parse_stroops("0.00000001"),
            Err(RequestError::InvalidOperation(_))
        ));
        assert!(matches!(parse_stroops("0"), Err(RequestError::InvalidOperation(_))));
        assert!(matches!(parse_stroops("-1"), Err(RequestError::Parse(_))));
        assert!(matches!(parse_stroops("ten"), Err(RequestError::Parse(_))));
        assert!(parse_stroops("922337203685.4775808").is_err());
    }

    #[test]
    fn test_price_approximation() {
        assert_eq!(Price::from_decimal(dec("0.5")).unwrap(), Price { n: 1, d: 2 });
        assert_eq!(Price::from_decimal(dec("2")).unwrap(), Price { n: 2, d: 1 });
        assert_eq!(
            Price::from_str("0.1000").unwrap(),
            Price { n: 1, d: 10 }
        );
        assert_eq!(
            Price::from_str("1.25").unwrap().to_decimal(),
            dec("1.25")
        );
        assert!(Price::from_str("0").is_err());
        assert!(matches!(Price::from_str("abc"), Err(RequestError::Parse(_))));
    }

    proptest! {
        #[test]
        fn prop_price_close_to_input(n in 1u32..1_000_000, d in 1u32..1_000_000) {
            let value = Decimal::from(n) / Decimal::from(d);
            let price = Price::from_decimal(value).unwrap();
            let diff = (price.to_decimal() - value).abs();
            prop_assert!(diff <= value * dec("0.000001"));
        }

        #[test]
        fn prop_stroops_match_formatted_amount(units in 1i64..1_000_000_000_000i64) {
            let value = Decimal::new(units, AMOUNT_SCALE);
            prop_assert_eq!(to_stroops(value).unwrap(), units);
            prop_assert_eq!(parse_stroops(&format_amount(value)).unwrap(), units);
        }
    }
}
