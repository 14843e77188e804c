//! Money type for representing currency amounts
//!
//! Internally stores amounts in cents (i64) to avoid floating-point precision
//! issues. Bank statements disagree on number formatting, so parsing accepts
//! decimal commas, apostrophe/space thousands separators and currency codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A monetary amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use spendwise::models::Money;
    /// let amount = Money::from_cents(1050); // 10.50
    /// assert_eq!(amount.to_string(), "10.50");
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole units and cents
    pub const fn from_units_cents(units: i64, cents: i64) -> Self {
        Self(units * 100 + cents)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole currency units (truncated toward zero)
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// The cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Parse a money amount from a string
    ///
    /// Accepts: `"10.50"`, `"-10.50"`, `"+10.50"`, `"10"`, `"12,50"`,
    /// `"1'234.50"`, `"1,234.50"`, `"CHF -12.50"`, `"$10.50"`, `"(10.50)"`.
    /// More than two fraction digits are rounded half away from zero.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let invalid = || MoneyParseError::InvalidFormat(s.trim().to_string());

        let mut body = s.trim();
        if body.is_empty() {
            return Err(invalid());
        }

        let mut negative = false;
        if body.starts_with('(') && body.ends_with(')') {
            negative = true;
            body = &body[1..body.len() - 1];
        }

        // Currency codes or symbols on either side of the number
        body = body.trim_matches(|c: char| c.is_alphabetic() || "$€£¥".contains(c) || c == ' ');

        if let Some(rest) = body.strip_prefix('-') {
            negative = !negative;
            body = rest;
        } else if let Some(rest) = body.strip_prefix('+') {
            body = rest;
        }
        // "-CHF 12.50" leaves the symbol after the sign
        body = body.trim_start_matches(|c: char| c.is_alphabetic() || "$€£¥".contains(c) || c == ' ');

        let cleaned: String = body
            .chars()
            .filter(|c| !matches!(c, '\'' | '’' | ' ' | '_' | '\u{a0}'))
            .collect();
        if cleaned.is_empty() {
            return Err(invalid());
        }

        let (int_part, frac_part) = split_decimal(&cleaned).ok_or_else(invalid)?;

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let units: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };

        let digits: Vec<i64> = frac_part
            .chars()
            .filter_map(|c| c.to_digit(10).map(i64::from))
            .collect();
        let mut cents = digits.first().copied().unwrap_or(0) * 10 + digits.get(1).copied().unwrap_or(0);
        if digits.get(2).copied().unwrap_or(0) >= 5 {
            cents += 1;
        }

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -total } else { total }))
    }

    /// Format with a currency symbol or code, e.g. `CHF -12.50`
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        if symbol.is_empty() {
            return self.to_string();
        }
        if symbol.chars().all(|c| c.is_alphabetic()) {
            format!("{} {}", symbol, self)
        } else if self.is_negative() {
            format!("-{}{}.{:02}", symbol, self.units().abs(), self.cents_part())
        } else {
            format!("{}{}.{:02}", symbol, self.units(), self.cents_part())
        }
    }

    /// `self / total` as a fraction, or 0 when `total` is not positive
    pub fn ratio_of(&self, total: Money) -> f64 {
        if total.0 <= 0 {
            0.0
        } else {
            self.0 as f64 / total.0 as f64
        }
    }
}

/// Split a cleaned number into integer and fraction digits.
///
/// When both `.` and `,` appear, the later one is the decimal separator. A
/// lone `,` followed by one or two digits is a decimal comma; otherwise it
/// groups thousands.
fn split_decimal(s: &str) -> Option<(String, String)> {
    let last_dot = s.rfind('.');
    let last_comma = s.rfind(',');

    let (decimal, grouping) = match (last_dot, last_comma) {
        (Some(d), Some(c)) if d > c => (Some('.'), ','),
        (Some(_), Some(_)) => (Some(','), '.'),
        (Some(_), None) => (Some('.'), ','),
        (None, Some(c)) => {
            let after = s.len() - c - 1;
            if s.matches(',').count() == 1 && after <= 2 {
                (Some(','), '.')
            } else {
                (None, ',')
            }
        }
        (None, None) => (None, ','),
    };

    let without_grouping: String = s.chars().filter(|&c| c != grouping).collect();
    match decimal {
        Some(sep) => {
            let mut parts = without_grouping.split(sep);
            let int = parts.next()?.to_string();
            let frac = parts.next().unwrap_or("").to_string();
            if parts.next().is_some() {
                return None;
            }
            Some((int, frac))
        }
        None => Some((without_grouping, String::new())),
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-{}.{:02}", self.units().abs(), self.cents_part())
        } else {
            write!(f, "{}.{:02}", self.units(), self.cents_part())
        }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: '{}'", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let m = Money::from_cents(1050);
        assert_eq!(m.units(), 10);
        assert_eq!(m.cents_part(), 50);
        assert_eq!(Money::from_units_cents(10, 50), m);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1050).to_string(), "10.50");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
        assert_eq!(Money::from_cents(-1050).to_string(), "-10.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
    }

    #[test]
    fn test_format_with_symbol() {
        assert_eq!(Money::from_cents(-1250).format_with_symbol("CHF"), "CHF -12.50");
        assert_eq!(Money::from_cents(1250).format_with_symbol("$"), "$12.50");
        assert_eq!(Money::from_cents(-1250).format_with_symbol("$"), "-$12.50");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);

        let total: Money = vec![a, b, -b].into_iter().sum();
        assert_eq!(total, a);
    }

    #[test]
    fn test_parse_plain() {
        assert_eq!(Money::parse("10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("-10.50").unwrap().cents(), -1050);
        assert_eq!(Money::parse("+10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse("-0.05").unwrap().cents(), -5);
        assert_eq!(Money::parse(".75").unwrap().cents(), 75);
    }

    #[test]
    fn test_parse_bank_formats() {
        assert_eq!(Money::parse("-45,60").unwrap().cents(), -4560);
        assert_eq!(Money::parse("1'234.50").unwrap().cents(), 123450);
        assert_eq!(Money::parse("1,234.50").unwrap().cents(), 123450);
        assert_eq!(Money::parse("1.234,50").unwrap().cents(), 123450);
        assert_eq!(Money::parse("1,234").unwrap().cents(), 123400);
        assert_eq!(Money::parse("CHF -12.50").unwrap().cents(), -1250);
        assert_eq!(Money::parse("-12.50 CHF").unwrap().cents(), -1250);
        assert_eq!(Money::parse("$10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("(10.50)").unwrap().cents(), -1050);
    }

    #[test]
    fn test_parse_rounds_extra_digits() {
        assert_eq!(Money::parse("12.345").unwrap().cents(), 1235);
        assert_eq!(Money::parse("-12.344").unwrap().cents(), -1234);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("12.3.4").is_err());
        assert!(Money::parse("-").is_err());
    }

    #[test]
    fn test_ratio_of() {
        let spent = Money::from_cents(2500);
        assert_eq!(spent.ratio_of(Money::from_cents(10000)), 0.25);
        assert_eq!(spent.ratio_of(Money::zero()), 0.0);
    }

    #[test]
    fn test_serialization() {
        let m = Money::from_cents(1050);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "1050");
        assert_eq!(serde_json::from_str::<Money>(&json).unwrap(), m);
    }
}
