//! Calendar month used as the budgeting period
//!
//! Serialized as `"YYYY-MM"`. Months are 1-based.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month (e.g. "2025-01")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BudgetMonth {
    year: i32,
    month: u32,
}

impl BudgetMonth {
    /// Create a month, validating that `month` is 1-12
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodParseError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodParseError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    pub fn current() -> Self {
        Self::for_date(chrono::Local::now().date_naive())
    }

    /// The month containing a date
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// Last day of the month (inclusive)
    pub fn end_date(&self) -> NaiveDate {
        self.next().start_date().pred_opt().unwrap_or_default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Parse `"YYYY-MM"`
    pub fn parse(s: &str) -> Result<Self, PeriodParseError> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| PeriodParseError::InvalidFormat(s.to_string()))?;

        let year: i32 = year
            .parse()
            .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| PeriodParseError::InvalidFormat(s.to_string()))?;

        Self::new(year, month)
    }

    /// Human-readable label, e.g. "January 2025"
    pub fn label(&self) -> String {
        self.start_date().format("%B %Y").to_string()
    }
}

impl fmt::Display for BudgetMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<String> for BudgetMonth {
    type Error = PeriodParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BudgetMonth> for String {
    fn from(month: BudgetMonth) -> Self {
        month.to_string()
    }
}

/// Error parsing a month
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    InvalidFormat(String),
    InvalidMonth(u32),
}

impl fmt::Display for PeriodParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(s) => {
                write!(f, "Invalid month '{}', expected YYYY-MM", s)
            }
            Self::InvalidMonth(m) => write!(f, "Invalid month number: {}", m),
        }
    }
}

impl std::error::Error for PeriodParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_bounds() {
        let feb = BudgetMonth::new(2024, 2).unwrap();
        assert_eq!(feb.start_date(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(feb.end_date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(feb.contains(NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()));
        assert!(!feb.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
    }

    #[test]
    fn test_navigation() {
        let dec = BudgetMonth::new(2024, 12).unwrap();
        assert_eq!(dec.next(), BudgetMonth::new(2025, 1).unwrap());
        assert_eq!(dec.next().prev(), dec);
        assert_eq!(
            BudgetMonth::new(2025, 1).unwrap().prev(),
            BudgetMonth::new(2024, 12).unwrap()
        );
    }

    #[test]
    fn test_parse_and_display() {
        let month = BudgetMonth::parse("2025-03").unwrap();
        assert_eq!(month.year(), 2025);
        assert_eq!(month.month(), 3);
        assert_eq!(month.to_string(), "2025-03");
        assert_eq!(month.label(), "March 2025");

        assert!(BudgetMonth::parse("2025-13").is_err());
        assert!(BudgetMonth::parse("March").is_err());
        assert!(BudgetMonth::new(2025, 0).is_err());
    }

    #[test]
    fn test_ordering() {
        let a = BudgetMonth::new(2024, 12).unwrap();
        let b = BudgetMonth::new(2025, 1).unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_serialization() {
        let month = BudgetMonth::new(2025, 1).unwrap();
        let json = serde_json::to_string(&month).unwrap();
        assert_eq!(json, "\"2025-01\"");
        assert_eq!(serde_json::from_str::<BudgetMonth>(&json).unwrap(), month);
        assert!(serde_json::from_str::<BudgetMonth>("\"2025-00\"").is_err());
    }
}
