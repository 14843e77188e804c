//! Month reference parsing
//!
//! Turns user input like `last`, `2025-01` or `Feb 2025` into a
//! [`BudgetMonth`], relative to a fixed "today".

use chrono::{Datelike, Local, NaiveDate};

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::BudgetMonth;

const MONTH_NAMES: [(&str, u32); 24] = [
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

/// Resolves month references
pub struct PeriodService {
    today: NaiveDate,
}

impl Default for PeriodService {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodService {
    pub fn new() -> Self {
        Self::at(Local::now().date_naive())
    }

    /// Resolve relative references against a given date
    pub fn at(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn current_month(&self) -> BudgetMonth {
        BudgetMonth::for_date(self.today)
    }

    /// Parse a month reference or fall back to the current month
    pub fn parse_or_current(&self, input: Option<&str>) -> SpendwiseResult<BudgetMonth> {
        match input {
            Some(s) => self.parse(s),
            None => Ok(self.current_month()),
        }
    }

    /// Parse a month reference
    ///
    /// Accepted: `current`/`this`/`now`, `last`/`prev`/`previous`, `next`,
    /// `YYYY-MM`, and month names with an optional year (`March`, `mar 2024`).
    /// A bare month name later than the current month means last year.
    pub fn parse(&self, input: &str) -> SpendwiseResult<BudgetMonth> {
        let lower = input.trim().to_lowercase();

        match lower.as_str() {
            "current" | "this" | "now" => return Ok(self.current_month()),
            "last" | "prev" | "previous" => return Ok(self.current_month().prev()),
            "next" => return Ok(self.current_month().next()),
            _ => {}
        }

        if let Some(month) = self.parse_month_name(&lower) {
            return Ok(month);
        }

        BudgetMonth::parse(&lower).map_err(|e| SpendwiseError::Validation(e.to_string()))
    }

    fn parse_month_name(&self, s: &str) -> Option<BudgetMonth> {
        let (name, month) = MONTH_NAMES.iter().find(|(name, _)| {
            s.strip_prefix(name)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(' '))
        })?;

        let rest = s[name.len()..].trim();
        let year = if rest.is_empty() {
            if *month > self.today.month() {
                self.today.year() - 1
            } else {
                self.today.year()
            }
        } else {
            rest.parse().ok()?
        };

        BudgetMonth::new(year, *month).ok()
    }

    /// The `count` most recent months ending with the current one, oldest first
    pub fn recent_months(&self, count: usize) -> Vec<BudgetMonth> {
        let mut months = Vec::with_capacity(count);
        let mut month = self.current_month();
        for _ in 0..count {
            months.push(month);
            month = month.prev();
        }
        months.reverse();
        months
    }
}
