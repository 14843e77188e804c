//! Bank statement parsing
//!
//! Each supported bank gets a [`StatementParser`] that turns the raw text of
//! an exported statement into [`ParsedTransaction`]s. Parsers never touch
//! storage; categorization, duplicate detection and persistence happen in
//! [`crate::services::ImportService`].

pub mod generic;
pub mod open_banking;
pub mod raiffeisen;
pub mod revolut;

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};

use crate::models::{Money, TransactionSource};

pub use generic::{ColumnMapping, GenericParser};
pub use raiffeisen::RaiffeisenParser;
pub use revolut::RevolutParser;

/// Header keywords identifying a Raiffeisen export
const RAIFFEISEN_MARKERS: [&str; 3] = ["iban", "booked at", "valuta date"];

/// Header keywords identifying a Revolut export
const REVOLUT_MARKERS: [&str; 3] = ["type", "product", "completed date"];

/// Supported statement layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BankFormat {
    Revolut,
    Raiffeisen,
    Generic,
}

impl BankFormat {
    /// Guess the format from a statement's header line
    ///
    /// Raiffeisen markers are checked first since its header also carries
    /// columns a Revolut check would match. Generic is never detected.
    pub fn detect(header_line: &str) -> Option<Self> {
        let header = header_line.to_lowercase();

        if RAIFFEISEN_MARKERS.iter().any(|m| header.contains(m)) {
            Some(Self::Raiffeisen)
        } else if REVOLUT_MARKERS.iter().any(|m| header.contains(m)) {
            Some(Self::Revolut)
        } else {
            None
        }
    }

    /// Detect from full statement content using its first non-blank line
    pub fn detect_content(content: &str) -> Option<Self> {
        content
            .trim_start_matches('\u{feff}')
            .lines()
            .find(|line| !line.trim().is_empty())
            .and_then(Self::detect)
    }

    pub fn source(&self) -> TransactionSource {
        match self {
            Self::Revolut => TransactionSource::Revolut,
            Self::Raiffeisen => TransactionSource::Raiffeisen,
            Self::Generic => TransactionSource::Generic,
        }
    }

    /// The parser for this format
    pub fn parser(&self) -> Box<dyn StatementParser> {
        match self {
            Self::Revolut => Box::new(RevolutParser),
            Self::Raiffeisen => Box::new(RaiffeisenParser),
            Self::Generic => Box::new(GenericParser::detect()),
        }
    }
}

impl fmt::Display for BankFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revolut => write!(f, "Revolut"),
            Self::Raiffeisen => write!(f, "Raiffeisen"),
            Self::Generic => write!(f, "Generic CSV"),
        }
    }
}

impl FromStr for BankFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "revolut" => Ok(Self::Revolut),
            "raiffeisen" => Ok(Self::Raiffeisen),
            "generic" | "csv" => Ok(Self::Generic),
            other => Err(format!(
                "Unknown format '{}'. Expected revolut, raiffeisen or generic",
                other
            )),
        }
    }
}

/// A statement row ready for categorization
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTransaction {
    /// Line number in the source (1-based), or position for API data
    pub row_number: usize,
    pub date: NaiveDate,
    pub description: String,
    /// Signed amount, negative for money going out
    pub amount: Money,
    pub source: TransactionSource,
    /// Stable fingerprint used to skip rows imported before
    pub import_id: String,
}

impl ParsedTransaction {
    /// Build a row whose import ID is derived from its content
    pub fn new(
        row_number: usize,
        date: NaiveDate,
        description: &str,
        amount: Money,
        source: TransactionSource,
    ) -> Self {
        let description = normalize_description(description);
        let import_id = crate::models::transaction::generate_import_id(date, amount, &description);
        Self {
            row_number,
            date,
            description,
            amount,
            source,
            import_id,
        }
    }
}

/// A row that could not be turned into a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub row_number: usize,
    pub message: String,
}

impl RowError {
    pub fn new(row_number: usize, message: impl Into<String>) -> Self {
        Self {
            row_number,
            message: message.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row_number, self.message)
    }
}

pub type ParsedRow = Result<ParsedTransaction, RowError>;

/// Parses one bank's statement export
pub trait StatementParser {
    fn format(&self) -> BankFormat;

    /// Parse every data row. Rows that are not transactions at all (too few
    /// columns) are dropped; rows with bad values come back as errors.
    fn parse(&self, content: &str) -> Vec<ParsedRow>;
}

/// Blank descriptions are stored as "No description"
pub(crate) fn normalize_description(description: &str) -> String {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        "No description".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Read all records of a delimited statement with their 1-based line numbers
pub(crate) fn read_records(content: &str, delimiter: u8) -> Vec<(usize, Result<StringRecord, String>)> {
    let content = content.trim_start_matches('\u{feff}');
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    let mut fallback_line = 0;
    for result in reader.records() {
        fallback_line += 1;
        match result {
            Ok(record) => {
                let line = record
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_line);
                records.push((line, Ok(record)));
            }
            Err(e) => records.push((fallback_line, Err(e.to_string()))),
        }
    }
    records
}

/// Parse a date or date-time cell, trying each format in turn
pub(crate) fn parse_date_with(value: &str, formats: &[&str]) -> Result<NaiveDate, String> {
    let value = value.trim();
    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.date());
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date);
        }
    }
    Err(format!("Could not parse date: '{}'", value))
}

/// Parse an amount cell
pub(crate) fn parse_amount(value: &str) -> Result<Money, String> {
    Money::parse(value).map_err(|e| format!("Could not parse amount '{}': {}", value.trim(), e))
}
