//! Header-driven parser for CSV exports of other banks
//!
//! Columns are located by header keywords; amounts come from a single signed
//! column or from separate debit/credit columns.

use csv::StringRecord;

use super::{parse_amount, parse_date_with, read_records, BankFormat, ParsedRow, ParsedTransaction, RowError, StatementParser};
use crate::models::{Money, TransactionSource};

const DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d",
    "%Y-%m-%d %H:%M:%S",
    "%d.%m.%Y",
    "%d.%m.%y",
    "%d.%m.%Y %H:%M",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d/%m/%y",
    "%Y/%m/%d",
    "%d-%m-%Y",
];

/// Where the interesting fields live in a generic CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub date_column: usize,
    /// Signed amount column, unused when debit and credit are both mapped
    pub amount_column: Option<usize>,
    pub debit_column: Option<usize>,
    pub credit_column: Option<usize>,
    pub description_column: Option<usize>,
    /// Appended to the description when present
    pub memo_column: Option<usize>,
    pub has_header: bool,
    pub delimiter: u8,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date_column: 0,
            amount_column: Some(1),
            debit_column: None,
            credit_column: None,
            description_column: Some(2),
            memo_column: None,
            has_header: true,
            delimiter: b',',
        }
    }
}

impl ColumnMapping {
    /// Detect the mapping from a header record
    ///
    /// Returns `None` when no amount column can be found.
    pub fn from_headers(headers: &StringRecord, delimiter: u8) -> Option<Self> {
        let mut mapping = Self {
            amount_column: None,
            description_column: None,
            delimiter,
            ..Self::default()
        };
        let mut date_found = false;

        for (idx, header) in headers.iter().enumerate() {
            let h = header.trim().to_lowercase();

            if !date_found && (h.contains("date") || h.contains("datum") || h.contains("booked")) {
                mapping.date_column = idx;
                date_found = true;
            } else if (h.contains("amount") || h.contains("betrag")) && mapping.amount_column.is_none() {
                mapping.amount_column = Some(idx);
            } else if h.contains("debit") || h.contains("withdrawal") || h.contains("belastung") {
                mapping.debit_column = Some(idx);
            } else if h.contains("credit") || h.contains("deposit") || h.contains("gutschrift") {
                mapping.credit_column = Some(idx);
            } else if mapping.description_column.is_none()
                && (h.contains("description")
                    || h.contains("text")
                    || h.contains("payee")
                    || h.contains("merchant")
                    || h.contains("name"))
            {
                mapping.description_column = Some(idx);
            } else if h.contains("memo") || h.contains("note") || h.contains("reference") {
                mapping.memo_column = Some(idx);
            }
        }

        if mapping.debit_column.is_some() && mapping.credit_column.is_some() {
            mapping.amount_column = None;
        } else if mapping.amount_column.is_none() {
            return None;
        }

        Some(mapping)
    }

    fn amount(&self, record: &StringRecord) -> Result<Money, String> {
        let cell = |i: usize| record.get(i).map(str::trim).unwrap_or("");

        if let Some(col) = self.amount_column {
            return parse_amount(cell(col));
        }

        let debit = match self.debit_column.map(cell) {
            Some(s) if !s.is_empty() => -parse_amount(s)?.abs(),
            _ => Money::zero(),
        };
        let credit = match self.credit_column.map(cell) {
            Some(s) if !s.is_empty() => parse_amount(s)?.abs(),
            _ => Money::zero(),
        };
        Ok(debit + credit)
    }

    fn parse_record(&self, record: &StringRecord, line: usize) -> Result<ParsedTransaction, String> {
        let date_cell = record
            .get(self.date_column)
            .ok_or_else(|| "Missing date column".to_string())?;
        let date = parse_date_with(date_cell, &DATE_FORMATS)?;
        let amount = self.amount(record)?;

        let field = |col: Option<usize>| {
            col.and_then(|c| record.get(c))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        let mut description = field(self.description_column);
        let memo = field(self.memo_column);
        if !memo.is_empty() {
            if description.is_empty() {
                description = memo;
            } else {
                description = format!("{} ({})", description, memo);
            }
        }

        Ok(ParsedTransaction::new(line, date, &description, amount, TransactionSource::Generic))
    }
}

/// Parser for arbitrary bank CSVs
#[derive(Debug, Clone, Default)]
pub struct GenericParser {
    mapping: Option<ColumnMapping>,
}

impl GenericParser {
    /// Detect delimiter and columns from the file's header
    pub fn detect() -> Self {
        Self { mapping: None }
    }

    pub fn with_mapping(mapping: ColumnMapping) -> Self {
        Self {
            mapping: Some(mapping),
        }
    }
}

/// Pick `;` when the header has more semicolons than commas
fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    }
}

impl StatementParser for GenericParser {
    fn format(&self) -> BankFormat {
        BankFormat::Generic
    }

    fn parse(&self, content: &str) -> Vec<ParsedRow> {
        let delimiter = self
            .mapping
            .as_ref()
            .map(|m| m.delimiter)
            .unwrap_or_else(|| sniff_delimiter(content));
        let mut records = read_records(content, delimiter).into_iter();

        let mapping = match &self.mapping {
            Some(mapping) => {
                if mapping.has_header {
                    records.next();
                }
                mapping.clone()
            }
            None => match records.next() {
                Some((_, Ok(header))) => match ColumnMapping::from_headers(&header, delimiter) {
                    Some(mapping) => mapping,
                    None => {
                        return vec![Err(RowError::new(1, "Could not find an amount column in the header"))]
                    }
                },
                Some((line, Err(e))) => return vec![Err(RowError::new(line, e))],
                None => return Vec::new(),
            },
        };

        records
            .filter(|(_, record)| !matches!(record, Ok(r) if r.iter().all(|c| c.trim().is_empty())))
            .map(|(line, record)| {
                record
                    .and_then(|r| mapping.parse_record(&r, line))
                    .map_err(|message| RowError::new(line, message))
            })
            .collect()
    }
}
