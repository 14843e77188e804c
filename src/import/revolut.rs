//! Revolut account statement export
//!
//! Comma separated, columns:
//! `Type,Product,Started Date,Completed Date,Description,Amount,Fee,Currency,State,Balance`

use tracing::{debug, warn};

use super::{parse_amount, parse_date_with, read_records, BankFormat, ParsedRow, ParsedTransaction, RowError, StatementParser};
use crate::models::TransactionSource;

const MIN_COLUMNS: usize = 6;
const DATE_COLUMN: usize = 3;
const DESCRIPTION_COLUMN: usize = 4;
const AMOUNT_COLUMN: usize = 5;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%d"];

#[derive(Debug, Clone, Copy, Default)]
pub struct RevolutParser;

impl StatementParser for RevolutParser {
    fn format(&self) -> BankFormat {
        BankFormat::Revolut
    }

    fn parse(&self, content: &str) -> Vec<ParsedRow> {
        let mut rows = Vec::new();

        for (index, (line, record)) in read_records(content, b',').into_iter().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    rows.push(Err(RowError::new(line, e)));
                    continue;
                }
            };

            if index == 0 && record.iter().any(|cell| cell.to_lowercase().contains("type")) {
                continue;
            }

            if record.len() < MIN_COLUMNS {
                warn!(line, columns = record.len(), "skipping short Revolut row");
                continue;
            }

            let cell = |i: usize| record.get(i).unwrap_or("").trim();

            let parsed = parse_date_with(cell(DATE_COLUMN), &DATE_FORMATS).and_then(|date| {
                parse_amount(cell(AMOUNT_COLUMN)).map(|amount| {
                    ParsedTransaction::new(
                        line,
                        date,
                        cell(DESCRIPTION_COLUMN),
                        amount,
                        TransactionSource::Revolut,
                    )
                })
            });

            rows.push(parsed.map_err(|message| RowError::new(line, message)));
        }

        let parsed = rows.iter().filter(|row| row.is_ok()).count();
        debug!(parsed, errors = rows.len() - parsed, "parsed Revolut statement");
        rows
    }
}
