//! Raiffeisen e-banking CSV export
//!
//! Semicolon separated with a header line, columns:
//! `IBAN;Booked At;Text;Credit/Debit Amount;Balance;Valuta Date`.
//! Amounts may use a decimal comma and `'` thousands separators.

use tracing::{debug, warn};

use super::{parse_amount, parse_date_with, read_records, BankFormat, ParsedRow, ParsedTransaction, RowError, StatementParser};
use crate::models::TransactionSource;

const MIN_COLUMNS: usize = 6;
const DATE_COLUMN: usize = 1;
const DESCRIPTION_COLUMN: usize = 2;
const AMOUNT_COLUMN: usize = 3;

const DATE_FORMATS: [&str; 4] = ["%d.%m.%y %H:%M", "%d.%m.%Y %H:%M", "%d.%m.%y", "%d.%m.%Y"];

#[derive(Debug, Clone, Copy, Default)]
pub struct RaiffeisenParser;

impl StatementParser for RaiffeisenParser {
    fn format(&self) -> BankFormat {
        BankFormat::Raiffeisen
    }

    fn parse(&self, content: &str) -> Vec<ParsedRow> {
        let mut rows = Vec::new();

        for (line, record) in read_records(content, b';').into_iter().skip(1) {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    rows.push(Err(RowError::new(line, e)));
                    continue;
                }
            };

            if record.len() < MIN_COLUMNS {
                warn!(line, columns = record.len(), "skipping short Raiffeisen row");
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
                        TransactionSource::Raiffeisen,
                    )
                })
            });

            rows.push(parsed.map_err(|message| RowError::new(line, message)));
        }

        let parsed = rows.iter().filter(|row| row.is_ok()).count();
        debug!(parsed, errors = rows.len() - parsed, "parsed Raiffeisen statement");
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;

    const HEADER: &str = "IBAN;Booked At;Text;Credit/Debit Amount;Balance;Valuta Date";

    #[test]
    fn test_parse_statement() {
        let content = format!(
            "{}\n\
             CH9300762011623852957;05.03.25 14:30;Coop Pronto Bern;-12,50;1'987,50;05.03.25\n\
             CH9300762011623852957;28.02.2025 00:00;Salary ACME AG;5'400.00;2'000.00;28.02.2025\n",
            HEADER
        );

        let rows = RaiffeisenParser.parse(&content);
        assert_eq!(rows.len(), 2);

        let first = rows[0].as_ref().unwrap();
        assert_eq!(first.row_number, 2);
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        assert_eq!(first.description, "Coop Pronto Bern");
        assert_eq!(first.amount, Money::from_cents(-1250));
        assert_eq!(first.source, TransactionSource::Raiffeisen);

        let second = rows[1].as_ref().unwrap();
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        assert_eq!(second.amount, Money::from_cents(540000));
    }

    #[test]
    fn test_first_line_always_skipped() {
        // A data-looking first line is still treated as the header
        let line = "CH93;05.03.25 14:30;Coop;-1,00;0;05.03.25";
        let content = format!("{}\n{}\n", line, line);
        assert_eq!(RaiffeisenParser.parse(&content).len(), 1);
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let content = format!("{}\nCH93;05.03.25 14:30;Coop\n", HEADER);
        assert!(RaiffeisenParser.parse(&content).is_empty());
    }

    #[test]
    fn test_invalid_date_is_row_error() {
        let content = format!("{}\nCH93;2025-03-05;Coop;-1,00;0;05.03.25\n", HEADER);
        let rows = RaiffeisenParser.parse(&content);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_err());
    }
}
