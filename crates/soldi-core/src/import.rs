//! Bank statement and CSV import
//!
//! Postal bank xlsx exports carry 8 rows of letterhead before the data:
//! column 0 is the date, column 2 the debit amount, column 3 the credit
//! amount, column 4 the description. Parsing keeps every data row, even
//! ones missing fields, so a preview can show exactly what the file
//! contains; the commit loop then skips rows it cannot store.

use std::io::{Read, Seek};

use calamine::{Data, Reader, Xlsx};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Posting};

/// Letterhead rows before the first data row in a statement export
pub const STATEMENT_HEADER_ROWS: usize = 8;

/// Rows shown when previewing a file before import
pub const PREVIEW_ROWS: usize = 5;

/// Description used when the statement leaves the field blank
pub const DEFAULT_DESCRIPTION: &str = "Imported transaction";

const COL_DATE: usize = 0;
const COL_DEBIT: usize = 2;
const COL_CREDIT: usize = 3;
const COL_DESCRIPTION: usize = 4;

/// One parsed statement row. Fields the file did not provide (or that
/// failed to parse) stay `None` and make the row non-importable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementRow {
    pub date: Option<NaiveDate>,
    pub description: String,
    /// Signed: negative for debits, positive for credits
    pub amount: Option<f64>,
}

impl StatementRow {
    pub fn is_importable(&self) -> bool {
        self.date.is_some() && self.amount.is_some()
    }
}

/// Tally of one commit pass over parsed rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    /// Rows persisted as transactions
    pub imported: usize,
    /// Rows missing a date or amount, never attempted
    pub skipped: usize,
    /// Rows that failed to persist
    pub failed: usize,
}

/// Parse an xlsx bank statement from any seekable reader
pub fn parse_statement<R: Read + Seek>(reader: R) -> Result<Vec<StatementRow>> {
    let mut workbook = Xlsx::new(reader)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Import("Workbook contains no sheets".to_string()))??;

    let rows = parse_grid(range.rows());
    debug!(rows = rows.len(), "Parsed statement");
    Ok(rows)
}

/// Parse a generic CSV export with `date,description,amount` columns
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<StatementRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let col = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    let date_col = col("date")
        .ok_or_else(|| Error::Import("CSV is missing a 'date' column".to_string()))?;
    let amount_col = col("amount")
        .ok_or_else(|| Error::Import("CSV is missing an 'amount' column".to_string()))?;
    let description_col = col("description");

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let description = description_col
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_DESCRIPTION)
            .to_string();
        rows.push(StatementRow {
            date: record.get(date_col).and_then(parse_date),
            description,
            amount: record.get(amount_col).and_then(parse_amount),
        });
    }
    Ok(rows)
}

/// The first rows of a parse, for showing the user before committing
pub fn preview(rows: &[StatementRow]) -> &[StatementRow] {
    &rows[..rows.len().min(PREVIEW_ROWS)]
}

/// Persist parsed rows as transactions against one account.
///
/// Each row is committed independently: a failure is logged and counted,
/// then the loop moves on, so one bad row never blocks the rest of the
/// file. Rows already present in the database are imported again, there
/// is no duplicate detection.
pub fn commit_rows(
    db: &Database,
    user_id: i64,
    account_id: i64,
    rows: &[StatementRow],
) -> ImportOutcome {
    let mut outcome = ImportOutcome::default();

    for (index, row) in rows.iter().enumerate() {
        let (Some(date), Some(amount)) = (row.date, row.amount) else {
            debug!(row = index, "Skipping row without date or amount");
            outcome.skipped += 1;
            continue;
        };

        let posting = if amount < 0.0 {
            Posting::expense(account_id, None, None)
        } else {
            Posting::income(account_id, None, None)
        };

        let result = NewTransaction::new(date, row.description.clone(), amount.abs(), posting)
            .and_then(|tx| db.insert_transaction(user_id, &tx));
        match result {
            Ok(_) => outcome.imported += 1,
            Err(e) => {
                warn!(row = index, error = %e, "Failed to import statement row");
                outcome.failed += 1;
            }
        }
    }

    outcome
}

fn parse_grid<'a>(rows: impl Iterator<Item = &'a [Data]>) -> Vec<StatementRow> {
    rows.skip(STATEMENT_HEADER_ROWS).map(parse_row).collect()
}

fn parse_row(cells: &[Data]) -> StatementRow {
    let date = cells.get(COL_DATE).and_then(parse_date_cell);

    // A value in the debit column wins and is always negative, the
    // credit column only counts when the debit column is empty
    let debit = cells.get(COL_DEBIT).and_then(parse_amount_cell);
    let credit = cells.get(COL_CREDIT).and_then(parse_amount_cell);
    let amount = match (debit, credit) {
        (Some(d), _) => Some(-d.abs()),
        (None, Some(c)) => Some(c.abs()),
        (None, None) => None,
    };

    let description = match cells.get(COL_DESCRIPTION) {
        Some(Data::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => DEFAULT_DESCRIPTION.to_string(),
    };

    StatementRow {
        date,
        description,
        amount,
    }
}

fn parse_date_cell(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::Float(f) => excel_serial_to_date(*f),
        Data::Int(i) => excel_serial_to_date(*i as f64),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()),
        Data::String(s) => parse_date(s),
        _ => None,
    }
}

/// Statement dates are day-first; ISO dates are accepted as well
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

fn parse_amount_cell(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => parse_amount(s),
        _ => None,
    }
}

/// Parse an amount in either "1.234,56" or "1234.56" notation
fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€' && *c != '+')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(',') {
        // Comma decimal separator, dots are thousands separators
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Excel serial day to date. The epoch is 1899-12-30, which absorbs
/// Excel's fictitious 1900-02-29.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if serial <= 0.0 || serial > 200_000.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_days(chrono::Days::new(serial as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    fn data_row(date: &str, debit: Option<f64>, credit: Option<f64>, desc: &str) -> Vec<Data> {
        vec![
            s(date),
            Data::Empty,
            debit.map(Data::Float).unwrap_or(Data::Empty),
            credit.map(Data::Float).unwrap_or(Data::Empty),
            s(desc),
        ]
    }

    fn header_rows() -> Vec<Vec<Data>> {
        (0..STATEMENT_HEADER_ROWS)
            .map(|i| vec![s(&format!("Letterhead {}", i))])
            .collect()
    }

    fn parse(grid: &[Vec<Data>]) -> Vec<StatementRow> {
        parse_grid(grid.iter().map(Vec::as_slice))
    }

    #[test]
    fn skips_letterhead_rows() {
        let mut grid = header_rows();
        grid.push(data_row("05/03/2024", Some(12.50), None, "Groceries"));
        grid.push(data_row("06/03/2024", None, Some(1500.0), "Salary"));

        let rows = parse(&grid);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(StatementRow::is_importable));
    }

    #[test]
    fn letterhead_only_file_yields_nothing() {
        let rows = parse(&header_rows());
        assert!(rows.is_empty());
    }

    #[test]
    fn debit_column_becomes_negative_amount() {
        let mut grid = header_rows();
        grid.push(data_row("05/03/2024", Some(42.0), None, "Card payment"));

        let rows = parse(&grid);
        assert_eq!(rows[0].amount, Some(-42.0));
    }

    #[test]
    fn debit_wins_even_when_stored_negative() {
        let mut grid = header_rows();
        grid.push(data_row("05/03/2024", Some(-42.0), None, "Card payment"));

        let rows = parse(&grid);
        assert_eq!(rows[0].amount, Some(-42.0));
    }

    #[test]
    fn credit_only_becomes_positive_amount() {
        let mut grid = header_rows();
        grid.push(data_row("05/03/2024", None, Some(250.0), "Refund"));

        let rows = parse(&grid);
        assert_eq!(rows[0].amount, Some(250.0));
    }

    #[test]
    fn day_first_dates_are_normalized() {
        let mut grid = header_rows();
        grid.push(data_row("05/03/2024", Some(1.0), None, "x"));

        let rows = parse(&grid);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(rows[0].date.unwrap().to_string(), "2024-03-05");
    }

    #[test]
    fn excel_serial_dates_are_accepted() {
        let mut grid = header_rows();
        grid.push(vec![
            Data::Float(45667.0),
            Data::Empty,
            Data::Float(10.0),
            Data::Empty,
            s("Serial date"),
        ]);

        let rows = parse(&grid);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2025, 1, 10));
    }

    #[test]
    fn malformed_date_leaves_row_unimportable() {
        let mut grid = header_rows();
        grid.push(data_row("not a date", Some(10.0), None, "x"));

        let rows = parse(&grid);
        assert_eq!(rows[0].date, None);
        assert!(!rows[0].is_importable());
    }

    #[test]
    fn blank_description_gets_default() {
        let mut grid = header_rows();
        grid.push(data_row("05/03/2024", Some(10.0), None, "  "));

        let rows = parse(&grid);
        assert_eq!(rows[0].description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn italian_amount_notation() {
        assert_eq!(parse_amount("1.234,56"), Some(1234.56));
        assert_eq!(parse_amount("€ 12,00"), Some(12.0));
        assert_eq!(parse_amount("1234.56"), Some(1234.56));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("n/a"), None);
    }

    #[test]
    fn preview_caps_at_five_rows() {
        let rows: Vec<StatementRow> = (0..12)
            .map(|i| StatementRow {
                date: NaiveDate::from_ymd_opt(2024, 1, 1 + i),
                description: format!("row {}", i),
                amount: Some(1.0),
            })
            .collect();
        assert_eq!(preview(&rows).len(), PREVIEW_ROWS);

        let short = &rows[..2];
        assert_eq!(preview(short).len(), 2);
    }

    #[test]
    fn commit_persists_each_importable_row() {
        let db = Database::in_memory().unwrap();
        let user = db.get_or_create_local_user().unwrap();
        let account = db.create_account(user.id, "Bancoposta", 100.0).unwrap();

        let mut grid = header_rows();
        grid.push(data_row("05/03/2024", Some(30.0), None, "Groceries"));
        grid.push(data_row("06/03/2024", None, Some(1500.0), "Salary"));
        grid.push(data_row("07/03/2024", Some(20.0), None, "Fuel"));
        let rows = parse(&grid);

        let outcome = commit_rows(&db, user.id, account.id, &rows);
        assert_eq!(outcome.imported, 3);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(outcome.failed, 0);
        assert_eq!(db.count_transactions(user.id).unwrap(), 3);

        // Debits stored as expenses, credits as income, at write time
        let account = db.get_account(user.id, account.id).unwrap().unwrap();
        assert!((account.balance - 1550.0).abs() < 1e-9);
    }

    #[test]
    fn rows_without_date_and_amount_are_skipped_not_persisted() {
        let db = Database::in_memory().unwrap();
        let user = db.get_or_create_local_user().unwrap();
        let account = db.create_account(user.id, "Contanti", 0.0).unwrap();

        let mut grid = header_rows();
        grid.push(vec![s(""), Data::Empty, Data::Empty, Data::Empty, s("junk")]);
        grid.push(data_row("05/03/2024", Some(5.0), None, "Coffee"));
        let rows = parse(&grid);

        let outcome = commit_rows(&db, user.id, account.id, &rows);
        assert_eq!(outcome.imported, 1);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(db.count_transactions(user.id).unwrap(), 1);
    }

    #[test]
    fn failure_on_one_row_does_not_stop_the_rest() {
        let db = Database::in_memory().unwrap();
        let user = db.get_or_create_local_user().unwrap();

        // Nonexistent account makes every persistence attempt fail; the
        // loop must still visit every row and report each failure
        let mut grid = header_rows();
        grid.push(data_row("05/03/2024", Some(5.0), None, "a"));
        grid.push(data_row("06/03/2024", Some(6.0), None, "b"));
        grid.push(data_row("07/03/2024", Some(7.0), None, "c"));
        let rows = parse(&grid);

        let outcome = commit_rows(&db, user.id, 9999, &rows);
        assert_eq!(outcome.imported, 0);
        assert_eq!(outcome.failed, 3);
        assert_eq!(db.count_transactions(user.id).unwrap(), 0);
    }

    #[test]
    fn reimporting_the_same_rows_duplicates_them() {
        let db = Database::in_memory().unwrap();
        let user = db.get_or_create_local_user().unwrap();
        let account = db.create_account(user.id, "Postepay", 0.0).unwrap();

        let mut grid = header_rows();
        grid.push(data_row("05/03/2024", Some(5.0), None, "Coffee"));
        let rows = parse(&grid);

        commit_rows(&db, user.id, account.id, &rows);
        commit_rows(&db, user.id, account.id, &rows);
        assert_eq!(db.count_transactions(user.id).unwrap(), 2);
    }

    #[test]
    fn csv_import_parses_headered_files() {
        let csv = "date,description,amount\n\
                   2024-03-05,Groceries,-30.50\n\
                   06/03/2024,,1500\n";
        let rows = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, Some(-30.50));
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2024, 3, 6));
        assert_eq!(rows[1].description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn csv_without_date_column_is_rejected() {
        let csv = "description,amount\nCoffee,-2.0\n";
        assert!(parse_csv(csv.as_bytes()).is_err());
    }
}
