//! Ledger import from CSV exports
//!
//! Expected header (column order does not matter, extra columns are ignored):
//!
//! ```text
//! date,net_amount,description_fake,category_name,parent_name
//! "January 05, 2024",-42.10,CB CARREFOUR,Groceries,Food & Dining
//! ```
//!
//! Rows whose date cannot be parsed are kept with no date; the analyzers
//! leave them out of anything date-windowed.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::Transaction;

/// Accepted header names per field, first is canonical
const DATE_COLUMNS: &[&str] = &["date"];
const AMOUNT_COLUMNS: &[&str] = &["net_amount", "amount"];
const DESCRIPTION_COLUMNS: &[&str] = &["description_fake", "description"];
const CATEGORY_COLUMNS: &[&str] = &["category_name", "category"];
const PARENT_COLUMNS: &[&str] = &["parent_name", "parent_category"];

struct Columns {
    date: usize,
    amount: usize,
    description: usize,
    category: usize,
    parent: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| -> Result<usize> {
            headers
                .iter()
                .position(|h| {
                    let h = h.trim().trim_start_matches('\u{feff}');
                    names.iter().any(|n| h.eq_ignore_ascii_case(n))
                })
                .ok_or_else(|| Error::Import(format!("Missing column: {}", names[0])))
        };

        Ok(Self {
            date: find(DATE_COLUMNS)?,
            amount: find(AMOUNT_COLUMNS)?,
            description: find(DESCRIPTION_COLUMNS)?,
            category: find(CATEGORY_COLUMNS)?,
            parent: find(PARENT_COLUMNS)?,
        })
    }
}

/// Parse a ledger, sorted by date with undated rows last
pub fn parse_ledger<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut transactions = Vec::new();
    let mut undated = 0;

    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let amount = parse_amount(field(columns.amount))
            .map_err(|e| Error::Import(format!("line {}: {}", line, e)))?;

        let date = parse_date(field(columns.date));
        if date.is_none() {
            undated += 1;
            debug!(line, value = field(columns.date), "Unparsable date, row kept undated");
        }

        transactions.push(Transaction::new(
            date,
            amount,
            field(columns.description),
            field(columns.category),
            field(columns.parent),
        ));
    }

    // Stable: same-day rows keep file order
    transactions.sort_by_key(|tx| (tx.date.is_none(), tx.date));

    debug!(
        count = transactions.len(),
        undated, "Parsed ledger transactions"
    );
    Ok(transactions)
}

/// Open and parse a ledger file
pub fn load_ledger(path: &Path) -> Result<Vec<Transaction>> {
    let file = File::open(path)
        .map_err(|e| Error::Import(format!("Failed to open {}: {}", path.display(), e)))?;
    let transactions = parse_ledger(file)?;
    info!(
        path = %path.display(),
        count = transactions.len(),
        "Loaded ledger"
    );
    Ok(transactions)
}

/// Parse a date, `None` when no known format matches
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let formats = [
        "%B %d, %Y", // January 05, 2024
        "%Y-%m-%d",  // 2024-01-05
        "%d/%m/%Y",  // 05/01/2024 (European)
    ];

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse an amount string, handling currency symbols and separators
///
/// A comma followed by one or two trailing digits is a decimal comma
/// (`42,10`, `1.234,56`); any other comma separates thousands.
fn parse_amount(s: &str) -> Result<f64> {
    let mut cleaned: String = s
        .trim()
        .replace(['$', '€', '£', ' ', '\u{a0}'], "")
        .replace('(', "-")
        .replace(')', "");

    if let Some(pos) = cleaned.rfind(',') {
        let decimals = &cleaned[pos + 1..];
        let decimal_comma = (1..=2).contains(&decimals.len())
            && decimals.chars().all(|c| c.is_ascii_digit())
            && cleaned.rfind('.').map_or(true, |dot| dot < pos);
        if decimal_comma {
            cleaned = format!("{}.{}", cleaned[..pos].replace(['.', ','], ""), decimals);
        } else {
            cleaned = cleaned.replace(',', "");
        }
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::Import(format!("Unable to parse amount: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEDGER: &str = "\
date,net_amount,description_fake,category_name,parent_name,account
\"March 02, 2024\",-42.10,CB CARREFOUR,Groceries,Food & Dining,main
\"January 15, 2024\",\"2,500.00\",VIR SALAIRE,Salary,Income,main
not a date,-9.99,PRLV NETFLIX,Streaming,Subscriptions,main
\"January 15, 2024\",-800,PRLV LOYER,Rent,Housing,main
";

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("January 05, 2024"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(
            parse_date("2024-01-05"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(
            parse_date("05/01/2024"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("Febtober 40, 2024"), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("-42.10").unwrap(), -42.10);
        assert_eq!(parse_amount("$1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_amount("(12.00)").unwrap(), -12.0);
        assert_eq!(parse_amount(" 7 € ").unwrap(), 7.0);
        assert!(parse_amount("").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("NaN").is_err());
    }

    #[test]
    fn test_parse_amount_decimal_comma() {
        assert_eq!(parse_amount("42,10").unwrap(), 42.10);
        assert_eq!(parse_amount("-42,1").unwrap(), -42.1);
        assert_eq!(parse_amount("1.234,56 €").unwrap(), 1234.56);
        assert_eq!(parse_amount("1 234,56").unwrap(), 1234.56);
        // Three digits after a comma are a thousands group
        assert_eq!(parse_amount("1,234").unwrap(), 1234.0);
        assert_eq!(parse_amount("2,500.00").unwrap(), 2500.0);
    }

    #[test]
    fn test_decimal_comma_in_ledger() {
        let csv = "date,net_amount,description_fake,category_name,parent_name\n2024-01-01,\"-42,10\",CB MARCHE,Courses,Alimentation & Restau.\n";
        let txs = parse_ledger(csv.as_bytes()).unwrap();
        assert_eq!(txs[0].amount, -42.10);
    }

    #[test]
    fn test_parse_ledger_sorts_and_keeps_undated() {
        let txs = parse_ledger(LEDGER.as_bytes()).unwrap();
        assert_eq!(txs.len(), 4);

        // Same date keeps file order: salary before rent
        assert_eq!(txs[0].description, "VIR SALAIRE");
        assert_eq!(txs[0].amount, 2500.0);
        assert_eq!(txs[1].description, "PRLV LOYER");
        assert_eq!(txs[2].date, NaiveDate::from_ymd_opt(2024, 3, 2));
        assert_eq!(txs[2].parent_category, "Food & Dining");

        assert!(txs[3].date.is_none());
        assert_eq!(txs[3].category, "Streaming");
    }

    #[test]
    fn test_column_aliases_and_order() {
        let csv = "parent_category,amount,description,category,date\nHousing,-10,rent,Rent,2024-02-01\n";
        let txs = parse_ledger(csv.as_bytes()).unwrap();
        assert_eq!(txs[0].amount, -10.0);
        assert_eq!(txs[0].parent_category, "Housing");
        assert_eq!(txs[0].date, NaiveDate::from_ymd_opt(2024, 2, 1));
    }

    #[test]
    fn test_missing_column_is_error() {
        let csv = "date,net_amount,description_fake\n2024-01-01,-1,x\n";
        let err = parse_ledger(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("category_name"));
    }

    #[test]
    fn test_bad_amount_names_line() {
        let csv = "date,net_amount,description_fake,category_name,parent_name\n2024-01-01,oops,x,c,p\n";
        let err = parse_ledger(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Import(_)));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_load_ledger_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        std::fs::write(&path, LEDGER).unwrap();

        let txs = load_ledger(&path).unwrap();
        assert_eq!(txs.len(), 4);

        assert!(load_ledger(&dir.path().join("missing.csv")).is_err());
    }
}
