//! Transaction history loading
//!
//! History arrives as CSV (`date,description,amount[,category][,id]`, header
//! required, column order free) or as a JSON array of transactions.

use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Transaction;

/// Column positions resolved from the CSV header
struct Columns {
    date: usize,
    description: usize,
    amount: usize,
    category: Option<usize>,
    id: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::InvalidData(format!("Missing '{}' column", name)))
        };
        Ok(Self {
            date: require("date")?,
            description: require("description")?,
            amount: require("amount")?,
            category: find("category"),
            id: find("id"),
        })
    }
}

/// Parse transactions from CSV
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut transactions = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let line = row + 2;

        let field = |index: usize, name: &str| {
            record
                .get(index)
                .ok_or_else(|| Error::InvalidData(format!("Line {}: missing {}", line, name)))
        };

        let date = parse_date(field(columns.date, "date")?)
            .map_err(|e| Error::InvalidData(format!("Line {}: {}", line, e)))?;
        let description = field(columns.description, "description")?.to_string();
        let amount = parse_amount(field(columns.amount, "amount")?)
            .map_err(|e| Error::InvalidData(format!("Line {}: {}", line, e)))?;
        let category = columns
            .category
            .and_then(|i| record.get(i))
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty());
        let id = columns
            .id
            .and_then(|i| record.get(i))
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("row-{}", line));

        transactions.push(Transaction {
            id,
            description,
            amount,
            date,
            category,
        });
    }

    debug!("Parsed {} transactions from CSV", transactions.len());
    Ok(transactions)
}

/// Parse transactions from a JSON array
pub fn parse_json(content: &str) -> Result<Vec<Transaction>> {
    let transactions: Vec<Transaction> = serde_json::from_str(content)?;

    let mut seen = HashSet::new();
    for tx in &transactions {
        if !tx.amount.is_finite() {
            return Err(Error::InvalidData(format!(
                "transaction '{}' has a non-finite amount",
                tx.id
            )));
        }
        if !seen.insert(tx.id.as_str()) {
            return Err(Error::InvalidData(format!(
                "duplicate transaction id '{}'",
                tx.id
            )));
        }
    }
    Ok(transactions)
}

/// Load transactions from a `.json` or `.csv` file
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        let content = fs::read_to_string(path)?;
        parse_json(&content)
    } else {
        let file = fs::File::open(path)?;
        parse_csv(file)
    }
}

/// Parse a date in ISO or day-first European form
fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%d-%m-%Y", // 15-01-2024
        "%d/%m/%Y", // 15/01/2024
        "%Y%m%d",   // 20240115
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::InvalidData(format!("Unable to parse date: {}", s)))
}

/// Parse an amount, handling currency symbols and decimal commas
fn parse_amount(s: &str) -> Result<f64> {
    let mut cleaned: String = s
        .trim()
        .replace(['€', '$', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    // Whichever separator comes last is the decimal one
    match (cleaned.rfind(','), cleaned.rfind('.')) {
        // 1.234,56 or 45,30
        (Some(comma), dot) if dot.map_or(true, |d| comma > d) => {
            cleaned = cleaned.replace('.', "").replace(',', ".");
        }
        // 1,234.56
        (Some(_), Some(_)) => cleaned = cleaned.replace(',', ""),
        _ => {}
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::InvalidData(format!("Unable to parse amount: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("2024-01-15").unwrap(), expected);
        assert_eq!(parse_date("15-01-2024").unwrap(), expected);
        assert_eq!(parse_date("15/01/2024").unwrap(), expected);
        assert_eq!(parse_date("20240115").unwrap(), expected);
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("€1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_amount("-45,30").unwrap(), -45.30);
        assert_eq!(parse_amount("-1.234,56").unwrap(), -1234.56);
        assert_eq!(parse_amount("€ 12.345.678,9").unwrap(), 12345678.9);
        assert_eq!(parse_amount("(100.00)").unwrap(), -100.00);
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("NaN").is_err());
    }

    #[test]
    fn test_parse_csv() {
        let csv = "date,description,amount,category
2024-01-15,Albert Heijn 1234,-45.30,
2024-01-25,Salary,2800.00,income";

        let transactions = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].description, "Albert Heijn 1234");
        assert_eq!(transactions[0].amount, -45.30);
        assert_eq!(transactions[0].category, None);
        assert_eq!(transactions[0].id, "row-2");
        assert_eq!(transactions[1].category, Some("income".to_string()));
    }

    #[test]
    fn test_parse_csv_column_order_and_ids() {
        let csv = "Amount,ID,Date,Description
-12.50,abc,2024-02-01,Spotify";

        let transactions = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(transactions[0].id, "abc");
        assert_eq!(transactions[0].amount, -12.50);
        assert_eq!(
            transactions[0].date,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
    }

    #[test]
    fn test_parse_csv_errors() {
        let missing_column = "date,amount\n2024-01-01,-5";
        assert!(matches!(
            parse_csv(missing_column.as_bytes()),
            Err(Error::InvalidData(_))
        ));

        let bad_date = "date,description,amount\nsoon,Coffee,-3";
        let err = parse_csv(bad_date.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn test_parse_json() {
        let json = r#"[
            {"id": "t1", "description": "Jumbo", "amount": -20.5, "date": "2024-03-01"},
            {"id": "t2", "description": "Rent", "amount": -1000, "date": "2024-03-01", "category": "rent"}
        ]"#;
        let transactions = parse_json(json).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[1].category.as_deref(), Some("rent"));

        let duplicate = r#"[
            {"id": "t1", "description": "A", "amount": -1, "date": "2024-03-01"},
            {"id": "t1", "description": "B", "amount": -2, "date": "2024-03-02"}
        ]"#;
        assert!(parse_json(duplicate).is_err());
        assert!(matches!(parse_json("{not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_load_transactions_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("history.csv");
        fs::write(&csv_path, "date,description,amount\n2024-01-01,Lidl,-9.99\n").unwrap();
        assert_eq!(load_transactions(&csv_path).unwrap().len(), 1);

        let json_path = dir.path().join("history.JSON");
        fs::write(
            &json_path,
            r#"[{"id":"x","description":"Lidl","amount":-1.0,"date":"2024-01-01"}]"#,
        )
        .unwrap();
        assert_eq!(load_transactions(&json_path).unwrap()[0].id, "x");
    }
}
