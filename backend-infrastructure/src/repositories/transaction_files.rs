// Transaction table loading
// CSV in, validated Transaction rows out; malformed rows are never dropped

use std::io::Read;
use std::path::Path;

use thiserror::Error;

use backend_domain::{parse_timestamp, Transaction};

const REQUIRED_COLUMNS: [&str; 6] = [
    "TransactionID",
    "AccountID",
    "Timestamp",
    "Amount",
    "Location",
    "AvgDailySpend",
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("failed to parse CSV: {0}")]
    Csv(String),
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),
    #[error("row {row}: invalid {column}: '{value}'")]
    InvalidField {
        row: usize,
        column: &'static str,
        value: String,
    },
}

pub fn load_transactions_path(path: &Path) -> Result<Vec<Transaction>, LoadError> {
    let file = std::fs::File::open(path)
        .map_err(|err| LoadError::FileNotFound(format!("{}: {}", path.display(), err)))?;
    load_transactions(std::io::BufReader::new(file))
}

/// Parse a transaction table from CSV. Required columns are
/// TransactionID, AccountID, Timestamp, Amount, Location, AvgDailySpend;
/// Merchant and TransactionType pass through when present. Row numbers in
/// errors are 1-based over data rows.
pub fn load_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>, LoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|err| LoadError::Csv(err.to_string()))?
        .clone();

    let position = |name: &'static str| -> Result<usize, LoadError> {
        headers
            .iter()
            .position(|header| header.trim() == name)
            .ok_or(LoadError::MissingColumn(name))
    };
    let transaction_id = position(REQUIRED_COLUMNS[0])?;
    let account_id = position(REQUIRED_COLUMNS[1])?;
    let timestamp = position(REQUIRED_COLUMNS[2])?;
    let amount = position(REQUIRED_COLUMNS[3])?;
    let location = position(REQUIRED_COLUMNS[4])?;
    let avg_daily_spend = position(REQUIRED_COLUMNS[5])?;
    let merchant = headers.iter().position(|header| header.trim() == "Merchant");
    let transaction_type = headers
        .iter()
        .position(|header| header.trim() == "TransactionType");

    let mut transactions = Vec::new();
    for (index, result) in csv_reader.records().enumerate() {
        let row = index + 1;
        let record = result.map_err(|err| LoadError::Csv(err.to_string()))?;
        let field = |column_index: usize| record.get(column_index).unwrap_or("").trim();

        let parsed_timestamp = parse_timestamp(field(timestamp)).ok_or_else(|| {
            LoadError::InvalidField {
                row,
                column: "Timestamp",
                value: field(timestamp).to_string(),
            }
        })?;
        let parsed_amount = parse_decimal(field(amount)).ok_or_else(|| LoadError::InvalidField {
            row,
            column: "Amount",
            value: field(amount).to_string(),
        })?;
        let parsed_baseline =
            parse_decimal(field(avg_daily_spend)).ok_or_else(|| LoadError::InvalidField {
                row,
                column: "AvgDailySpend",
                value: field(avg_daily_spend).to_string(),
            })?;

        transactions.push(Transaction {
            transaction_id: field(transaction_id).to_string(),
            account_id: field(account_id).to_string(),
            timestamp: parsed_timestamp,
            amount: parsed_amount,
            location: field(location).to_string(),
            avg_daily_spend: parsed_baseline,
            merchant: merchant.map(|i| field(i).to_string()).filter(|v| !v.is_empty()),
            transaction_type: transaction_type
                .map(|i| field(i).to_string())
                .filter(|v| !v.is_empty()),
        });
    }
    Ok(transactions)
}

fn parse_decimal(raw: &str) -> Option<f64> {
    let value: f64 = raw.parse().ok()?;
    value.is_finite().then_some(value)
}
