// Transaction entity
// Represents one financial transaction row from an uploaded table

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub account_id: String,
    pub timestamp: NaiveDateTime,
    pub amount: f64,
    pub location: String,
    /// Per-account baseline, denormalized onto every row by the data source.
    pub avg_daily_spend: f64,
    pub merchant: Option<String>,
    pub transaction_type: Option<String>,
}
