// Anomaly entity
// A flagged transaction together with the rules that fired on it

use serde::{Deserialize, Serialize};

use crate::entities::Transaction;
use crate::value_objects::AnomalyRule;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub transaction: Transaction,
    /// Non-empty, in fixed rule evaluation order.
    pub rules: Vec<AnomalyRule>,
    pub narrative: Option<String>,
}

impl AnomalyRecord {
    /// Comma-joined label, e.g. "Foreign Location, High Velocity".
    pub fn anomaly_type(&self) -> String {
        self.rules
            .iter()
            .map(|rule| rule.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn to_row(&self) -> AnomalyReportRow {
        let txn = &self.transaction;
        AnomalyReportRow {
            transaction_id: txn.transaction_id.clone(),
            account_id: txn.account_id.clone(),
            timestamp: txn.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            amount: txn.amount,
            location: txn.location.clone(),
            avg_daily_spend: txn.avg_daily_spend,
            merchant: txn.merchant.clone(),
            transaction_type: txn.transaction_type.clone(),
            anomaly_type: self.anomaly_type(),
            narrative: self.narrative.clone().unwrap_or_default(),
        }
    }
}

/// Flat row shape used by the HTTP surface and the CSV report.
/// Header names match the input table columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyReportRow {
    #[serde(rename = "TransactionID")]
    pub transaction_id: String,
    #[serde(rename = "AccountID")]
    pub account_id: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "AvgDailySpend")]
    pub avg_daily_spend: f64,
    #[serde(rename = "Merchant")]
    pub merchant: Option<String>,
    #[serde(rename = "TransactionType")]
    pub transaction_type: Option<String>,
    #[serde(rename = "AnomalyType")]
    pub anomaly_type: String,
    #[serde(rename = "Narrative")]
    pub narrative: String,
}
