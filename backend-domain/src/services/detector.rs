use std::collections::HashMap;

use chrono::Duration;
use thiserror::Error;

use crate::entities::{AnomalyRecord, DetectorConfig, Transaction};
use crate::value_objects::AnomalyRule;

/// Rule-based transaction anomaly detector.
///
/// Pure over its input: the caller's slice is never mutated, and running the
/// same input twice yields identical output. Flagged rows are returned in
/// original input order regardless of the per-account sorting done internally
/// for the velocity window.
#[derive(Debug, Default)]
pub struct Detector;

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("invalid transaction at row {row} ({transaction_id}): field {field}: {reason}")]
    Validation {
        row: usize,
        transaction_id: String,
        field: &'static str,
        reason: String,
    },
}

impl Detector {
    pub fn new() -> Self {
        Self
    }

    /// Run all four rules over the table and return the rows that tripped at
    /// least one, each annotated with the rules that fired in fixed order.
    ///
    /// Malformed rows are a hard error raised before any rule evaluation;
    /// silently skipping them could hide data-quality issues masquerading as
    /// "no anomaly".
    pub fn detect(
        &self,
        transactions: &[Transaction],
        config: &DetectorConfig,
    ) -> Result<Vec<AnomalyRecord>, DetectionError> {
        validate(transactions)?;

        let velocity = velocity_flags(transactions, config);

        let mut records = Vec::new();
        for (index, txn) in transactions.iter().enumerate() {
            let mut rules = Vec::new();
            if high_value(txn, config) {
                rules.push(AnomalyRule::HighValue);
            }
            if odd_hour(txn, config) {
                rules.push(AnomalyRule::OddHour);
            }
            if !config.is_domestic(&txn.location) {
                rules.push(AnomalyRule::ForeignLocation);
            }
            if velocity[index] {
                rules.push(AnomalyRule::HighVelocity);
            }
            if !rules.is_empty() {
                records.push(AnomalyRecord {
                    transaction: txn.clone(),
                    rules,
                    narrative: None,
                });
            }
        }
        Ok(records)
    }
}

fn validate(transactions: &[Transaction]) -> Result<(), DetectionError> {
    for (row, txn) in transactions.iter().enumerate() {
        let fail = |field: &'static str, reason: String| DetectionError::Validation {
            row,
            transaction_id: txn.transaction_id.clone(),
            field,
            reason,
        };
        if txn.transaction_id.trim().is_empty() {
            return Err(fail("TransactionID", "must not be empty".to_string()));
        }
        if txn.account_id.trim().is_empty() {
            return Err(fail("AccountID", "must not be empty".to_string()));
        }
        if !txn.amount.is_finite() || txn.amount < 0.0 {
            return Err(fail("Amount", format!("must be non-negative, got {}", txn.amount)));
        }
        if !txn.avg_daily_spend.is_finite() || txn.avg_daily_spend < 0.0 {
            return Err(fail(
                "AvgDailySpend",
                format!("must be non-negative, got {}", txn.avg_daily_spend),
            ));
        }
    }
    Ok(())
}

/// Strict greater-than: an amount exactly at the multiple does not fire.
/// A zero baseline therefore flags every positive amount, which is intended.
fn high_value(txn: &Transaction, config: &DetectorConfig) -> bool {
    txn.amount > txn.avg_daily_spend * config.high_value_multiplier
}

/// Half-open [start, end): the start hour fires, the end hour does not.
fn odd_hour(txn: &Transaction, config: &DetectorConfig) -> bool {
    let hour = chrono::Timelike::hour(&txn.timestamp);
    hour >= config.odd_hours_start && hour < config.odd_hours_end
}

/// Per-account trailing window count, two-pointer over the sorted partition.
///
/// The window is inclusive at both ends: transactions with timestamp in
/// [t - window, t] count, including the transaction itself. The rule fires
/// when that count is strictly greater than the threshold.
fn velocity_flags(transactions: &[Transaction], config: &DetectorConfig) -> Vec<bool> {
    let mut flags = vec![false; transactions.len()];
    let window = Duration::minutes(i64::from(config.velocity_window_minutes));

    let mut partitions: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, txn) in transactions.iter().enumerate() {
        partitions.entry(txn.account_id.as_str()).or_default().push(index);
    }

    for indices in partitions.values_mut() {
        // Stable by construction: equal timestamps keep input order because
        // the index vector is built in input order.
        indices.sort_by_key(|&index| transactions[index].timestamp);

        let mut start = 0usize;
        for position in 0..indices.len() {
            let current = transactions[indices[position]].timestamp;
            while transactions[indices[start]].timestamp < current - window {
                start += 1;
            }
            let count = position - start + 1;
            if count as u32 > config.velocity_threshold_count {
                flags[indices[position]] = true;
            }
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn txn(id: &str, account: &str, ts: chrono::NaiveDateTime, amount: f64) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            account_id: account.to_string(),
            timestamp: ts,
            amount,
            location: "New York".to_string(),
            avg_daily_spend: 100.0,
            merchant: None,
            transaction_type: None,
        }
    }

    fn detect(transactions: &[Transaction]) -> Vec<AnomalyRecord> {
        Detector::new()
            .detect(transactions, &DetectorConfig::default())
            .expect("detect")
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(detect(&[]).is_empty());
    }

    #[test]
    fn clean_transaction_is_not_flagged() {
        let rows = detect(&[txn("T1", "A1", at(12, 0), 50.0)]);
        assert!(rows.is_empty());
    }

    #[test]
    fn high_value_is_strict_greater_than() {
        // Exactly 10x the baseline does not fire.
        let rows = detect(&[txn("T1", "A1", at(12, 0), 1000.0)]);
        assert!(rows.is_empty());

        let rows = detect(&[txn("T1", "A1", at(12, 0), 1000.01)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rules, vec![AnomalyRule::HighValue]);
    }

    #[test]
    fn zero_baseline_flags_any_positive_amount() {
        let mut t = txn("T1", "A1", at(12, 0), 0.01);
        t.avg_daily_spend = 0.0;
        let rows = detect(&[t]);
        assert_eq!(rows[0].rules, vec![AnomalyRule::HighValue]);
    }

    #[test]
    fn odd_hour_range_is_half_open() {
        // hour == start fires
        let rows = detect(&[txn("T1", "A1", at(1, 0), 50.0)]);
        assert_eq!(rows[0].rules, vec![AnomalyRule::OddHour]);
        // interior hour fires
        let rows = detect(&[txn("T1", "A1", at(4, 59), 50.0)]);
        assert_eq!(rows[0].rules, vec![AnomalyRule::OddHour]);
        // hour == end does not fire
        let rows = detect(&[txn("T1", "A1", at(5, 0), 50.0)]);
        assert!(rows.is_empty());
    }

    #[test]
    fn foreign_location_fires_only_outside_domestic_set() {
        let mut t = txn("T1", "A1", at(12, 0), 50.0);
        t.location = "Moscow".to_string();
        let rows = detect(&[t]);
        assert_eq!(rows[0].rules, vec![AnomalyRule::ForeignLocation]);

        let mut t = txn("T2", "A1", at(12, 0), 50.0);
        t.location = "Internet".to_string();
        assert!(detect(&[t]).is_empty());
    }

    #[test]
    fn velocity_fires_once_count_exceeds_threshold() {
        // 5 transactions spaced 2 minutes apart: counts run 1..=5, and only
        // the 5th exceeds the threshold of 4.
        let transactions: Vec<Transaction> = (0..5u32)
            .map(|i| txn(&format!("T{i}"), "A1", at(12, 2 * i), 50.0))
            .collect();
        let rows = detect(&transactions);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].transaction.transaction_id, "T4");
        assert_eq!(rows[0].rules, vec![AnomalyRule::HighVelocity]);
    }

    #[test]
    fn velocity_ignores_transactions_outside_the_window() {
        let mut transactions: Vec<Transaction> = (0..5u32)
            .map(|i| txn(&format!("T{i}"), "A1", at(12, 2 * i), 50.0))
            .collect();
        // 100 minutes after t0, far outside every prior window.
        transactions.push(txn("T5", "A1", at(13, 40), 50.0));
        let rows = detect(&transactions);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].transaction.transaction_id, "T4");
    }

    #[test]
    fn velocity_window_lower_bound_is_inclusive() {
        // Four transactions at t, then one exactly 10 minutes later: the
        // boundary rows still count, so the 5th sees a count of 5 > 4.
        // With an exclusive lower bound its count would be 1.
        let mut transactions: Vec<Transaction> = (0..4u32)
            .map(|i| txn(&format!("T{i}"), "A1", at(12, 0), 50.0))
            .collect();
        transactions.push(txn("T4", "A1", at(12, 10), 50.0));
        let rows = detect(&transactions);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].transaction.transaction_id, "T4");
        assert_eq!(rows[0].rules, vec![AnomalyRule::HighVelocity]);
    }

    #[test]
    fn velocity_is_account_local() {
        // Five accounts, one transaction each, same instant: no velocity.
        let transactions: Vec<Transaction> = (0..5u32)
            .map(|i| txn(&format!("T{i}"), &format!("A{i}"), at(12, 0), 50.0))
            .collect();
        assert!(detect(&transactions).is_empty());
    }

    #[test]
    fn anomaly_type_order_is_fixed() {
        // Foreign + velocity: label order never depends on which rule "won".
        let mut transactions: Vec<Transaction> = (0..5u32)
            .map(|i| txn(&format!("T{i}"), "A1", at(12, i), 50.0))
            .collect();
        for t in &mut transactions {
            t.location = "Moscow".to_string();
        }
        let rows = detect(&transactions);
        let last = rows.last().expect("flagged rows");
        assert_eq!(last.anomaly_type(), "Foreign Location, High Velocity");
    }

    #[test]
    fn output_preserves_input_order() {
        let mut first = txn("T1", "A2", at(3, 0), 50.0);
        first.location = "Moscow".to_string();
        let second = txn("T2", "A1", at(2, 0), 50.0);
        let rows = detect(&[first, second]);
        assert_eq!(rows[0].transaction.transaction_id, "T1");
        assert_eq!(rows[1].transaction.transaction_id, "T2");
    }

    #[test]
    fn detection_is_idempotent() {
        let transactions: Vec<Transaction> = (0..6u32)
            .map(|i| txn(&format!("T{i}"), "A1", at(1, i), 2000.0))
            .collect();
        let first = detect(&transactions);
        let second = detect(&transactions);
        let labels = |rows: &[AnomalyRecord]| {
            rows.iter()
                .map(|r| (r.transaction.transaction_id.clone(), r.anomaly_type()))
                .collect::<Vec<_>>()
        };
        assert_eq!(labels(&first), labels(&second));
    }

    #[test]
    fn input_is_not_mutated() {
        let transactions = vec![txn("T1", "A1", at(2, 0), 50.0)];
        let snapshot = transactions.clone();
        let _ = detect(&transactions);
        assert_eq!(
            transactions[0].transaction_id,
            snapshot[0].transaction_id
        );
        assert_eq!(transactions[0].timestamp, snapshot[0].timestamp);
    }

    #[test]
    fn malformed_row_is_a_hard_error() {
        let mut bad = txn("T1", "A1", at(12, 0), 50.0);
        bad.amount = -5.0;
        let err = Detector::new()
            .detect(&[bad], &DetectorConfig::default())
            .expect_err("validation error");
        let DetectionError::Validation { row, field, .. } = err;
        assert_eq!(row, 0);
        assert_eq!(field, "Amount");
    }

    #[test]
    fn empty_account_id_is_rejected() {
        let mut bad = txn("T1", "", at(12, 0), 50.0);
        bad.account_id = String::new();
        let err = Detector::new()
            .detect(&[bad], &DetectorConfig::default())
            .expect_err("validation error");
        let DetectionError::Validation { field, .. } = err;
        assert_eq!(field, "AccountID");
    }

    #[test]
    fn custom_thresholds_are_honored() {
        let config = DetectorConfig {
            high_value_multiplier: 2.0,
            ..DetectorConfig::default()
        };
        let rows = Detector::new()
            .detect(&[txn("T1", "A1", at(12, 0), 250.0)], &config)
            .expect("detect");
        assert_eq!(rows[0].rules, vec![AnomalyRule::HighValue]);
    }
}
