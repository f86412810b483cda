use tracing::{info, warn};
use uuid::Uuid;

use backend_domain::{now_naive, DetectionRun, RunSummary, Transaction};

use crate::{AppError, AppState};

/// Recorded in place of a narrative when the provider fails for a row.
/// Per-row failures never abort the batch.
pub const NARRATIVE_FAILURE_SENTINEL: &str = "Narrative generation failed.";

pub async fn run_detection(
    state: &AppState,
    transactions: Vec<Transaction>,
) -> Result<RunSummary, AppError> {
    let records = state
        .detector
        .detect(&transactions, &state.config.detector)
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let mut narrative_failures = 0usize;
    let mut anomalies = Vec::with_capacity(records.len());
    for mut record in records {
        match state.narrator.narrate(&record).await {
            Ok(text) => record.narrative = Some(text),
            Err(err) => {
                warn!(
                    "narrative failed for {}: {}",
                    record.transaction.transaction_id, err
                );
                narrative_failures += 1;
                record.narrative = Some(NARRATIVE_FAILURE_SENTINEL.to_string());
            }
        }
        anomalies.push(record);
    }

    let run = DetectionRun {
        run_id: Uuid::new_v4().to_string(),
        started_at: now_naive(),
        transactions_seen: transactions.len(),
        anomalies,
        narrative_failures,
    };

    state.metrics.record_run(run.transactions_seen);
    state.metrics.record_anomalies(run.anomalies.len());
    state.metrics.record_narrative_failures(narrative_failures);
    info!(
        "detection run {}: {} transactions, {} anomalies",
        run.run_id,
        run.transactions_seen,
        run.anomalies.len()
    );

    let summary = run.summary();
    *state.last_run.write().await = Some(run);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::RwLock;

    use backend_domain::ports::{NarrativeError, NarrativeProvider};
    use backend_domain::services::Detector;
    use backend_domain::{AnomalyRecord, DetectorConfig, RuntimeConfig};

    use crate::Metrics;

    struct EchoNarrator;

    #[async_trait]
    impl NarrativeProvider for EchoNarrator {
        async fn narrate(&self, record: &AnomalyRecord) -> Result<String, NarrativeError> {
            Ok(format!("flagged: {}", record.anomaly_type()))
        }
    }

    struct FailingNarrator;

    #[async_trait]
    impl NarrativeProvider for FailingNarrator {
        async fn narrate(&self, _record: &AnomalyRecord) -> Result<String, NarrativeError> {
            Err(NarrativeError::Api {
                status: 503,
                body: "overloaded".to_string(),
            })
        }
    }

    fn state(narrator: Arc<dyn NarrativeProvider>) -> AppState {
        AppState {
            config: RuntimeConfig {
                bind_addr: "127.0.0.1:0".to_string(),
                api_token: None,
                report_dir: "./reports".to_string(),
                max_body_bytes: 1024,
                request_timeout_seconds: 5,
                narrative_temperature: 0.2,
                narrative_max_tokens: 256,
                detector: DetectorConfig::default(),
            },
            detector: Arc::new(Detector::new()),
            narrator,
            last_run: Arc::new(RwLock::new(None)),
            metrics: Arc::new(Metrics::default()),
        }
    }

    fn odd_hour_txn(id: &str) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            account_id: "ACC-1".to_string(),
            timestamp: chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(2, 0, 0)
                .unwrap(),
            amount: 40.0,
            location: "New York".to_string(),
            avg_daily_spend: 100.0,
            merchant: None,
            transaction_type: None,
        }
    }

    #[tokio::test]
    async fn stores_run_with_narratives() {
        let state = state(Arc::new(EchoNarrator));
        let summary = run_detection(&state, vec![odd_hour_txn("T1")])
            .await
            .expect("run");
        assert_eq!(summary.anomalies_found, 1);
        assert_eq!(summary.narrative_failures, 0);

        let run = state.last_run.read().await;
        let run = run.as_ref().expect("stored run");
        assert_eq!(
            run.anomalies[0].narrative.as_deref(),
            Some("flagged: Odd Hour")
        );
    }

    #[tokio::test]
    async fn narrative_failure_degrades_to_sentinel() {
        let state = state(Arc::new(FailingNarrator));
        let summary = run_detection(&state, vec![odd_hour_txn("T1")])
            .await
            .expect("run");
        assert_eq!(summary.narrative_failures, 1);

        let run = state.last_run.read().await;
        let run = run.as_ref().expect("stored run");
        assert_eq!(
            run.anomalies[0].narrative.as_deref(),
            Some(NARRATIVE_FAILURE_SENTINEL)
        );
    }

    #[tokio::test]
    async fn clean_table_stores_empty_run() {
        let state = state(Arc::new(EchoNarrator));
        let mut txn = odd_hour_txn("T1");
        txn.timestamp = chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let summary = run_detection(&state, vec![txn]).await.expect("run");
        assert_eq!(summary.anomalies_found, 0);
        assert!(state.last_run.read().await.is_some());
    }

    #[tokio::test]
    async fn invalid_row_is_rejected() {
        let state = state(Arc::new(EchoNarrator));
        let mut txn = odd_hour_txn("T1");
        txn.amount = -1.0;
        let err = run_detection(&state, vec![txn]).await.expect_err("reject");
        match err {
            AppError::BadRequest(message) => assert!(message.contains("Amount")),
            _ => panic!("unexpected error type"),
        }
        assert!(state.last_run.read().await.is_none());
    }
}
