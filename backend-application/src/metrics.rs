use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    detection_runs: AtomicU64,
    transactions_seen: AtomicU64,
    anomalies: AtomicU64,
    narrative_failures: AtomicU64,
}

impl Metrics {
    pub fn record_run(&self, transaction_count: usize) {
        self.detection_runs.fetch_add(1, Ordering::Relaxed);
        self.transactions_seen
            .fetch_add(transaction_count as u64, Ordering::Relaxed);
    }

    pub fn record_anomalies(&self, count: usize) {
        self.anomalies.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_narrative_failures(&self, count: usize) {
        self.narrative_failures
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let runs = self.detection_runs.load(Ordering::Relaxed);
        let transactions = self.transactions_seen.load(Ordering::Relaxed);
        let anomalies = self.anomalies.load(Ordering::Relaxed);
        let narrative_failures = self.narrative_failures.load(Ordering::Relaxed);

        format!(
            "# TYPE tan_detection_runs_total counter\n\
tan_detection_runs_total {}\n\
# TYPE tan_transactions_total counter\n\
tan_transactions_total {}\n\
# TYPE tan_anomalies_total counter\n\
tan_anomalies_total {}\n\
# TYPE tan_narrative_failures_total counter\n\
tan_narrative_failures_total {}\n",
            runs, transactions, anomalies, narrative_failures
        )
    }
}
