// Detection run entity
// Snapshot of the most recent detection pass, kept in memory only

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::entities::AnomalyRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionRun {
    pub run_id: String,
    pub started_at: NaiveDateTime,
    pub transactions_seen: usize,
    pub anomalies: Vec<AnomalyRecord>,
    pub narrative_failures: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: String,
    pub transactions_seen: usize,
    pub anomalies_found: usize,
    pub narrative_failures: usize,
}

impl DetectionRun {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id.clone(),
            started_at: self.started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            transactions_seen: self.transactions_seen,
            anomalies_found: self.anomalies.len(),
            narrative_failures: self.narrative_failures,
        }
    }
}
