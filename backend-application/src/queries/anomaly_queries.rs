use backend_domain::{AnomalyReportRow, DetectionRun, RunSummary};

use crate::{AppError, AppState};

#[derive(Debug, serde::Serialize)]
pub struct AnomalyListing {
    pub run: RunSummary,
    pub anomalies: Vec<AnomalyReportRow>,
}

/// Latest run's annotated rows. `NoRunYet` when nothing has run; a clean run
/// comes back as an empty listing with a zero count.
pub async fn latest_anomalies(state: &AppState) -> Result<AnomalyListing, AppError> {
    let run = state.last_run.read().await;
    let run = run.as_ref().ok_or(AppError::NoRunYet)?;
    Ok(listing(run))
}

pub async fn latest_run(state: &AppState) -> Result<DetectionRun, AppError> {
    let run = state.last_run.read().await;
    run.clone().ok_or(AppError::NoRunYet)
}

fn listing(run: &DetectionRun) -> AnomalyListing {
    AnomalyListing {
        run: run.summary(),
        anomalies: run.anomalies.iter().map(|record| record.to_row()).collect(),
    }
}
