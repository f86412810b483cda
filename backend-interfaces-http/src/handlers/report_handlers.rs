use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::error;

use backend_application::queries::anomaly_queries;
use backend_application::AppState;
use backend_infrastructure::{write_csv_report, write_incident_reports};

use crate::error::HttpError;
use crate::middleware::authorize;

#[derive(serde::Serialize)]
pub struct ReportReceipt {
    pub csv_path: String,
    pub incident_reports: usize,
}

/// Write the CSV summary plus one incident document per flagged transaction
/// for the latest run.
pub async fn generate_reports(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ReportReceipt>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }

    let run = anomaly_queries::latest_run(&state).await?;
    let rows: Vec<_> = run.anomalies.iter().map(|record| record.to_row()).collect();

    let csv_path = write_csv_report(&state.config.report_dir, &rows)
        .await
        .map_err(|err| {
            error!("CSV report failed: {}", err);
            HttpError::Internal(err.to_string())
        })?;
    let incidents = write_incident_reports(&state.config.report_dir, &run.anomalies)
        .await
        .map_err(|err| {
            error!("incident reports failed: {}", err);
            HttpError::Internal(err.to_string())
        })?;

    Ok(Json(ReportReceipt {
        csv_path: csv_path.to_string_lossy().to_string(),
        incident_reports: incidents.len(),
    }))
}
