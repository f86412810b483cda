use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::error;

use backend_application::commands::detect_commands;
use backend_application::queries::anomaly_queries::{self, AnomalyListing};
use backend_application::AppState;
use backend_domain::RunSummary;
use backend_infrastructure::load_transactions;

use crate::error::HttpError;
use crate::middleware::{authorize, decode_body};

/// Accepts a raw CSV transaction table (optionally gzip-compressed), runs
/// detection and narration, and returns the run summary.
pub async fn upload_transactions(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<RunSummary>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }

    let content = decode_body(&headers, &body).map_err(|err| {
        error!("failed to decode upload body: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;
    let transactions =
        load_transactions(content.as_bytes()).map_err(|err| HttpError::BadRequest(err.to_string()))?;

    let summary = detect_commands::run_detection(&state, transactions).await?;
    Ok(Json(summary))
}

/// Latest run's annotated rows. 404 while no run exists; an empty list with
/// a zero count after a clean run.
pub async fn list_anomalies(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AnomalyListing>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let listing = anomaly_queries::latest_anomalies(&state).await?;
    Ok(Json(listing))
}
