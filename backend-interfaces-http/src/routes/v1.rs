use axum::Router;

use backend_application::AppState;

use crate::handlers::{detect_handlers, ops_handlers, report_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/detect/upload",
            axum::routing::post(detect_handlers::upload_transactions),
        )
        .route(
            "/v1/detect/anomalies",
            axum::routing::get(detect_handlers::list_anomalies),
        )
        .route(
            "/v1/reports/generate",
            axum::routing::post(report_handlers::generate_reports),
        )
        .route(
            "/v1/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/v1/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
