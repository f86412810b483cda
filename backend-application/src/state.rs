use std::sync::Arc;

use backend_domain::ports::NarrativeProvider;
use backend_domain::services::Detector;
use backend_domain::{DetectionRun, RuntimeConfig};
use tokio::sync::RwLock;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub detector: Arc<Detector>,
    pub narrator: Arc<dyn NarrativeProvider>,
    /// None until the first detection run; a run with zero anomalies is
    /// distinct from "no run yet".
    pub last_run: Arc<RwLock<Option<DetectionRun>>>,
    pub metrics: Arc<Metrics>,
}
