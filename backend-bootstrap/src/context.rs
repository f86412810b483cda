use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::{info, warn};

use backend_application::{AppState, Metrics};
use backend_domain::ports::NarrativeProvider;
use backend_domain::services::Detector;
use backend_infrastructure::{
    load_domestic_locations, AppConfig, GeminiNarrator, TemplateNarrator,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let mut runtime_config = config.to_runtime_config();

        if let Some(path) = &config.domestic_locations_path {
            match load_domestic_locations(path).await {
                Ok(locations) => {
                    info!("loaded {} domestic locations from {}", locations.len(), path);
                    runtime_config.detector.domestic_locations = locations;
                }
                Err(err) => {
                    warn!("failed to load domestic locations from {}: {}", path, err);
                }
            }
        }

        let narrator: Arc<dyn NarrativeProvider> = match &config.gemini_api_key {
            Some(api_key) => Arc::new(GeminiNarrator::new(
                api_key.clone(),
                config.gemini_model.clone(),
                config.narrative_temperature,
                config.narrative_max_tokens,
            )),
            None => {
                warn!("GEMINI_API_KEY not set, using template narratives");
                Arc::new(TemplateNarrator::new())
            }
        };

        let state = AppState {
            config: runtime_config,
            detector: Arc::new(Detector::new()),
            narrator,
            last_run: Arc::new(RwLock::new(None)),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
