use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{DetectorConfig, RuntimeConfig};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub report_dir: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub narrative_temperature: f32,
    pub narrative_max_tokens: u32,
    pub high_value_multiplier: f64,
    pub odd_hours_start: u32,
    pub odd_hours_end: u32,
    pub domestic_locations: Vec<String>,
    /// Optional YAML list that replaces `domestic_locations` when present.
    pub domestic_locations_path: Option<String>,
    pub velocity_window_minutes: u32,
    pub velocity_threshold_count: u32,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let detector = DetectorConfig::default();
        Self {
            bind_addr: "127.0.0.1:3412".to_string(),
            api_token: None,
            report_dir: "./reports".to_string(),
            gemini_api_key: None,
            gemini_model: "gemini-2.0-flash".to_string(),
            narrative_temperature: 0.2,
            narrative_max_tokens: 256,
            high_value_multiplier: detector.high_value_multiplier,
            odd_hours_start: detector.odd_hours_start,
            odd_hours_end: detector.odd_hours_end,
            domestic_locations: detector.domestic_locations,
            domestic_locations_path: None,
            velocity_window_minutes: detector.velocity_window_minutes,
            velocity_threshold_count: detector.velocity_threshold_count,
            max_body_bytes: 8 * 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("TAN_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let base_dir = file_path.parent();
        if !file_path.exists() {
            warn!("config.toml not found, using defaults");
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config.resolve_paths(base_dir);
            config.normalize();
            config.validate()?;
            return Ok(config);
        }
        let content = fs::read_to_string(file_path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(bind_addr) = env::var("TAN_BIND_ADDR") {
            if !bind_addr.trim().is_empty() {
                self.bind_addr = bind_addr;
            }
        }
        if let Ok(api_token) = env::var("TAN_API_TOKEN") {
            self.api_token = Some(api_token);
        }
        if let Ok(api_key) = env::var("GEMINI_API_KEY") {
            self.gemini_api_key = Some(api_key);
        }
    }

    pub fn normalize(&mut self) {
        if let Some(api_token) = &self.api_token {
            if api_token.trim().is_empty() {
                self.api_token = None;
            }
        }
        if let Some(api_key) = &self.gemini_api_key {
            if api_key.trim().is_empty() {
                self.gemini_api_key = None;
            }
        }
        if let Some(path) = &self.domestic_locations_path {
            if path.trim().is_empty() {
                self.domestic_locations_path = None;
            }
        }
        self.domestic_locations = std::mem::take(&mut self.domestic_locations)
            .into_iter()
            .map(|location| location.trim().to_string())
            .filter(|location| !location.is_empty())
            .collect();
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.report_dir = resolve_path(base, &self.report_dir);
        if let Some(path) = &self.domestic_locations_path {
            self.domestic_locations_path = Some(resolve_path(base, path));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|_| anyhow!("bind_addr '{}' is not a socket address", self.bind_addr))?;
        if self.report_dir.trim().is_empty() {
            return Err(anyhow!("report_dir must not be empty"));
        }
        if !(self.high_value_multiplier > 0.0) {
            return Err(anyhow!("high_value_multiplier must be positive"));
        }
        if self.odd_hours_start >= self.odd_hours_end || self.odd_hours_end > 24 {
            return Err(anyhow!(
                "odd hours [{}, {}) is not a valid 24h range",
                self.odd_hours_start,
                self.odd_hours_end
            ));
        }
        if self.velocity_window_minutes == 0 {
            return Err(anyhow!("velocity_window_minutes must be at least 1"));
        }
        if self.velocity_threshold_count == 0 {
            return Err(anyhow!("velocity_threshold_count must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.narrative_temperature) {
            return Err(anyhow!("narrative_temperature must be in [0, 2]"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            report_dir: self.report_dir.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            narrative_temperature: self.narrative_temperature,
            narrative_max_tokens: self.narrative_max_tokens,
            detector: DetectorConfig {
                high_value_multiplier: self.high_value_multiplier,
                odd_hours_start: self.odd_hours_start,
                odd_hours_end: self.odd_hours_end,
                domestic_locations: self.domestic_locations.clone(),
                velocity_window_minutes: self.velocity_window_minutes,
                velocity_threshold_count: self.velocity_threshold_count,
            },
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let path = Path::new(value);
    if path.is_absolute() {
        return value.to_string();
    }
    base.join(path).to_string_lossy().to_string()
}
