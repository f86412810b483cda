// Runtime configuration models shared across layers

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub report_dir: String,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub narrative_temperature: f32,
    pub narrative_max_tokens: u32,
    pub detector: DetectorConfig,
}

/// Thresholds for the rule-based detector. Always passed in explicitly so
/// detection stays deterministic under varied thresholds in tests.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// High Value fires when amount > avg_daily_spend * multiplier.
    pub high_value_multiplier: f64,
    /// Odd Hour fires when the local hour falls in [start, end).
    pub odd_hours_start: u32,
    pub odd_hours_end: u32,
    /// Foreign Location fires when the location is not in this set.
    pub domestic_locations: Vec<String>,
    /// High Velocity fires when the same-account transaction count within
    /// the trailing window exceeds the threshold.
    pub velocity_window_minutes: u32,
    pub velocity_threshold_count: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            high_value_multiplier: 10.0,
            odd_hours_start: 1,
            odd_hours_end: 5,
            domestic_locations: vec![
                "New York".to_string(),
                "Chicago".to_string(),
                "Miami".to_string(),
                "Internet".to_string(),
            ],
            velocity_window_minutes: 10,
            velocity_threshold_count: 4,
        }
    }
}

impl DetectorConfig {
    pub fn is_domestic(&self, location: &str) -> bool {
        self.domestic_locations.iter().any(|known| known == location)
    }
}
