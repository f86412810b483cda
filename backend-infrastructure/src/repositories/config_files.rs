// File-backed configuration lists

use tokio::fs;

/// Load the domestic-location set from a YAML list of strings.
/// Replaces the inline config list when a path is configured.
pub async fn load_domestic_locations(path: &str) -> anyhow::Result<Vec<String>> {
    let content = fs::read_to_string(path).await?;
    let locations: Vec<String> = serde_yaml::from_str(&content)?;
    Ok(locations
        .into_iter()
        .map(|location| location.trim().to_string())
        .filter(|location| !location.is_empty())
        .collect())
}
