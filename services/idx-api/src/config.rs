//! Model source configuration.
//!
//! Defaults target the GFS 0.25 degree feed on AWS Open Data; a YAML file
//! can override any field for other buckets or cycle counts.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Where and how one model family's output is published.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSourceConfig {
    /// Public S3 bucket holding the model output.
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Hours after cycle start before a run is typically complete.
    #[serde(default = "default_publication_delay_hours")]
    pub publication_delay_hours: u32,

    /// How many cycles to look back when resolving the latest run.
    #[serde(default = "default_max_runs_to_check")]
    pub max_runs_to_check: u32,

    /// Number of per-forecast-hour files a complete run publishes.
    ///
    /// Tied to the GFS 0.25 degree configuration; must be revisited if
    /// NCEP changes the set of published lead times.
    #[serde(default = "default_expected_forecast_files")]
    pub expected_forecast_files: usize,
}

fn default_bucket() -> String {
    "noaa-gfs-bdp-pds".to_string()
}

fn default_publication_delay_hours() -> u32 {
    2
}

fn default_max_runs_to_check() -> u32 {
    3
}

fn default_expected_forecast_files() -> usize {
    209
}

impl Default for ModelSourceConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            publication_delay_hours: default_publication_delay_hours(),
            max_runs_to_check: default_max_runs_to_check(),
            expected_forecast_files: default_expected_forecast_files(),
        }
    }
}

impl ModelSourceConfig {
    /// Load a model source configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ModelSourceConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(bucket = %config.bucket, path = %path.display(), "Loaded model source config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_gfs() {
        let config = ModelSourceConfig::default();
        assert_eq!(config.bucket, "noaa-gfs-bdp-pds");
        assert_eq!(config.publication_delay_hours, 2);
        assert_eq!(config.max_runs_to_check, 3);
        assert_eq!(config.expected_forecast_files, 209);
    }

    #[test]
    fn test_parse_partial_yaml_keeps_defaults() {
        let yaml = r#"
bucket: my-mirror-bucket
max_runs_to_check: 5
"#;
        let config: ModelSourceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.bucket, "my-mirror-bucket");
        assert_eq!(config.max_runs_to_check, 5);
        assert_eq!(config.expected_forecast_files, 209);
    }
}
