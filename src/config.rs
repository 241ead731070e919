use crate::error::AppError;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "retail_dashboard.toml";

/// What the normalizer does with a row whose `Date` cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateErrorPolicy {
    /// Exclude the row and count it in the load report.
    #[default]
    Drop,
    /// Fail the whole load on the first bad date.
    Abort,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleaningPolicy {
    pub date_errors: DateErrorPolicy,
    /// Quality gate: drop rows whose Sales or Quantity is absent or `<= 0`.
    pub drop_non_positive: bool,
}

impl Default for CleaningPolicy {
    fn default() -> Self {
        Self {
            date_errors: DateErrorPolicy::Drop,
            drop_non_positive: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub input_path: String,
    pub output_dir: String,
    pub top_stores: usize,
    pub preview_rows: usize,
    pub log_level: String,
    pub cleaning: CleaningPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_path: "retail_sales.xlsx".to_string(),
            output_dir: ".".to_string(),
            top_stores: 5,
            preview_rows: 12,
            log_level: "retail_dashboard=info".to_string(),
            cleaning: CleaningPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Read the TOML config at `path`, falling back to defaults when the file
    /// does not exist. A file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(text)?)
    }
}
