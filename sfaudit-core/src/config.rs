// Audit configuration: rule thresholds and report settings from TOML

use crate::error::ConfigError;
use crate::report::ReportFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file, as written by `sfaudit init`.
pub const DEFAULT_CONFIG: &str = include_str!("../defaults/sfaudit.toml");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AuditConfig {
    pub thresholds: Thresholds,
    pub report: ReportSettings,
}

/// Limits the rule predicates compare against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Thresholds {
    /// Characters
    pub title_max_length: usize,
    /// Characters
    pub description_max_length: usize,
    pub slow_page_seconds: f64,
    pub min_word_count: u32,
    pub max_outlinks: u32,
    /// Percent of the HTML that is visible text
    pub min_text_ratio: f64,
    /// Hops allowed before a redirect counts as a chain
    pub max_redirect_hops: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            title_max_length: 60,
            description_max_length: 160,
            slow_page_seconds: 3.0,
            min_word_count: 200,
            max_outlinks: 100,
            min_text_ratio: 10.0,
            max_redirect_hops: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ReportSettings {
    pub output_dir: String,
    pub formats: Vec<String>,
    pub top_issues: usize,
    pub example_limit: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: "reports".to_string(),
            formats: vec![
                "json".to_string(),
                "html".to_string(),
                "xlsx".to_string(),
                "chart".to_string(),
            ],
            top_issues: 3,
            example_limit: 5,
        }
    }
}

impl ReportSettings {
    /// Formats resolved to [`ReportFormat`]; unknown names are dropped.
    pub fn report_formats(&self) -> Vec<ReportFormat> {
        self.formats
            .iter()
            .filter_map(|f| ReportFormat::from_str(f))
            .collect()
    }
}

/// Load, parse and validate a configuration file.
pub fn load_config(path: &Path) -> Result<AuditConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<AuditConfig, ConfigError> {
    let config: AuditConfig = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &AuditConfig) -> Result<(), ConfigError> {
    let t = &config.thresholds;

    if t.title_max_length == 0 {
        return Err(ConfigError::Validation(
            "thresholds.title-max-length must be greater than 0".to_string(),
        ));
    }
    if t.description_max_length == 0 {
        return Err(ConfigError::Validation(
            "thresholds.description-max-length must be greater than 0".to_string(),
        ));
    }
    if t.slow_page_seconds.is_nan() || t.slow_page_seconds <= 0.0 {
        return Err(ConfigError::Validation(
            "thresholds.slow-page-seconds must be positive".to_string(),
        ));
    }
    if t.min_text_ratio < 0.0 || t.min_text_ratio > 100.0 {
        return Err(ConfigError::Validation(
            "thresholds.min-text-ratio must be between 0 and 100".to_string(),
        ));
    }

    let r = &config.report;
    for format in &r.formats {
        if ReportFormat::from_str(format).is_none() {
            return Err(ConfigError::Validation(format!(
                "report.formats: unknown format '{}'",
                format
            )));
        }
    }
    if r.example_limit == 0 {
        return Err(ConfigError::Validation(
            "report.example-limit must be greater than 0".to_string(),
        ));
    }

    Ok(())
}
