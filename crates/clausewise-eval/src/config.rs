//! Evaluation run configuration.
//!
//! Loaded from YAML; every field has a default so an empty file is valid.
//! Precedence, lowest to highest: file, `CLAUSEWISE_API_URL`, CLI flags.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable that replaces `base_url`.
pub const API_URL_ENV: &str = "CLAUSEWISE_API_URL";

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Base URL of the contract API
    pub base_url: String,

    /// Timeout for the liveness probe (fail fast)
    #[serde(with = "humantime_duration")]
    pub health_timeout: Duration,

    /// Timeout for every other request
    #[serde(with = "humantime_duration")]
    pub request_timeout: Duration,

    /// Question set file (JSON)
    pub question_set: PathBuf,

    /// Documents uploaded before questions are asked
    pub fixtures: Vec<PathBuf>,

    /// Where the summary artifact is written
    pub results_path: PathBuf,

    pub scoring: ScoringConfig,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            health_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(60),
            question_set: PathBuf::from("eval/qa_eval_set.json"),
            fixtures: vec![
                PathBuf::from("uploads/Sample NDA.pdf"),
                PathBuf::from("uploads/NDA.pdf"),
            ],
            results_path: PathBuf::from("eval/eval_results.json"),
            scoring: ScoringConfig::default(),
        }
    }
}

/// Scoring constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Phrases marking a deflected answer (matched case-insensitively)
    pub negative_phrases: Vec<String>,

    /// Multiplier applied to the keyword score when a phrase is present
    pub negative_penalty: f64,

    /// Added when the answer carries citations
    pub citation_bonus: f64,

    /// Minimum score counted as a pass
    pub pass_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            negative_phrases: ["not found", "cannot find", "no information", "not in the document"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            negative_penalty: 0.5,
            citation_bonus: 0.1,
            pass_threshold: 0.7,
        }
    }
}

impl EvalConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: EvalConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Apply `CLAUSEWISE_API_URL` from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides from an arbitrary lookup.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            tracing::debug!(base_url = %url, "Base URL overridden from environment");
            self.base_url = url;
        }
    }

    /// Check value ranges and the URL scheme.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.health_timeout.is_zero() || self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid("timeouts must be greater than zero".to_string()));
        }

        let scoring = &self.scoring;
        for (name, value) in [
            ("negative_penalty", scoring.negative_penalty),
            ("citation_bonus", scoring.citation_bonus),
            ("pass_threshold", scoring.pass_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "scoring.{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Serde adapter for durations written as `5s`, `1m 30s`, `250ms`.
mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}
