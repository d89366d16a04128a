//! Application configuration.
//!
//! Loaded from a TOML file (every key optional, defaults below), then
//! overridden from the environment after `.env` is read:
//!
//! - `KIDNEY_COMPASS_API_URL`: backend base URL
//! - `KIDNEY_COMPASS_API_TIMEOUT_SECS`: request timeout in seconds
//!
//! ```toml
//! [slider]
//! max_range_ml = 3000
//! step_ml = 50
//! goal_ml = 2000
//!
//! [vitals]
//! red_systolic = 140
//!
//! [api]
//! base_url = "http://localhost:7860"
//! ```

use crate::input::range::RangeConfig;
use crate::model::{ConfigurationError, VitalsThresholds};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

pub const ENV_API_URL: &str = "KIDNEY_COMPASS_API_URL";
pub const ENV_API_TIMEOUT: &str = "KIDNEY_COMPASS_API_TIMEOUT_SECS";

/// Intake below which the "drink more" reminder shows, in millilitres.
pub const DEFAULT_LOW_INTAKE_ML: u32 = 1500;

pub const DEFAULT_API_BASE_URL: &str =
    "https://huggingface.co/spaces/fishbubble1234/kidney-compass-backend";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub slider: SliderConfig,
    pub vitals: VitalsThresholds,
    pub api: ApiConfig,
}

/// Water-intake track settings, in millilitres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderConfig {
    pub max_range_ml: i64,
    pub step_ml: i64,
    pub goal_ml: i64,
    /// Intake below which the "drink more" reminder shows.
    pub low_intake_ml: u32,
    /// Amounts offered as one-tap buttons.
    pub quick_add_ml: Vec<u32>,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            max_range_ml: 3000,
            step_ml: 50,
            goal_ml: 2000,
            low_intake_ml: DEFAULT_LOW_INTAKE_ML,
            quick_add_ml: vec![150, 250, 500],
        }
    }
}

impl SliderConfig {
    pub fn range_config(&self) -> Result<RangeConfig, ConfigurationError> {
        RangeConfig::new(self.max_range_ml, self.step_ml, self.goal_ml)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 15,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigurationError> {
        let config: AppConfig =
            toml::from_str(text).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, loads `.env`, and applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigurationError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut config = Self::from_toml_str(&text)?;

        dotenv::dotenv().ok();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        info!(path = %path.display(), base_url = %config.api.base_url, "configuration loaded");
        Ok(config)
    }

    /// Applies overrides from `lookup`, normally the process environment.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigurationError> {
        if let Some(url) = lookup(ENV_API_URL) {
            debug!(%url, "api base url overridden from environment");
            self.api.base_url = url;
        }
        if let Some(raw) = lookup(ENV_API_TIMEOUT) {
            self.api.timeout_secs = raw.trim().parse().map_err(|_| ConfigurationError::InvalidOverride {
                key: ENV_API_TIMEOUT.to_string(),
                value: raw.clone(),
            })?;
        }
        Ok(())
    }

    /// Checks the slider section; vitals and api have no invalid states
    /// beyond what parsing rejects.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.slider.range_config().map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = AppConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.slider.max_range_ml, 3000);
        assert_eq!(config.vitals.red_systolic, 140);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [slider]
            step_ml = 100

            [vitals]
            yellow_systolic = 125
            "#,
        )
        .unwrap();
        assert_eq!(config.slider.step_ml, 100);
        assert_eq!(config.slider.goal_ml, 2000);
        assert_eq!(config.vitals.yellow_systolic, 125);
        assert_eq!(config.vitals.red_systolic, 140);
    }

    #[test]
    fn test_zero_step_is_a_configuration_error() {
        let err = AppConfig::from_toml_str("[slider]\nstep_ml = 0").unwrap_err();
        assert_eq!(err, ConfigurationError::NonPositiveStep(0));
    }

    #[test]
    fn test_negative_range_is_a_configuration_error() {
        let err = AppConfig::from_toml_str("[slider]\nmax_range_ml = -3000").unwrap_err();
        assert_eq!(err, ConfigurationError::NonPositiveRange(-3000));
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        assert!(matches!(
            AppConfig::from_toml_str("[slider"),
            Err(ConfigurationError::Parse(_))
        ));
    }

    #[test]
    fn test_environment_overrides_apply() {
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "http://localhost:7860"),
            (ENV_API_TIMEOUT, "3"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api.base_url, "http://localhost:7860");
        assert_eq!(config.api.timeout_secs, 3);
    }

    #[test]
    fn test_bad_timeout_override_is_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|key| {
            (key == ENV_API_TIMEOUT).then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(ConfigurationError::InvalidOverride { .. })));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        assert!(matches!(
            AppConfig::load("/nonexistent/kidney_compass.toml"),
            Err(ConfigurationError::Io { .. })
        ));
    }
}
