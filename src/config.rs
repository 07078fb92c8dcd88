use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LiftRsError;
use crate::metrics::AnalysisConfig;
use crate::regenerate::RegenerationConfig;
use crate::safety::SafetyConfig;
use crate::validation::ValidationConfig;

/// Main engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Configuration metadata
    pub metadata: ConfigMetadata,

    /// Analysis window settings
    pub analysis: AnalysisConfig,

    /// Rest and duration adjustment settings
    pub regeneration: RegenerationConfig,

    /// Safety rule thresholds
    pub safety: SafetyConfig,

    /// Plan validation bounds
    pub validation: ValidationConfig,

    /// Produce the four-week cycle alongside the regenerated week
    pub generate_cycle: bool,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        let now = Utc::now();

        ConfigMetadata {
            version: "1.0".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            metadata: ConfigMetadata::default(),
            analysis: AnalysisConfig::default(),
            regeneration: RegenerationConfig::default(),
            safety: SafetyConfig::default(),
            validation: ValidationConfig::default(),
            generate_cycle: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: EngineConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Reject settings the engine cannot honour
    pub fn validate(&self) -> crate::error::Result<()> {
        let invalid = |reason: &str| Err(LiftRsError::Configuration(reason.to_string()));

        if self.analysis.window_days == 0 {
            return invalid("analysis.window_days must be at least 1");
        }
        if self.regeneration.min_rest_seconds > self.regeneration.max_rest_seconds {
            return invalid("regeneration.min_rest_seconds exceeds max_rest_seconds");
        }
        if self.regeneration.min_duration_minutes > self.regeneration.max_duration_minutes {
            return invalid("regeneration.min_duration_minutes exceeds max_duration_minutes");
        }
        if self.safety.max_volume_increase_pct < Decimal::ZERO {
            return invalid("safety.max_volume_increase_pct must not be negative");
        }
        if self.safety.deload_volume_ratio <= Decimal::ZERO || self.safety.deload_volume_ratio > Decimal::ONE {
            return invalid("safety.deload_volume_ratio must be within (0, 1]");
        }
        if self.safety.deload_weight_factor <= Decimal::ZERO || self.safety.deload_weight_factor > Decimal::ONE {
            return invalid("safety.deload_weight_factor must be within (0, 1]");
        }
        if self.validation.min_workout_sets > self.validation.max_workout_sets {
            return invalid("validation.min_workout_sets exceeds max_workout_sets");
        }

        Ok(())
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".liftrs")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(path = %config_path.display(), error = %err, "Using default configuration");
                Self::default()
            }
        }
    }
}
