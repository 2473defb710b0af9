use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cluster::ClusterPricing;
use crate::error::{ConfigError, CostError};
use crate::per_task::PerTaskRates;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub cluster: ClusterPricing,
    pub per_task: PerTaskRates,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// CSV file with Instance_Type,Rate,vCPU,Memory columns
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// Level used when neither --verbose nor LOGLEVEL is set
    pub level: String,
    /// `text` for human-readable lines, `json` for one object per event
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/ec2_costs.csv"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            // Try .podcost.toml in current dir, then ~/.config/podcost/config.toml
            let local = PathBuf::from(".podcost.toml");
            if local.exists() {
                local
            } else {
                dirs::config_dir()
                    .map(|d| d.join("podcost").join("config.toml"))
                    .unwrap_or_else(|| PathBuf::from(".podcost.toml"))
            }
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| CostError::from(ConfigError::ParseError(e.to_string())))
                .with_context(|| {
                    let mut err = format!("Failed to parse config: {}", config_path.display());
                    err.push_str("\n  Common issues:");
                    err.push_str("\n    - Invalid TOML syntax");
                    err.push_str("\n    - Rates written as bare words instead of numbers");
                    err.push_str("\n  Tip: Run 'podcost init' to create a new config file");
                    err
                })?;
            config.validate()?;
            Ok(config)
        } else {
            // Use defaults but warn if user explicitly provided a path
            if path.is_some() {
                eprintln!("WARNING: Config file not found: {}", config_path.display());
                eprintln!("   Using default configuration. Run 'podcost init' to create a config file.");
            }
            Ok(Config::default())
        }
    }

    /// Reject negative prices and an empty reference instance type
    pub fn validate(&self) -> std::result::Result<(), CostError> {
        let non_negative = [
            ("cluster.control_plane_hourly", self.cluster.control_plane_hourly),
            ("per_task.vcpu_hourly", self.per_task.vcpu_hourly),
            ("per_task.memory_gib_hourly", self.per_task.memory_gib_hourly),
        ];
        for (field, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("must be non-negative, got {}", value),
                }
                .into());
            }
        }

        if self.cluster.reference_instance_type.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "cluster.reference_instance_type".to_string(),
                reason: "cannot be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

pub fn init_config(output: &Path) -> Result<()> {
    let config = Config::default();
    config.save(output)?;
    println!("Created config file: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cluster.control_plane_hourly, dec!(0.10));
        assert_eq!(config.cluster.core_node_count, 4);
        assert_eq!(config.cluster.reference_instance_type, "m5a.2xlarge");
        assert_eq!(config.per_task.vcpu_hourly, dec!(0.03238));
        assert_eq!(config.per_task.memory_gib_hourly, dec!(0.00356));
        assert!(config.logging.enabled);
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let config = Config::default();
        assert!(config.save(&config_path).is_ok());
        assert!(config_path.exists());

        let loaded = Config::load(Some(&config_path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let fake_path = temp_dir.path().join("nonexistent.toml");

        // Should return default config
        let config = Config::load(Some(&fake_path)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        std::fs::write(&config_path, "invalid toml content {").unwrap();

        let result = Config::load(Some(&config_path));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_partial_override() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.toml");
        std::fs::write(
            &config_path,
            r#"
[per_task]
vcpu_hourly = 0.04048
memory_gib_hourly = "0.004445"

[catalog]
path = "/srv/pricing/ec2.csv"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&config_path)).unwrap();
        assert_eq!(config.per_task.vcpu_hourly, dec!(0.04048));
        assert_eq!(config.per_task.memory_gib_hourly, dec!(0.004445));
        assert_eq!(config.catalog.path, PathBuf::from("/srv/pricing/ec2.csv"));
        // Untouched sections keep their defaults
        assert_eq!(config.cluster, ClusterPricing::default());
    }

    #[test]
    fn test_config_rejects_negative_rate() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("negative.toml");
        std::fs::write(
            &config_path,
            "[cluster]\ncontrol_plane_hourly = -0.1\ncore_node_count = 4\nreference_instance_type = \"m5a.2xlarge\"\n",
        )
        .unwrap();

        assert!(Config::load(Some(&config_path)).is_err());
    }

    #[test]
    fn test_init_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("init_test.toml");

        assert!(init_config(&config_path).is_ok());
        assert!(config_path.exists());

        let config = Config::load(Some(&config_path)).unwrap();
        assert_eq!(config.cluster.core_node_count, 4);
    }
}
