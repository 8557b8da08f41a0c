//! Configuration file support for Fitlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/fitlog/config.toml`.

use crate::period::PeriodKind;
use crate::targets::DailyTargets;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub targets: TargetOverrides,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Reporting defaults
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ReportConfig {
    #[serde(default)]
    pub default_period: PeriodKind,
}

/// Fixed values that replace the computed daily targets
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TargetOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_g: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs_g: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat_g: Option<u32>,
}

impl TargetOverrides {
    pub fn apply(&self, computed: DailyTargets) -> DailyTargets {
        DailyTargets {
            calories: self.calories.unwrap_or(computed.calories),
            protein_g: self.protein_g.unwrap_or(computed.protein_g),
            carbs_g: self.carbs_g.unwrap_or(computed.carbs_g),
            fat_g: self.fat_g.unwrap_or(computed.fat_g),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir()
        .or_else(|| std::env::var_os("HOME").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_dir().join(".local/share"));
    base.join("fitlog")
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_dir().join(".config"));
        base.join("fitlog").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.report.default_period, PeriodKind::Week);
        assert!(config.targets.is_empty());
        assert!(config.data.data_dir.ends_with("fitlog"));
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.report.default_period = PeriodKind::Month;
        config.targets.calories = Some(2200);
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.report.default_period, PeriodKind::Month);
        assert_eq!(parsed.targets.calories, Some(2200));
        assert_eq!(parsed.data.data_dir, config.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[targets]
protein_g = 180
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.targets.protein_g, Some(180));
        assert_eq!(config.targets.calories, None);
        assert_eq!(config.report.default_period, PeriodKind::Week); // default
    }

    #[test]
    fn test_overrides_apply() {
        let computed = DailyTargets {
            calories: 2759,
            protein_g: 172,
            carbs_g: 310,
            fat_g: 92,
        };
        let overrides = TargetOverrides {
            calories: Some(2500),
            fat_g: Some(80),
            ..TargetOverrides::default()
        };
        let applied = overrides.apply(computed);
        assert_eq!(applied.calories, 2500);
        assert_eq!(applied.protein_g, 172);
        assert_eq!(applied.fat_g, 80);
    }

    #[test]
    fn test_invalid_period_is_rejected() {
        let toml_str = r#"
[report]
default_period = "fortnight"
"#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }
}
