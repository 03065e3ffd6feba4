use crate::error::{AgriScoreError, Result};
use crate::models::{SensorField, SensorReading};
use dialoguer::Input;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://dashboard-xuhc.onrender.com";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    /// Initial reading for a new session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor: Option<SensorReading>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: String,
    /// Request timeout. Absent means the transport default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl BackendConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
}

fn default_ttl_ms() -> u64 {
    3000
}

impl NotificationConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HistoryConfig {
    /// Maximum display history points. Absent keeps every point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Replace the current reading with the newest fetched one.
    #[serde(default)]
    pub adopt_latest_reading: bool,
}

impl Config {
    /// Load from `config_override`, else the first config found in the standard
    /// locations. Falls back to defaults when no file exists anywhere.
    pub fn load(config_override: Option<&PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => {
                if !p.exists() {
                    return Err(AgriScoreError::Config(format!(
                        "Config file not found at {:?}",
                        p
                    )));
                }
                p.clone()
            }
            None => match Self::find_config_path() {
                Some(p) => p,
                None => {
                    tracing::info!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| AgriScoreError::Config(format!("Failed to read config: {}", e)))?;

        let config = Self::parse(&config_str)?;
        tracing::debug!(path = %config_path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse YAML after substituting `${VAR}` placeholders from the environment.
    pub fn parse(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| AgriScoreError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.backend.base_url.trim();
        if url.is_empty() {
            return Err(AgriScoreError::Config("backend.base_url is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AgriScoreError::Config(format!(
                "backend.base_url must start with http:// or https:// (got '{}')",
                url
            )));
        }
        if let Some(reading) = &self.sensor {
            for field in SensorField::ALL {
                let value = reading.get(field);
                if !value.is_finite() {
                    return Err(AgriScoreError::Config(format!(
                        "sensor.{} must be a finite number (got {})",
                        field.key(),
                        value
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn initial_reading(&self) -> SensorReading {
        self.sensor.unwrap_or_else(SensorReading::session_default)
    }

    fn find_config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("agriscore").join("config.yaml"))
            .filter(|p| p.exists())
    }

    /// Default path for writing new config files (~/.config/agriscore/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AgriScoreError::Config("Cannot determine config directory".into()))?
            .join("agriscore");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up the AgriScore dashboard!");
        println!();

        println!("Backend");
        let base_url: String = Input::new()
            .with_prompt("  Base URL")
            .default(DEFAULT_BASE_URL.into())
            .interact_text()
            .map_err(|e| AgriScoreError::Config(format!("Input error: {}", e)))?;

        let timeout_secs: u64 = Input::new()
            .with_prompt("  Request timeout in seconds (0 = transport default)")
            .default(0)
            .interact_text()
            .map_err(|e| AgriScoreError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("History");
        let limit: usize = Input::new()
            .with_prompt("  Max chart points (0 = unlimited)")
            .default(0)
            .interact_text()
            .map_err(|e| AgriScoreError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            backend: BackendConfig {
                base_url,
                timeout_secs: (timeout_secs > 0).then_some(timeout_secs),
            },
            notifications: NotificationConfig::default(),
            history: HistoryConfig {
                limit: (limit > 0).then_some(limit),
                adopt_latest_reading: false,
            },
            sensor: None,
        };
        config.validate()?;

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| AgriScoreError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# AgriScore Configuration\n# Generated by `agriscore init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
            Ok(re) => re,
            Err(_) => return result,
        };

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        if let Ok(dir) = std::env::var("AGRISCORE_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| AgriScoreError::Config("Cannot determine data directory".into()))?
            .join("agriscore");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("agriscore.db"))
    }

    pub fn log_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("agriscore.log"))
    }
}
