use crate::core::history::DEFAULT_CAPACITY;
use crate::core::rate::CurrencyPair;
use crate::core::schedule::ScheduleRule;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

pub const ACCESS_KEY_ENV: &str = "CAMBIO_ACCESS_KEY";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub access_key: String,
}

fn default_base_url() -> String {
    "https://api.exchangeratesapi.io/v1/latest".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: default_base_url(),
            access_key: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            capacity: default_capacity(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScheduleConfig {
    #[serde(default = "default_hours")]
    pub hours: Vec<u32>,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_hours() -> Vec<u32> {
    vec![10, 12]
}

fn default_poll_interval() -> u64 {
    30
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            hours: default_hours(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl ScheduleConfig {
    pub fn rule(&self) -> Result<ScheduleRule> {
        ScheduleRule::new(self.hours.iter().copied())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    #[default]
    Console,
    Log,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub pair: CurrencyPair,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub notifier: NotifierKind,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "cambio", "cambio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "cambio", "cambio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        if let Ok(key) = std::env::var(ACCESS_KEY_ENV) {
            debug!("Using access key from {}", ACCESS_KEY_ENV);
            config.provider.access_key = key;
        }
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.provider.access_key.trim().is_empty() {
            bail!(
                "Missing provider access_key (set it in the config or via {})",
                ACCESS_KEY_ENV
            );
        }
        if self.history.capacity == 0 {
            bail!("history.capacity must be greater than zero");
        }
        if self.schedule.poll_interval_secs == 0 {
            bail!("schedule.poll_interval_secs must be greater than zero");
        }
        self.schedule.rule()?;
        Ok(())
    }
}
