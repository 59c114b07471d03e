use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::selector::{WindowSelector, DEFAULT_WINDOW_SIZE};

const CONFIG_FILE_NAME: &str = "alarm_window.json";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub backend_url: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_reading_count")]
    pub reading_count: u32,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Unset means the nearest reading is accepted however far away it is.
    #[serde(default)]
    pub max_anchor_distance_secs: Option<u64>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_reading_count() -> u32 {
    20
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let backend_url = env::var("BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        let auth_token = env::var("AUTH_TOKEN").ok().filter(|t| !t.trim().is_empty());

        let reading_count = get_env_var("READING_COUNT", default_reading_count());
        let window_size = get_env_var("WINDOW_SIZE", default_window_size());
        let max_anchor_distance_secs = env::var("MAX_ANCHOR_DISTANCE_SECS")
            .ok()
            .and_then(|val| val.trim().parse().ok());
        let request_timeout_secs =
            get_env_var("REQUEST_TIMEOUT_SECS", default_request_timeout_secs());

        Ok(Config {
            backend_url,
            auth_token,
            reading_count,
            window_size,
            max_anchor_distance_secs,
            request_timeout_secs,
        })
    }

    fn get_config_file_path() -> PathBuf {
        let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(config_dir).join(CONFIG_FILE_NAME)
    }

    pub fn load_from_file() -> Result<Self> {
        let config_file_path = Self::get_config_file_path();
        let contents = fs::read_to_string(&config_file_path)
            .with_context(|| format!("failed to read {}", config_file_path.display()))?;
        let config: Config = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_file_path.display()))?;
        Ok(config)
    }

    /// Uses the config file when one exists, otherwise the environment.
    pub fn load() -> Result<Self> {
        if Self::get_config_file_path().exists() {
            Self::load_from_file()
        } else {
            Self::from_env()
        }
    }

    pub fn selector(&self) -> Result<WindowSelector> {
        let max_distance = match self.max_anchor_distance_secs {
            Some(secs) => Some(
                i64::try_from(secs)
                    .ok()
                    .and_then(Duration::try_seconds)
                    .context("max_anchor_distance_secs is out of range")?,
            ),
            None => None,
        };
        Ok(WindowSelector::new(self.window_size, max_distance)?)
    }
}

fn get_env_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|val| val.trim().parse().ok())
        .unwrap_or(default)
}
