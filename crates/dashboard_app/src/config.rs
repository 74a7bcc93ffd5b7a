use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use dashboard_core::DEFAULT_LIMIT;
use dashboard_engine::{ReconnectConfig, DEFAULT_UPLOAD_ENDPOINT};
use dashboard_logging::{dash_info, LogDestination};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "dashboard.ron";
pub const DEFAULT_JOB_URL: &str = "ws://localhost:9000/ws/job";
pub const DEFAULT_WORKER_URL: &str = "ws://localhost:8000/ws/worker";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub job_url: String,
    pub worker_url: String,
    pub upload_url: String,
    pub default_limit: u32,
    pub connect_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    pub reconnect: Option<ReconnectSettings>,
    pub log: LogDestination,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            job_url: DEFAULT_JOB_URL.to_string(),
            worker_url: DEFAULT_WORKER_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_ENDPOINT.to_string(),
            default_limit: DEFAULT_LIMIT,
            connect_timeout_secs: 10,
            upload_timeout_secs: 60,
            reconnect: None,
            log: LogDestination::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectSettings {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1_000,
            max_delay_ms: 30_000,
            multiplier: 2.0,
        }
    }
}

impl ReconnectSettings {
    pub fn to_config(&self) -> ReconnectConfig {
        ReconnectConfig {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            multiplier: self.multiplier,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Reads the config at `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<DashboardConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(DashboardConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };

    let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    dash_info!("Loaded config from {:?}", path);
    Ok(config)
}
