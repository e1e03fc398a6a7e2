//! Configuration system (layered: code > env > config file > defaults).

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_STREAM_PATH: &str = "/api/run-stream";
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Global default config (lazy-initialized from env).
static DEFAULT_CONFIG: OnceLock<StudioConfig> = OnceLock::new();

/// Runtime configuration for talking to the pipeline backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioConfig {
    pub base_url: String,
    pub stream_path: String,
    /// Longest wait for the next chunk of a streaming response. `None` waits forever.
    pub idle_timeout: Option<Duration>,
    pub connect_timeout: Duration,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            stream_path: DEFAULT_STREAM_PATH.to_string(),
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// On-disk shape of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub stream_path: Option<String>,
    /// `0` disables the idle timeout.
    pub idle_timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
}

impl StudioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, then the user config file (if present), then environment variables.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut config = Self::new();
        if let Some(path) = default_config_path() {
            if path.exists() {
                config = config.merge_file(&path)?;
            }
        }
        config.apply_env(|key| std::env::var(key).ok())
    }

    /// Get (or create) the global default config.
    ///
    /// Falls back to defaults when the environment cannot be read.
    pub fn global() -> &'static StudioConfig {
        DEFAULT_CONFIG.get_or_init(|| {
            Self::from_env().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Ignoring invalid configuration, using defaults");
                Self::default()
            })
        })
    }

    /// Load a TOML config file on top of the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new().merge_file(path.as_ref())
    }

    fn merge_file(self, path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&raw)?;
        Ok(self.merge(file))
    }

    /// Overlay the keys set in `file`.
    pub fn merge(mut self, file: ConfigFile) -> Self {
        if let Some(url) = file.base_url {
            self.base_url = url;
        }
        if let Some(path) = file.stream_path {
            self.stream_path = path;
        }
        if let Some(secs) = file.idle_timeout_secs {
            self.idle_timeout = idle_timeout_from_secs(secs);
        }
        if let Some(secs) = file.connect_timeout_secs {
            self.connect_timeout = Duration::from_secs(secs);
        }
        self
    }

    /// Overlay `STUDIO_*` variables resolved through `lookup`.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("STUDIO_BASE_URL") {
            self.base_url = url;
        }
        if let Some(path) = lookup("STUDIO_STREAM_PATH") {
            self.stream_path = path;
        }
        if let Some(raw) = lookup("STUDIO_IDLE_TIMEOUT_SECS") {
            self.idle_timeout = idle_timeout_from_secs(parse_secs("STUDIO_IDLE_TIMEOUT_SECS", &raw)?);
        }
        if let Some(raw) = lookup("STUDIO_CONNECT_TIMEOUT_SECS") {
            self.connect_timeout =
                Duration::from_secs(parse_secs("STUDIO_CONNECT_TIMEOUT_SECS", &raw)?);
        }
        Ok(self)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_stream_path(mut self, path: impl Into<String>) -> Self {
        self.stream_path = path.into();
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Full URL of the streaming endpoint.
    pub fn stream_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.stream_path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(StudioError::Configuration("base_url is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(StudioError::Configuration(format!(
                "base_url must start with http:// or https://, got '{url}'"
            )));
        }
        Ok(())
    }
}

/// `~/.pipeline-studio/config.toml`, when a home directory can be found.
pub fn default_config_path() -> Option<PathBuf> {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".pipeline-studio").join("config.toml"))
}

fn idle_timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn parse_secs(key: &str, raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|_| {
        StudioError::Configuration(format!("{key} must be a whole number of seconds, got '{raw}'"))
    })
}
