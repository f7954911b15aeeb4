//! Configuration.
//!
//! YAML file with precedence: CLI > ENV > file > defaults. The binary applies
//! CLI flags on top of [`Config::load_or_default`] + [`Config::apply_env`].

use crate::error::{MonitorError, Result};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding `global.update_ms`.
pub const ENV_UPDATE_MS: &str = "PROCWATCH_UPDATE_MS";
/// Environment variable overriding `global.vim_keys`.
pub const ENV_VIM_KEYS: &str = "PROCWATCH_VIM_KEYS";
/// Environment variable overriding `theme`.
pub const ENV_THEME: &str = "PROCWATCH_THEME";

/// Global configuration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Resample interval in milliseconds.
    #[serde(default = "default_update_ms")]
    pub update_ms: u64,

    /// Maximum wait for a key press per loop iteration, in milliseconds.
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,

    /// Enable `j`/`k` navigation.
    #[serde(default)]
    pub vim_keys: bool,

    /// Process enumeration root.
    #[serde(default = "default_proc_root")]
    pub proc_root: PathBuf,

    /// Memory-info file.
    #[serde(default = "default_meminfo_path")]
    pub meminfo_path: PathBuf,
}

fn default_update_ms() -> u64 {
    3000
}
fn default_poll_ms() -> u64 {
    100
}
fn default_proc_root() -> PathBuf {
    PathBuf::from(crate::collectors::DEFAULT_PROC_ROOT)
}
fn default_meminfo_path() -> PathBuf {
    PathBuf::from(crate::collectors::DEFAULT_MEMINFO_PATH)
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            update_ms: default_update_ms(),
            poll_ms: default_poll_ms(),
            vim_keys: false,
            proc_root: default_proc_root(),
            meminfo_path: default_meminfo_path(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Global settings.
    #[serde(default)]
    pub global: GlobalConfig,

    /// Built-in theme name.
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_theme() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self { global: GlobalConfig::default(), theme: default_theme() }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `$XDG_CONFIG_HOME/procwatch/config.yaml` or the platform equivalent.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("procwatch").join("config.yaml"))
    }

    /// Loads and validates configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| MonitorError::ConfigNotFound(path.display().to_string()))?;

        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            MonitorError::ConfigParse { line, message: e.to_string() }
        })
    }

    /// Loads configuration with fallback to defaults.
    ///
    /// A missing file is silent; an unreadable or invalid one is logged.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(MonitorError::ConfigNotFound(_)) => Self::default(),
            Err(e) => {
                crate::warn!("config", "{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Checks interval constraints.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::ConfigInvalid`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, message: &str| {
            Err(MonitorError::ConfigInvalid { key: key.to_string(), message: message.to_string() })
        };

        if self.global.update_ms == 0 {
            return invalid("global.update_ms", "must be greater than 0");
        }
        if self.global.poll_ms == 0 {
            return invalid("global.poll_ms", "must be greater than 0");
        }
        if self.global.poll_ms > self.global.update_ms {
            return invalid("global.poll_ms", "must not exceed global.update_ms");
        }
        Ok(())
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_UPDATE_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => {
                    self.global.update_ms = ms;
                    self.global.poll_ms = self.global.poll_ms.min(ms);
                }
                _ => crate::warn!("config", "ignoring {}={:?}", ENV_UPDATE_MS, raw),
            }
        }

        if let Some(raw) = lookup(ENV_VIM_KEYS) {
            match raw.trim() {
                "1" | "true" | "yes" => self.global.vim_keys = true,
                "0" | "false" | "no" => self.global.vim_keys = false,
                _ => crate::warn!("config", "ignoring {}={:?}", ENV_VIM_KEYS, raw),
            }
        }

        if let Some(raw) = lookup(ENV_THEME) {
            self.theme = raw.trim().to_string();
        }
    }

    /// Sets the resample interval, clamping `poll_ms` so the result stays valid.
    pub fn set_update_ms(&mut self, ms: u64) {
        self.global.update_ms = ms;
        self.global.poll_ms = self.global.poll_ms.min(ms).max(1);
    }

    /// Returns the resample interval as a Duration.
    #[must_use]
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.global.update_ms)
    }

    /// Returns the key poll timeout as a Duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.global.poll_ms)
    }

    /// Resolves the configured theme, falling back to the default.
    #[must_use]
    pub fn resolve_theme(&self) -> Theme {
        Theme::by_name(&self.theme).unwrap_or_else(|e| {
            crate::warn!("config", "{}; using default theme", e);
            Theme::default()
        })
    }
}
