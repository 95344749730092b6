//! TOML-based application configuration.
//!
//! Stores:
//! - Chorus window timing, title and phrases
//! - Snooze interval
//! - iOS and Android notification presentation
//!
//! Configuration is stored at `~/.config/dawnchorus/config.toml`.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::chorus::{ChorusWindow, DEFAULT_PHRASES, DEFAULT_SPAN_SECS, DEFAULT_STEP_SECS, DEFAULT_TITLE};
use crate::error::{ConfigError, ValidationError};
use crate::notifier::{AndroidPresentation, IosPresentation};
use crate::service::DEFAULT_SNOOZE_MINUTES;

/// Returns `~/.config/dawnchorus[-dev]/` based on DAWNCHORUS_ENV.
///
/// Set DAWNCHORUS_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("DAWNCHORUS_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("dawnchorus-dev")
    } else {
        base_dir.join("dawnchorus")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::SaveFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

/// Chorus window configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_step_secs")]
    pub step_secs: u32,
    #[serde(default = "default_span_secs")]
    pub span_secs: u32,
    #[serde(default = "default_title")]
    pub title: String,
    /// One phrase per event; must have `span_secs / step_secs + 1` entries.
    #[serde(default = "default_phrases")]
    pub phrases: Vec<String>,
}

/// Snooze configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnoozeConfig {
    #[serde(default = "default_snooze_minutes")]
    pub minutes: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/dawnchorus/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub snooze: SnoozeConfig,
    #[serde(default)]
    pub ios: IosPresentation,
    #[serde(default)]
    pub android: AndroidPresentation,
}

fn default_step_secs() -> u32 {
    DEFAULT_STEP_SECS
}
fn default_span_secs() -> u32 {
    DEFAULT_SPAN_SECS
}
fn default_title() -> String {
    DEFAULT_TITLE.into()
}
fn default_phrases() -> Vec<String> {
    DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect()
}
fn default_snooze_minutes() -> u32 {
    DEFAULT_SNOOZE_MINUTES
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            step_secs: default_step_secs(),
            span_secs: default_span_secs(),
            title: default_title(),
            phrases: default_phrases(),
        }
    }
}

impl Default for SnoozeConfig {
    fn default() -> Self {
        Self {
            minutes: default_snooze_minutes(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::InvalidValue {
            key: key.to_string(),
            message: "unknown config key".into(),
        };
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, typed by the current value.
    ///
    /// The change is only applied if the resulting window is still valid.
    /// Does not save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        updated.chorus_window().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        *self = updated;
        Ok(())
    }

    /// Validated chorus window for these settings.
    pub fn chorus_window(&self) -> Result<ChorusWindow, ValidationError> {
        ChorusWindow::new(
            self.window.step_secs,
            self.window.span_secs,
            self.window.title.clone(),
            self.window.phrases.clone(),
        )
    }

    pub fn snooze_offset(&self) -> Duration {
        Duration::minutes(i64::from(self.snooze.minutes))
    }

    pub fn ios_presentation(&self) -> IosPresentation {
        self.ios.clone()
    }

    pub fn android_presentation(&self) -> AndroidPresentation {
        self.android.clone()
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
