//! Editor configuration.
//!
//! Loaded from `<config_dir>/xeditor/config.toml`. Every struct uses
//! `#[serde(default)]`, so a config file only needs the keys it changes
//! and older files keep working when new settings are added.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::document::SavePolicy;

/// Main editor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// UI appearance settings
    pub ui: UiConfig,

    /// File handling settings
    pub files: FileConfig,

    /// "Run current file" settings
    pub runner: RunnerConfig,

    /// Python completion settings
    pub completion: CompletionConfig,

    /// Plugin loading settings
    pub plugins: PluginConfig,

    /// Session persistence settings
    pub session: SessionConfig,
}

impl Config {
    /// Loads config from `path`, or from the default location when `None`.
    ///
    /// A missing file yields defaults. A broken file is logged and also
    /// yields defaults so a typo never prevents the editor from starting.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!("Using default config: {}", e);
                    return Self::default();
                }
            },
        };

        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("xeditor").join("config.toml"))
    }
}

/// UI appearance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Color theme name ("dark" or "light")
    pub theme: String,

    /// Editor font size in points
    pub font_size: f32,

    /// Initial window size
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            font_size: 14.0,
            window_width: 1200.0,
            window_height: 800.0,
        }
    }
}

/// How edits reach the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavePolicyKind {
    /// Write the whole file after every change
    #[default]
    Eager,
    /// Write once edits have paused for `auto_save_delay` ms
    Debounced,
    /// Write only on explicit save
    Manual,
}

/// File handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Save policy
    pub save_policy: SavePolicyKind,

    /// Debounce delay in ms for the "debounced" policy
    pub auto_save_delay: u64,

    /// Entry names hidden from the file tree
    pub exclude_patterns: Vec<String>,
}

impl FileConfig {
    /// Resolves the configured policy.
    pub fn save_policy(&self) -> SavePolicy {
        match self.save_policy {
            SavePolicyKind::Eager => SavePolicy::Eager,
            SavePolicyKind::Debounced => SavePolicy::Debounced {
                delay: Duration::from_millis(self.auto_save_delay),
            },
            SavePolicyKind::Manual => SavePolicy::Manual,
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            save_policy: SavePolicyKind::Eager,
            auto_save_delay: 500,
            exclude_patterns: vec![
                "node_modules".to_string(),
                "target".to_string(),
                "__pycache__".to_string(),
            ],
        }
    }
}

/// Runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Interpreter invoked with the file path as its only argument
    pub interpreter: String,

    /// Kill the run after this many seconds (0 = never)
    pub timeout_secs: u64,
}

impl RunnerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            timeout_secs: 0,
        }
    }
}

/// Completion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Enable Ctrl+Space completion
    pub enabled: bool,

    /// Python executable that has `jedi` installed
    pub python: String,

    /// Give up on a completion query after this many ms
    pub timeout_ms: u64,
}

impl CompletionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            python: "python3".to_string(),
            timeout_ms: 5000,
        }
    }
}

/// Plugin configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Load plugins at startup
    pub enabled: bool,

    /// Plugin directory, relative to the working directory unless absolute
    pub dir: PathBuf,

    /// Plugin ids that are discovered but never activated
    pub disabled: Vec<String>,

    /// Upper bound for a plugin's activation command
    pub activation_timeout_secs: u64,
}

impl PluginConfig {
    pub fn activation_timeout(&self) -> Duration {
        Duration::from_secs(self.activation_timeout_secs)
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("plugins"),
            disabled: Vec::new(),
            activation_timeout_secs: 10,
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Reopen the files of the previous session at startup
    pub restore: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { restore: true }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.runner.interpreter, "python3");
        assert_eq!(config.files.save_policy(), SavePolicy::Eager);
        assert_eq!(config.plugins.dir, PathBuf::from("plugins"));
        assert!(config.runner.timeout().is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.completion.timeout_ms, config.completion.timeout_ms);
        assert_eq!(parsed.files.save_policy, config.files.save_policy);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [files]
            save_policy = "debounced"
            auto_save_delay = 250

            [runner]
            timeout_secs = 3
            "#,
        )
        .unwrap();

        assert_eq!(
            parsed.files.save_policy(),
            SavePolicy::Debounced {
                delay: Duration::from_millis(250)
            }
        );
        assert_eq!(parsed.runner.timeout(), Some(Duration::from_secs(3)));
        assert_eq!(parsed.runner.interpreter, "python3");
        assert!(parsed.session.restore);
    }

    #[test]
    fn test_broken_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[files\nsave_policy = ").unwrap();

        assert!(Config::load_from(&path).is_err());
        let config = Config::load(Some(&path));
        assert_eq!(config.files.save_policy, SavePolicyKind::Eager);
    }
}
