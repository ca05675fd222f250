//! # XEditor Plugin System
//!
//! Plugins are directories under `plugins/`, each with a `plugin.toml`:
//!
//! ```toml
//! id = "hello"
//! name = "Hello"
//! version = "1.0.0"
//! api_version = "1.0.0"
//! main = "./activate.sh"        # optional
//!
//! [[commands]]
//! id = "hello.wc"
//! title = "Word count"
//! program = "wc"
//! args = ["-w"]
//! ```
//!
//! ## Learning: Out-of-Process Plugins
//!
//! Nothing a plugin ships is loaded into the editor. Activation runs the
//! `main` command as a child process and contributed commands are programs
//! run against the active file. A plugin that crashes, hangs or has a bad
//! manifest ends up in the `Error` state; the editor and the other plugins
//! carry on.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use xeditor_core::config::PluginConfig;
use xeditor_core::process::{self, ProcessSpec};

/// Plugin system errors.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Plugin not found: {0}")]
    NotFound(String),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Plugin already loaded: {0}")]
    AlreadyLoaded(String),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Incompatible plugin API version: expected {expected}, got {got}")]
    IncompatibleVersion { expected: String, got: String },

    #[error("Activation failed: {0}")]
    ActivationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Plugin API version for compatibility checking.
pub const API_VERSION: &str = "1.0.0";

/// Plugin manifest (plugin.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Plugin identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Version string
    pub version: String,

    #[serde(default)]
    pub description: String,

    /// Required API version
    pub api_version: String,

    /// Activation command, run in the plugin directory
    #[serde(default)]
    pub main: Option<String>,

    /// Commands contributed by this plugin
    #[serde(default)]
    pub commands: Vec<CommandContribution>,
}

/// Toolbar command contributed by a plugin.
///
/// Invoking it runs `program args... <active file>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandContribution {
    /// Command identifier
    pub id: String,
    /// Button label
    pub title: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Plugin state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    /// Discovered, not activated yet
    Installed,
    /// Activated; its commands are offered
    Active,
    /// Activation failed
    Error,
    /// Listed in `plugins.disabled`
    Disabled,
}

/// Information about a discovered plugin.
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub manifest: PluginManifest,
    /// Plugin directory
    pub path: PathBuf,
    pub state: PluginState,
    /// Error message (if state is Error)
    pub error: Option<String>,
}

/// A plugin directory that could not be turned into a plugin.
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Plugin manager.
pub struct PluginManager {
    plugins_dir: PathBuf,

    /// Ids that are discovered but never activated
    disabled: Vec<String>,

    activation_timeout: Duration,

    /// Plugins by id, so commands keep a stable order
    plugins: BTreeMap<String, PluginInfo>,

    failures: Vec<LoadFailure>,
}

impl PluginManager {
    /// Creates a new plugin manager.
    pub fn new(plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
            disabled: Vec::new(),
            activation_timeout: Duration::from_secs(10),
            plugins: BTreeMap::new(),
            failures: Vec::new(),
        }
    }

    pub fn from_config(config: &PluginConfig) -> Self {
        Self::new(&config.dir)
            .with_disabled(config.disabled.clone())
            .with_activation_timeout(config.activation_timeout())
    }

    pub fn with_disabled(mut self, disabled: Vec<String>) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_activation_timeout(mut self, timeout: Duration) -> Self {
        self.activation_timeout = timeout;
        self
    }

    /// Discovers and activates every plugin.
    ///
    /// Returns the number of active plugins. Failures are recorded per
    /// plugin and never stop the others from loading.
    pub async fn load_all(&mut self) -> usize {
        let ids = match self.discover() {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!("Cannot read {}: {}", self.plugins_dir.display(), e);
                return 0;
            }
        };

        for id in ids {
            if let Err(e) = self.activate(&id).await {
                tracing::warn!("Plugin {} failed: {}", id, e);
            }
        }

        let active = self.active().count();
        tracing::info!("{} plugins active", active);
        active
    }

    /// [`load_all`](Self::load_all) for callers outside an async runtime.
    pub fn load_all_blocking(&mut self) -> Result<usize, PluginError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(runtime.block_on(self.load_all()))
    }

    /// Discovers installed plugins.
    ///
    /// A missing plugin directory means no plugins; it is not created.
    pub fn discover(&mut self) -> Result<Vec<String>, PluginError> {
        let mut discovered = Vec::new();

        if !self.plugins_dir.is_dir() {
            tracing::debug!("No plugin directory at {}", self.plugins_dir.display());
            return Ok(discovered);
        }

        let mut dirs: Vec<PathBuf> = std::fs::read_dir(&self.plugins_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir() && p.join("plugin.toml").is_file())
            .collect();
        dirs.sort();

        for path in dirs {
            match self.register(&path) {
                Ok(id) => discovered.push(id),
                Err(e) => {
                    tracing::warn!("Skipping plugin at {}: {}", path.display(), e);
                    self.failures.push(LoadFailure {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(discovered)
    }

    fn register(&mut self, path: &Path) -> Result<String, PluginError> {
        let manifest = Self::load_manifest(&path.join("plugin.toml"))?;
        let id = manifest.id.clone();
        if self.plugins.contains_key(&id) {
            return Err(PluginError::AlreadyLoaded(id));
        }

        let state = if self.disabled.contains(&id) {
            PluginState::Disabled
        } else {
            PluginState::Installed
        };

        self.plugins.insert(
            id.clone(),
            PluginInfo {
                manifest,
                path: path.to_path_buf(),
                state,
                error: None,
            },
        );
        Ok(id)
    }

    /// Loads a plugin manifest.
    fn load_manifest(path: &Path) -> Result<PluginManifest, PluginError> {
        let content = std::fs::read_to_string(path)?;
        let manifest: PluginManifest =
            toml::from_str(&content).map_err(|e| PluginError::InvalidManifest(e.to_string()))?;

        if !Self::is_compatible(&manifest.api_version) {
            return Err(PluginError::IncompatibleVersion {
                expected: API_VERSION.to_string(),
                got: manifest.api_version,
            });
        }

        Ok(manifest)
    }

    /// Checks if an API version is compatible.
    fn is_compatible(version: &str) -> bool {
        // Same major version
        let current_major = API_VERSION.split('.').next().unwrap_or("0");
        let plugin_major = version.split('.').next().unwrap_or("");
        current_major == plugin_major
    }

    /// Activates a plugin by running its `main` command.
    ///
    /// On failure the plugin is left in the `Error` state.
    pub async fn activate(&mut self, id: &str) -> Result<(), PluginError> {
        let info = self
            .plugins
            .get(id)
            .ok_or_else(|| PluginError::NotFound(id.to_string()))?;

        match info.state {
            PluginState::Active | PluginState::Disabled => return Ok(()),
            PluginState::Installed | PluginState::Error => {}
        }

        let result = match &info.manifest.main {
            Some(main) => {
                let spec = self.activation_spec(info, main)?;
                Self::run_activation(spec).await
            }
            None => Ok(()),
        };

        let info = self
            .plugins
            .get_mut(id)
            .ok_or_else(|| PluginError::NotFound(id.to_string()))?;
        match result {
            Ok(()) => {
                info.state = PluginState::Active;
                info.error = None;
                tracing::info!("Activated plugin: {}", id);
                Ok(())
            }
            Err(e) => {
                info.state = PluginState::Error;
                info.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn activation_spec(&self, info: &PluginInfo, main: &str) -> Result<ProcessSpec, PluginError> {
        let mut words = main.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| PluginError::InvalidManifest("empty `main`".to_string()))?;

        Ok(ProcessSpec::new(resolve_program(&info.path, program))
            .args(words)
            .current_dir(&info.path)
            .env("XEDITOR_API_VERSION", API_VERSION)
            .env("XEDITOR_PLUGIN_ID", &info.manifest.id)
            .timeout(Some(self.activation_timeout)))
    }

    async fn run_activation(spec: ProcessSpec) -> Result<(), PluginError> {
        let output = process::capture(&spec)
            .await
            .map_err(|e| PluginError::ActivationFailed(format!("cannot start {}: {}", spec, e)))?;

        if output.timed_out {
            return Err(PluginError::ActivationFailed(format!(
                "`{}` timed out",
                spec
            )));
        }
        if !output.success() {
            let detail = output.text.trim();
            return Err(PluginError::ActivationFailed(format!(
                "`{}` exited with {:?}{}{}",
                spec,
                output.status,
                if detail.is_empty() { "" } else { ": " },
                detail
            )));
        }
        Ok(())
    }

    /// Returns information about a plugin.
    pub fn get(&self, id: &str) -> Option<&PluginInfo> {
        self.plugins.get(id)
    }

    /// Returns active plugins.
    pub fn active(&self) -> impl Iterator<Item = &PluginInfo> {
        self.plugins
            .values()
            .filter(|p| p.state == PluginState::Active)
    }

    /// Plugin directories that could not be loaded at all.
    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    /// Number of plugins that failed to load or activate.
    pub fn failure_count(&self) -> usize {
        self.failures.len()
            + self
                .plugins
                .values()
                .filter(|p| p.state == PluginState::Error)
                .count()
    }

    /// Returns the commands of active plugins.
    pub fn commands(&self) -> Vec<&CommandContribution> {
        self.active()
            .flat_map(|p| p.manifest.commands.iter())
            .collect()
    }

    /// How to run command `id` against `file`.
    pub fn command_spec(&self, id: &str, file: &Path) -> Result<ProcessSpec, PluginError> {
        let (info, command) = self
            .active()
            .find_map(|p| p.manifest.commands.iter().find(|c| c.id == id).map(|c| (p, c)))
            .ok_or_else(|| PluginError::CommandNotFound(id.to_string()))?;

        Ok(ProcessSpec::new(resolve_program(&info.path, &command.program))
            .args(command.args.iter().cloned())
            .arg(file)
            .current_dir(&info.path)
            .env("XEDITOR_API_VERSION", API_VERSION)
            .env("XEDITOR_PLUGIN_ID", &info.manifest.id))
    }
}

/// Programs given as a path are relative to the plugin directory; bare
/// names are looked up on `PATH`.
fn resolve_program(plugin_dir: &Path, program: &str) -> String {
    if program.contains('/') && !Path::new(program).is_absolute() {
        plugin_dir.join(program).to_string_lossy().into_owned()
    } else {
        program.to_string()
    }
}
