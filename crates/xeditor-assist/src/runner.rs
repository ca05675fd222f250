//! Run the current file.

use std::fmt;
use std::path::Path;
use std::time::Duration;
use xeditor_core::config::RunnerConfig;
use xeditor_core::process::{self, ProcessSpec};

/// Result of a run as shown in the output dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// stdout and stderr merged in arrival order
    pub text: String,

    /// Exit code; `None` if the process never started or was killed
    pub status: Option<i32>,

    pub timed_out: bool,

    /// The program could not be spawned; `text` holds the reason
    pub failed_to_start: bool,
}

impl RunOutput {
    /// One line for the status bar.
    pub fn summary(&self) -> String {
        if self.failed_to_start {
            "Run failed to start".to_string()
        } else if self.timed_out {
            "Run killed after timeout".to_string()
        } else {
            match self.status {
                Some(code) => format!("Run finished with exit code {}", code),
                None => "Run terminated by signal".to_string(),
            }
        }
    }
}

impl fmt::Display for RunOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Spawns an interpreter on a file and captures what it prints.
#[derive(Debug, Clone)]
pub struct Runner {
    interpreter: String,
    timeout: Option<Duration>,
}

impl Runner {
    pub fn new(interpreter: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout,
        }
    }

    pub fn from_config(config: &RunnerConfig) -> Self {
        Self::new(config.interpreter.clone(), config.timeout())
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    /// `<interpreter> <path>`, with the path as the only argument.
    pub fn spec(&self, path: &Path) -> ProcessSpec {
        ProcessSpec::new(&self.interpreter)
            .arg(path)
            .timeout(self.timeout)
    }

    /// Runs `path` and waits for it to finish.
    pub async fn run(self, path: impl AsRef<Path>) -> RunOutput {
        let spec = self.spec(path.as_ref());
        execute(spec).await
    }
}

/// Runs any command the same way a file run is handled.
///
/// Exit status never turns into an error; a spawn failure becomes the
/// output text.
pub async fn execute(spec: ProcessSpec) -> RunOutput {
    tracing::info!("Running `{}`", spec);
    match process::capture(&spec).await {
        Ok(output) => {
            tracing::info!("`{}` exited with {:?}", spec, output.status);
            let mut text = output.text;
            if output.timed_out {
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                let limit = spec.timeout.unwrap_or_default();
                text.push_str(&format!("[killed after {} s]\n", limit.as_secs()));
            }
            RunOutput {
                text,
                status: output.status,
                timed_out: output.timed_out,
                failed_to_start: false,
            }
        }
        Err(e) => {
            tracing::warn!("Could not start `{}`: {}", spec.program, e);
            RunOutput {
                text: format!("Failed to start {}: {}", spec.program, e),
                status: None,
                timed_out: false,
                failed_to_start: true,
            }
        }
    }
}
