//! # XEditor
//!
//! A small tabbed code editor with a file tree, session restore,
//! Python completion and a Run button.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the editor
//! cargo run
//!
//! # Open a file on top of the restored session
//! cargo run -- path/to/script.py
//!
//! # Root the file tree somewhere other than $HOME
//! cargo run -- --workspace path/to/project
//! ```

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use xeditor_core::Config;
use xeditor_ui::{Flags, run};

/// XEditor - a minimal code editor
#[derive(Parser, Debug)]
#[command(name = "xeditor")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to open
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Directory shown in the file tree
    #[arg(short, long, value_name = "DIR")]
    workspace: Option<PathBuf>,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Do not load plugins
    #[arg(long)]
    no_plugins: bool,

    /// Start without reopening the previous session
    #[arg(long)]
    no_restore: bool,

    /// Verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().as_str()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true),
        )
        .with(filter)
        .init();

    tracing::info!("Starting XEditor v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load(args.config.as_deref());

    let flags = Flags {
        file: args.file,
        workspace: args.workspace,
        config,
        no_plugins: args.no_plugins,
        no_restore: args.no_restore,
    };

    run(flags).map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["xeditor"]);
        assert!(args.file.is_none());
        assert!(args.workspace.is_none());
        assert!(!args.no_plugins);
        assert!(!args.no_restore);
        assert_eq!(args.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_args_with_file_and_flags() {
        let args = Args::parse_from([
            "xeditor",
            "script.py",
            "-w",
            "/tmp/project",
            "--no-restore",
            "--no-plugins",
            "-vv",
        ]);
        assert_eq!(args.file, Some(PathBuf::from("script.py")));
        assert_eq!(args.workspace, Some(PathBuf::from("/tmp/project")));
        assert!(args.no_restore);
        assert!(args.no_plugins);
        assert_eq!(args.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_args_config_path() {
        let args = Args::parse_from(["xeditor", "--config", "custom.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
    }
}
