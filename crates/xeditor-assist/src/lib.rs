//! # XEditor Assist
//!
//! Python support that lives outside the editor process.
//!
//! ## Learning: Shelling Out
//!
//! Completion and "run current file" both need a Python interpreter.
//! Rather than embedding one, the editor spawns it as a child process:
//! - Completion sends a JSON request to a small `jedi` helper on stdin
//!   and reads a JSON array of names back
//! - Run passes the file path as the only argument and shows whatever
//!   the program printed
//!
//! Both go through `xeditor_core::process::capture`, which merges the
//! child's stdout and stderr and kills it on timeout or when dropped.

pub mod completion;
pub mod runner;

pub use completion::{
    complete_owned, suggest, Completer, CompletionRequest, Completions, JediCompleter,
};
pub use runner::{execute, RunOutput, Runner};

/// Errors from external helpers.
///
/// These never reach the user directly: completion degrades to an empty
/// list and the runner turns them into output text.
#[derive(Debug, thiserror::Error)]
pub enum AssistError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Helper exited with {status:?}: {output}")]
    Failed { status: Option<i32>, output: String },

    #[error("Malformed helper output: {0}")]
    Json(#[from] serde_json::Error),
}
