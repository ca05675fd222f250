//! # XEditor UI
//!
//! The editor window, built with the iced framework.
//!
//! ## Architecture
//!
//! The UI follows the Elm architecture (TEA):
//! - **Model**: `App`, which owns the core `Editor`
//! - **Message**: Events that can occur
//! - **Update**: (state, message) -> new state plus follow-up tasks
//! - **View**: state -> UI elements
//!
//! ## Learning: Keeping the UI Thread Free
//!
//! `update` must return quickly. Anything that can block (file dialogs,
//! completion, running a program) is returned as a `Task` that runs on
//! the tokio runtime and reports back with a `Message`. Results are
//! checked against the current state before they are applied.

pub mod app;
pub mod theme;

pub use app::{run, App, Flags};
