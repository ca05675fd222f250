//! # XEditor Core
//!
//! Core editor logic and state management, independent of any GUI toolkit.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Editor                             │
//! │  ┌────────────┐ ┌──────────┐ ┌──────────────┐ ┌────────┐ │
//! │  │ Navigator  │ │  Config  │ │ SessionStore │ │ Events │ │
//! │  └────────────┘ └──────────┘ └──────────────┘ └────────┘ │
//! │  ┌────────────────────────────────────────────┐          │
//! │  │        DocumentManager (one tab per path)  │          │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐       │          │
//! │  │  │  Doc 1  │ │  Doc 2  │ │  Doc 3  │       │          │
//! │  │  └─────────┘ └─────────┘ └─────────┘       │          │
//! │  └────────────────────────────────────────────┘          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The GUI owns one `Editor` and calls into it from its update loop.
//! Work that must not block that loop (completion, running files) is done
//! by other crates on owned snapshots taken from here.

pub mod config;
pub mod document;
pub mod editor;
pub mod event;
pub mod language;
pub mod navigator;
pub mod process;
pub mod session;

pub use config::Config;
pub use document::{Document, DocumentId, DocumentManager, SavePolicy};
pub use editor::{Editor, Lifecycle};
pub use event::{EditorEvent, EventBus};
pub use language::Language;
pub use navigator::{FileNode, Navigator, NavigatorAction};
pub use process::{ProcessOutput, ProcessSpec};
pub use session::{Session, SessionEntry, SessionStore};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("No active document")]
    NoActiveDocument,

    #[error("No tab at index {0}")]
    TabOutOfRange(usize),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Run is only available for Python files (current file is {0})")]
    NotRunnable(Language),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Buffer error: {0}")]
    Buffer(#[from] xeditor_buffer::BufferError),

    #[error("Session error: {0}")]
    Session(#[from] session::SessionError),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}
