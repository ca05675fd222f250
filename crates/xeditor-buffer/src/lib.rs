//! # XEditor Buffer
//!
//! Text storage for open files.
//!
//! ## Key Concepts
//!
//! - `TextBuffer` owns a rope; every open tab has exactly one
//! - The buffer tracks whether it differs from disk (`is_modified`) and a
//!   monotonically increasing `revision` that changes on every edit
//! - Positions are 0-based `(line, column)` pairs counted in chars

mod buffer;
mod cursor;

pub use buffer::TextBuffer;
pub use cursor::Position;

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Position {line}:{column} is out of bounds")]
    PositionOutOfBounds { line: usize, column: usize },

    #[error("Invalid character index: {0}")]
    InvalidCharIndex(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
