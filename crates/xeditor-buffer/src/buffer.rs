//! Text buffer backed by a rope.
//!
//! The editing surface owns the interactive text; after every change event
//! the whole text is handed to [`TextBuffer::set_text`], which makes the
//! buffer the authoritative copy used for saving, completion and sessions.

use ropey::Rope;
use std::borrow::Cow;
use std::path::Path;

use crate::{BufferError, BufferResult, Position};

/// A text buffer backed by a rope data structure.
///
/// `TextBuffer` is `Send` but is meant to be owned by the UI thread; async
/// work receives owned snapshots (`text().into_owned()`) instead of borrows.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,

    /// Whether the buffer differs from what was last written or read
    modified: bool,

    /// Bumped on every mutation
    revision: u64,
}

impl TextBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use xeditor_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            modified: false,
            revision: 0,
        }
    }

    /// Loads a buffer from a UTF-8 file.
    pub fn from_file(path: impl AsRef<Path>) -> BufferResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from(content.as_str()))
    }

    /// Overwrites `path` with the whole buffer and clears the modified flag.
    ///
    /// The file is truncated and rewritten in place; there is no temp file.
    /// On failure the modified flag is left untouched.
    pub fn write_to(&mut self, path: impl AsRef<Path>) -> BufferResult<()> {
        std::fs::write(path.as_ref(), self.text().as_bytes())?;
        self.modified = false;
        Ok(())
    }

    // ==================== Text Access ====================

    /// Returns the entire text content.
    #[inline]
    pub fn text(&self) -> Cow<'_, str> {
        self.rope.slice(..).into()
    }

    /// Returns a specific line (0-indexed), including its trailing newline.
    pub fn line(&self, line_idx: usize) -> BufferResult<Cow<'_, str>> {
        if line_idx >= self.len_lines() {
            return Err(BufferError::PositionOutOfBounds {
                line: line_idx,
                column: 0,
            });
        }
        Ok(self.rope.line(line_idx).into())
    }

    /// Returns the identifier characters immediately before `pos`.
    ///
    /// Used to work out how much of a completion candidate is already typed.
    pub fn word_prefix_at(&self, pos: Position) -> BufferResult<String> {
        let end = self.position_to_char_idx(pos)?;
        let line_start = self.rope.line_to_char(pos.line);

        let mut start = end;
        while start > line_start {
            let c = self.rope.char(start - 1);
            if c.is_alphanumeric() || c == '_' {
                start -= 1;
            } else {
                break;
            }
        }

        Ok(self.rope.slice(start..end).to_string())
    }

    // ==================== Measurements ====================

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    #[inline]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns the number of lines in the buffer.
    ///
    /// An empty buffer has 1 line. A buffer ending with `\n` counts
    /// the empty line after it.
    #[inline]
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Returns the length of a line in chars, excluding its line break.
    pub fn line_len(&self, line_idx: usize) -> BufferResult<usize> {
        let line = self.line(line_idx)?;
        let trimmed = line.trim_end_matches(['\n', '\r']);
        Ok(trimmed.chars().count())
    }

    // ==================== Mutations ====================

    /// Replaces the whole content.
    ///
    /// Identical text is a no-op so cursor-only events do not dirty the buffer.
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.rope == text {
            return false;
        }
        self.rope = Rope::from_str(text);
        self.modified = true;
        self.revision += 1;
        true
    }

    // ==================== Position Conversion ====================

    /// Converts a Position (line, column) to a character index.
    ///
    /// The column may equal the line length (insertion point at line end).
    pub fn position_to_char_idx(&self, pos: Position) -> BufferResult<usize> {
        if pos.line >= self.len_lines() {
            return Err(BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            });
        }

        if pos.column > self.line_len(pos.line)? {
            return Err(BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            });
        }

        Ok(self.rope.line_to_char(pos.line) + pos.column)
    }

    /// Converts a character index to a Position (line, column).
    pub fn char_idx_to_position(&self, char_idx: usize) -> BufferResult<Position> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }

        let line = self.rope.char_to_line(char_idx);
        let column = char_idx - self.rope.line_to_char(line);

        Ok(Position { line, column })
    }

    /// Clamps a position into the buffer, e.g. a cursor restored from a
    /// session after the file shrank.
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.len_lines().saturating_sub(1));
        let column = pos.column.min(self.line_len(line).unwrap_or(0));
        Position { line, column }
    }

    // ==================== State Queries ====================

    /// Returns true if the buffer has changes not yet written.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Returns the edit counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
            modified: false,
            revision: 0,
        }
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_text_marks_modified() {
        let mut buffer = TextBuffer::from("abc");
        assert!(buffer.set_text("abcd"));
        assert!(buffer.is_modified());
        assert_eq!(buffer.revision(), 1);

        // Same content does not count as an edit
        assert!(!buffer.set_text("abcd"));
        assert_eq!(buffer.revision(), 1);
    }

    #[test]
    fn test_write_truncates_and_clears_modified() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "a much longer original content").unwrap();

        let mut buffer = TextBuffer::from_file(&path).unwrap();
        buffer.set_text("short");
        buffer.write_to(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "short");
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_write_failure_keeps_modified() {
        let dir = tempdir().unwrap();
        let mut buffer = TextBuffer::new();
        buffer.set_text("x");

        // A directory cannot be written as a file
        assert!(buffer.write_to(dir.path()).is_err());
        assert!(buffer.is_modified());
    }

    #[test]
    fn test_from_file_rejects_invalid_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bin.dat");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        assert!(matches!(TextBuffer::from_file(&path), Err(BufferError::Io(_))));
    }

    #[test]
    fn test_position_conversion() {
        let buffer = TextBuffer::from("ab\ncd\n");
        assert_eq!(buffer.position_to_char_idx(Position::new(1, 1)).unwrap(), 4);
        assert_eq!(buffer.position_to_char_idx(Position::new(1, 2)).unwrap(), 5);
        assert!(buffer.position_to_char_idx(Position::new(1, 3)).is_err());
        assert_eq!(buffer.char_idx_to_position(4).unwrap(), Position::new(1, 1));
    }

    #[test]
    fn test_word_prefix() {
        let buffer = TextBuffer::from("import os\nos.pa");
        let prefix = buffer.word_prefix_at(Position::new(1, 5)).unwrap();
        assert_eq!(prefix, "pa");

        let none = buffer.word_prefix_at(Position::new(1, 3)).unwrap();
        assert_eq!(none, "");
    }

    #[test]
    fn test_clamp() {
        let buffer = TextBuffer::from("one\ntwo");
        assert_eq!(buffer.clamp(Position::new(10, 10)), Position::new(1, 3));
        assert_eq!(buffer.clamp(Position::new(0, 99)), Position::new(0, 3));
    }

    proptest! {
        #[test]
        fn prop_char_idx_roundtrip(text in "[a-z\n]{0,64}", idx in 0usize..65) {
            let buffer = TextBuffer::from(text.as_str());
            let idx = idx.min(buffer.len_chars());
            let pos = buffer.char_idx_to_position(idx).unwrap();
            prop_assert_eq!(buffer.position_to_char_idx(pos).unwrap(), idx);
        }
    }
}
