//! Open documents and the tab list.
//!
//! A `Document` is one open file: its buffer, cursor, scroll line and
//! language tag. `DocumentManager` keeps the documents in tab order and
//! guarantees that a path is open in at most one tab.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};
use uuid::Uuid;
use xeditor_buffer::{Position, TextBuffer};

use crate::language::Language;
use crate::{CoreError, CoreResult};

/// Unique identifier for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Creates a new unique document ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// When buffer edits are written back to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SavePolicy {
    /// Overwrite the file synchronously after every change.
    #[default]
    Eager,
    /// Overwrite once no edit has happened for `delay`.
    Debounced { delay: Duration },
    /// Only write on an explicit save.
    Manual,
}

/// A single open file.
pub struct Document {
    id: DocumentId,
    buffer: TextBuffer,

    /// Absolute, normalized file path
    path: PathBuf,

    /// Tab label (the file's base name)
    name: String,

    language: Language,
    cursor: Position,
    scroll_line: usize,

    /// Time of the most recent edit that is not yet on disk
    last_edit: Option<Instant>,
}

impl Document {
    /// Reads `path` into a new document.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = normalize_path(path.as_ref())?;
        if !path.exists() {
            return Err(CoreError::FileNotFound(path.display().to_string()));
        }
        let buffer = TextBuffer::from_file(&path)?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            id: DocumentId::new(),
            buffer,
            language: Language::from_path(&path),
            path,
            name,
            cursor: Position::ZERO,
            scroll_line: 0,
            last_edit: None,
        })
    }

    // ==================== Getters ====================

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the tab label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Language tag; a pure function of the path's extension.
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        self.buffer.text()
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn scroll_line(&self) -> usize {
        self.scroll_line
    }

    /// True while the buffer holds edits that are not on disk.
    pub fn is_dirty(&self) -> bool {
        self.buffer.is_modified()
    }

    pub fn revision(&self) -> u64 {
        self.buffer.revision()
    }

    // ==================== Editing ====================

    /// Takes the editing surface's full text after a change event.
    ///
    /// Returns false when the text did not actually change.
    pub fn set_text(&mut self, text: &str, now: Instant) -> bool {
        let changed = self.buffer.set_text(text);
        if changed {
            self.last_edit = Some(now);
            self.cursor = self.buffer.clamp(self.cursor);
        }
        changed
    }

    /// Records the editing surface's cursor, clamped into the buffer.
    pub fn set_cursor(&mut self, pos: Position) {
        self.cursor = self.buffer.clamp(pos);
    }

    pub fn set_scroll_line(&mut self, line: usize) {
        self.scroll_line = line.min(self.buffer.len_lines().saturating_sub(1));
    }

    /// Identifier characters typed just before the cursor.
    pub fn word_before_cursor(&self) -> String {
        self.buffer.word_prefix_at(self.cursor).unwrap_or_default()
    }

    // ==================== Saving ====================

    /// Overwrites the bound file with the buffer.
    ///
    /// On failure the document stays dirty and keeps its content.
    pub fn save(&mut self) -> CoreResult<()> {
        self.buffer.write_to(&self.path)?;
        self.last_edit = None;
        Ok(())
    }

    /// Whether a debounced save should happen at `now`.
    pub fn save_due(&self, delay: Duration, now: Instant) -> bool {
        self.is_dirty()
            && self
                .last_edit
                .is_some_and(|at| now.saturating_duration_since(at) >= delay)
    }
}

/// Makes `path` absolute and removes `.`/`..` components without touching
/// the filesystem, so the same file reached two ways maps to one tab.
pub fn normalize_path(path: &Path) -> CoreResult<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

/// Manages the open documents in tab order.
pub struct DocumentManager {
    documents: HashMap<DocumentId, Document>,

    /// Tab order
    order: Vec<DocumentId>,

    /// Selected tab
    active: Option<DocumentId>,
}

impl DocumentManager {
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            order: Vec::new(),
            active: None,
        }
    }

    /// Appends a document as the last tab and selects it.
    pub fn add(&mut self, doc: Document) -> DocumentId {
        let id = doc.id();
        self.documents.insert(id, doc);
        self.order.push(id);
        self.active = Some(id);
        id
    }

    /// Removes the tab at `index` and returns its document.
    ///
    /// If it was selected, the tab that moves into its slot (or the new
    /// last tab) becomes selected.
    pub fn remove_at(&mut self, index: usize) -> CoreResult<Document> {
        if index >= self.order.len() {
            return Err(CoreError::TabOutOfRange(index));
        }

        let id = self.order.remove(index);
        let doc = self
            .documents
            .remove(&id)
            .ok_or(CoreError::DocumentNotFound(id))?;

        if self.active == Some(id) {
            let next = index.min(self.order.len().saturating_sub(1));
            self.active = self.order.get(next).copied();
        }

        Ok(doc)
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.get_mut(&id)
    }

    pub fn active(&self) -> Option<&Document> {
        self.active.and_then(|id| self.documents.get(&id))
    }

    pub fn active_id(&self) -> Option<DocumentId> {
        self.active
    }

    /// Index of the selected tab.
    pub fn active_index(&self) -> Option<usize> {
        let id = self.active?;
        self.index_of(id)
    }

    pub fn set_active(&mut self, id: DocumentId) {
        if self.documents.contains_key(&id) {
            self.active = Some(id);
        }
    }

    /// Selects the tab at `index`.
    pub fn select(&mut self, index: usize) -> CoreResult<DocumentId> {
        let id = *self
            .order
            .get(index)
            .ok_or(CoreError::TabOutOfRange(index))?;
        self.active = Some(id);
        Ok(id)
    }

    pub fn index_of(&self, id: DocumentId) -> Option<usize> {
        self.order.iter().position(|&i| i == id)
    }

    /// Finds the document bound to a normalized path.
    pub fn find_by_path(&self, path: &Path) -> Option<DocumentId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.documents.get(id).is_some_and(|d| d.path() == path))
    }

    /// Iterates documents in tab order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.order.iter().filter_map(|id| self.documents.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for DocumentManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_in(dir: &Path, name: &str, content: &str) -> Document {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        Document::open(&path).unwrap()
    }

    #[test]
    fn test_open_sets_name_and_language() {
        let dir = tempdir().unwrap();
        let doc = open_in(dir.path(), "script.py", "print(1)\n");
        assert_eq!(doc.name(), "script.py");
        assert_eq!(doc.language(), Language::Python);
        assert_eq!(doc.text(), "print(1)\n");
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let err = Document::open(dir.path().join("nope.txt")).err().unwrap();
        assert!(matches!(err, CoreError::FileNotFound(_)));
    }

    #[test]
    fn test_normalize_path() {
        let dir = tempdir().unwrap();
        let a = normalize_path(&dir.path().join("x/../f.txt")).unwrap();
        let b = normalize_path(&dir.path().join("./f.txt")).unwrap();
        assert_eq!(a, b);
        assert!(a.is_absolute());
    }

    #[test]
    fn test_save_due() {
        let dir = tempdir().unwrap();
        let mut doc = open_in(dir.path(), "a.txt", "a");
        let start = Instant::now();
        let delay = Duration::from_millis(200);

        assert!(!doc.save_due(delay, start));
        doc.set_text("ab", start);
        assert!(!doc.save_due(delay, start + Duration::from_millis(100)));
        assert!(doc.save_due(delay, start + Duration::from_millis(200)));

        doc.save().unwrap();
        assert!(!doc.save_due(delay, start + Duration::from_secs(1)));
        assert_eq!(std::fs::read_to_string(doc.path()).unwrap(), "ab");
    }

    #[test]
    fn test_cursor_is_clamped() {
        let dir = tempdir().unwrap();
        let mut doc = open_in(dir.path(), "a.txt", "one\ntwo\n");
        doc.set_cursor(Position::new(1, 3));
        assert_eq!(doc.cursor(), Position::new(1, 3));

        doc.set_text("x", Instant::now());
        assert_eq!(doc.cursor(), Position::new(0, 1));
    }

    #[test]
    fn test_remove_selects_neighbour() {
        let dir = tempdir().unwrap();
        let mut docs = DocumentManager::new();
        let a = docs.add(open_in(dir.path(), "a.txt", "a"));
        let b = docs.add(open_in(dir.path(), "b.txt", "b"));
        let c = docs.add(open_in(dir.path(), "c.txt", "c"));

        docs.select(1).unwrap();
        let removed = docs.remove_at(1).unwrap();
        assert_eq!(removed.id(), b);
        assert_eq!(docs.active_id(), Some(c));

        docs.remove_at(1).unwrap();
        assert_eq!(docs.active_id(), Some(a));

        docs.remove_at(0).unwrap();
        assert!(docs.active().is_none());
        assert!(matches!(docs.remove_at(0), Err(CoreError::TabOutOfRange(0))));
    }

    #[test]
    fn test_removing_other_tab_keeps_selection() {
        let dir = tempdir().unwrap();
        let mut docs = DocumentManager::new();
        docs.add(open_in(dir.path(), "a.txt", "a"));
        let b = docs.add(open_in(dir.path(), "b.txt", "b"));

        docs.remove_at(0).unwrap();
        assert_eq!(docs.active_id(), Some(b));
        assert_eq!(docs.active_index(), Some(0));
    }
}
