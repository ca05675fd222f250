//! Main editor orchestration.
//!
//! ## Learning: The Facade Pattern
//!
//! `Editor` acts as a facade over documents, the navigator, the session
//! store and the event bus. The GUI only talks to `Editor`, which keeps
//! the "one tab per path" and save policy rules in one place.

use std::path::{Path, PathBuf};
use std::time::Instant;
use xeditor_buffer::Position;

use crate::config::Config;
use crate::document::{normalize_path, Document, DocumentId, DocumentManager, SavePolicy};
use crate::event::{EditorEvent, EventBus};
use crate::navigator::{Navigator, NavigatorAction};
use crate::session::{Session, SessionEntry, SessionStore, SESSION_VERSION};
use crate::{CoreError, CoreResult};

/// Where the editor is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Building the window, loading plugins, restoring the session
    #[default]
    Starting,
    /// Handling user actions
    Ready,
    /// Flushing and persisting before the window closes
    Closing,
}

/// The main editor state.
///
/// `Editor` is owned by the UI thread. Background work receives owned
/// snapshots (text, paths) and reports back through UI messages.
pub struct Editor {
    documents: DocumentManager,
    navigator: Navigator,
    config: Config,
    save_policy: SavePolicy,

    /// Where the session is persisted; `None` disables persistence
    sessions: Option<SessionStore>,

    event_bus: EventBus,
    lifecycle: Lifecycle,
}

impl Editor {
    /// Creates an editor whose navigator starts at the home directory.
    pub fn new(config: Config) -> Self {
        Self::with_root(config, Navigator::default_root())
    }

    /// Creates an editor whose navigator starts at `root`.
    pub fn with_root(config: Config, root: impl AsRef<Path>) -> Self {
        let navigator = Navigator::new(root, config.files.exclude_patterns.clone());
        let save_policy = config.files.save_policy();
        Self {
            documents: DocumentManager::new(),
            navigator,
            config,
            save_policy,
            sessions: None,
            event_bus: EventBus::new(),
            lifecycle: Lifecycle::Starting,
        }
    }

    /// Persists the session through `store`.
    pub fn with_session_store(mut self, store: SessionStore) -> Self {
        self.sessions = Some(store);
        self
    }

    // ==================== Lifecycle ====================

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Starting → Ready. Any other state is left as is.
    pub fn mark_ready(&mut self) {
        if self.lifecycle == Lifecycle::Starting {
            self.set_lifecycle(Lifecycle::Ready);
        }
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    /// Ready → Closing: flushes pending saves and persists the session.
    ///
    /// There is no way back; the window is expected to close next.
    pub fn close(&mut self) -> CoreResult<()> {
        if self.lifecycle == Lifecycle::Closing {
            return Ok(());
        }
        self.set_lifecycle(Lifecycle::Closing);

        for (id, e) in self.flush_all() {
            tracing::warn!("Could not save {} on exit: {}", id, e);
        }

        let session = self.capture_session();
        if let Some(store) = &self.sessions {
            store.save(&session)?;
            tracing::info!("Session saved with {} files", session.open_files.len());
        }
        Ok(())
    }

    fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        tracing::info!("Lifecycle: {:?} -> {:?}", self.lifecycle, lifecycle);
        self.lifecycle = lifecycle;
        self.emit(EditorEvent::LifecycleChanged(lifecycle));
    }

    fn ensure_open(&self, action: &str) -> CoreResult<()> {
        if self.lifecycle == Lifecycle::Closing {
            return Err(CoreError::InvalidOperation(format!(
                "cannot {} while closing",
                action
            )));
        }
        Ok(())
    }

    // ==================== Tabs ====================

    /// Opens `path` in a new tab, or selects the tab that already has it.
    ///
    /// An already open file is not re-read from disk.
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> CoreResult<DocumentId> {
        self.ensure_open("open a file")?;
        let path = normalize_path(path.as_ref())?;

        if let Some(id) = self.documents.find_by_path(&path) {
            self.documents.set_active(id);
            self.emit(EditorEvent::DocumentFocused(id));
            return Ok(id);
        }

        let doc = Document::open(&path)?;
        tracing::info!("Opened {} ({})", path.display(), doc.language());
        let id = self.documents.add(doc);

        self.emit(EditorEvent::DocumentOpened(id));
        self.emit(EditorEvent::DocumentFocused(id));
        Ok(id)
    }

    /// Closes the tab at `index` without asking about unsaved changes.
    ///
    /// Debounced edits are written first; manual-policy edits are dropped.
    pub fn close_tab(&mut self, index: usize) -> CoreResult<DocumentId> {
        self.ensure_open("close a tab")?;
        let mut doc = self.documents.remove_at(index)?;
        let id = doc.id();

        if doc.is_dirty() {
            match self.save_policy {
                SavePolicy::Manual => {
                    tracing::debug!("Discarding unsaved edits to {}", doc.path().display());
                }
                _ => {
                    if let Err(e) = doc.save() {
                        tracing::warn!("Could not save {} on close: {}", doc.path().display(), e);
                    }
                }
            }
        }

        self.emit(EditorEvent::DocumentClosed(id));
        if let Some(active) = self.documents.active_id() {
            self.emit(EditorEvent::DocumentFocused(active));
        }
        Ok(id)
    }

    /// Selects the tab at `index`.
    pub fn select_tab(&mut self, index: usize) -> CoreResult<DocumentId> {
        let id = self.documents.select(index)?;
        self.emit(EditorEvent::DocumentFocused(id));
        Ok(id)
    }

    /// Selects the next (or previous) tab, wrapping around.
    pub fn cycle_tab(&mut self, forward: bool) -> Option<DocumentId> {
        if self.documents.is_empty() {
            return None;
        }
        let len = self.documents.len();
        let current = self.documents.active_index()?;
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.select_tab(next).ok()
    }

    // ==================== Editing ====================

    /// Takes the surface's text after a change event and applies the policy.
    ///
    /// Returns whether the text changed. Under the eager policy a failed
    /// write is returned as an error; the new text is kept either way.
    pub fn update_text(&mut self, id: DocumentId, text: &str) -> CoreResult<bool> {
        self.update_text_at(id, text, Instant::now())
    }

    /// `update_text` with an explicit clock, for debounce bookkeeping.
    pub fn update_text_at(&mut self, id: DocumentId, text: &str, now: Instant) -> CoreResult<bool> {
        self.ensure_open("edit")?;
        let doc = self.document_mut(id)?;
        if !doc.set_text(text, now) {
            return Ok(false);
        }
        self.emit(EditorEvent::DocumentChanged(id));

        if self.save_policy == SavePolicy::Eager {
            self.save(id)?;
        }
        Ok(true)
    }

    pub fn set_cursor(&mut self, id: DocumentId, pos: Position) -> CoreResult<()> {
        self.document_mut(id)?.set_cursor(pos);
        Ok(())
    }

    pub fn set_scroll_line(&mut self, id: DocumentId, line: usize) -> CoreResult<()> {
        self.document_mut(id)?.set_scroll_line(line);
        Ok(())
    }

    // ==================== Saving ====================

    /// Writes a document to disk.
    ///
    /// On failure the document stays dirty and `SaveFailed` is emitted.
    pub fn save(&mut self, id: DocumentId) -> CoreResult<()> {
        let doc = self.document_mut(id)?;
        match doc.save() {
            Ok(()) => {
                tracing::debug!("Saved {}", doc.path().display());
                self.emit(EditorEvent::DocumentSaved(id));
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Saving {} failed: {}", doc.path().display(), e);
                self.emit(EditorEvent::SaveFailed {
                    id,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Writes the selected document.
    pub fn save_active(&mut self) -> CoreResult<DocumentId> {
        let id = self.documents.active_id().ok_or(CoreError::NoActiveDocument)?;
        self.save(id)?;
        Ok(id)
    }

    /// Writes debounced documents whose last edit is old enough.
    ///
    /// Returns the documents that failed to save.
    pub fn flush_due(&mut self, now: Instant) -> Vec<(DocumentId, CoreError)> {
        let SavePolicy::Debounced { delay } = self.save_policy else {
            return Vec::new();
        };

        let due: Vec<DocumentId> = self
            .documents
            .iter()
            .filter(|d| d.save_due(delay, now))
            .map(|d| d.id())
            .collect();
        self.save_each(due)
    }

    /// Writes every document with pending edits, unless saving is manual.
    pub fn flush_all(&mut self) -> Vec<(DocumentId, CoreError)> {
        if self.save_policy == SavePolicy::Manual {
            return Vec::new();
        }
        let dirty: Vec<DocumentId> = self
            .documents
            .iter()
            .filter(|d| d.is_dirty())
            .map(|d| d.id())
            .collect();
        self.save_each(dirty)
    }

    fn save_each(&mut self, ids: Vec<DocumentId>) -> Vec<(DocumentId, CoreError)> {
        ids.into_iter()
            .filter_map(|id| self.save(id).err().map(|e| (id, e)))
            .collect()
    }

    // ==================== Run ====================

    /// Path of the selected document if it can be run.
    pub fn run_target(&self) -> CoreResult<PathBuf> {
        let doc = self.active_document()?;
        if !doc.language().is_python() {
            return Err(CoreError::NotRunnable(doc.language()));
        }
        Ok(doc.path().to_path_buf())
    }

    /// `run_target`, after making sure the file on disk matches the buffer.
    pub fn prepare_run(&mut self) -> CoreResult<PathBuf> {
        self.ensure_open("run")?;
        let path = self.run_target()?;
        let doc = self.active_document()?;
        if doc.is_dirty() && self.save_policy != SavePolicy::Manual {
            let id = doc.id();
            self.save(id)?;
        }
        Ok(path)
    }

    // ==================== Navigator ====================

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Re-roots the navigator ("open folder").
    pub fn open_folder(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        self.ensure_open("open a folder")?;
        let path = normalize_path(path.as_ref())?;
        self.navigator.set_root(&path)?;
        self.emit(EditorEvent::WorkspaceOpened(path));
        Ok(())
    }

    /// Activates a navigator row; files are opened or focused.
    pub fn activate(&mut self, path: &Path) -> CoreResult<Option<DocumentId>> {
        self.ensure_open("open a file")?;
        match self.navigator.activate(path)? {
            NavigatorAction::Open(file) => self.open_file(file).map(Some),
            NavigatorAction::Toggled { .. } => Ok(None),
        }
    }

    /// Re-reads the navigator tree from disk.
    pub fn refresh_navigator(&mut self) {
        self.navigator.refresh();
    }

    // ==================== Session ====================

    /// Snapshot of the open tabs.
    pub fn capture_session(&self) -> Session {
        let open_files = self
            .documents
            .iter()
            .map(|d| SessionEntry {
                path: d.path().to_path_buf(),
                cursor: d.cursor(),
                scroll_line: d.scroll_line(),
            })
            .collect();

        Session {
            version: SESSION_VERSION,
            open_files,
            active: self.documents.active_index(),
        }
    }

    /// Reopens the files of the stored session.
    ///
    /// Returns `(opened, skipped)`.
    pub fn restore_session(&mut self) -> (usize, usize) {
        let Some(store) = &self.sessions else {
            return (0, 0);
        };
        let session = store.load();
        self.restore_from(&session)
    }

    /// Reopens the files of `session`.
    ///
    /// Paths that no longer exist are skipped quietly, unreadable files are
    /// skipped with a warning. The stored record is never rewritten here.
    pub fn restore_from(&mut self, session: &Session) -> (usize, usize) {
        let mut opened = Vec::with_capacity(session.open_files.len());
        let mut skipped = 0;

        for entry in &session.open_files {
            if !entry.path.exists() {
                tracing::debug!("Skipping missing session file {}", entry.path.display());
                opened.push(None);
                skipped += 1;
                continue;
            }

            match self.open_file(&entry.path) {
                Ok(id) => {
                    if let Some(doc) = self.documents.get_mut(id) {
                        doc.set_cursor(entry.cursor);
                        doc.set_scroll_line(entry.scroll_line);
                    }
                    opened.push(Some(id));
                }
                Err(e) => {
                    tracing::warn!("Could not restore {}: {}", entry.path.display(), e);
                    opened.push(None);
                    skipped += 1;
                }
            }
        }

        let selected = session.active.and_then(|i| opened.get(i).copied().flatten());
        if let Some(id) = selected {
            self.documents.set_active(id);
            self.emit(EditorEvent::DocumentFocused(id));
        }

        let count = opened.iter().flatten().count();
        tracing::info!("Session restored: {} opened, {} skipped", count, skipped);
        self.emit(EditorEvent::SessionRestored {
            opened: count,
            skipped,
        });
        (count, skipped)
    }

    // ==================== Accessors ====================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn save_policy(&self) -> SavePolicy {
        self.save_policy
    }

    pub fn document(&self, id: DocumentId) -> CoreResult<&Document> {
        self.documents.get(id).ok_or(CoreError::DocumentNotFound(id))
    }

    fn document_mut(&mut self, id: DocumentId) -> CoreResult<&mut Document> {
        self.documents
            .get_mut(id)
            .ok_or(CoreError::DocumentNotFound(id))
    }

    pub fn active_document(&self) -> CoreResult<&Document> {
        self.documents.active().ok_or(CoreError::NoActiveDocument)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.documents.active_index()
    }

    /// Open documents in tab order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn tab_count(&self) -> usize {
        self.documents.len()
    }

    // ==================== Events ====================

    /// Subscribes to editor events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EditorEvent> {
        self.event_bus.subscribe()
    }

    fn emit(&self, event: EditorEvent) {
        self.event_bus.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SavePolicyKind;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};

    fn editor_in(dir: &TempDir) -> Editor {
        Editor::with_root(Config::default(), dir.path())
    }

    fn editor_with_policy(dir: &TempDir, kind: SavePolicyKind) -> Editor {
        let mut config = Config::default();
        config.files.save_policy = kind;
        config.files.auto_save_delay = 200;
        Editor::with_root(config, dir.path())
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_open_same_path_twice_is_one_tab() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "a.py", "original");
        let mut editor = editor_in(&dir);

        let first = editor.open_file(&path).unwrap();
        std::fs::write(&path, "changed on disk").unwrap();
        let second = editor.open_file(dir.path().join(".").join("a.py")).unwrap();

        assert_eq!(first, second);
        assert_eq!(editor.tab_count(), 1);
        assert_eq!(editor.document(first).unwrap().text(), "original");
    }

    #[test]
    fn test_open_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let mut editor = editor_in(&dir);
        assert!(editor.open_file(dir.path().join("none.py")).is_err());
        assert_eq!(editor.tab_count(), 0);
    }

    #[test]
    fn test_eager_write_on_change() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "a.txt", "hello");
        let mut editor = editor_in(&dir);
        let id = editor.open_file(&path).unwrap();

        assert!(editor.update_text(id, "hello world").unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello world");
        assert!(!editor.document(id).unwrap().is_dirty());

        // Cursor-only change events carry the same text
        assert!(!editor.update_text(id, "hello world").unwrap());
    }

    #[test]
    fn test_reopen_round_trip() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "a.txt", "");
        let mut editor = editor_in(&dir);

        let id = editor.open_file(&path).unwrap();
        editor.update_text(id, "content C").unwrap();
        editor.close_tab(0).unwrap();
        assert_eq!(editor.tab_count(), 0);

        let id = editor.open_file(&path).unwrap();
        assert_eq!(editor.document(id).unwrap().text(), "content C");
    }

    #[test]
    fn test_debounced_writes_after_delay() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "a.txt", "a");
        let mut editor = editor_with_policy(&dir, SavePolicyKind::Debounced);
        let id = editor.open_file(&path).unwrap();

        let start = Instant::now();
        editor.update_text_at(id, "ab", start).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a");

        assert!(editor.flush_due(start + Duration::from_millis(50)).is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a");

        assert!(editor.flush_due(start + Duration::from_millis(250)).is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ab");
        assert!(!editor.document(id).unwrap().is_dirty());
    }

    #[test]
    fn test_debounced_flushes_on_close_tab() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "a.txt", "a");
        let mut editor = editor_with_policy(&dir, SavePolicyKind::Debounced);
        let id = editor.open_file(&path).unwrap();

        editor.update_text(id, "pending").unwrap();
        editor.close_tab(0).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "pending");
    }

    #[test]
    fn test_manual_only_writes_on_save() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "a.txt", "a");
        let mut editor = editor_with_policy(&dir, SavePolicyKind::Manual);
        let id = editor.open_file(&path).unwrap();

        editor.update_text(id, "edited").unwrap();
        assert!(editor.flush_all().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a");

        editor.save_active().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "edited");

        // Closing drops unsaved manual edits
        editor.update_text(id, "dropped").unwrap();
        editor.close_tab(0).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "edited");
    }

    #[test]
    fn test_failed_write_keeps_document_dirty() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        let path = sub.join("a.txt");
        std::fs::write(&path, "a").unwrap();

        let mut editor = editor_in(&dir);
        let mut events = editor.subscribe();
        let id = editor.open_file(&path).unwrap();
        std::fs::remove_dir_all(&sub).unwrap();

        assert!(editor.update_text(id, "lost?").is_err());
        let doc = editor.document(id).unwrap();
        assert!(doc.is_dirty());
        assert_eq!(doc.text(), "lost?");

        let mut saw_failure = false;
        while let Ok(event) = events.try_recv() {
            saw_failure |= matches!(event, EditorEvent::SaveFailed { id: failed, .. } if failed == id);
        }
        assert!(saw_failure);
    }

    #[test]
    fn test_run_gating() {
        let dir = tempdir().unwrap();
        let txt = write(&dir, "notes.txt", "");
        let py = write(&dir, "main.py", "print('hi')");
        let mut editor = editor_in(&dir);

        assert!(matches!(editor.run_target(), Err(CoreError::NoActiveDocument)));

        editor.open_file(&txt).unwrap();
        assert!(matches!(editor.run_target(), Err(CoreError::NotRunnable(_))));

        editor.open_file(&py).unwrap();
        assert_eq!(editor.run_target().unwrap(), normalize_path(&py).unwrap());
    }

    #[test]
    fn test_prepare_run_flushes_pending_edit() {
        let dir = tempdir().unwrap();
        let py = write(&dir, "main.py", "");
        let mut editor = editor_with_policy(&dir, SavePolicyKind::Debounced);
        let id = editor.open_file(&py).unwrap();

        editor.update_text(id, "print(1)").unwrap();
        editor.prepare_run().unwrap();
        assert_eq!(std::fs::read_to_string(&py).unwrap(), "print(1)");
    }

    #[test]
    fn test_close_tab_selection_and_range() {
        let dir = tempdir().unwrap();
        let a = write(&dir, "a.txt", "");
        let b = write(&dir, "b.txt", "");
        let mut editor = editor_in(&dir);
        editor.open_file(&a).unwrap();
        let b_id = editor.open_file(&b).unwrap();

        editor.select_tab(0).unwrap();
        editor.close_tab(0).unwrap();
        assert_eq!(editor.active_document().unwrap().id(), b_id);
        assert!(matches!(editor.close_tab(5), Err(CoreError::TabOutOfRange(5))));
    }

    #[test]
    fn test_cycle_tab_wraps() {
        let dir = tempdir().unwrap();
        let a = write(&dir, "a.txt", "");
        let b = write(&dir, "b.txt", "");
        let mut editor = editor_in(&dir);
        assert_eq!(editor.cycle_tab(true), None);

        let a_id = editor.open_file(&a).unwrap();
        let b_id = editor.open_file(&b).unwrap();

        assert_eq!(editor.cycle_tab(true), Some(a_id));
        assert_eq!(editor.cycle_tab(false), Some(b_id));
    }

    #[test]
    fn test_activate_opens_files() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "a.py", "x = 1");
        let mut editor = editor_in(&dir);

        let id = editor.activate(&path).unwrap();
        assert!(id.is_some());
        assert_eq!(editor.tab_count(), 1);
    }

    #[test]
    fn test_empty_session_round_trip() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        let mut editor = editor_in(&dir).with_session_store(store.clone());
        editor.mark_ready();
        editor.close().unwrap();

        let mut restored = editor_in(&dir).with_session_store(store);
        assert_eq!(restored.restore_session(), (0, 0));
        assert_eq!(restored.tab_count(), 0);
    }

    #[test]
    fn test_session_restores_cursor_and_active() {
        let dir = tempdir().unwrap();
        let a = write(&dir, "a.py", "one\ntwo\nthree\n");
        let b = write(&dir, "b.py", "");
        let store = SessionStore::new(dir.path().join("session.json"));

        let mut editor = editor_in(&dir).with_session_store(store.clone());
        let a_id = editor.open_file(&a).unwrap();
        editor.open_file(&b).unwrap();
        editor.set_cursor(a_id, Position::new(2, 3)).unwrap();
        editor.select_tab(0).unwrap();
        editor.close().unwrap();

        let mut restored = editor_in(&dir).with_session_store(store);
        assert_eq!(restored.restore_session(), (2, 0));
        let active = restored.active_document().unwrap();
        assert_eq!(active.name(), "a.py");
        assert_eq!(active.cursor(), Position::new(2, 3));
    }

    #[test]
    fn test_restore_skips_missing_paths() {
        let dir = tempdir().unwrap();
        let present = write(&dir, "present.py", "");
        let session = Session {
            version: SESSION_VERSION,
            open_files: vec![
                SessionEntry::new(&present),
                SessionEntry::new(dir.path().join("gone.py")),
            ],
            active: Some(1),
        };

        let mut editor = editor_in(&dir);
        assert_eq!(editor.restore_from(&session), (1, 1));
        assert_eq!(editor.tab_count(), 1);
        assert_eq!(editor.active_document().unwrap().name(), "present.py");
    }

    #[test]
    fn test_restore_leaves_record_untouched() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let session = Session {
            version: SESSION_VERSION,
            open_files: vec![SessionEntry::new(dir.path().join("gone.py"))],
            active: None,
        };
        store.save(&session).unwrap();

        let mut editor = editor_in(&dir).with_session_store(store.clone());
        editor.restore_session();
        assert_eq!(store.load(), session);
    }

    #[test]
    fn test_lifecycle() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "a.txt", "");
        let mut editor = editor_in(&dir);
        assert_eq!(editor.lifecycle(), Lifecycle::Starting);

        editor.mark_ready();
        assert!(editor.is_ready());

        editor.close().unwrap();
        assert_eq!(editor.lifecycle(), Lifecycle::Closing);

        // No way back
        editor.mark_ready();
        assert_eq!(editor.lifecycle(), Lifecycle::Closing);
        assert!(matches!(
            editor.open_file(&path),
            Err(CoreError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_close_flushes_debounced_edits() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "a.txt", "a");
        let mut editor = editor_with_policy(&dir, SavePolicyKind::Debounced);
        let id = editor.open_file(&path).unwrap();
        editor.update_text(id, "flushed").unwrap();

        editor.close().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "flushed");
    }

    #[test]
    fn test_open_folder() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("proj")).unwrap();
        let mut editor = editor_in(&dir);

        editor.open_folder(dir.path().join("proj")).unwrap();
        assert!(editor.navigator().root().ends_with("proj"));
        assert!(editor.open_folder(dir.path().join("missing")).is_err());
    }
}
