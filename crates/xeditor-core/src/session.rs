//! Session persistence.
//!
//! The session is the list of files that were open at shutdown, with the
//! cursor and scroll position of each and the selected tab. It lives in
//! `<config_dir>/XEditor/session.json`.
//!
//! Learning: Versioned Files
//! - `version` is written first so a newer editor can change the layout
//!   and an older one recognises a file it must not interpret
//! - Reading never fails the caller: a bad file means an empty session

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use xeditor_buffer::Position;

/// Layout version written by this build.
pub const SESSION_VERSION: u32 = 1;

/// Files that were open when the editor last shut down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub version: u32,

    /// Open files in tab order
    #[serde(default)]
    pub open_files: Vec<SessionEntry>,

    /// Index into `open_files` of the selected tab
    #[serde(default)]
    pub active: Option<usize>,
}

impl Session {
    /// A session with no files.
    pub fn empty() -> Self {
        Self {
            version: SESSION_VERSION,
            open_files: Vec::new(),
            active: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.open_files.is_empty()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::empty()
    }
}

/// One open file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub path: PathBuf,

    #[serde(default)]
    pub cursor: Position,

    #[serde(default)]
    pub scroll_line: usize,
}

impl SessionEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cursor: Position::ZERO,
            scroll_line: 0,
        }
    }
}

/// Reads and writes the session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// A store backed by an explicit file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store in the platform config directory.
    pub fn default_location() -> Result<Self, SessionError> {
        let dir = dirs::config_dir().ok_or(SessionError::NoConfigDir)?;
        Ok(Self::new(dir.join("XEditor").join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored session.
    ///
    /// A missing file is an empty session. An unreadable, corrupt or newer
    /// file is logged and also treated as empty; the file itself is left
    /// alone until the next `save` replaces it.
    pub fn load(&self) -> Session {
        if !self.path.exists() {
            tracing::debug!("No session at {}", self.path.display());
            return Session::empty();
        }

        match self.try_load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Ignoring session {}: {}", self.path.display(), e);
                Session::empty()
            }
        }
    }

    /// Reads the stored session, reporting why it cannot be used.
    pub fn try_load(&self) -> Result<Session, SessionError> {
        let content = std::fs::read_to_string(&self.path)?;
        let session: Session = serde_json::from_str(&content)?;
        if session.version > SESSION_VERSION {
            return Err(SessionError::UnsupportedVersion(session.version));
        }
        Ok(session)
    }

    /// Replaces the stored session.
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(
            "Saved session with {} files to {}",
            session.open_files.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Session file errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed session file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Session version {0} is newer than this editor supports")]
    UnsupportedVersion(u32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert_eq!(store.load(), Session::empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));

        let session = Session {
            version: SESSION_VERSION,
            open_files: vec![
                SessionEntry {
                    path: PathBuf::from("/tmp/a.py"),
                    cursor: Position::new(3, 4),
                    scroll_line: 2,
                },
                SessionEntry::new("/tmp/b.txt"),
            ],
            active: Some(1),
        };
        store.save(&session).unwrap();
        assert_eq!(store.load(), session);
    }

    #[test]
    fn test_wire_format() {
        let json = r#"{"version":1,"open_files":[{"path":"/abs/a.py","cursor":{"line":0,"column":0},"scroll_line":0}],"active":0}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.open_files[0].path, PathBuf::from("/abs/a.py"));
        assert_eq!(session.active, Some(0));
    }

    #[test]
    fn test_corrupt_file_is_empty_and_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = SessionStore::new(&path);
        assert!(store.try_load().is_err());
        assert!(store.load().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"version":2,"open_files":[{"path":"/a"}]}"#).unwrap();

        let store = SessionStore::new(&path);
        assert!(matches!(
            store.try_load(),
            Err(SessionError::UnsupportedVersion(2))
        ));
        assert!(store.load().is_empty());
    }
}
