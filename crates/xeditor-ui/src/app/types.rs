use iced::widget::text_editor::{self, Action, Motion};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use xeditor_core::{Config, Document, DocumentId};

/// Two presses on the same row within this window count as a double-click.
pub const DOUBLE_CLICK: Duration = Duration::from_millis(400);

/// Startup options from the command line.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    /// File to open after the session is restored
    pub file: Option<PathBuf>,
    /// Navigator root instead of the home directory
    pub workspace: Option<PathBuf>,
    pub config: Config,
    /// Skip plugin loading
    pub no_plugins: bool,
    /// Skip reopening the previous session
    pub no_restore: bool,
}

/// The editing surface for one open document.
pub struct TabView {
    pub id: DocumentId,
    pub content: text_editor::Content,
}

impl TabView {
    /// Builds a surface showing `doc` with its cursor and scroll position.
    pub fn new(doc: &Document) -> Self {
        let mut content = text_editor::Content::with_text(&doc.text());

        let cursor = doc.cursor();
        content.perform(Action::Move(Motion::DocumentStart));
        for _ in 0..cursor.line {
            content.perform(Action::Move(Motion::Down));
        }
        content.perform(Action::Move(Motion::Home));
        for _ in 0..cursor.column {
            content.perform(Action::Move(Motion::Right));
        }

        if doc.scroll_line() > 0 {
            content.perform(Action::Scroll {
                lines: i32::try_from(doc.scroll_line()).unwrap_or(i32::MAX),
            });
        }

        Self {
            id: doc.id(),
            content,
        }
    }
}

/// A modal dialog over the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// Non-fatal problem the user should see
    Warning { title: String, message: String },
    /// Output of a run or plugin command
    Output {
        title: String,
        text: String,
        running: bool,
    },
}

/// Candidates shown under the editor after Ctrl+Space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPopup {
    pub doc: DocumentId,
    /// Identifier characters already typed before the cursor
    pub prefix: String,
    pub items: Vec<String>,
}

/// What choosing `candidate` should type, given the typed `prefix`.
///
/// Returns the number of chars to select backwards and the replacement.
pub fn completion_edit<'a>(prefix: &str, candidate: &'a str) -> (usize, &'a str) {
    match candidate.strip_prefix(prefix) {
        Some(suffix) => (0, suffix),
        None => (prefix.chars().count(), candidate),
    }
}

/// Converts a byte offset within `line` to a char count.
///
/// An offset past the end counts the whole line.
pub fn char_column(line: &str, byte: usize) -> usize {
    line.char_indices().take_while(|(i, _)| *i < byte).count()
}

/// Tracks presses on navigator rows to detect double-clicks.
#[derive(Debug, Default)]
pub struct RowClicks {
    last: Option<(PathBuf, Instant)>,
}

impl RowClicks {
    /// Records a press; returns true when it completes a double-click.
    pub fn press(&mut self, path: &Path, now: Instant) -> bool {
        let double = matches!(
            &self.last,
            Some((prev, at)) if prev == path && now.saturating_duration_since(*at) <= DOUBLE_CLICK
        );
        self.last = if double {
            None
        } else {
            Some((path.to_path_buf(), now))
        };
        double
    }

    /// The row pressed last, for highlighting.
    pub fn selected(&self) -> Option<&Path> {
        self.last.as_ref().map(|(p, _)| p.as_path())
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_click_window() {
        let mut clicks = RowClicks::default();
        let a = Path::new("/tmp/a.py");
        let b = Path::new("/tmp/b.py");
        let t0 = Instant::now();

        assert!(!clicks.press(a, t0));
        assert!(clicks.press(a, t0 + Duration::from_millis(300)));

        // A third press starts over
        assert!(!clicks.press(a, t0 + Duration::from_millis(350)));

        assert!(!clicks.press(b, t0 + Duration::from_millis(900)));
        assert!(!clicks.press(a, t0 + Duration::from_millis(950)));
        assert!(!clicks.press(a, t0 + Duration::from_millis(1500)));
        assert_eq!(clicks.selected(), Some(a));
    }

    #[test]
    fn test_char_column() {
        assert_eq!(char_column("pa + 1", 2), 2);
        assert_eq!(char_column("é.pa + 1", 5), 4);
        assert_eq!(char_column("日本", 6), 2);
        assert_eq!(char_column("ab", 10), 2);
        assert_eq!(char_column("", 0), 0);
    }

    #[test]
    fn test_completion_edit() {
        assert_eq!(completion_edit("pa", "path"), (0, "th"));
        assert_eq!(completion_edit("", "path"), (0, "path"));
        assert_eq!(completion_edit("Pa", "path"), (2, "path"));
    }

    #[test]
    fn test_tab_view_restores_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.py");
        std::fs::write(&path, "one\ntwo\nthree\n").unwrap();

        let mut doc = Document::open(&path).unwrap();
        doc.set_cursor(xeditor_buffer::Position::new(2, 3));
        let view = TabView::new(&doc);
        assert_eq!(view.content.cursor_position(), (2, 3));
    }
}
