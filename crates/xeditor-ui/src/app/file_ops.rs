use iced::widget::text_editor;
use std::path::Path;

use xeditor_buffer::Position;
use xeditor_core::{CoreError, DocumentId};

use super::{App, Modal, TabView, char_column};

impl App {
    /// Makes `views` match the open documents: new tabs get a surface,
    /// closed tabs lose theirs.
    pub fn sync_views(&mut self) {
        let ids: Vec<DocumentId> = self.editor.documents().map(|d| d.id()).collect();
        self.views.retain(|id, _| ids.contains(id));

        for doc in self.editor.documents() {
            self.views
                .entry(doc.id())
                .or_insert_with(|| TabView::new(doc));
        }

        if let Some(popup) = &self.completion {
            if !self.views.contains_key(&popup.doc) {
                self.completion = None;
            }
        }
    }

    /// Opens or focuses `path` and reports the outcome in the status bar.
    pub fn open_path(&mut self, path: &Path) {
        match self.editor.open_file(path) {
            Ok(id) => {
                self.sync_views();
                if let Ok(doc) = self.editor.document(id) {
                    self.status_message = format!("Opened {}", doc.path().display());
                }
            }
            Err(e) => self.show_error("Open file", &e),
        }
    }

    /// Applies an editing surface action to the selected document.
    ///
    /// Text changes are pushed into the document, which may write the
    /// file depending on the save policy.
    pub fn apply_action(&mut self, action: text_editor::Action) {
        let Some(id) = self.editor.active_document().ok().map(|d| d.id()) else {
            return;
        };
        let Some(view) = self.views.get_mut(&id) else {
            return;
        };

        let is_edit = action.is_edit();
        let scroll = match &action {
            text_editor::Action::Scroll { lines } => Some(*lines),
            _ => None,
        };
        view.content.perform(action);

        // iced reports the column as a byte offset into the line
        let (line, byte) = view.content.cursor_position();
        let column = view
            .content
            .line(line)
            .map(|text| char_column(&text, byte))
            .unwrap_or(byte);
        let text = is_edit.then(|| view.content.text());

        if let Some(text) = text {
            self.completion = None;
            if let Err(e) = self.editor.update_text(id, &text) {
                self.status_message = format!("Save failed: {}", e);
            }
        }

        if let Err(e) = self.editor.set_cursor(id, Position::new(line, column)) {
            tracing::debug!("Cursor not recorded: {}", e);
        }

        if let Some(lines) = scroll {
            if let Ok(doc) = self.editor.document(id) {
                let current = doc.scroll_line() as i64;
                let next = (current + i64::from(lines)).max(0) as usize;
                if let Err(e) = self.editor.set_scroll_line(id, next) {
                    tracing::debug!("Scroll position not recorded: {}", e);
                }
            }
        }
    }

    /// Shows a warning dialog for a failed user action.
    pub fn show_error(&mut self, title: &str, error: &CoreError) {
        tracing::warn!("{}: {}", title, error);
        self.status_message = format!("{}: {}", title, error);
        self.modal = Some(Modal::Warning {
            title: title.to_string(),
            message: error.to_string(),
        });
    }
}
