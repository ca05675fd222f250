use iced::keyboard::{self, key::Named};
use iced::widget::text_editor::{Action, Edit, Motion};
use iced::{Task, window};
use std::sync::Arc;
use std::time::Instant;

use xeditor_assist::{CompletionRequest, RunOutput};
use xeditor_core::{CoreError, Lifecycle};

use super::{App, CompletionPopup, Message, Modal, completion_edit};

/// Shown when Run is used without a Python file selected.
pub const RUN_PYTHON_ONLY: &str = "Run is only available for Python files.";

/// Maps a key press to the command it is bound to.
///
/// Shared by the window-level handler and the editor surface so shortcuts
/// work whether or not the editor has focus.
pub fn shortcut(key: &keyboard::Key, modifiers: keyboard::Modifiers) -> Option<Message> {
    match key {
        keyboard::Key::Named(Named::F5) => return Some(Message::Run),
        keyboard::Key::Named(Named::Escape) => return Some(Message::Escape),
        _ => {}
    }

    if !modifiers.control() {
        return None;
    }

    match key {
        keyboard::Key::Named(Named::Tab) => {
            if modifiers.shift() {
                Some(Message::PrevTab)
            } else {
                Some(Message::NextTab)
            }
        }
        keyboard::Key::Named(Named::Space) => Some(Message::Complete),
        keyboard::Key::Character(c) => match (c.to_lowercase().as_str(), modifiers.shift()) {
            (" ", _) => Some(Message::Complete),
            ("o", false) => Some(Message::OpenFile),
            ("o", true) => Some(Message::OpenFolder),
            ("s", false) => Some(Message::Save),
            ("w", false) => Some(Message::CloseCurrentTab),
            _ => None,
        },
        _ => None,
    }
}

impl App {
    pub fn update(&mut self, message: Message) -> Task<Message> {
        if self.editor.lifecycle() == Lifecycle::Closing {
            return Task::none();
        }

        match message {
            Message::OpenFile => {
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .add_filter("All Files", &["*"])
                            .add_filter("Python", &["py"])
                            .pick_file()
                            .await
                            .map(|file| file.path().to_path_buf())
                    },
                    Message::FilePicked,
                );
            }

            Message::FilePicked(Some(path)) => self.open_path(&path),
            Message::FilePicked(None) => {}

            Message::OpenFolder => {
                let start = self.editor.navigator().root().to_path_buf();
                return Task::perform(
                    async move {
                        rfd::AsyncFileDialog::new()
                            .set_directory(start)
                            .pick_folder()
                            .await
                            .map(|folder| folder.path().to_path_buf())
                    },
                    Message::FolderPicked,
                );
            }

            Message::FolderPicked(Some(path)) => match self.editor.open_folder(&path) {
                Ok(()) => {
                    self.row_clicks.clear();
                    self.status_message = format!("Opened folder {}", path.display());
                }
                Err(e) => self.show_error("Open folder", &e),
            },
            Message::FolderPicked(None) => {}

            Message::RefreshTree => {
                self.editor.refresh_navigator();
            }

            Message::TreeRowPressed { path, is_dir } => {
                // Folders toggle on one press; files open on a double press.
                let activate = is_dir || self.row_clicks.press(&path, Instant::now());
                if activate {
                    match self.editor.activate(&path) {
                        Ok(Some(id)) => {
                            self.sync_views();
                            self.completion = None;
                            if let Ok(doc) = self.editor.document(id) {
                                self.status_message = format!("Opened {}", doc.path().display());
                            }
                        }
                        Ok(None) => {}
                        Err(e) => self.show_error("Open file", &e),
                    }
                }
                if is_dir {
                    self.row_clicks.clear();
                }
            }

            Message::Run => return self.start_run(),

            Message::PluginCommand(id) => return self.start_plugin_command(&id),

            Message::RunFinished(output) => self.finish_run(output),

            Message::CancelRun => {
                if let Some(handle) = self.running.take() {
                    handle.abort();
                    self.status_message = "Run cancelled".to_string();
                    if let Some(Modal::Output { text, running, .. }) = &mut self.modal {
                        text.push_str("\n[cancelled]");
                        *running = false;
                    }
                }
            }

            Message::Save => match self.editor.save_active() {
                Ok(id) => {
                    if let Ok(doc) = self.editor.document(id) {
                        self.status_message = format!("Saved {}", doc.name());
                    }
                }
                Err(CoreError::NoActiveDocument) => {}
                Err(e) => {
                    tracing::warn!("Save failed: {}", e);
                    self.status_message = format!("Save failed: {}", e);
                }
            },

            Message::Complete => return self.start_completion(),

            Message::CompletionsReady(completions) => {
                let active = self.editor.active_document().ok().map(|d| d.id());
                let Ok(doc) = self.editor.document(completions.doc) else {
                    return Task::none();
                };
                if active != Some(doc.id()) || !completions.is_current(doc) {
                    tracing::debug!("Dropping stale completions for {}", doc.name());
                    return Task::none();
                }
                if completions.items.is_empty() {
                    self.status_message = "No completions".to_string();
                    self.completion = None;
                } else {
                    self.status_message = format!("{} completion(s)", completions.items.len());
                    self.completion = Some(CompletionPopup {
                        doc: completions.doc,
                        prefix: doc.word_before_cursor(),
                        items: completions.items,
                    });
                }
            }

            Message::CompletionChosen(name) => {
                if let Some(popup) = self.completion.take() {
                    let (back, insert) = completion_edit(&popup.prefix, &name);
                    for _ in 0..back {
                        self.apply_action(Action::Select(Motion::Left));
                    }
                    if !insert.is_empty() {
                        self.apply_action(Action::Edit(Edit::Paste(Arc::new(insert.to_string()))));
                    }
                }
            }

            Message::DismissCompletion => {
                self.completion = None;
            }

            Message::DismissDialog => {
                if !self.is_running() {
                    self.modal = None;
                }
            }

            Message::Escape => {
                if self.completion.is_some() {
                    self.completion = None;
                } else if self.is_running() {
                    return self.update(Message::CancelRun);
                } else {
                    self.modal = None;
                }
            }

            Message::TabSelected(index) => match self.editor.select_tab(index) {
                Ok(_) => self.completion = None,
                Err(e) => tracing::debug!("Ignoring tab selection: {}", e),
            },

            Message::CloseTab(index) => {
                let result = self.editor.close_tab(index);
                self.sync_views();
                match result {
                    Ok(_) => self.status_message = "Tab closed".to_string(),
                    Err(e) => self.show_error("Close tab", &e),
                }
            }

            Message::CloseCurrentTab => {
                if let Some(index) = self.editor.active_index() {
                    return self.update(Message::CloseTab(index));
                }
            }

            Message::NextTab => {
                if self.editor.cycle_tab(true).is_some() {
                    self.completion = None;
                }
            }

            Message::PrevTab => {
                if self.editor.cycle_tab(false).is_some() {
                    self.completion = None;
                }
            }

            Message::EditorAction(action) => self.apply_action(action),

            Message::AutoSaveTick(now) => {
                for (id, e) in self.editor.flush_due(now) {
                    let name = self
                        .editor
                        .document(id)
                        .map(|d| d.name().to_string())
                        .unwrap_or_default();
                    self.status_message = format!("Save failed for {}: {}", name, e);
                }
            }

            Message::KeyPressed(key, modifiers) => return self.handle_key_pressed(key, modifiers),

            Message::CloseRequested(id) => {
                if let Some(handle) = self.running.take() {
                    handle.abort();
                }
                if let Err(e) = self.editor.close() {
                    tracing::error!("Shutdown did not complete cleanly: {}", e);
                }
                return window::close(id);
            }
        }

        Task::none()
    }

    /// Window-level shortcuts. The editor surface forwards its own
    /// bindings, so this only sees keys pressed elsewhere.
    pub fn handle_key_pressed(
        &mut self,
        key: keyboard::Key,
        modifiers: keyboard::Modifiers,
    ) -> Task<Message> {
        match shortcut(&key, modifiers) {
            Some(message) => self.update(message),
            None => Task::none(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    fn start_run(&mut self) -> Task<Message> {
        if self.is_running() {
            self.status_message = "A run is already in progress".to_string();
            return Task::none();
        }

        let path = match self.editor.prepare_run() {
            Ok(path) => path,
            Err(CoreError::NotRunnable(_) | CoreError::NoActiveDocument) => {
                self.modal = Some(Modal::Warning {
                    title: "Run".to_string(),
                    message: RUN_PYTHON_ONLY.to_string(),
                });
                return Task::none();
            }
            Err(e) => {
                self.show_error("Run", &e);
                return Task::none();
            }
        };

        let title = path
            .file_name()
            .map(|n| format!("Run {}", n.to_string_lossy()))
            .unwrap_or_else(|| "Run".to_string());
        tracing::info!("Running {} with {}", path.display(), self.runner.interpreter());
        self.status_message = format!("Running {}...", path.display());

        let task = Task::perform(self.runner.clone().run(path), Message::RunFinished);
        self.track_run(title, task)
    }

    fn start_plugin_command(&mut self, id: &str) -> Task<Message> {
        if self.is_running() {
            self.status_message = "A run is already in progress".to_string();
            return Task::none();
        }

        let Ok(path) = self.editor.active_document().map(|d| d.path().to_path_buf()) else {
            self.status_message = "Open a file first".to_string();
            return Task::none();
        };

        let spec = match self.plugins.command_spec(id, &path) {
            Ok(spec) => spec,
            Err(e) => {
                tracing::warn!("Plugin command {} unavailable: {}", id, e);
                self.status_message = format!("Plugin command failed: {}", e);
                return Task::none();
            }
        };

        let title = self
            .plugins
            .commands()
            .into_iter()
            .find(|c| c.id == id)
            .map(|c| c.title.clone())
            .unwrap_or_else(|| id.to_string());
        tracing::info!("Plugin command {}: {}", id, spec);
        self.status_message = format!("{}...", title);

        let task = Task::perform(xeditor_assist::execute(spec), Message::RunFinished);
        self.track_run(title, task)
    }

    /// Opens the output dialog and keeps a handle so the run can be cancelled.
    fn track_run(&mut self, title: String, task: Task<Message>) -> Task<Message> {
        let (task, handle) = task.abortable();
        self.running = Some(handle);
        self.modal = Some(Modal::Output {
            title,
            text: String::new(),
            running: true,
        });
        task
    }

    fn finish_run(&mut self, output: RunOutput) {
        self.running = None;
        let summary = output.summary();
        tracing::info!("{}", summary);
        self.status_message = summary;

        match &mut self.modal {
            Some(Modal::Output { text, running, .. }) => {
                *text = output.text;
                *running = false;
            }
            _ => {
                self.modal = Some(Modal::Output {
                    title: "Output".to_string(),
                    text: output.text,
                    running: false,
                });
            }
        }
    }

    fn start_completion(&mut self) -> Task<Message> {
        if !self.editor.config().completion.enabled {
            self.status_message = "Completion is disabled".to_string();
            return Task::none();
        }
        let Ok(doc) = self.editor.active_document() else {
            return Task::none();
        };
        if !doc.language().is_python() {
            self.status_message = "Completion is only available for Python files".to_string();
            return Task::none();
        }

        let request = CompletionRequest::from_document(doc);
        self.status_message = "Completing...".to_string();
        Task::perform(
            xeditor_assist::complete_owned(self.completer.clone(), request),
            Message::CompletionsReady,
        )
    }
}
