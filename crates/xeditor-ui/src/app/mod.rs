use iced::widget::text_editor;
use iced::{Subscription, Task, keyboard, window};
use std::collections::HashMap;
use std::time::Duration;

use xeditor_assist::{JediCompleter, Runner};
use xeditor_core::{DocumentId, Editor, SavePolicy, SessionStore};
use xeditor_plugin::PluginManager;

pub mod file_ops;
pub mod messages;
pub mod types;
pub mod update;
pub mod view;

pub use messages::*;
pub use types::*;

/// How often pending debounced saves are checked.
const AUTO_SAVE_TICK: Duration = Duration::from_millis(100);

pub struct App {
    pub editor: Editor,
    pub plugins: PluginManager,
    pub runner: Runner,
    pub completer: JediCompleter,
    pub views: HashMap<DocumentId, TabView>,
    pub status_message: String,
    pub modal: Option<Modal>,
    pub completion: Option<CompletionPopup>,
    pub running: Option<iced::task::Handle>,
    pub row_clicks: RowClicks,
    pub sidebar_width: f32,
    pub theme: iced::Theme,
}

impl App {
    /// Builds the window state: restore the session, open the requested
    /// file, then mark the editor ready.
    pub fn new(flags: Flags, plugins: PluginManager) -> (Self, Task<Message>) {
        let config = flags.config;

        let editor = match &flags.workspace {
            Some(root) => Editor::with_root(config.clone(), root),
            None => Editor::new(config.clone()),
        };
        let editor = match SessionStore::default_location() {
            Ok(store) => editor.with_session_store(store),
            Err(e) => {
                tracing::warn!("Sessions disabled: {}", e);
                editor
            }
        };

        let mut app = Self {
            editor,
            plugins,
            runner: Runner::from_config(&config.runner),
            completer: JediCompleter::from_config(&config.completion),
            views: HashMap::new(),
            status_message: String::new(),
            modal: None,
            completion: None,
            running: None,
            row_clicks: RowClicks::default(),
            sidebar_width: 250.0,
            theme: crate::theme::for_name(&config.ui.theme),
        };

        if config.session.restore && !flags.no_restore {
            let (opened, skipped) = app.editor.restore_session();
            tracing::info!("Restored {} file(s), skipped {}", opened, skipped);
        }

        if let Some(file) = &flags.file {
            if let Err(e) = app.editor.open_file(file) {
                tracing::warn!("Could not open {}: {}", file.display(), e);
                app.modal = Some(Modal::Warning {
                    title: "Open file".to_string(),
                    message: format!("Could not open {}: {}", file.display(), e),
                });
            }
        }

        app.sync_views();
        app.editor.mark_ready();

        app.status_message = match app.plugins.failure_count() {
            0 => "Ready".to_string(),
            n => format!("Ready | {} plugin(s) failed to load", n),
        };

        (app, Task::none())
    }

    pub fn title(&self) -> String {
        match self.editor.active_document() {
            Ok(doc) => {
                let modified = if doc.is_dirty() { " *" } else { "" };
                format!("{}{} - XEditor", doc.name(), modified)
            }
            Err(_) => "XEditor".to_string(),
        }
    }

    pub fn theme(&self) -> iced::Theme {
        self.theme.clone()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let keyboard_sub =
            keyboard::on_key_press(|key, modifiers| Some(Message::KeyPressed(key, modifiers)));
        let close_sub = window::close_requests().map(Message::CloseRequested);

        let mut subs = vec![keyboard_sub, close_sub];
        if matches!(self.editor.save_policy(), SavePolicy::Debounced { .. }) {
            subs.push(iced::time::every(AUTO_SAVE_TICK).map(Message::AutoSaveTick));
        }
        Subscription::batch(subs)
    }

    /// Editing surface of the selected tab.
    pub fn active_view(&self) -> Option<&TabView> {
        self.editor
            .active_document()
            .ok()
            .and_then(|doc| self.views.get(&doc.id()))
    }

    pub fn active_content(&self) -> Option<&text_editor::Content> {
        self.active_view().map(|v| &v.content)
    }
}

/// Loads plugins, then runs the window until it is closed.
pub fn run(flags: Flags) -> iced::Result {
    let mut plugins = PluginManager::from_config(&flags.config.plugins);
    if flags.config.plugins.enabled && !flags.no_plugins {
        match plugins.load_all_blocking() {
            Ok(active) => tracing::info!("{} plugin(s) active", active),
            Err(e) => tracing::error!("Plugin loading failed: {}", e),
        }
    }

    let size = iced::Size::new(flags.config.ui.window_width, flags.config.ui.window_height);

    iced::application(App::title, App::update, App::view)
        .subscription(App::subscription)
        .theme(App::theme)
        .window_size(size)
        .exit_on_close_request(false)
        .antialiasing(true)
        .run_with(move || App::new(flags, plugins))
}
