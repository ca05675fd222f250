use iced::widget::text_editor;
use iced::{keyboard, window};
use std::path::PathBuf;
use std::time::Instant;

use xeditor_assist::{Completions, RunOutput};

#[derive(Debug, Clone)]
pub enum Message {
    // Toolbar
    OpenFile,
    OpenFolder,
    Run,
    PluginCommand(String),

    // Shortcut-only actions
    Save,
    Complete,
    Escape,

    // Tabs
    TabSelected(usize),
    CloseTab(usize),
    CloseCurrentTab,
    NextTab,
    PrevTab,

    // Editor
    EditorAction(text_editor::Action),

    // Navigator
    TreeRowPressed { path: PathBuf, is_dir: bool },
    RefreshTree,

    // Completion popup
    CompletionChosen(String),
    DismissCompletion,

    // Dialogs
    DismissDialog,
    CancelRun,

    // Subscriptions
    KeyPressed(keyboard::Key, keyboard::Modifiers),
    AutoSaveTick(Instant),
    CloseRequested(window::Id),

    // Async results
    FilePicked(Option<PathBuf>),
    FolderPicked(Option<PathBuf>),
    RunFinished(RunOutput),
    CompletionsReady(Completions),
}
