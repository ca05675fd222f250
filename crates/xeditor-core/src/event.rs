//! Event system for editor notifications.
//!
//! ## Learning: Observer Pattern in Rust
//!
//! A `tokio::sync::broadcast` channel carries events as values. Subscribers
//! get their own copy and the editor never holds references to them, so
//! there are no lifetimes to manage between the core and its listeners.

use std::path::PathBuf;
use tokio::sync::broadcast;

use crate::document::DocumentId;
use crate::editor::Lifecycle;

/// Events that can occur in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    // Document events
    /// A file was opened in a new tab
    DocumentOpened(DocumentId),
    /// A tab was selected
    DocumentFocused(DocumentId),
    /// A tab was closed
    DocumentClosed(DocumentId),
    /// A document's text changed
    DocumentChanged(DocumentId),
    /// A document was written to disk
    DocumentSaved(DocumentId),
    /// Writing a document failed; it stays dirty
    SaveFailed { id: DocumentId, reason: String },

    // Editor events
    /// The navigator was re-rooted
    WorkspaceOpened(PathBuf),
    /// Files from the previous session were reopened
    SessionRestored { opened: usize, skipped: usize },
    /// The editor moved to another lifecycle state
    LifecycleChanged(Lifecycle),
}

/// Event bus for broadcasting editor events.
///
/// Lagged receivers lose old events; senders never block.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        // Capacity of 256 events in the buffer
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: EditorEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribes to events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(EditorEvent::LifecycleChanged(Lifecycle::Ready));

        let event = rx.recv().await.unwrap();
        assert_eq!(event, EditorEvent::LifecycleChanged(Lifecycle::Ready));
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let id = DocumentId::new();
        bus.emit(EditorEvent::DocumentSaved(id));

        assert_eq!(rx1.recv().await.unwrap(), EditorEvent::DocumentSaved(id));
        assert_eq!(rx2.recv().await.unwrap(), EditorEvent::DocumentSaved(id));
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new();
        bus.emit(EditorEvent::WorkspaceOpened(PathBuf::from("/tmp")));
    }
}
