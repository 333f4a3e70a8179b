#![forbid(unsafe_code)]

//! Bridge between a text-entry surface and the autocomplete controller.
//!
//! The surface pushes raw [`InputChange`]s through an [`InputSender`]. The
//! controller pulls them off the bridge one at a time and normalizes each
//! against its *current* search text, so a burst of identical edits issues a
//! single search. The bridge holds nothing but the subscription itself:
//! [`InputBridge::detach`] (or dropping the bridge) ends it, after which
//! senders report the widget as gone. The reverse direction, controller to
//! surface, is the [`TextEntrySurface`] trait.
//!
//! Normalization rules:
//!
//! | change                                   | notification           |
//! |------------------------------------------|------------------------|
//! | only `selected_result_index`             | `PointerSelect(index)` |
//! | text empty or whitespace                 | `Cleared`              |
//! | text differs from current search text    | `Query(trimmed)`       |
//! | text equal to current search text        | nothing                |

use std::sync::{Arc, Mutex, PoisonError, mpsc};

/// A raw change event from the text-entry surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputChange {
    /// The surface's text after the change, if the change carried text.
    pub input_value: Option<String>,
    /// Result index picked by pointer, if the change came from a click on
    /// the result list.
    pub selected_result_index: Option<usize>,
}

impl InputChange {
    /// A text edit.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            input_value: Some(value.into()),
            selected_result_index: None,
        }
    }

    /// A pointer pick of the result at `index`.
    #[must_use]
    pub fn pointer_select(index: usize) -> Self {
        Self {
            input_value: None,
            selected_result_index: Some(index),
        }
    }
}

/// A normalized notification for the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeNotification {
    /// The text became empty or whitespace-only.
    Cleared,
    /// New non-empty query text, already trimmed.
    Query(String),
    /// A result was picked by pointer.
    PointerSelect(usize),
}

/// Whether `text` is empty or whitespace-only.
#[must_use]
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Sending half handed to the text-entry surface.
#[derive(Debug, Clone)]
pub struct InputSender {
    sender: mpsc::Sender<InputChange>,
}

impl InputSender {
    /// Publish a change. Returns `false` once the widget has detached.
    pub fn send(&self, change: InputChange) -> bool {
        self.sender.send(change).is_ok()
    }

    /// Publish a text edit.
    pub fn text(&self, value: impl Into<String>) -> bool {
        self.send(InputChange::text(value))
    }

    /// Publish a pointer pick.
    pub fn pointer_select(&self, index: usize) -> bool {
        self.send(InputChange::pointer_select(index))
    }
}

/// The widget side of the text-change subscription.
#[derive(Debug)]
pub struct InputBridge {
    sender: mpsc::Sender<InputChange>,
    receiver: Option<mpsc::Receiver<InputChange>>,
}

impl Default for InputBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBridge {
    /// Create an attached bridge.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver: Some(receiver),
        }
    }

    /// A sender for the text-entry surface. All senders feed the same
    /// subscription.
    #[must_use]
    pub fn sender(&self) -> InputSender {
        InputSender {
            sender: self.sender.clone(),
        }
    }

    /// Whether the subscription is live.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.receiver.is_some()
    }

    /// End the subscription. Queued changes are discarded.
    pub fn detach(&mut self) {
        self.receiver = None;
    }

    /// Next queued raw change, if any.
    pub fn try_next(&mut self) -> Option<InputChange> {
        self.receiver.as_ref()?.try_recv().ok()
    }

    /// Normalize a raw change against the controller's current search text.
    #[must_use]
    pub fn normalize(change: &InputChange, current_search_text: &str) -> Option<BridgeNotification> {
        let Some(value) = change.input_value.as_deref() else {
            return change
                .selected_result_index
                .map(BridgeNotification::PointerSelect);
        };

        if is_blank(value) {
            return Some(BridgeNotification::Cleared);
        }

        (value != current_search_text).then(|| BridgeNotification::Query(value.trim().to_string()))
    }
}

// ---------------------------------------------------------------------------
// Display text
// ---------------------------------------------------------------------------

/// The writable side of the text-entry surface.
///
/// The controller writes the reconciled text here after a commit or a
/// dismissal.
pub trait TextEntrySurface {
    /// Replace the text shown in the entry field.
    fn set_display_text(&mut self, text: &str);
}

/// A shareable display-text cell. Clones observe the same text.
#[derive(Debug, Clone, Default)]
pub struct DisplayText {
    text: Arc<Mutex<String>>,
}

impl DisplayText {
    /// An empty display text.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text.
    #[must_use]
    pub fn get(&self) -> String {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TextEntrySurface for DisplayText {
    fn set_display_text(&mut self, text: &str) {
        let mut current = self.text.lock().unwrap_or_else(PoisonError::into_inner);
        current.clear();
        current.push_str(text);
    }
}
