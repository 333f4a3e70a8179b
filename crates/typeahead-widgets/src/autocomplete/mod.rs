#![forbid(unsafe_code)]

//! Autocomplete controller.
//!
//! [`Autocomplete`] owns the search text, the visible results with their
//! highlight, the committed selection, and hover state. It reacts to three
//! kinds of input:
//!
//! - text changes from the input bridge (`Cleared`, `Query`, `PointerSelect`),
//! - keyboard and pointer commands,
//! - search completions.
//!
//! Every search is tagged with a [`SearchToken`]. Only the completion of the
//! latest search is applied; anything older is dropped and recorded as stale
//! in the bounded [`SearchTrace`]. Clearing, committing, and dismissing also make any
//! outstanding search stale, so a late result cannot reopen a list the user
//! already closed.
//!
//! The controller never renders. Mutations queue an
//! [`AutocompleteEvent::StateChanged`] and the host redraws when it drains
//! them.
//!
//! # Usage
//!
//! ```ignore
//! let mut widget = Autocomplete::new()
//!     .with_data(fruits)
//!     .with_config(AutocompleteConfig::new().with_search_results_limit(5));
//! let input = widget.input_sender();
//!
//! // The text field publishes every edit.
//! input.text("ap");
//!
//! // Once per loop iteration:
//! widget.pump();
//! for event in widget.drain_events() {
//!     match event {
//!         AutocompleteEvent::ResultSelected(record) => { /* use it */ }
//!         AutocompleteEvent::StateChanged => { /* redraw */ }
//!     }
//! }
//! ```

mod config;
mod results;

pub use config::{AutocompleteConfig, DEFAULT_PROPERTY};
pub use results::ResultSet;

use std::collections::VecDeque;
use std::fmt;

use typeahead_core::event::{Event, KeyCode, KeyEvent, MouseEventKind};
use typeahead_core::geometry::Rect;
use typeahead_core::{debug, debug_span, warn};

use crate::error::AutocompleteError;
use crate::input_bridge::{BridgeNotification, InputBridge, InputChange, InputSender, TextEntrySurface};
use crate::pointer::{PointerDown, PointerHub, PointerRegistration};
use crate::record::{Record, field_text};
use crate::search::{PendingSearch, SearchFunction, SearchOutcome, SearchResponse, substring_search};
use crate::token::{Completion, SearchCoordinator, SearchToken, SearchTrace};

// ---------------------------------------------------------------------------
// Commands and notifications
// ---------------------------------------------------------------------------

/// Highlight movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the end of the list.
    Next,
    /// Toward the start of the list.
    Previous,
}

/// Whether a key was handled by the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The widget acted on the key; the host must not apply its default.
    Consumed,
    /// The key belongs to the text-entry surface.
    PassThrough,
}

impl KeyOutcome {
    /// Whether the key was consumed.
    #[must_use]
    pub fn is_consumed(self) -> bool {
        self == Self::Consumed
    }
}

/// Notification for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutocompleteEvent<R> {
    /// Visible state changed; redraw when convenient.
    StateChanged,
    /// A result was committed. Fired exactly once per commit.
    ResultSelected(R),
}

// ---------------------------------------------------------------------------
// Autocomplete
// ---------------------------------------------------------------------------

/// The unresolved current search.
enum Outstanding<R> {
    /// Resolves through a completer channel; `poll_searches` watches it.
    Channel(PendingSearch<R>),
    /// Resolved by the host through `complete_search`.
    Host,
}

/// The autocomplete state machine.
pub struct Autocomplete<R> {
    config: AutocompleteConfig,
    data: Vec<R>,
    search: Option<Box<dyn SearchFunction<R>>>,
    search_text: String,
    results: ResultSet<R>,
    selected: Option<R>,
    hovering: bool,
    hit_area: Option<Rect>,
    coordinator: SearchCoordinator,
    pending: Option<(SearchToken, Outstanding<R>)>,
    bridge: InputBridge,
    pointer: Option<PointerRegistration>,
    surface: Option<Box<dyn TextEntrySurface>>,
    events: VecDeque<AutocompleteEvent<R>>,
    revision: u64,
    last_error: Option<AutocompleteError>,
}

impl<R: fmt::Debug> fmt::Debug for Autocomplete<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Autocomplete")
            .field("config", &self.config)
            .field("search_text", &self.search_text)
            .field("results", &self.results)
            .field("selected", &self.selected)
            .field("hovering", &self.hovering)
            .field("hit_area", &self.hit_area)
            .field("current_token", &self.coordinator.current_token())
            .field("has_custom_search", &self.search.is_some())
            .finish_non_exhaustive()
    }
}

impl<R: Record + Clone> Default for Autocomplete<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record + Clone> Autocomplete<R> {
    /// A widget with no data, the default search, and default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: AutocompleteConfig::default(),
            data: Vec::new(),
            search: None,
            search_text: String::new(),
            results: ResultSet::new(),
            selected: None,
            hovering: false,
            hit_area: None,
            coordinator: SearchCoordinator::new(),
            pending: None,
            bridge: InputBridge::new(),
            pointer: None,
            surface: None,
            events: VecDeque::new(),
            revision: 0,
            last_error: None,
        }
    }

    // --- Builders ---

    /// Set the configuration (builder).
    #[must_use]
    pub fn with_config(mut self, config: AutocompleteConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the records the default search scans (builder).
    #[must_use]
    pub fn with_data(mut self, data: Vec<R>) -> Self {
        self.data = data;
        self
    }

    /// Replace the default search (builder).
    #[must_use]
    pub fn with_search(mut self, search: impl SearchFunction<R> + 'static) -> Self {
        self.search = Some(Box::new(search));
        self
    }

    /// Attach the text-entry surface that receives reconciled text (builder).
    #[must_use]
    pub fn with_surface(mut self, surface: impl TextEntrySurface + 'static) -> Self {
        self.surface = Some(Box::new(surface));
        self
    }

    /// Keep at most `capacity` search trace steps (builder). 0 disables the
    /// trace.
    #[must_use]
    pub fn with_trace_capacity(mut self, capacity: usize) -> Self {
        self.coordinator = SearchCoordinator::new().with_trace_capacity(capacity);
        self
    }

    /// Listen for document-level pointer-downs on `hub` (builder).
    #[must_use]
    pub fn with_pointer_hub(mut self, hub: &PointerHub) -> Self {
        self.pointer = Some(hub.register());
        self
    }

    /// Set the hover surface used for mouse events (builder).
    #[must_use]
    pub fn with_hit_area(mut self, area: Rect) -> Self {
        self.hit_area = Some(area);
        self
    }

    // --- Settings ---

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &AutocompleteConfig {
        &self.config
    }

    /// Replace the records the default search scans.
    pub fn set_data(&mut self, data: Vec<R>) {
        self.data = data;
    }

    /// Replace the search function. `None` restores the default search.
    pub fn set_search(&mut self, search: Option<Box<dyn SearchFunction<R>>>) {
        self.search = search;
    }

    /// Set or clear the hover surface. Typically updated after each layout.
    pub fn set_hit_area(&mut self, area: Option<Rect>) {
        self.hit_area = area;
    }

    /// The hover surface, if set.
    #[must_use]
    pub fn hit_area(&self) -> Option<Rect> {
        self.hit_area
    }

    /// A sender for the text-entry surface's change stream.
    #[must_use]
    pub fn input_sender(&self) -> InputSender {
        self.bridge.sender()
    }

    /// End the text-change subscription and the pointer registration.
    ///
    /// Queued but unprocessed changes are discarded. Dropping the widget has
    /// the same effect.
    pub fn detach(&mut self) {
        self.bridge.detach();
        self.pointer = None;
        debug!("autocomplete detached");
    }

    // --- State ---

    /// Text driving the current search (trimmed).
    #[must_use]
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Visible results in search order.
    #[must_use]
    pub fn results(&self) -> &[R] {
        self.results.items()
    }

    /// The result set with its highlight.
    #[must_use]
    pub fn result_set(&self) -> &ResultSet<R> {
        &self.results
    }

    /// Highlighted index. 0 when there are no results.
    #[must_use]
    pub fn highlighted_index(&self) -> usize {
        self.results.highlighted_index()
    }

    /// Highlighted result, if any.
    #[must_use]
    pub fn active_result(&self) -> Option<&R> {
        self.results.active()
    }

    /// Committed selection, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&R> {
        self.selected.as_ref()
    }

    /// Whether the pointer is over the widget.
    #[must_use]
    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Whether a deferred or host-tracked search is still outstanding.
    #[must_use]
    pub fn has_pending_search(&self) -> bool {
        self.pending.is_some()
    }

    /// Token of the most recent search (or invalidation).
    #[must_use]
    pub fn current_token(&self) -> SearchToken {
        self.coordinator.current_token()
    }

    /// Recent search lifecycle steps.
    #[must_use]
    pub fn search_trace(&self) -> &SearchTrace {
        self.coordinator.trace()
    }

    /// The most recent recoverable failure.
    #[must_use]
    pub fn last_error(&self) -> Option<&AutocompleteError> {
        self.last_error.as_ref()
    }

    /// Take the most recent recoverable failure.
    pub fn take_last_error(&mut self) -> Option<AutocompleteError> {
        self.last_error.take()
    }

    /// Descriptor text of `record`, or "" when the field is missing.
    #[must_use]
    pub fn descriptor_of(&self, record: &R) -> String {
        field_text(record, &self.config.descriptor_property).into_owned()
    }

    /// Take all queued notifications.
    pub fn drain_events(&mut self) -> impl Iterator<Item = AutocompleteEvent<R>> + '_ {
        self.events.drain(..)
    }

    /// Incremented on every state change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn mark_changed(&mut self) {
        self.revision += 1;
        if !matches!(self.events.back(), Some(AutocompleteEvent::StateChanged)) {
            self.events.push_back(AutocompleteEvent::StateChanged);
        }
    }

    // --- Input bridge notifications ---

    /// Text became empty: drop results and any outstanding search. The
    /// selection is untouched.
    pub fn on_cleared(&mut self) {
        let _span = debug_span!("autocomplete.cleared").entered();
        self.search_text.clear();
        self.results.clear();
        self.invalidate_search();
        self.mark_changed();
    }

    /// Search for `text` and return the search's token.
    ///
    /// Blank text is treated as [`on_cleared`](Self::on_cleared) and returns
    /// the null token. Ready results are applied before this returns;
    /// deferred ones when [`poll_searches`](Self::poll_searches) sees them.
    pub fn on_query(&mut self, text: &str) -> SearchToken {
        let query = text.trim();
        if query.is_empty() {
            self.on_cleared();
            return SearchToken::NONE;
        }

        self.search_text = query.to_string();
        if self
            .selected
            .as_ref()
            .is_some_and(|item| field_text(item, &self.config.descriptor_property) != query)
        {
            self.selected = None;
        }

        let token = self.coordinator.start_search();
        self.pending = None;
        let _span = debug_span!("autocomplete.query", token = token.raw()).entered();
        debug!(query, "search issued");

        let response = match &self.search {
            Some(search) => search.search(query),
            None => SearchResponse::Ready(substring_search(
                &self.data,
                query,
                self.config.properties_to_search.as_slice(),
                self.config.effective_limit(),
            )),
        };

        match response {
            SearchResponse::Ready(items) => {
                let _ = self.resolve(token, Ok(items));
            }
            SearchResponse::Failed(err) => {
                let _ = self.resolve(token, Err(err));
            }
            SearchResponse::Pending(pending) => {
                self.pending = Some((token, Outstanding::Channel(pending)));
            }
            SearchResponse::External => {
                self.pending = Some((token, Outstanding::Host));
            }
        }

        self.mark_changed();
        token
    }

    /// Apply a normalized bridge notification.
    pub fn handle_notification(&mut self, notification: BridgeNotification) {
        match notification {
            BridgeNotification::Cleared => self.on_cleared(),
            BridgeNotification::Query(text) => {
                self.on_query(&text);
            }
            BridgeNotification::PointerSelect(index) => {
                if let Err(err) = self.pointer_select(index) {
                    self.last_error = Some(err);
                }
            }
        }
    }

    /// Normalize a raw change against the current search text and apply it.
    pub fn handle_input_change(&mut self, change: &InputChange) {
        if let Some(notification) = InputBridge::normalize(change, &self.search_text) {
            self.handle_notification(notification);
        }
    }

    // --- Search completion ---

    /// Resolve search `token` with `outcome`.
    ///
    /// This is how the host resolves searches answered with
    /// [`SearchResponse::External`]; [`pump`](Self::pump) leaves those alone.
    ///
    /// Returns the coordinator's verdict: `Current` completions were applied,
    /// `Stale` ones dropped. A current failure leaves results untouched and is
    /// returned as [`AutocompleteError::Search`]; it is also kept as the last
    /// error.
    pub fn complete_search(
        &mut self,
        token: SearchToken,
        outcome: SearchOutcome<R>,
    ) -> Result<Completion, AutocompleteError> {
        if self.pending.as_ref().is_some_and(|(t, _)| *t == token) {
            self.pending = None;
        }
        self.resolve(token, outcome)
    }

    /// Check the outstanding deferred search. Returns `true` if it resolved.
    ///
    /// Host-tracked searches are never resolved here.
    pub fn poll_searches(&mut self) -> bool {
        let polled = match &self.pending {
            Some((token, Outstanding::Channel(pending))) => {
                pending.try_take().map(|outcome| (*token, outcome))
            }
            Some((_, Outstanding::Host)) | None => None,
        };
        let Some((token, outcome)) = polled else {
            return false;
        };
        self.pending = None;
        let _ = self.resolve(token, outcome);
        true
    }

    fn resolve(
        &mut self,
        token: SearchToken,
        outcome: SearchOutcome<R>,
    ) -> Result<Completion, AutocompleteError> {
        let verdict = match &outcome {
            Ok(items) => self.coordinator.complete(token, items.len()),
            Err(_) => self.coordinator.fail(token),
        };

        match (verdict, outcome) {
            (Completion::Unknown, _) => {
                warn!(token = token.raw(), "completion for unknown search token");
                Err(AutocompleteError::UnknownToken { token })
            }
            (Completion::Stale { current: _current }, _) => {
                debug!(
                    token = token.raw(),
                    current = _current.raw(),
                    "stale search result discarded"
                );
                Ok(verdict)
            }
            (Completion::Current, Ok(items)) => {
                debug!(token = token.raw(), count = items.len(), "results applied");
                self.results.replace(items);
                self.mark_changed();
                Ok(verdict)
            }
            (Completion::Current, Err(source)) => {
                warn!(token = token.raw(), error = %source, "search failed; keeping prior results");
                let err = AutocompleteError::Search { token, source };
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn invalidate_search(&mut self) {
        self.coordinator.invalidate();
        self.pending = None;
    }

    // --- Commands ---

    /// Move the highlight, wrapping at both ends.
    pub fn navigate(&mut self, direction: Direction) {
        match direction {
            Direction::Next => self.results.next(),
            Direction::Previous => self.results.previous(),
        }
        self.mark_changed();
    }

    /// Commit the highlighted result.
    ///
    /// Returns `false`, with no state change and no notification, when there
    /// are no results.
    pub fn commit_active(&mut self) -> bool {
        let Some(item) = self.results.active().cloned() else {
            return false;
        };
        let _span = debug_span!("autocomplete.commit", index = self.results.highlighted_index())
            .entered();

        self.search_text = self.descriptor_of(&item);
        self.selected = Some(item.clone());
        self.results.clear();
        self.invalidate_search();
        self.sync_display_text();

        debug!(descriptor = %self.search_text, "result selected");
        self.events.push_back(AutocompleteEvent::ResultSelected(item));
        self.mark_changed();
        true
    }

    /// Highlight `index` and commit it.
    ///
    /// An index outside the current results is rejected and leaves every
    /// piece of state unchanged.
    pub fn pointer_select(&mut self, index: usize) -> Result<(), AutocompleteError> {
        let len = self.results.len();
        if !self.results.highlight(index) {
            warn!(index, len, "pointer selected an out-of-range result");
            return Err(AutocompleteError::InvalidIndex { index, len });
        }
        self.commit_active();
        Ok(())
    }

    /// Close the list when interaction leaves the widget.
    ///
    /// If the highlighted result's descriptor equals the search text
    /// (ignoring case) it is committed first. Then the search text is blanked
    /// unless it still equals the selection's descriptor, and results are
    /// dropped.
    pub fn cancel_and_reconcile(&mut self) {
        let _span = debug_span!("autocomplete.cancel").entered();

        let exact_match = self.results.active().is_some_and(|active| {
            field_text(active, &self.config.descriptor_property).to_lowercase()
                == self.search_text.to_lowercase()
        });
        if exact_match {
            debug!("auto-committing exact match");
            self.commit_active();
        }

        let keep_text = self
            .selected
            .as_ref()
            .is_some_and(|item| field_text(item, &self.config.descriptor_property) == self.search_text);
        if !keep_text {
            self.search_text.clear();
        }

        self.results.clear();
        self.invalidate_search();
        self.sync_display_text();
        self.mark_changed();
    }

    fn sync_display_text(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.set_display_text(&self.search_text);
        }
    }

    // --- Keyboard ---

    /// Dispatch a key while the entry field has focus.
    ///
    /// | key              | action                          |
    /// |------------------|---------------------------------|
    /// | Down             | next result                     |
    /// | Up               | previous result                 |
    /// | Tab, BackTab, Enter | commit, only if results exist |
    /// | Escape           | dismiss                         |
    ///
    /// Releases and every other key pass through.
    pub fn handle_key(&mut self, key: &KeyEvent) -> KeyOutcome {
        if !key.is_press() {
            return KeyOutcome::PassThrough;
        }
        match key.code {
            KeyCode::Down => {
                self.navigate(Direction::Next);
                KeyOutcome::Consumed
            }
            KeyCode::Up => {
                self.navigate(Direction::Previous);
                KeyOutcome::Consumed
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Enter => {
                if self.commit_active() {
                    KeyOutcome::Consumed
                } else {
                    KeyOutcome::PassThrough
                }
            }
            KeyCode::Escape => {
                self.cancel_and_reconcile();
                KeyOutcome::Consumed
            }
            _ => KeyOutcome::PassThrough,
        }
    }

    // --- Pointer ---

    /// The pointer entered the widget.
    pub fn pointer_enter(&mut self) {
        self.hovering = true;
    }

    /// The pointer left the widget.
    pub fn pointer_leave(&mut self) {
        self.hovering = false;
    }

    /// A pointer-down happened somewhere on screen. Dismisses the list unless
    /// the pointer is over the widget.
    pub fn handle_document_pointer_down(&mut self) {
        if !self.hovering {
            self.cancel_and_reconcile();
        }
    }

    fn track_hover(&mut self, x: u16, y: u16) {
        let Some(area) = self.hit_area else {
            return;
        };
        match (self.hovering, area.contains(x, y)) {
            (false, true) => self.pointer_enter(),
            (true, false) => self.pointer_leave(),
            _ => {}
        }
    }

    /// Handle a canonical input event. Returns `true` if the event was
    /// consumed.
    ///
    /// Mouse positions update hover state when a hit area is set, and any
    /// mouse-down counts as a document-level pointer-down.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Key(key) => self.handle_key(key).is_consumed(),
            Event::Mouse(mouse) => {
                match mouse.kind {
                    MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                        self.track_hover(mouse.x, mouse.y);
                    }
                    MouseEventKind::Down(_) => {
                        self.track_hover(mouse.x, mouse.y);
                        self.handle_document_pointer_down();
                    }
                    _ => {}
                }
                false
            }
            _ => false,
        }
    }

    fn handle_pointer_down(&mut self, down: PointerDown) {
        self.track_hover(down.x, down.y);
        self.handle_document_pointer_down();
    }

    // --- Event loop ---

    /// Process queued text changes, document pointer-downs, and the
    /// outstanding search, in that order. Returns `true` if state changed.
    pub fn pump(&mut self) -> bool {
        let before = self.revision;

        while let Some(change) = self.bridge.try_next() {
            self.handle_input_change(&change);
        }
        while let Some(down) = self.pointer.as_ref().and_then(PointerRegistration::try_next) {
            self.handle_pointer_down(down);
        }
        self.poll_searches();

        self.revision != before
    }
}
