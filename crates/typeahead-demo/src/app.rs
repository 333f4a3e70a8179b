#![forbid(unsafe_code)]

//! Demo application state: a one-line entry field over the autocomplete
//! widget, with the result list drawn below it.
//!
//! Row 0 is the entry line, rows `1..=n` are results, and the row after the
//! list is a status line. The entry line and the list together form the
//! widget's hit area.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::Value;
use typeahead::{
    Autocomplete, AutocompleteConfig, AutocompleteEvent, DisplayText, DropdownMenu, Event,
    InputSender, KeyCode, MouseButton, MouseEventKind, PointerDown, PointerHub, Rect,
    SearchResponse, TextEntrySurface, parse_config, parse_records, substring_search,
};

use crate::cli::Opts;

/// Records used when no data file is given.
pub const BUILTIN_FRUITS: &str = r#"[
    {"name": "Apple", "color": "red"},
    {"name": "Apricot", "color": "orange"},
    {"name": "Avocado", "color": "green"},
    {"name": "Banana", "color": "yellow"},
    {"name": "Blueberry", "color": "blue"},
    {"name": "Cherry", "color": "red"},
    {"name": "Grape", "color": "purple"},
    {"name": "Kiwi", "color": "green"},
    {"name": "Mango", "color": "orange"},
    {"name": "Papaya", "color": "orange"}
]"#;

/// Load records from `path`, or the built-in list.
pub fn load_records(path: Option<&Path>) -> typeahead::Result<Vec<Value>> {
    match path {
        Some(path) => parse_records(&fs::read_to_string(path)?),
        None => parse_records(BUILTIN_FRUITS),
    }
}

/// Build the widget config from an optional file plus flag overrides.
pub fn build_config(opts: &Opts) -> typeahead::Result<AutocompleteConfig> {
    let mut config = match &opts.config {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => AutocompleteConfig::default(),
    };
    if !opts.properties.is_empty() {
        config.properties_to_search = opts.properties.clone();
    }
    if let Some(descriptor) = &opts.descriptor {
        config.descriptor_property = descriptor.clone();
    }
    if let Some(limit) = opts.limit {
        config.search_results_limit = Some(limit);
    }
    Ok(config)
}

/// Default search moved onto a thread that sleeps `latency` first.
fn delayed_search(
    records: Arc<Vec<Value>>,
    config: &AutocompleteConfig,
    latency: Duration,
) -> impl Fn(&str) -> SearchResponse<Value> + 'static {
    let properties = Arc::new(config.properties_to_search.clone());
    let limit = config.effective_limit();
    move |query: &str| {
        let records = Arc::clone(&records);
        let properties = Arc::clone(&properties);
        let query = query.to_string();
        SearchResponse::spawn(move || {
            thread::sleep(latency);
            Ok(substring_search(
                records.as_slice(),
                &query,
                properties.as_slice(),
                limit,
            ))
        })
    }
}

/// Whether the loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep running.
    Continue,
    /// Exit the loop.
    Quit,
}

/// The demo's state.
#[derive(Debug)]
pub struct DemoApp {
    widget: Autocomplete<Value>,
    input: InputSender,
    entry: DisplayText,
    hub: PointerHub,
    menu: DropdownMenu,
    selections: Vec<Value>,
    status: String,
    width: u16,
}

impl DemoApp {
    /// Build the app. A non-zero `latency` runs searches on a thread.
    #[must_use]
    pub fn new(records: Vec<Value>, config: AutocompleteConfig, latency: Duration) -> Self {
        let entry = DisplayText::new();
        let hub = PointerHub::new();

        let mut widget = Autocomplete::new()
            .with_surface(entry.clone())
            .with_pointer_hub(&hub);
        if latency.is_zero() {
            widget = widget.with_data(records);
        } else {
            widget = widget.with_search(delayed_search(Arc::new(records), &config, latency));
        }
        let widget = widget.with_config(config);
        let input = widget.input_sender();

        let mut app = Self {
            widget,
            input,
            entry,
            hub,
            menu: DropdownMenu::default(),
            selections: Vec::new(),
            status: "type to search".to_string(),
            width: 80,
        };
        app.sync_layout();
        app
    }

    /// Text in the entry field.
    #[must_use]
    pub fn entry_text(&self) -> String {
        self.entry.get()
    }

    /// Records committed so far.
    #[must_use]
    pub fn selections(&self) -> &[Value] {
        &self.selections
    }

    /// The widget.
    #[must_use]
    pub fn widget(&self) -> &Autocomplete<Value> {
        &self.widget
    }

    fn edit(&mut self, f: impl FnOnce(&mut String)) {
        let mut text = self.entry.get();
        f(&mut text);
        self.entry.set_display_text(&text);
        self.input.text(text);
    }

    /// Route one terminal event.
    pub fn handle_event(&mut self, event: &Event) -> Flow {
        match event {
            Event::Key(key) => {
                if key.ctrl() && key.is_char('c') {
                    return Flow::Quit;
                }
                if !key.is_press() || self.widget.handle_key(key).is_consumed() {
                    return Flow::Continue;
                }
                match key.code {
                    KeyCode::Char(c) if !key.ctrl() && !key.alt() => self.edit(|t| t.push(c)),
                    KeyCode::Backspace => self.edit(|t| {
                        t.pop();
                    }),
                    _ => {}
                }
            }
            Event::Paste(text) => self.edit(|t| t.push_str(text)),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    let row = usize::from(mouse.y);
                    if (1..=self.widget.results().len()).contains(&row) {
                        self.input.pointer_select(row - 1);
                    }
                    self.hub
                        .dispatch_pointer_down(PointerDown::new(mouse.x, mouse.y));
                }
                MouseEventKind::Down(_) => {
                    self.hub
                        .dispatch_pointer_down(PointerDown::new(mouse.x, mouse.y));
                }
                _ => {
                    self.widget.handle_event(event);
                }
            },
            Event::Resize { width, .. } => {
                self.width = *width;
                self.sync_layout();
            }
        }
        Flow::Continue
    }

    /// Drain queued input, pointer, and search work. Returns `true` if the
    /// screen needs a redraw.
    pub fn pump(&mut self) -> bool {
        let changed = self.widget.pump();

        let events: Vec<_> = self.widget.drain_events().collect();
        for event in events {
            if let AutocompleteEvent::ResultSelected(record) = event {
                self.status = format!("selected {}", self.widget.descriptor_of(&record));
                self.selections.push(record);
            }
        }
        if let Some(err) = self.widget.take_last_error() {
            self.status = format!("error: {err}");
        }

        self.sync_layout();
        changed
    }

    fn sync_layout(&mut self) {
        let len = self.widget.results().len();
        let active = self
            .widget
            .active_result()
            .map(|_| self.widget.highlighted_index());
        self.menu.sync_with(len, active);

        let height = u16::try_from(len + 1).unwrap_or(u16::MAX);
        self.widget
            .set_hit_area(Some(Rect::new(0, 0, self.width, height)));
    }

    /// Lines to draw, top to bottom.
    #[must_use]
    pub fn view(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.menu.len() + 2);
        lines.push(format!("> {}", self.entry.get()));
        for (record, item) in self.widget.results().iter().zip(self.menu.items()) {
            let marker = if item.is_active() { '>' } else { ' ' };
            lines.push(format!(" {marker} {}", self.widget.descriptor_of(record)));
        }
        let pending = if self.widget.has_pending_search() {
            " (searching)"
        } else {
            ""
        };
        lines.push(format!("-- {}{pending}", self.status));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use typeahead::{KeyEvent, MouseEvent};

    fn app() -> DemoApp {
        let records = load_records(None).expect("built-in records");
        DemoApp::new(records, AutocompleteConfig::default(), Duration::ZERO)
    }

    fn type_text(app: &mut DemoApp, text: &str) {
        for c in text.chars() {
            app.handle_event(&Event::Key(KeyEvent::new(KeyCode::Char(c))));
            app.pump();
        }
    }

    fn press(app: &mut DemoApp, code: KeyCode) {
        app.handle_event(&Event::Key(KeyEvent::new(code)));
        app.pump();
    }

    fn click(app: &mut DemoApp, x: u16, y: u16) {
        app.handle_event(&Event::Mouse(MouseEvent::new(
            MouseEventKind::Down(MouseButton::Left),
            x,
            y,
        )));
        app.pump();
    }

    #[test]
    fn typing_and_enter_commits() {
        let mut app = app();
        type_text(&mut app, "ap");
        let view = app.view();
        assert_eq!(
            view[1..view.len() - 1],
            [" > Apple", "   Apricot", "   Grape", "   Papaya"]
        );

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.entry_text(), "Apple");
        assert_eq!(app.selections().len(), 1);
        assert_eq!(app.view().last().map(String::as_str), Some("-- selected Apple"));
    }

    #[test]
    fn backspace_requeries() {
        let mut app = app();
        type_text(&mut app, "kiw");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.entry_text(), "ki");
        assert_eq!(app.widget().search_text(), "ki");
    }

    #[test]
    fn clicking_a_row_commits_it() {
        let mut app = app();
        type_text(&mut app, "ap");
        click(&mut app, 4, 2);
        assert_eq!(app.entry_text(), "Apricot");
        assert_eq!(app.selections().len(), 1);
    }

    #[test]
    fn clicking_outside_blanks_partial_text() {
        let mut app = app();
        type_text(&mut app, "ap");
        click(&mut app, 4, 20);
        assert_eq!(app.entry_text(), "");
        assert!(app.selections().is_empty());
    }

    #[test]
    fn paste_searches() {
        let mut app = app();
        app.handle_event(&Event::Paste("berry".to_string()));
        app.pump();
        assert_eq!(app.widget().results().len(), 1);
    }

    #[test]
    fn ctrl_c_quits() {
        let mut app = app();
        let key = KeyEvent::new(KeyCode::Char('c')).with_modifiers(typeahead::Modifiers::CTRL);
        assert_eq!(app.handle_event(&Event::Key(key)), Flow::Quit);
    }

    #[test]
    fn latency_mode_resolves_in_background() {
        let records = load_records(None).expect("built-in records");
        let mut app = DemoApp::new(records, AutocompleteConfig::default(), Duration::from_millis(5));
        type_text(&mut app, "kiwi");

        let deadline = Instant::now() + Duration::from_secs(5);
        while app.widget().has_pending_search() {
            assert!(Instant::now() < deadline, "search never resolved");
            thread::sleep(Duration::from_millis(1));
            app.pump();
        }
        assert_eq!(app.widget().results().len(), 1);
    }

    #[test]
    fn config_overrides_apply() {
        let opts = Opts {
            properties: vec!["color".to_string()],
            limit: Some(2),
            ..Opts::default()
        };
        let config = build_config(&opts).expect("config");
        assert_eq!(config.properties_to_search, ["color"]);
        assert_eq!(config.search_results_limit, Some(2));
        assert_eq!(config.descriptor_property, "name");
    }

    #[test]
    fn missing_data_file_is_io_error() {
        let err = load_records(Some(Path::new("/definitely/not/here.json")))
            .expect_err("missing file");
        assert!(matches!(err, typeahead::Error::Io(_)));
    }
}
