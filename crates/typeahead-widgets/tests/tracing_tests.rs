#![forbid(unsafe_code)]

//! Tracing integration tests.
//!
//! Spans and events enabled:
//!   cargo test -p typeahead-widgets --features tracing --test tracing_tests
//!
//! Zero-overhead verification (no feature):
//!   cargo test -p typeahead-widgets --test tracing_tests -- zero_overhead

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

#[cfg(feature = "tracing")]
use typeahead_core::event::{KeyCode, KeyEvent};
use typeahead_widgets::Autocomplete;
#[cfg(feature = "tracing")]
use typeahead_widgets::SearchResponse;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

type Fruit = BTreeMap<String, String>;

fn fruit(name: &str) -> Fruit {
    BTreeMap::from([("name".to_string(), name.to_string())])
}

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A captured span with its fields.
#[derive(Debug, Clone)]
#[allow(dead_code)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

/// A captured event with its message and the span it was emitted in.
#[derive(Debug, Clone)]
#[allow(dead_code)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: HashMap<String, String>,
    span: Option<String>,
}

/// A tracing Layer that records spans and events.
struct Capture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

/// Handle to read what was captured.
struct CaptureHandle {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }
}

/// Visitor that extracts fields.
struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0
            .push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let mut fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.remove("message").unwrap_or_default();
        let span = ctx
            .event_span(event)
            .map(|span_ref| span_ref.name().to_string());
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields,
            span,
        });
    }
}

fn with_capture<F: FnOnce()>(f: F) -> CaptureHandle {
    let spans = Arc::new(Mutex::new(Vec::new()));
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = Capture {
        spans: spans.clone(),
        events: events.clone(),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    CaptureHandle { spans, events }
}

// ============================================================================
// Tests
// ============================================================================

/// Queries, commits, and dismissals each open their own span.
#[test]
#[cfg(feature = "tracing")]
fn command_spans_are_created() {
    let handle = with_capture(|| {
        let mut widget = Autocomplete::new().with_data(vec![fruit("Apple"), fruit("Banana")]);
        widget.on_query("an");
        widget.commit_active();
        widget.on_query("zz");
        widget.handle_key(&KeyEvent::new(KeyCode::Escape));
    });

    let names: Vec<_> = handle.spans().into_iter().map(|s| s.name).collect();
    for expected in ["autocomplete.query", "autocomplete.commit", "autocomplete.cancel"] {
        assert!(
            names.iter().any(|n| n == expected),
            "missing {expected} span, got {names:?}"
        );
    }

    let query = handle
        .spans()
        .into_iter()
        .find(|s| s.name == "autocomplete.query")
        .expect("query span");
    assert_eq!(query.fields.get("token").map(String::as_str), Some("1"));
}

/// A stale completion is logged at debug level with both tokens.
#[test]
#[cfg(feature = "tracing")]
fn stale_discard_is_logged() {
    let handle = with_capture(|| {
        let mut widget: Autocomplete<Fruit> =
            Autocomplete::new().with_search(|_q: &str| SearchResponse::External);
        let first = widget.on_query("a");
        widget.pump();
        let _second = widget.on_query("ab");
        widget.pump();
        let _ = widget.complete_search(first, Ok(vec![fruit("Apple")]));
    });

    assert!(
        handle.events().iter().all(|e| e.level != tracing::Level::WARN),
        "pumping must not fail host-tracked searches"
    );

    let stale = handle
        .events()
        .into_iter()
        .find(|e| e.message == "stale search result discarded")
        .expect("stale discard event");
    assert_eq!(stale.level, tracing::Level::DEBUG);
    assert_eq!(stale.fields.get("token").map(String::as_str), Some("1"));
    assert_eq!(stale.fields.get("current").map(String::as_str), Some("2"));
}

/// Search failures are warnings emitted inside the query span.
#[test]
#[cfg(feature = "tracing")]
fn search_failure_is_warned() {
    let handle = with_capture(|| {
        let mut widget: Autocomplete<Fruit> = Autocomplete::new().with_search(|_q: &str| {
            SearchResponse::Failed(typeahead_widgets::SearchError::failed("offline"))
        });
        widget.on_query("a");
    });

    let failure = handle
        .events()
        .into_iter()
        .find(|e| e.level == tracing::Level::WARN)
        .expect("warning event");
    assert!(failure.message.contains("search failed"));
    assert_eq!(failure.span.as_deref(), Some("autocomplete.query"));
}

/// Without the feature no autocomplete spans are emitted.
#[test]
#[cfg(not(feature = "tracing"))]
fn zero_overhead_when_disabled() {
    let handle = with_capture(|| {
        let mut widget = Autocomplete::new().with_data(vec![fruit("Apple")]);
        widget.on_query("app");
        widget.cancel_and_reconcile();
    });

    assert!(
        handle
            .spans()
            .iter()
            .all(|s| !s.name.starts_with("autocomplete")),
        "no autocomplete spans expected without the tracing feature"
    );
}
