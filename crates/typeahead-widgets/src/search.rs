#![forbid(unsafe_code)]

//! Search functions and their responses.
//!
//! A search function maps query text to a [`SearchResponse`]: either results
//! that are ready now, a failure, or a [`PendingSearch`] that resolves later
//! through a channel. The controller treats all three the same way: every
//! response is tagged with a token and applied through one completion path.
//!
//! The default search, [`substring_search`], is a case-insensitive substring
//! match over a list of fields. It keeps source order and stops scanning once
//! the result limit is reached.

use std::fmt;
use std::sync::mpsc;
use std::thread;

use crate::record::{Record, field_text};

// ---------------------------------------------------------------------------
// SearchError
// ---------------------------------------------------------------------------

/// Failure reported by a search function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The search function reported a failure.
    Failed(String),
    /// The completer was dropped without resolving the search.
    Abandoned,
}

impl SearchError {
    /// Convenience constructor for [`SearchError::Failed`].
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(msg) => write!(f, "search failed: {msg}"),
            Self::Abandoned => write!(f, "search abandoned before producing results"),
        }
    }
}

impl std::error::Error for SearchError {}

/// Outcome of a single search.
pub type SearchOutcome<R> = Result<Vec<R>, SearchError>;

// ---------------------------------------------------------------------------
// SearchResponse
// ---------------------------------------------------------------------------

/// What a search function returns.
#[derive(Debug)]
pub enum SearchResponse<R> {
    /// Results available immediately.
    Ready(Vec<R>),
    /// The search failed synchronously.
    Failed(SearchError),
    /// Results will arrive later through a [`SearchCompleter`].
    Pending(PendingSearch<R>),
    /// The host tracks the search itself and resolves it by token with
    /// [`Autocomplete::complete_search`](crate::Autocomplete::complete_search).
    /// Polling never resolves it.
    External,
}

impl<R> SearchResponse<R> {
    /// A response resolved later through the returned [`SearchCompleter`].
    ///
    /// This is the promise-style contract: hand the completer to whatever
    /// produces the results and return the response to the controller.
    /// Dropping the completer unresolved fails the search with
    /// [`SearchError::Abandoned`].
    #[must_use]
    pub fn deferred() -> (Self, SearchCompleter<R>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self::Pending(PendingSearch { receiver }),
            SearchCompleter { sender },
        )
    }

    /// Run `search` on a background thread and resolve with its outcome.
    #[must_use]
    pub fn spawn<F>(search: F) -> Self
    where
        F: FnOnce() -> SearchOutcome<R> + Send + 'static,
        R: Send + 'static,
    {
        let (response, completer) = Self::deferred();
        thread::spawn(move || completer.resolve(search()));
        response
    }

    /// Whether results are not available yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_) | Self::External)
    }
}

impl<R> From<Vec<R>> for SearchResponse<R> {
    fn from(results: Vec<R>) -> Self {
        Self::Ready(results)
    }
}

impl<R> From<SearchOutcome<R>> for SearchResponse<R> {
    fn from(outcome: SearchOutcome<R>) -> Self {
        match outcome {
            Ok(results) => Self::Ready(results),
            Err(err) => Self::Failed(err),
        }
    }
}

// ---------------------------------------------------------------------------
// PendingSearch / SearchCompleter
// ---------------------------------------------------------------------------

/// Receiving half of a deferred search.
#[derive(Debug)]
pub struct PendingSearch<R> {
    receiver: mpsc::Receiver<SearchOutcome<R>>,
}

impl<R> PendingSearch<R> {
    /// Take the outcome if it has arrived.
    ///
    /// Returns `None` while the search is still running. A dropped completer
    /// yields `Some(Err(SearchError::Abandoned))`.
    pub fn try_take(&self) -> Option<SearchOutcome<R>> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(SearchError::Abandoned)),
        }
    }
}

/// Sending half of a deferred search.
///
/// Consumed on resolution, so a search resolves at most once.
#[derive(Debug)]
pub struct SearchCompleter<R> {
    sender: mpsc::Sender<SearchOutcome<R>>,
}

impl<R> SearchCompleter<R> {
    /// Resolve with results.
    pub fn complete(self, results: Vec<R>) {
        self.resolve(Ok(results));
    }

    /// Resolve with a failure.
    pub fn fail(self, error: SearchError) {
        self.resolve(Err(error));
    }

    /// Resolve with an outcome.
    ///
    /// If the widget was torn down the outcome is dropped silently.
    pub fn resolve(self, outcome: SearchOutcome<R>) {
        let _ = self.sender.send(outcome);
    }
}

// ---------------------------------------------------------------------------
// SearchFunction
// ---------------------------------------------------------------------------

/// A pluggable search function.
///
/// Implementations must not depend on controller state. Any closure
/// `Fn(&str) -> SearchResponse<R>` is a search function.
pub trait SearchFunction<R> {
    /// Search for `query` (already trimmed and non-empty).
    fn search(&self, query: &str) -> SearchResponse<R>;
}

impl<R, F> SearchFunction<R> for F
where
    F: Fn(&str) -> SearchResponse<R>,
{
    fn search(&self, query: &str) -> SearchResponse<R> {
        self(query)
    }
}

// ---------------------------------------------------------------------------
// Default substring search
// ---------------------------------------------------------------------------

/// Case-insensitive substring search over `properties` of each record.
///
/// A record matches when any listed field contains `query`. Source order is
/// kept. `limit` of `None` or `Some(0)` means unlimited; otherwise the scan
/// stops as soon as `limit` matches are collected.
pub fn substring_search<R, S>(data: &[R], query: &str, properties: &[S], limit: Option<usize>) -> Vec<R>
where
    R: Record + Clone,
    S: AsRef<str>,
{
    let needle = query.to_lowercase();
    let limit = limit.filter(|&n| n > 0);

    let matches = data.iter().filter(|record| {
        properties.iter().any(|property| {
            field_text(*record, property.as_ref())
                .to_lowercase()
                .contains(&needle)
        })
    });

    match limit {
        Some(n) => matches.take(n).cloned().collect(),
        None => matches.cloned().collect(),
    }
}

/// A self-contained default search over an owned data set.
///
/// The controller runs [`substring_search`] against its own data when no
/// search function is configured; `DataSearch` packages the same behavior for
/// hosts that want to wrap or reuse it.
#[derive(Debug, Clone)]
pub struct DataSearch<R> {
    data: Vec<R>,
    properties: Vec<String>,
    limit: Option<usize>,
}

impl<R: Record + Clone> DataSearch<R> {
    /// Search `data` on the `name` field with no limit.
    #[must_use]
    pub fn new(data: Vec<R>) -> Self {
        Self {
            data,
            properties: vec![crate::autocomplete::DEFAULT_PROPERTY.to_string()],
            limit: None,
        }
    }

    /// Set the fields to scan (builder).
    #[must_use]
    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = properties.into_iter().map(Into::into).collect();
        self
    }

    /// Set the result limit (builder).
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The records being searched.
    #[must_use]
    pub fn data(&self) -> &[R] {
        &self.data
    }
}

impl<R: Record + Clone> SearchFunction<R> for DataSearch<R> {
    fn search(&self, query: &str) -> SearchResponse<R> {
        SearchResponse::Ready(substring_search(
            &self.data,
            query,
            self.properties.as_slice(),
            self.limit,
        ))
    }
}
