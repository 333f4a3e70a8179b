#![forbid(unsafe_code)]

//! Search tokens and most-recent-wins bookkeeping.
//!
//! Every issued search gets a [`SearchToken`]. Tokens are strictly
//! increasing, so "is this completion still wanted?" is a single comparison
//! against the current token. The [`SearchCoordinator`] issues tokens and
//! tracks the search still in flight.
//!
//! The coordinator also keeps a [`SearchTrace`]: a bounded window of the most
//! recent lifecycle steps, for inspecting races in tests and bug reports.
//! Older steps are evicted, and a capacity of 0 turns recording off.
//!
//! # Invariants
//!
//! 1. Start tokens are strictly monotonic.
//! 2. A completion is applied only when its token is the current token.
//! 3. Invalidating (clearing, committing, dismissing) makes every in-flight
//!    token stale without issuing a new search.

use std::collections::VecDeque;
use std::fmt;

/// Trace steps kept by default.
pub const DEFAULT_TRACE_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// SearchToken
// ---------------------------------------------------------------------------

/// Monotonic identifier of an issued search.
///
/// Token 0 is reserved for "no search".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SearchToken(u64);

impl SearchToken {
    /// The null token.
    pub const NONE: Self = Self(0);

    /// Create a token from a raw value (for tests and external bookkeeping).
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Raw token value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Whether this is the null token.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SearchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// SearchEvent / SearchTrace
// ---------------------------------------------------------------------------

/// One step in a search's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEvent {
    /// A search was issued.
    Started(SearchToken),
    /// A search was superseded by a newer search or by a dismissal.
    Superseded {
        /// The superseded search.
        token: SearchToken,
        /// Token that replaced it.
        by: SearchToken,
    },
    /// Results of the current search replaced the visible list.
    Applied {
        /// The applied search.
        token: SearchToken,
        /// Number of results.
        count: usize,
    },
    /// The current search failed; the visible list was kept.
    Failed(SearchToken),
    /// A superseded search resolved and was dropped.
    StaleDiscarded {
        /// The late search.
        token: SearchToken,
        /// Token that was current when it arrived.
        current: SearchToken,
    },
}

impl SearchEvent {
    /// Token this step refers to.
    #[must_use]
    pub fn token(&self) -> SearchToken {
        match *self {
            Self::Started(token)
            | Self::Failed(token)
            | Self::Superseded { token, .. }
            | Self::Applied { token, .. }
            | Self::StaleDiscarded { token, .. } => token,
        }
    }
}

/// Bounded window of recent search lifecycle steps.
#[derive(Debug, Clone)]
pub struct SearchTrace {
    window: VecDeque<SearchEvent>,
    capacity: usize,
    evicted: u64,
}

impl Default for SearchTrace {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_TRACE_CAPACITY)
    }
}

impl SearchTrace {
    /// A trace that keeps at most `capacity` steps. 0 records nothing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity.min(DEFAULT_TRACE_CAPACITY)),
            capacity,
            evicted: 0,
        }
    }

    /// Record a step, evicting the oldest one when full.
    pub fn record(&mut self, event: SearchEvent) {
        if self.capacity == 0 {
            self.evicted += 1;
            return;
        }
        if self.window.len() == self.capacity {
            self.window.pop_front();
            self.evicted += 1;
        }
        self.window.push_back(event);
    }

    /// Retained steps, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &SearchEvent> {
        self.window.iter()
    }

    /// Retained steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Whether nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Maximum retained steps.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Steps dropped (or never kept) because of the capacity.
    #[must_use]
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Applied tokens within the window, oldest first.
    #[must_use]
    pub fn applied_tokens(&self) -> Vec<SearchToken> {
        self.iter()
            .filter_map(|e| match *e {
                SearchEvent::Applied { token, .. } => Some(token),
                _ => None,
            })
            .collect()
    }

    /// Last retained step for `token`.
    #[must_use]
    pub fn last_step(&self, token: SearchToken) -> Option<SearchEvent> {
        self.window.iter().rev().find(|e| e.token() == token).copied()
    }

    /// Ordering problems within the window: non-increasing starts, applying
    /// something other than the latest start, or discarding a token that was
    /// not older than the current one.
    #[must_use]
    pub fn ordering_violations(&self) -> Vec<String> {
        let mut latest = None;
        let mut violations = Vec::new();
        for event in &self.window {
            match *event {
                SearchEvent::Started(token) => {
                    if latest.is_some_and(|prev| token <= prev) {
                        violations.push(format!("{token} started after a newer search"));
                    }
                    latest = Some(token);
                }
                SearchEvent::Applied { token, .. }
                    if latest.is_some_and(|prev| prev != token) =>
                {
                    violations.push(format!("{token} applied over a newer search"));
                }
                SearchEvent::StaleDiscarded { token, current } if token >= current => {
                    violations.push(format!("{token} discarded while {current} was current"));
                }
                _ => {}
            }
        }
        violations
    }
}

// ---------------------------------------------------------------------------
// SearchCoordinator
// ---------------------------------------------------------------------------

/// Verdict on a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The completion belongs to the current search and may be applied.
    Current,
    /// The completion was superseded and must be dropped.
    Stale {
        /// Token that is current now.
        current: SearchToken,
    },
    /// The token was never issued here, or already resolved.
    Unknown,
}

/// Issues search tokens and decides which completions may be applied.
///
/// Lives inside the controller and is only touched from its event handlers.
#[derive(Debug, Default)]
pub struct SearchCoordinator {
    last_issued: u64,
    current: SearchToken,
    in_flight: Option<SearchToken>,
    trace: SearchTrace,
}

impl SearchCoordinator {
    /// Create a coordinator with no searches issued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `capacity` trace steps (builder). 0 disables the trace.
    #[must_use]
    pub fn with_trace_capacity(mut self, capacity: usize) -> Self {
        self.trace = SearchTrace::with_capacity(capacity);
        self
    }

    fn supersede(&mut self) -> SearchToken {
        self.last_issued += 1;
        let next = SearchToken(self.last_issued);
        if let Some(token) = self.in_flight.take() {
            self.trace.record(SearchEvent::Superseded { token, by: next });
        }
        self.current = next;
        next
    }

    /// Issue a token for a new search, superseding the one in flight.
    pub fn start_search(&mut self) -> SearchToken {
        let token = self.supersede();
        self.in_flight = Some(token);
        self.trace.record(SearchEvent::Started(token));
        token
    }

    /// Make the in-flight search stale without starting a new one.
    ///
    /// A token is consumed so late completions compare as stale.
    pub fn invalidate(&mut self) {
        if self.in_flight.is_some() {
            self.supersede();
        }
    }

    /// The most recently issued (or invalidating) token.
    #[must_use]
    pub fn current_token(&self) -> SearchToken {
        self.current
    }

    /// Whether the current search is still unresolved.
    #[must_use]
    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Classify a successful completion carrying `count` results.
    ///
    /// The caller must apply `Current` completions.
    pub fn complete(&mut self, token: SearchToken, count: usize) -> Completion {
        let verdict = self.resolve(token);
        if verdict == Completion::Current {
            self.trace.record(SearchEvent::Applied { token, count });
        }
        verdict
    }

    /// Classify a failed completion.
    pub fn fail(&mut self, token: SearchToken) -> Completion {
        let verdict = self.resolve(token);
        if verdict == Completion::Current {
            self.trace.record(SearchEvent::Failed(token));
        }
        verdict
    }

    // The current token is only `Current` while in flight, so a search
    // resolves at most once.
    fn resolve(&mut self, token: SearchToken) -> Completion {
        if token.is_none() || token.raw() > self.last_issued {
            return Completion::Unknown;
        }
        if token != self.current {
            self.trace.record(SearchEvent::StaleDiscarded {
                token,
                current: self.current,
            });
            return Completion::Stale {
                current: self.current,
            };
        }
        if self.in_flight.take() == Some(token) {
            Completion::Current
        } else {
            Completion::Unknown
        }
    }

    /// Recent lifecycle steps.
    #[must_use]
    pub fn trace(&self) -> &SearchTrace {
        &self.trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_none_is_zero() {
        assert!(SearchToken::NONE.is_none());
        assert_eq!(SearchToken::default(), SearchToken::NONE);
        assert_eq!(SearchToken::from_raw(5).raw(), 5);
        assert_eq!(SearchToken::from_raw(3).to_string(), "Token(3)");
    }

    #[test]
    fn tokens_are_monotonic() {
        let mut coord = SearchCoordinator::new();
        let a = coord.start_search();
        let b = coord.start_search();
        let c = coord.start_search();
        assert!(a < b && b < c);
        assert_eq!(coord.current_token(), c);
        assert!(coord.trace().ordering_violations().is_empty());
    }

    #[test]
    fn newer_search_supersedes_older() {
        let mut coord = SearchCoordinator::new();
        let a = coord.start_search();
        let b = coord.start_search();
        assert_eq!(
            coord.trace().last_step(a),
            Some(SearchEvent::Superseded { token: a, by: b })
        );

        assert_eq!(coord.complete(a, 3), Completion::Stale { current: b });
        assert_eq!(
            coord.trace().last_step(a),
            Some(SearchEvent::StaleDiscarded { token: a, current: b })
        );
        assert_eq!(coord.complete(b, 1), Completion::Current);
        assert_eq!(coord.trace().applied_tokens(), vec![b]);
        assert!(!coord.has_in_flight());
    }

    #[test]
    fn out_of_order_completion_applies_only_latest() {
        let mut coord = SearchCoordinator::new();
        let a = coord.start_search();
        let b = coord.start_search();
        assert_eq!(coord.complete(b, 2), Completion::Current);
        assert_eq!(coord.complete(a, 5), Completion::Stale { current: b });
        assert_eq!(coord.trace().applied_tokens(), vec![b]);
        assert!(coord.trace().ordering_violations().is_empty());
    }

    #[test]
    fn invalidate_makes_in_flight_stale() {
        let mut coord = SearchCoordinator::new();
        let a = coord.start_search();
        coord.invalidate();
        assert_ne!(coord.current_token(), a);
        assert!(matches!(coord.complete(a, 1), Completion::Stale { .. }));
        assert!(coord.trace().applied_tokens().is_empty());
    }

    #[test]
    fn invalidate_without_in_flight_is_noop() {
        let mut coord = SearchCoordinator::new();
        let a = coord.start_search();
        assert_eq!(coord.complete(a, 0), Completion::Current);
        coord.invalidate();
        assert_eq!(coord.current_token(), a);
    }

    #[test]
    fn unknown_tokens_leave_no_trace() {
        let mut coord = SearchCoordinator::new();
        let _ = coord.start_search();
        let before = coord.trace().len();
        assert_eq!(coord.complete(SearchToken::from_raw(99), 1), Completion::Unknown);
        assert_eq!(coord.complete(SearchToken::NONE, 1), Completion::Unknown);
        assert_eq!(coord.trace().len(), before);
    }

    #[test]
    fn current_search_resolves_once() {
        let mut coord = SearchCoordinator::new();
        let a = coord.start_search();
        assert_eq!(coord.complete(a, 1), Completion::Current);
        assert_eq!(coord.complete(a, 1), Completion::Unknown);
        assert_eq!(coord.trace().applied_tokens(), vec![a]);
    }

    #[test]
    fn failures_are_traced() {
        let mut coord = SearchCoordinator::new();
        let a = coord.start_search();
        assert_eq!(coord.fail(a), Completion::Current);
        assert_eq!(coord.trace().last_step(a), Some(SearchEvent::Failed(a)));
        assert!(coord.trace().applied_tokens().is_empty());
    }

    #[test]
    fn trace_window_is_bounded() {
        let mut coord = SearchCoordinator::new().with_trace_capacity(8);
        for _ in 0..1_000 {
            let token = coord.start_search();
            coord.complete(token, 1);
        }
        assert_eq!(coord.trace().len(), 8);
        assert_eq!(coord.trace().evicted(), 2_000 - 8);
        assert!(coord.trace().ordering_violations().is_empty());
    }

    #[test]
    fn zero_capacity_records_nothing() {
        let mut coord = SearchCoordinator::new().with_trace_capacity(0);
        let a = coord.start_search();
        coord.complete(a, 1);
        assert!(coord.trace().is_empty());
        assert_eq!(coord.trace().capacity(), 0);
    }

    #[test]
    fn ordering_violations_are_reported() {
        let mut trace = SearchTrace::default();
        let (one, two, three) = (
            SearchToken::from_raw(1),
            SearchToken::from_raw(2),
            SearchToken::from_raw(3),
        );
        trace.record(SearchEvent::Started(two));
        trace.record(SearchEvent::Started(one));
        trace.record(SearchEvent::Applied { token: two, count: 1 });
        trace.record(SearchEvent::StaleDiscarded {
            token: three,
            current: one,
        });
        assert_eq!(trace.ordering_violations().len(), 3);
    }
}
