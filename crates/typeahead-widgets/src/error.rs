#![forbid(unsafe_code)]

//! Errors surfaced by the autocomplete controller.
//!
//! None of these escape the widget's event loop on their own: commands that
//! can fail return them, and search failures are logged and kept as the
//! controller's last error.

use std::fmt;

use crate::search::SearchError;
use crate::token::SearchToken;

/// Recoverable autocomplete failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutocompleteError {
    /// A pointer selected an index outside the current result list.
    InvalidIndex {
        /// The rejected index.
        index: usize,
        /// Number of results at the time.
        len: usize,
    },
    /// The current search failed. Prior results were left in place.
    Search {
        /// Token of the failed search.
        token: SearchToken,
        /// What went wrong.
        source: SearchError,
    },
    /// A completion referred to a token this widget never issued or already
    /// resolved.
    UnknownToken {
        /// The unrecognized token.
        token: SearchToken,
    },
}

impl fmt::Display for AutocompleteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIndex { index, len } => {
                write!(f, "result index {index} out of range for {len} results")
            }
            Self::Search { token, source } => write!(f, "{token}: {source}"),
            Self::UnknownToken { token } => write!(f, "no pending search for {token}"),
        }
    }
}

impl std::error::Error for AutocompleteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Search { source, .. } => Some(source),
            _ => None,
        }
    }
}
