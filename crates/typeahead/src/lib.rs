#![forbid(unsafe_code)]

//! Typeahead public facade crate.
//!
//! Re-exports the autocomplete controller and its collaborators, and offers a
//! prelude for day-to-day usage.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use typeahead_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};
pub use typeahead_core::geometry::Rect;

// --- Widget re-exports -----------------------------------------------------

pub use typeahead_widgets::{
    Autocomplete, AutocompleteConfig, AutocompleteError, AutocompleteEvent, BridgeNotification,
    Completion, DEFAULT_PROPERTY, DataSearch, Direction, DisplayText, DropdownItem, DropdownMenu,
    InputBridge, InputChange, InputSender, KeyOutcome, PendingSearch, PointerDown, PointerHub,
    PointerRegistration, Record, ResultSet, SearchCompleter, SearchCoordinator, SearchError,
    SearchEvent, SearchFunction, SearchOutcome, SearchResponse, SearchToken, SearchTrace,
    TextEntrySurface, field_text, substring_search,
};

// --- Errors ---------------------------------------------------------------

/// Errors from loading records and configuration.
///
/// Widget failures are recoverable and stay on the widget; see
/// [`Autocomplete::take_last_error`].
#[derive(Debug)]
pub enum Error {
    /// I/O failure while loading records or driving the terminal.
    Io(std::io::Error),
    /// Invalid records or configuration.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Config(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Standard result type for typeahead APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- JSON loading -----------------------------------------------------------

/// Parse a JSON array of records.
///
/// Elements that are not objects are rejected, since they could never match
/// a field.
#[cfg(feature = "serde")]
pub fn parse_records(json: &str) -> Result<Vec<serde_json::Value>> {
    let records: Vec<serde_json::Value> = serde_json::from_str(json)?;
    if let Some(index) = records.iter().position(|r| !r.is_object()) {
        return Err(Error::Config(format!("record {index} is not an object")));
    }
    Ok(records)
}

/// Parse an [`AutocompleteConfig`] from camelCase JSON.
#[cfg(feature = "serde")]
pub fn parse_config(json: &str) -> Result<AutocompleteConfig> {
    Ok(serde_json::from_str(json)?)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Autocomplete, AutocompleteConfig, AutocompleteEvent, Direction, Error, Event, KeyCode,
        KeyEvent, KeyOutcome, Record, Result, SearchResponse,
    };

    pub use crate::{core, widgets};
}

pub use typeahead_core as core;
pub use typeahead_widgets as widgets;
