#![forbid(unsafe_code)]

//! Autocomplete widget state machine for typeahead.
//!
//! The [`Autocomplete`] controller coordinates text changes from an
//! [`InputBridge`], keyboard and pointer commands, and asynchronous search
//! completions. Searches are pluggable through [`SearchFunction`]; the default
//! is a case-insensitive substring match over [`Record`] fields.

pub mod autocomplete;
pub mod dropdown;
pub mod error;
pub mod input_bridge;
pub mod pointer;
pub mod record;
pub mod search;
pub mod token;

pub use autocomplete::{
    Autocomplete, AutocompleteConfig, AutocompleteEvent, DEFAULT_PROPERTY, Direction, KeyOutcome,
    ResultSet,
};
pub use dropdown::{DropdownItem, DropdownMenu};
pub use error::AutocompleteError;
pub use input_bridge::{
    BridgeNotification, DisplayText, InputBridge, InputChange, InputSender, TextEntrySurface,
};
pub use pointer::{PointerDown, PointerHub, PointerRegistration};
pub use record::{Record, field_text};
pub use search::{
    DataSearch, PendingSearch, SearchCompleter, SearchError, SearchFunction, SearchOutcome,
    SearchResponse, substring_search,
};
pub use token::{
    Completion, DEFAULT_TRACE_CAPACITY, SearchCoordinator, SearchEvent, SearchToken, SearchTrace,
};
