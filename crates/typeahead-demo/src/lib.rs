#![forbid(unsafe_code)]

//! Terminal demo for the typeahead autocomplete widget.
//!
//! Split into a library so the app state and argument parsing can be tested
//! without a terminal.

pub mod app;
pub mod cli;
pub mod terminal;
