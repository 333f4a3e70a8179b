#![forbid(unsafe_code)]

//! Core: canonical input events, hit areas, and logging shims shared by the
//! typeahead widgets.

pub mod event;
pub mod geometry;
pub mod logging;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
