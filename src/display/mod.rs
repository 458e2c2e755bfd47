//! Human-readable diagnostics for assembled models.
pub mod trace;

pub use trace::{format_trace, format_trace_with_values};
