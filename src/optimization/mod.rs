//! Pass infrastructure: configuration, diagnostics, and the passes.
//!
//! A pass consumes a mutable [`crate::metadata::scope::Scope`] plus a
//! configuration, mutates the scope in place, and reports what it did through
//! [`metrics::PassMetrics`] and an [`events::EventLog`]. Errors are reserved
//! for corrupt input; a pass that finds nothing to do reports zero counters.

pub mod config;
pub mod events;
pub mod metrics;
pub mod passes;

pub use config::FinalInlineConfig;
pub use events::{Event, EventKind, EventLog};
pub use metrics::PassMetrics;
pub use passes::{FinalInlinePass, FinalInlineResult};
