//! # sift-observability
//!
//! Structured tracing with span definitions, log events for the search
//! pipeline, and degradation event tracking with recovery status.

pub mod degradation;
pub mod tracing_setup;

pub use degradation::{DegradationTracker, RecoveryStatus, TrackedDegradation};
pub use tracing_setup::{init_tracing, init_tracing_from_config, init_tracing_with_filter};
