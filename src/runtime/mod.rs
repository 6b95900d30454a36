//! Per-request runtime instrumentation.
//!
//! Each service owns a [`RuntimeTracker`] bound to the request's
//! [`RuntimeStats`]. Timed operations feed the ledger, and
//! [`RuntimeStats::get_stats`] ranks the result when the request finishes.

mod stats;
mod tracker;

pub use stats::{ComponentStat, MethodStat, RuntimeStats};
pub use tracker::RuntimeTracker;
