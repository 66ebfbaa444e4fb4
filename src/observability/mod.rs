//! Observability: structured logging and chore metrics.
//!
//! - Logging with configurable formats (pretty, compact, JSON)
//! - Prometheus counters for reclamation outcomes (requires the `prometheus` feature)

pub mod metrics;
#[cfg(feature = "server")]
mod tracing_init;

#[cfg(feature = "server")]
pub use tracing_init::*;
