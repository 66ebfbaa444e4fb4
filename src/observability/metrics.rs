//! Prometheus metrics for the reclamation chore.
//!
//! Every recording function compiles to a no-op without the `prometheus` feature.

#[cfg(feature = "prometheus")]
use metrics::{counter, histogram};

use crate::config::MetricsConfig;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a tokio runtime.
#[cfg(feature = "prometheus")]
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    let Some(prometheus) = &config.prometheus else {
        return Ok(());
    };

    let addr: std::net::SocketAddr = prometheus
        .listen
        .parse()
        .map_err(|e| MetricsError::Setup(format!("invalid listen address: {}", e)))?;

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(listen = %addr, "Prometheus exporter listening");
    Ok(())
}

/// Initialize the metrics system (no-op without prometheus feature).
#[cfg(not(feature = "prometheus"))]
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if config.prometheus.is_some() {
        tracing::warn!(
            "Prometheus metrics are configured but the 'prometheus' feature is not compiled. \
            Rebuild with: cargo build --features prometheus"
        );
    }
    Ok(())
}

/// Record the outcome of one flow run.
///
/// # Arguments
/// * `task` - The flow name, e.g. "project-pending-deletion"
/// * `deleted` - Candidates fully reclaimed
/// * `skipped` - Candidates left in place because they were no longer eligible or were vetoed
/// * `failed` - Candidates whose processing returned an error
pub fn record_flow_outcome(task: &str, deleted: u64, skipped: u64, failed: u64) {
    #[cfg(feature = "prometheus")]
    {
        counter!("pending_delete_candidates_total", "task" => task.to_string(), "outcome" => "deleted")
            .increment(deleted);
        counter!("pending_delete_candidates_total", "task" => task.to_string(), "outcome" => "skipped")
            .increment(skipped);
        counter!("pending_delete_candidates_total", "task" => task.to_string(), "outcome" => "failed")
            .increment(failed);
    }
    #[cfg(not(feature = "prometheus"))]
    {
        let _ = (task, deleted, skipped, failed);
    }
}

/// Record how long a flow run took.
pub fn record_flow_duration(task: &str, duration_secs: f64) {
    #[cfg(feature = "prometheus")]
    {
        histogram!("pending_delete_flow_duration_seconds", "task" => task.to_string())
            .record(duration_secs);
    }
    #[cfg(not(feature = "prometheus"))]
    {
        let _ = (task, duration_secs);
    }
}

/// Record object versions removed from a bucket.
pub fn record_objects_deleted(task: &str, count: u64) {
    #[cfg(feature = "prometheus")]
    {
        counter!("pending_delete_objects_deleted_total", "task" => task.to_string())
            .increment(count);
    }
    #[cfg(not(feature = "prometheus"))]
    {
        let _ = (task, count);
    }
}

/// Record a flow that stopped early on a listing error.
pub fn record_flow_error(task: &str) {
    #[cfg(feature = "prometheus")]
    {
        counter!("pending_delete_flow_errors_total", "task" => task.to_string()).increment(1);
    }
    #[cfg(not(feature = "prometheus"))]
    {
        let _ = task;
    }
}

/// Metrics initialization errors.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Failed to set up metrics: {0}")]
    Setup(String),

    #[cfg(feature = "prometheus")]
    #[error("Failed to install metrics recorder: {0}")]
    Install(#[from] metrics_exporter_prometheus::BuildError),
}
