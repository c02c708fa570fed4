//! Metrics collection and exposition.
//!
//! # Metrics
//! - `blocks_operations_total` (counter): block operations by operation, outcome
//! - `blocks_operation_duration_seconds` (histogram): store round-trip latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::blocks::error::{BlockError, BlockResult, StoreError};

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome and latency of a block operation.
pub fn record_block_operation<T>(operation: &'static str, result: &BlockResult<T>, start: Instant) {
    let outcome = outcome_label(result);
    metrics::counter!("blocks_operations_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
    metrics::histogram!("blocks_operation_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

fn outcome_label<T>(result: &BlockResult<T>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(BlockError::InvalidSyntax(_)) => "invalid_syntax",
        Err(BlockError::Store(StoreError::InstanceNotFound(_) | StoreError::BlockNotFound { .. })) => {
            "not_found"
        }
        Err(BlockError::Timeout(_)) => "timeout",
        Err(e) if e.is_client_error() => "client_error",
        Err(_) => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome_label(&Ok(())), "ok");
        assert_eq!(
            outcome_label::<()>(&Err(StoreError::BlockNotFound { name: "x".into() }.into())),
            "not_found"
        );
        assert_eq!(outcome_label::<()>(&Err(BlockError::Timeout(Duration::from_secs(1)))), "timeout");
        assert_eq!(outcome_label::<()>(&Err(BlockError::EmptyBody)), "client_error");
        assert_eq!(
            outcome_label::<()>(&Err(StoreError::Unavailable("down".into()).into())),
            "error"
        );
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        record_block_operation("list", &Ok(()), Instant::now());
    }
}
