//! Prometheus metrics for the signing proxy.
//!
//! All metrics are aggregated in the [`Metrics`] struct for easy tracking and management.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Aggregated metrics for the proxy.
///
/// Metrics are registered with the global metrics registry on creation. Without
/// an installed exporter every call is a no-op.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance and register all metric descriptions.
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        // Request metrics
        describe_counter!(
            "signer_proxy_requests_total",
            "Total JSON-RPC requests received by method"
        );
        describe_histogram!(
            "signer_proxy_request_duration_seconds",
            "Time to answer a JSON-RPC request by method"
        );
        describe_counter!(
            "signer_proxy_errors_total",
            "Total error replies produced by the proxy by error"
        );

        // Transaction metrics
        describe_counter!(
            "signer_proxy_transactions_signed_total",
            "Total transactions signed by submission method"
        );
        describe_counter!(
            "signer_proxy_nonce_retries_total",
            "Total transactions resubmitted after a nonce too low reply"
        );

        // Downstream metrics
        describe_counter!(
            "signer_proxy_downstream_timeouts_total",
            "Total requests that timed out waiting for the downstream node"
        );
    }

    /// Record an answered JSON-RPC request.
    pub fn record_request(&self, method: &str, duration: Duration) {
        counter!("signer_proxy_requests_total", "method" => method.to_string()).increment(1);
        histogram!("signer_proxy_request_duration_seconds", "method" => method.to_string())
            .record(duration.as_secs_f64());
    }

    /// Record an error reply.
    pub fn record_error(&self, error: &str) {
        counter!("signer_proxy_errors_total", "error" => error.to_string()).increment(1);
    }

    /// Record a signed transaction.
    pub fn record_transaction_signed(&self, raw_method: &str) {
        counter!("signer_proxy_transactions_signed_total", "method" => raw_method.to_string())
            .increment(1);
    }

    /// Record a resubmission with a fresh nonce.
    pub fn record_nonce_retry(&self) {
        counter!("signer_proxy_nonce_retries_total").increment(1);
    }

    /// Record a downstream timeout.
    pub fn record_downstream_timeout(&self) {
        counter!("signer_proxy_downstream_timeouts_total").increment(1);
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
