//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define notary metrics (requests, latency, contract calls, uploads)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `notary_http_requests_total` (counter): requests by method, route, status
//! - `notary_http_request_duration_seconds` (histogram): latency by method, route
//! - `notary_contract_calls_total` (counter): registry calls by method, outcome
//! - `notary_contract_call_duration_seconds` (histogram): registry call latency
//! - `notary_upload_bytes` (histogram): accepted upload sizes
//! - `notary_chain_healthy` (gauge): 1=reachable, 0=unreachable
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Route labels use the matched route template, never the raw path

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished HTTP request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let route = route.to_string();
    counter!(
        "notary_http_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "notary_http_request_duration_seconds",
        "method" => method,
        "route" => route
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one registry call, read or write.
pub fn record_contract_call(method: &'static str, ok: bool, start: Instant) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("notary_contract_calls_total", "method" => method, "outcome" => outcome).increment(1);
    histogram!("notary_contract_call_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

/// Record the size of an accepted upload.
pub fn record_upload_bytes(len: usize) {
    histogram!("notary_upload_bytes").record(len as f64);
}

/// Record the latest chain reachability probe.
pub fn record_chain_health(healthy: bool) {
    gauge!("notary_chain_healthy").set(if healthy { 1.0 } else { 0.0 });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter_is_noop() {
        let start = Instant::now();
        record_request("GET", "/api/verify/{hash}", 200, start);
        record_contract_call("verifyContent(bytes32)", true, start);
        record_upload_bytes(1024);
        record_chain_health(false);
    }
}
