use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Safe to call more than once per process
/// (integration tests build several applications).
pub fn init_metrics() {
    METRICS_HANDLE.get_or_init(|| {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        if metrics::set_global_recorder(recorder).is_err() {
            tracing::warn!("A metrics recorder was already installed; /metrics may be empty");
        }
        handle
    });
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Outcome of a create-order request: `created`, `rejected`,
/// `gateway_error` or `amount_mismatch`.
pub fn record_order(outcome: &'static str) {
    counter!("checkout_orders_total", "outcome" => outcome).increment(1);
}

/// Amount opened with the gateway, in minor units.
pub fn record_amount(currency: &str, amount_minor: u64) {
    counter!("checkout_order_amount_minor_total", "currency" => currency.to_string())
        .increment(amount_minor);
}

pub fn record_verification(outcome: &'static str) {
    counter!("payment_verifications_total", "outcome" => outcome).increment(1);
}

pub fn record_tracking(outcome: &'static str) {
    counter!("shipment_tracking_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_subscription(outcome: &'static str) {
    counter!("newsletter_subscriptions_total", "outcome" => outcome).increment(1);
}
