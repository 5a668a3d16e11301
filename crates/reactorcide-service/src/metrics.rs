//! Process-wide Prometheus counters, scraped alongside the default
//! registry's built-in metrics by `GET /api/v1/metrics`
//! ([`handlers::health::metrics`](crate::handlers::health::metrics)).

use prometheus::{IntCounterVec, Opts};
use std::sync::OnceLock;

static DISPATCH_SUBMIT_FAILURE_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// `dispatch_submit_failure_total{queue=...}` (§4.I): incremented once per
/// `DispatcherClient::submit` call that returns `Err`, labeled by the job's
/// queue name.
pub fn dispatch_submit_failure_total() -> &'static IntCounterVec {
    DISPATCH_SUBMIT_FAILURE_TOTAL.get_or_init(|| {
        let counter = IntCounterVec::new(
            Opts::new("dispatch_submit_failure_total", "Dispatcher submissions that returned an error, by queue"),
            &["queue"],
        )
        .expect("dispatch_submit_failure_total has a valid metric name");
        prometheus::default_registry()
            .register(Box::new(counter.clone()))
            .expect("dispatch_submit_failure_total registers exactly once per process");
        counter
    })
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
