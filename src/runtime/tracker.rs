use std::future::Future;
use std::time::Instant;

use tracing::{Instrument, debug_span, trace};

use super::stats::RuntimeStats;

/// Times the operations of one component against the request's statistics.
///
/// `start` counts the call and stamps its start; `track` adds the elapsed
/// time. A `track` without a preceding `start` does nothing, which lets call
/// sites return early without tracking. Starting the same key twice before
/// tracking it keeps only the later start.
#[derive(Debug, Clone)]
pub struct RuntimeTracker {
    component: &'static str,
    stats: RuntimeStats,
}

impl RuntimeTracker {
    pub fn new(component: &'static str, stats: &RuntimeStats) -> Self {
        Self {
            component,
            stats: stats.clone(),
        }
    }

    pub fn component(&self) -> &'static str {
        self.component
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    pub fn start(&self, operation: &'static str) {
        self.stats.begin(self.component, operation, Instant::now());
    }

    pub fn track(&self, operation: &'static str) {
        if let Some(elapsed) = self
            .stats
            .complete(self.component, operation, Instant::now())
        {
            trace!(
                component = self.component,
                operation,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                "tracked operation"
            );
        }
    }

    /// Run `f` between a `start`/`track` pair inside an operation span.
    pub fn measure<T>(&self, operation: &'static str, f: impl FnOnce() -> T) -> T {
        let span = debug_span!("operation", component = self.component, operation);
        let _entered = span.enter();
        self.start(operation);
        let output = f();
        self.track(operation);
        output
    }

    /// Await `future` between a `start`/`track` pair inside an operation span.
    pub async fn instrument<F>(&self, operation: &'static str, future: F) -> F::Output
    where
        F: Future,
    {
        let span = debug_span!("operation", component = self.component, operation);
        self.start(operation);
        let output = future.instrument(span).await;
        self.track(operation);
        output
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{RuntimeStats, RuntimeTracker};

    #[test]
    fn track_without_start_is_a_no_op() {
        let stats = RuntimeStats::new();
        let tracker = RuntimeTracker::new("UrlService", &stats);

        tracker.track("get_category_url");

        assert!(stats.get_stats().is_empty());
        assert_eq!(stats.call_count("UrlService", "get_category_url"), 0);
    }

    #[test]
    fn start_counts_and_track_records_runtime() {
        let stats = RuntimeStats::new();
        let tracker = RuntimeTracker::new("CategoryService", &stats);

        tracker.start("get");
        std::thread::sleep(Duration::from_millis(2));
        tracker.track("get");

        let report = stats.get_stats();
        assert_eq!(report[0].class, "CategoryService");
        assert_eq!(report[0].total_count, 1);
        assert!(report[0].total_runtime >= 2.0);
    }

    #[test]
    fn start_without_track_only_counts() {
        let stats = RuntimeStats::new();
        let tracker = RuntimeTracker::new("CategoryService", &stats);

        tracker.start("set_current_category");

        assert_eq!(stats.call_count("CategoryService", "set_current_category"), 1);
        assert!(stats.get_stats().is_empty());
    }

    #[test]
    fn measure_returns_the_closure_output() {
        let stats = RuntimeStats::new();
        let tracker = RuntimeTracker::new("CategoryService", &stats);

        let value = tracker.measure("get_details", || 21 * 2);

        assert_eq!(value, 42);
        assert_eq!(stats.call_count("CategoryService", "get_details"), 1);
        assert!(stats.runtime("CategoryService", "get_details").is_some());
    }

    #[test]
    fn trackers_share_the_request_ledger() {
        let stats = RuntimeStats::new();
        let categories = RuntimeTracker::new("CategoryService", &stats);
        let urls = RuntimeTracker::new("UrlService", &stats);

        categories.measure("get", || ());
        urls.measure("get_category_url", || ());
        urls.measure("get_category_url", || ());

        let report = stats.get_stats();
        assert_eq!(report.len(), 2);
        let url_stats = report
            .iter()
            .find(|component| component.class == "UrlService")
            .expect("url service stats");
        assert_eq!(url_stats.total_count, 2);
    }

    #[tokio::test]
    async fn instrument_tracks_async_operations() {
        let stats = RuntimeStats::new();
        let tracker = RuntimeTracker::new("UrlService", &stats);

        let url = tracker
            .instrument("get_canonical_url", async { "/moebel".to_string() })
            .await;

        assert_eq!(url, "/moebel");
        assert_eq!(stats.call_count("UrlService", "get_canonical_url"), 1);
        assert!(stats.runtime("UrlService", "get_canonical_url").is_some());
    }
}
