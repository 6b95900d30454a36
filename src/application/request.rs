//! Per-request context and the service set built for it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::histogram;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::application::category::CategoryService;
use crate::application::layout::LayoutController;
use crate::application::repos::Repositories;
use crate::application::unit::UnitService;
use crate::application::url::UrlService;
use crate::config::{StorefrontSettings, TrackingSettings};
use crate::domain::types::Lang;
use crate::runtime::{ComponentStat, RuntimeStats};

pub(crate) const METRIC_REQUEST_MS: &str = "storefront_request_ms";

/// State scoped to one storefront request.
#[derive(Debug)]
pub struct RequestContext {
    lang: Lang,
    stats: RuntimeStats,
    tracking: TrackingSettings,
    started_at: Instant,
}

/// What a finished request reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestReport {
    /// Wall-clock seconds, rounded to three decimals.
    pub runtime_seconds: f64,
    pub stats: Vec<ComponentStat>,
}

impl RequestContext {
    /// Start a request in the session language; blank or missing means `de`.
    pub fn new(lang: Option<&str>, tracking: TrackingSettings) -> Self {
        let stats = if tracking.enabled {
            RuntimeStats::new()
        } else {
            RuntimeStats::disabled()
        };
        Self {
            lang: Lang::resolve(lang),
            stats,
            tracking,
            started_at: Instant::now(),
        }
    }

    pub fn lang(&self) -> &Lang {
        &self.lang
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Close the request: log the response time with the runtime statistics
    /// and hand them back.
    pub fn finish(self) -> RequestReport {
        let elapsed = self.elapsed();
        histogram!(METRIC_REQUEST_MS).record(elapsed.as_secs_f64() * 1000.0);

        let seconds = elapsed.as_secs_f64();
        let report = RequestReport {
            runtime_seconds: (seconds * 1000.0).round() / 1000.0,
            stats: self.stats.get_stats(),
        };

        if !self.tracking.enabled {
            debug!(lang = %self.lang, "request finished without runtime tracking");
            return report;
        }

        if self.tracking.log_stats {
            match serde_json::to_string(&report.stats) {
                Ok(stats) => info!(
                    lang = %self.lang,
                    stats = %stats,
                    "Server responds after {seconds:.3} seconds"
                ),
                Err(err) => {
                    warn!(error = %err, "failed to serialize runtime stats");
                    info!(lang = %self.lang, "Server responds after {seconds:.3} seconds");
                }
            }
        } else {
            info!(lang = %self.lang, "Server responds after {seconds:.3} seconds");
        }

        report
    }
}

/// The request-scoped services of one request, sharing its runtime ledger.
pub struct RequestServices {
    pub categories: Arc<CategoryService>,
    pub urls: Arc<UrlService>,
    pub units: UnitService,
    pub layout: LayoutController,
}

impl RequestServices {
    pub fn new(
        repos: &Repositories,
        settings: Arc<StorefrontSettings>,
        context: &RequestContext,
    ) -> Self {
        let stats = context.stats();
        let categories = Arc::new(CategoryService::new(
            repos.categories.clone(),
            settings.clone(),
            context.lang().clone(),
            stats,
        ));
        let urls = Arc::new(UrlService::new(
            categories.clone(),
            repos.items.clone(),
            settings.clone(),
            stats,
        ));
        let units = UnitService::new(repos.units.clone(), context.lang().clone(), stats);
        let layout = LayoutController::new(categories.clone(), urls.clone(), settings, stats);

        Self {
            categories,
            urls,
            units,
            layout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_language_defaults_to_german() {
        let context = RequestContext::new(Some("  "), TrackingSettings::default());
        assert_eq!(context.lang().as_str(), "de");
    }

    #[test]
    fn finish_returns_the_recorded_stats() {
        let context = RequestContext::new(Some("en"), TrackingSettings::default());
        context
            .stats()
            .record("CategoryService", "get", Duration::from_millis(4));

        let report = context.finish();

        assert_eq!(report.stats.len(), 1);
        assert_eq!(report.stats[0].class, "CategoryService");
        assert_eq!(report.stats[0].total_runtime, 4.0);
        assert!(report.runtime_seconds >= 0.0);
    }

    #[test]
    fn disabled_tracking_reports_nothing() {
        let tracking = TrackingSettings {
            enabled: false,
            log_stats: true,
        };
        let context = RequestContext::new(None, tracking);
        context
            .stats()
            .record("CategoryService", "get", Duration::from_millis(4));

        assert!(context.finish().stats.is_empty());
    }
}
