use crate::config::AppConfig;
use crate::mmm::assembler::ResultAssembler;
use crate::mmm::ingest::PlaceholderEstimator;
use crate::mmm::Estimator;
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ── Request counters (lock-free) ──

pub struct PerfCounters {
    pub samples_served: AtomicU64,
    pub uploads_processed: AtomicU64,
    pub simulations_run: AtomicU64,
    pub errors_returned: AtomicU64,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self {
            samples_served: AtomicU64::new(0),
            uploads_processed: AtomicU64::new(0),
            simulations_run: AtomicU64::new(0),
            errors_returned: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> serde_json::Value {
        use Ordering::Relaxed;
        serde_json::json!({
            "samples_served": self.samples_served.load(Relaxed),
            "uploads_processed": self.uploads_processed.load(Relaxed),
            "simulations_run": self.simulations_run.load(Relaxed),
            "errors_returned": self.errors_returned.load(Relaxed),
        })
    }
}

impl Default for PerfCounters {
    fn default() -> Self {
        Self::new()
    }
}

// ── Application shared state (read-only apart from counters) ──

pub struct AppState {
    pub config: AppConfig,
    pub assembler: ResultAssembler,
    pub estimator: Arc<dyn Estimator>,
    pub counters: PerfCounters,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        Self::with_estimator(config, Arc::new(PlaceholderEstimator))
    }

    pub fn with_estimator(config: AppConfig, estimator: Arc<dyn Estimator>) -> Arc<Self> {
        let assembler = ResultAssembler::new(config.thresholds, config.series_seed, config.series_weeks);
        Arc::new(Self {
            config,
            assembler,
            estimator,
            counters: PerfCounters::new(),
        })
    }
}
