use std::sync::atomic::{AtomicU64, Ordering};

/// Receives one call per API request.
///
/// Injected into the request middleware instead of living in a global.
pub trait MetricsCollector: Send + Sync {
    fn record_hit(&self);

    fn hits(&self) -> u64;
}

/// Relaxed atomic counter. Increments from concurrent requests carry no
/// ordering guarantee relative to each other.
#[derive(Debug, Default)]
pub struct AtomicHitCounter {
    hits: AtomicU64,
}

impl MetricsCollector for AtomicHitCounter {
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }
}
