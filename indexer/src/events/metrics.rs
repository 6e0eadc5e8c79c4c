//! Metrics tracking for the event processor.
//!
//! Provides atomic counters for monitoring event processing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Metrics for the event processor.
#[derive(Debug)]
pub struct EventMetrics {
    /// Total number of events processed.
    events_processed: AtomicU64,

    /// Number of deposit events.
    deposits: AtomicU64,

    /// Number of AddOrder events.
    orders_added: AtomicU64,

    /// Number of RemoveOrder events applied.
    orders_removed: AtomicU64,

    /// Number of events at or before the cursor.
    events_replayed: AtomicU64,

    /// Number of events skipped as data anomalies.
    anomalies: AtomicU64,

    /// Number of decimals lookups that fell back.
    decimals_fallbacks: AtomicU64,

    /// Total processing time in nanoseconds.
    total_processing_time_ns: AtomicU64,

    /// Start time for rate calculation.
    start_time: Instant,
}

impl Default for EventMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EventMetrics {
    /// Creates a new metrics instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events_processed: AtomicU64::new(0),
            deposits: AtomicU64::new(0),
            orders_added: AtomicU64::new(0),
            orders_removed: AtomicU64::new(0),
            events_replayed: AtomicU64::new(0),
            anomalies: AtomicU64::new(0),
            decimals_fallbacks: AtomicU64::new(0),
            total_processing_time_ns: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a deposit event.
    pub fn record_deposit(&self) {
        self.events_processed.fetch_add(1, Ordering::Relaxed);
        self.deposits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an AddOrder event.
    pub fn record_order_added(&self) {
        self.events_processed.fetch_add(1, Ordering::Relaxed);
        self.orders_added.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an applied RemoveOrder event.
    pub fn record_order_removed(&self) {
        self.events_processed.fetch_add(1, Ordering::Relaxed);
        self.orders_removed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an event skipped as a data anomaly.
    pub fn record_anomaly(&self) {
        self.events_processed.fetch_add(1, Ordering::Relaxed);
        self.anomalies.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a replayed event.
    pub fn record_replay(&self) {
        self.events_replayed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records decimals lookups that fell back.
    pub fn record_decimals_fallbacks(&self, count: u64) {
        self.decimals_fallbacks.fetch_add(count, Ordering::Relaxed);
    }

    /// Records time spent on one event.
    pub fn record_duration(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.total_processing_time_ns
            .fetch_add(nanos, Ordering::Relaxed);
    }

    /// Returns the total events processed.
    #[must_use]
    pub fn events_processed(&self) -> u64 {
        self.events_processed.load(Ordering::Relaxed)
    }

    /// Returns the number of deposits processed.
    #[must_use]
    pub fn deposits(&self) -> u64 {
        self.deposits.load(Ordering::Relaxed)
    }

    /// Returns the number of AddOrder events processed.
    #[must_use]
    pub fn orders_added(&self) -> u64 {
        self.orders_added.load(Ordering::Relaxed)
    }

    /// Returns the number of RemoveOrder events applied.
    #[must_use]
    pub fn orders_removed(&self) -> u64 {
        self.orders_removed.load(Ordering::Relaxed)
    }

    /// Returns the number of replayed events.
    #[must_use]
    pub fn events_replayed(&self) -> u64 {
        self.events_replayed.load(Ordering::Relaxed)
    }

    /// Returns the number of anomalies.
    #[must_use]
    pub fn anomalies(&self) -> u64 {
        self.anomalies.load(Ordering::Relaxed)
    }

    /// Returns the number of decimals fallbacks.
    #[must_use]
    pub fn decimals_fallbacks(&self) -> u64 {
        self.decimals_fallbacks.load(Ordering::Relaxed)
    }

    /// Returns the total processing time.
    #[must_use]
    pub fn total_processing_time(&self) -> Duration {
        Duration::from_nanos(self.total_processing_time_ns.load(Ordering::Relaxed))
    }

    /// Returns the average processing time per event.
    #[must_use]
    pub fn average_processing_time(&self) -> Duration {
        let count = self.events_processed();
        if count == 0 {
            return Duration::ZERO;
        }
        let total_ns = self.total_processing_time_ns.load(Ordering::Relaxed);
        Duration::from_nanos(total_ns / count)
    }

    /// Returns the events per second since start.
    #[must_use]
    pub fn events_per_second(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.events_processed() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Returns the share of events that were anomalies (0.0 to 1.0).
    #[must_use]
    pub fn anomaly_rate(&self) -> f64 {
        let total = self.events_processed();
        if total == 0 {
            return 0.0;
        }
        self.anomalies() as f64 / total as f64
    }

    /// Returns a snapshot of all metrics.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_processed: self.events_processed(),
            deposits: self.deposits(),
            orders_added: self.orders_added(),
            orders_removed: self.orders_removed(),
            events_replayed: self.events_replayed(),
            anomalies: self.anomalies(),
            decimals_fallbacks: self.decimals_fallbacks(),
            average_processing_time: self.average_processing_time(),
            events_per_second: self.events_per_second(),
            anomaly_rate: self.anomaly_rate(),
        }
    }

    /// Resets all counters.
    pub fn reset(&self) {
        self.events_processed.store(0, Ordering::Relaxed);
        self.deposits.store(0, Ordering::Relaxed);
        self.orders_added.store(0, Ordering::Relaxed);
        self.orders_removed.store(0, Ordering::Relaxed);
        self.events_replayed.store(0, Ordering::Relaxed);
        self.anomalies.store(0, Ordering::Relaxed);
        self.decimals_fallbacks.store(0, Ordering::Relaxed);
        self.total_processing_time_ns.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of event metrics.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    /// Total events processed.
    pub events_processed: u64,
    /// Deposits processed.
    pub deposits: u64,
    /// AddOrder events processed.
    pub orders_added: u64,
    /// RemoveOrder events applied.
    pub orders_removed: u64,
    /// Replayed events.
    pub events_replayed: u64,
    /// Anomalies.
    pub anomalies: u64,
    /// Decimals fallbacks.
    pub decimals_fallbacks: u64,
    /// Average processing time.
    pub average_processing_time: Duration,
    /// Events per second.
    pub events_per_second: f64,
    /// Anomaly rate.
    pub anomaly_rate: f64,
}
