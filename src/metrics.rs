//! Metrics collection and export for resource pools

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Metrics data for a pool
///
/// # Examples
///
/// ```
/// use stockpool::{Pool, PoolConfiguration};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let pool = Pool::new(PoolConfiguration::<u32>::new().with_create(|| 1)).unwrap();
///
/// let obj = pool.acquire(()).await.unwrap();
/// let metrics = pool.get_metrics();
/// assert_eq!(metrics.total_created, 1);
/// assert_eq!(metrics.in_use, 1);
/// drop(obj);
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolMetrics {
    /// Resources built by the create hook
    pub total_created: usize,

    /// Resources handed to the destroy hook
    pub total_destroyed: usize,

    /// Acquisitions that resolved with a resource
    pub total_acquired: usize,

    /// Resources that went back to the idle queue
    pub total_released: usize,

    /// Releases handed straight to a queued waiter
    pub direct_handoffs: usize,

    /// Acquisitions that had to wait
    pub queued_requests: usize,

    /// Validation failures, on acquisition or sweep
    pub validation_failures: usize,

    /// Idle resources destroyed by their eviction timer
    pub idle_evictions: usize,

    /// Completed sweep passes
    pub sweeps: usize,

    /// Currently tracked resources
    pub tracked: usize,

    /// Currently checked-out resources
    pub in_use: usize,

    /// Currently idle resources
    pub idle: usize,

    /// Currently queued requests
    pub pending: usize,

    /// Pool utilization ratio (0.0 to 1.0)
    pub utilization: f64,

    /// Maximum pool capacity
    pub max_capacity: usize,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_created".to_string(), self.total_created.to_string());
        metrics.insert("total_destroyed".to_string(), self.total_destroyed.to_string());
        metrics.insert("total_acquired".to_string(), self.total_acquired.to_string());
        metrics.insert("total_released".to_string(), self.total_released.to_string());
        metrics.insert("direct_handoffs".to_string(), self.direct_handoffs.to_string());
        metrics.insert("queued_requests".to_string(), self.queued_requests.to_string());
        metrics.insert("validation_failures".to_string(), self.validation_failures.to_string());
        metrics.insert("idle_evictions".to_string(), self.idle_evictions.to_string());
        metrics.insert("sweeps".to_string(), self.sweeps.to_string());
        metrics.insert("tracked".to_string(), self.tracked.to_string());
        metrics.insert("in_use".to_string(), self.in_use.to_string());
        metrics.insert("idle".to_string(), self.idle.to_string());
        metrics.insert("pending".to_string(), self.pending.to_string());
        metrics.insert("utilization".to_string(), format!("{:.2}", self.utilization));
        metrics.insert("max_capacity".to_string(), self.max_capacity.to_string());
        metrics
    }
}

/// Metrics exporter for Prometheus format
pub struct MetricsExporter;

impl MetricsExporter {
    /// Export metrics in Prometheus exposition format
    ///
    /// # Examples
    ///
    /// ```
    /// use stockpool::{Pool, PoolConfiguration};
    /// use std::collections::HashMap;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let pool = Pool::new(PoolConfiguration::<u32>::new().with_create(|| 1)).unwrap();
    ///
    /// let mut tags = HashMap::new();
    /// tags.insert("service".to_string(), "api".to_string());
    ///
    /// let output = pool.export_metrics_prometheus("db", Some(&tags));
    /// assert!(output.contains("stockpool_resources_in_use"));
    /// assert!(output.contains("service=\"api\""));
    /// # }
    /// ```
    pub fn export_prometheus(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        let mut output = String::new();
        let labels = Self::format_labels(pool_name, tags);

        let gauges = [
            ("stockpool_resources_tracked", "Currently tracked resources", metrics.tracked),
            ("stockpool_resources_in_use", "Currently checked-out resources", metrics.in_use),
            ("stockpool_resources_idle", "Currently idle resources", metrics.idle),
            ("stockpool_requests_pending", "Currently queued requests", metrics.pending),
        ];
        for (name, help, value) in gauges {
            Self::push_metric(&mut output, name, help, "gauge", &labels, value.to_string());
        }

        Self::push_metric(
            &mut output,
            "stockpool_utilization",
            "Pool utilization ratio",
            "gauge",
            &labels,
            format!("{:.2}", metrics.utilization),
        );

        let counters = [
            ("stockpool_resources_created_total", "Resources created", metrics.total_created),
            ("stockpool_resources_destroyed_total", "Resources destroyed", metrics.total_destroyed),
            ("stockpool_acquisitions_total", "Acquisitions resolved", metrics.total_acquired),
            ("stockpool_releases_total", "Resources returned to idle", metrics.total_released),
            ("stockpool_handoffs_total", "Releases handed to a waiter", metrics.direct_handoffs),
            ("stockpool_requests_queued_total", "Acquisitions that waited", metrics.queued_requests),
            ("stockpool_validation_failures_total", "Validation failures", metrics.validation_failures),
            ("stockpool_idle_evictions_total", "Idle timeout evictions", metrics.idle_evictions),
            ("stockpool_sweeps_total", "Sweep passes", metrics.sweeps),
        ];
        for (name, help, value) in counters {
            Self::push_metric(&mut output, name, help, "counter", &labels, value.to_string());
        }

        output
    }

    fn push_metric(output: &mut String, name: &str, help: &str, kind: &str, labels: &str, value: String) {
        output.push_str(&format!("# HELP {} {}\n", name, help));
        output.push_str(&format!("# TYPE {} {}\n", name, kind));
        output.push_str(&format!("{}{{{}}} {}\n", name, labels, value));
    }

    fn format_labels(pool_name: &str, tags: Option<&HashMap<String, String>>) -> String {
        let mut labels = vec![format!("pool=\"{}\"", pool_name)];

        if let Some(tags) = tags {
            let mut tags: Vec<_> = tags.iter().collect();
            tags.sort();
            for (key, value) in tags {
                labels.push(format!("{}=\"{}\"", key, value));
            }
        }

        labels.join(",")
    }
}

/// Snapshot of the pool's gauges, taken under the state lock
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Occupancy {
    pub tracked: usize,
    pub in_use: usize,
    pub idle: usize,
    pub pending: usize,
    pub capacity: usize,
}

impl Occupancy {
    pub fn utilization(&self) -> f64 {
        if self.capacity > 0 {
            self.in_use as f64 / self.capacity as f64
        } else {
            0.0
        }
    }
}

/// Internal metrics tracker
pub(crate) struct MetricsTracker {
    pub total_created: Arc<AtomicUsize>,
    pub total_destroyed: Arc<AtomicUsize>,
    pub total_acquired: Arc<AtomicUsize>,
    pub total_released: Arc<AtomicUsize>,
    pub direct_handoffs: Arc<AtomicUsize>,
    pub queued_requests: Arc<AtomicUsize>,
    pub validation_failures: Arc<AtomicUsize>,
    pub idle_evictions: Arc<AtomicUsize>,
    pub sweeps: Arc<AtomicUsize>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self {
            total_created: Arc::new(AtomicUsize::new(0)),
            total_destroyed: Arc::new(AtomicUsize::new(0)),
            total_acquired: Arc::new(AtomicUsize::new(0)),
            total_released: Arc::new(AtomicUsize::new(0)),
            direct_handoffs: Arc::new(AtomicUsize::new(0)),
            queued_requests: Arc::new(AtomicUsize::new(0)),
            validation_failures: Arc::new(AtomicUsize::new(0)),
            idle_evictions: Arc::new(AtomicUsize::new(0)),
            sweeps: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn incr(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_metrics(&self, occupancy: Occupancy) -> PoolMetrics {
        PoolMetrics {
            total_created: self.total_created.load(Ordering::Relaxed),
            total_destroyed: self.total_destroyed.load(Ordering::Relaxed),
            total_acquired: self.total_acquired.load(Ordering::Relaxed),
            total_released: self.total_released.load(Ordering::Relaxed),
            direct_handoffs: self.direct_handoffs.load(Ordering::Relaxed),
            queued_requests: self.queued_requests.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            idle_evictions: self.idle_evictions.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            tracked: occupancy.tracked,
            in_use: occupancy.in_use,
            idle: occupancy.idle,
            pending: occupancy.pending,
            utilization: occupancy.utilization(),
            max_capacity: occupancy.capacity,
        }
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new()
    }
}
