//! Health snapshot for resource pools

use crate::metrics::Occupancy;

/// Health status of a resource pool
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
/// let health = pool.status();
/// assert!(health.is_healthy());
/// assert_eq!(health.tracked, 0);
/// assert_eq!(health.capacity, 10);
/// # }
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthStatus {
    /// Whether the pool is healthy
    pub is_healthy: bool,

    /// Current pool utilization (0.0 to 1.0)
    pub utilization: f64,

    /// Tracked resources, idle or in use
    pub tracked: usize,

    /// Resources waiting in the idle queue
    pub idle: usize,

    /// Resources checked out by consumers
    pub in_use: usize,

    /// Acquisitions waiting for a resource
    pub pending: usize,

    /// Maximum tracked resources
    pub capacity: usize,

    /// Set once the pool has been torn down
    pub destroyed: bool,

    /// Warning messages
    pub warnings: Vec<String>,
}

impl HealthStatus {
    pub(crate) fn new(occupancy: Occupancy, destroyed: bool) -> Self {
        let utilization = occupancy.utilization();

        let mut warnings = Vec::new();
        let mut is_healthy = !destroyed;

        if destroyed {
            warnings.push("Pool has been destroyed".to_string());
        }

        // Check for high utilization
        if utilization > 0.9 {
            warnings.push(format!("High utilization: {:.1}%", utilization * 100.0));
            is_healthy = false;
        }

        if occupancy.pending > 0 {
            warnings.push(format!("{} requests waiting for a resource", occupancy.pending));
            is_healthy = false;
        }

        Self {
            is_healthy,
            utilization,
            tracked: occupancy.tracked,
            idle: occupancy.idle,
            in_use: occupancy.in_use,
            pending: occupancy.pending,
            capacity: occupancy.capacity,
            destroyed,
            warnings,
        }
    }

    /// Check if the pool is healthy
    pub fn is_healthy(&self) -> bool {
        self.is_healthy
    }
}
