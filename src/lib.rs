//! # stockpool
//!
//! An async pool of expensive, reusable resources for tokio applications.
//!
//! ## Features
//!
//! - Resources created lazily by a factory, up to a fixed capacity
//! - FIFO reuse of idle resources
//! - Requests queue in arrival order when the pool is exhausted, and a
//!   released resource goes straight to the oldest waiter
//! - Lifecycle hooks: create, init, uninit, destroy, validate
//! - Bounded discard-and-retry on stale idle resources
//! - Periodic validity sweep and idle-timeout eviction above a reserve
//! - Automatic release via RAII (Drop trait)
//! - Metrics and health snapshots, Prometheus export
//!
//! ## Quick Start
//!
//! ```rust
//! use stockpool::{Pool, PoolConfiguration};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let pool = Pool::new(
//!     PoolConfiguration::new()
//!         .with_create(|| String::from("connection"))
//!         .with_max_size(3),
//! )
//! .unwrap();
//!
//! {
//!     let conn = pool.acquire(()).await.unwrap();
//!     println!("Got: {}", *conn);
//!     // Resource automatically released when `conn` goes out of scope
//! }
//! assert_eq!(pool.idle_count(), 1);
//! # }
//! ```

mod pool;
mod config;
mod hooks;
mod logger;
mod metrics;
mod health;
mod eviction;
mod errors;

pub use pool::{Acquire, ItemId, Pool, Pooled, SweepReport};
pub use config::PoolConfiguration;
pub use logger::{NoopLogger, PoolLogger, TracingLogger};
pub use metrics::{MetricsExporter, PoolMetrics};
pub use health::HealthStatus;
pub use errors::{PoolError, PoolResult};
