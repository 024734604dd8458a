//! Validation, sweeps and idle eviction

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use stockpool::{Pool, PoolConfiguration};
use tokio::time::sleep;

#[tokio::main]
async fn main() {
    println!("=== stockpool - Validation Examples ===\n");

    let healthy = Arc::new(AtomicBool::new(true));
    let check = Arc::clone(&healthy);
    let counter = Arc::new(AtomicUsize::new(0));
    let next = Arc::clone(&counter);

    let pool: Pool<usize> = Pool::new(
        PoolConfiguration::new()
            .with_create(move || next.fetch_add(1, Ordering::SeqCst))
            .with_validation(move |_| check.load(Ordering::SeqCst))
            .with_cleanup_interval(Duration::from_millis(100))
            .with_idle_timeout(Duration::from_millis(300))
            .with_max_size(3),
    )
    .unwrap();

    println!("1. Sweep:");
    {
        let _a = pool.acquire(()).await.unwrap();
        let _b = pool.acquire(()).await.unwrap();
    }
    println!("   Idle before: {}", pool.idle_count());
    healthy.store(false, Ordering::SeqCst);
    sleep(Duration::from_millis(150)).await;
    println!("   Idle after sweep: {}\n", pool.idle_count());

    println!("2. Idle Eviction:");
    healthy.store(true, Ordering::SeqCst);
    drop(pool.acquire(()).await.unwrap());
    println!("   Tracked: {}", pool.tracked_count());
    sleep(Duration::from_millis(400)).await;
    println!("   Tracked after timeout: {}", pool.tracked_count());

    let health = pool.status();
    println!("   Healthy: {}", health.is_healthy());
    println!("{}", pool.export_metrics_prometheus("demo", None));
}
