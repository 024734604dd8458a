//! Basic usage: reuse, queueing and direct handoff

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stockpool::{Pool, PoolConfiguration};

#[derive(Debug)]
struct Thing {
    num: usize,
}

#[tokio::main]
async fn main() {
    println!("=== stockpool - Basic Examples ===\n");

    let counter = Arc::new(AtomicUsize::new(0));
    let next = Arc::clone(&counter);
    let pool = Pool::new(
        PoolConfiguration::new()
            .with_create(move || {
                println!("   creating thing");
                Thing {
                    num: next.fetch_add(1, Ordering::SeqCst),
                }
            })
            .with_init(|_: &mut Thing, ()| println!("   initting thing"))
            .with_uninit(|_| println!("   uninitting thing"))
            .with_destroy(|thing| println!("   destroying {:?}", thing))
            .with_min_idle(1)
            .with_max_size(3),
    )
    .unwrap();

    // Example 1: Round trip
    round_trip(&pool).await;

    // Example 2: Queueing behind a full pool
    queueing(&pool).await;

    // Example 3: Metrics and teardown
    teardown(&pool);
}

async fn round_trip(pool: &Pool<Thing>) {
    println!("1. Round Trip:");
    let obj = pool.acquire(()).await.unwrap();
    println!("   Got {:?}", *obj);
    pool.release(obj).unwrap();

    let num = pool.acquire_then((), |obj| obj.num).await.unwrap();
    println!("   Got num {} again\n", num);
}

async fn queueing(pool: &Pool<Thing>) {
    println!("2. Queueing:");
    let batch: Vec<_> = (0..3).map(|_| pool.acquire(())).collect();
    let last = pool.acquire(());
    println!("   Fourth request queued: {}", last.is_queued());

    let mut held = Vec::new();
    for acquire in batch {
        held.push(acquire.await.unwrap());
    }

    let released = held.remove(0);
    println!("   Releasing {:?}", *released);
    drop(released);

    let obj = last.await.unwrap();
    println!("   Dequeued {:?}\n", *obj);
}

fn teardown(pool: &Pool<Thing>) {
    println!("3. Metrics and Teardown:");
    let metrics = pool.get_metrics();
    println!("   Created: {}", metrics.total_created);
    println!("   Handoffs: {}", metrics.direct_handoffs);

    pool.destroy().unwrap();
    println!("   Destroyed: {}", pool.is_destroyed());
}
