use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use stockpool::{Acquire, Pool, PoolConfiguration, PoolError, SweepReport};
use tokio::time::{sleep, timeout};

#[derive(Debug, PartialEq)]
struct Thing {
    num: usize,
}

#[derive(Default)]
struct Ledger {
    created: AtomicUsize,
    inits: AtomicUsize,
    uninits: AtomicUsize,
    destroyed: Mutex<Vec<usize>>,
    invalid: Mutex<HashSet<usize>>,
}

impl Ledger {
    fn destroyed(&self) -> Vec<usize> {
        let mut nums = self.destroyed.lock().clone();
        nums.sort();
        nums
    }

    fn invalidate(&self, num: usize) {
        self.invalid.lock().insert(num);
    }
}

fn things(config: PoolConfiguration<Thing>) -> (Pool<Thing>, Arc<Ledger>) {
    let ledger = Arc::new(Ledger::default());
    let (create, init, uninit, destroy, valid) = (
        Arc::clone(&ledger),
        Arc::clone(&ledger),
        Arc::clone(&ledger),
        Arc::clone(&ledger),
        Arc::clone(&ledger),
    );

    let config = config
        .with_create(move || Thing {
            num: create.created.fetch_add(1, Ordering::SeqCst),
        })
        .with_init(move |_, ()| {
            init.inits.fetch_add(1, Ordering::SeqCst);
        })
        .with_uninit(move |_| {
            uninit.uninits.fetch_add(1, Ordering::SeqCst);
        })
        .with_destroy(move |thing| destroy.destroyed.lock().push(thing.num))
        .with_validation(move |thing| !valid.invalid.lock().contains(&thing.num));

    (Pool::new(config).unwrap(), ledger)
}

#[tokio::test(start_paused = true)]
async fn test_capacity_then_queueing() {
    let (pool, _) = things(PoolConfiguration::new().with_max_size(3));

    let first: Vec<_> = (0..3).map(|_| pool.acquire(())).collect();
    assert!(first.iter().all(|acquire| !acquire.is_queued()));

    let mut fourth = pool.acquire(());
    assert!(fourth.is_queued());
    assert_eq!(pool.pending_count(), 1);

    let mut held = Vec::new();
    for acquire in first {
        held.push(acquire.await.unwrap());
    }
    assert!(timeout(Duration::from_millis(50), &mut fourth).await.is_err());

    let released = held.remove(1);
    let (id, num) = (released.id(), released.num);
    pool.release(released).unwrap();

    let obj = fourth.await.unwrap();
    assert_eq!(obj.id(), id);
    assert_eq!(obj.num, num);
    assert_eq!(pool.idle_count(), 0);
    assert_eq!(pool.get_metrics().direct_handoffs, 1);
}

#[tokio::test]
async fn test_waiters_served_in_arrival_order() {
    let (pool, _) = things(PoolConfiguration::new().with_max_size(1));

    let held = pool.acquire(()).await.unwrap();
    let first = pool.acquire(());
    let second = pool.acquire(());

    pool.release(held).unwrap();
    let obj = first.await.unwrap();
    assert_eq!(pool.pending_count(), 1);

    drop(obj);
    let obj = second.await.unwrap();
    assert_eq!(obj.num, 0);
}

#[tokio::test]
async fn test_reuse_order_is_fifo() {
    let (pool, _) = things(PoolConfiguration::new().with_max_size(3));

    let a = pool.acquire(()).await.unwrap();
    let b = pool.acquire(()).await.unwrap();
    pool.release(b).unwrap();
    pool.release(a).unwrap();

    // b went idle first, so it comes back first
    assert_eq!(pool.acquire(()).await.unwrap().num, 1);
}

#[tokio::test]
async fn test_hook_calls_on_round_trip() {
    let (pool, ledger) = things(PoolConfiguration::new());

    let obj = pool.acquire(()).await.unwrap();
    pool.release(obj).unwrap();
    let obj = pool.acquire(()).await.unwrap();

    assert_eq!(obj.num, 0);
    assert_eq!(ledger.created.load(Ordering::SeqCst), 1);
    assert_eq!(ledger.inits.load(Ordering::SeqCst), 2);
    assert_eq!(ledger.uninits.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reserve_is_kept_and_surplus_evicted() {
    let (pool, ledger) = things(
        PoolConfiguration::new()
            .with_min_idle(1)
            .with_max_size(3)
            .with_idle_timeout(Duration::from_secs(30)),
    );

    let held: Vec<_> = vec![
        pool.acquire(()).await.unwrap(),
        pool.acquire(()).await.unwrap(),
        pool.acquire(()).await.unwrap(),
    ];
    drop(held);
    assert_eq!(pool.idle_count(), 3);

    sleep(Duration::from_secs(29)).await;
    assert_eq!(pool.tracked_count(), 3);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(pool.tracked_count(), 1);
    assert_eq!(pool.idle_count(), 1);
    assert_eq!(ledger.destroyed(), vec![1, 2]);

    sleep(Duration::from_secs(600)).await;
    assert_eq!(pool.tracked_count(), 1);
    assert_eq!(pool.get_metrics().idle_evictions, 2);
}

#[tokio::test(start_paused = true)]
async fn test_reacquire_cancels_eviction() {
    let (pool, ledger) = things(PoolConfiguration::new().with_idle_timeout(Duration::from_secs(30)));

    let obj = pool.acquire(()).await.unwrap();
    pool.release(obj).unwrap();

    sleep(Duration::from_secs(20)).await;
    let obj = pool.acquire(()).await.unwrap();
    sleep(Duration::from_secs(20)).await;
    assert_eq!(pool.tracked_count(), 1);
    assert!(ledger.destroyed().is_empty());

    pool.release(obj).unwrap();
    sleep(Duration::from_secs(31)).await;
    assert_eq!(pool.tracked_count(), 0);
    assert_eq!(ledger.destroyed(), vec![0]);
}

#[tokio::test]
async fn test_sweep_destroys_invalid_idle_items() {
    let (pool, ledger) = things(PoolConfiguration::new());

    let obj = pool.acquire(()).await.unwrap();
    let old_id = obj.id();
    pool.release(obj).unwrap();

    ledger.invalidate(0);
    let report = pool.sweep().unwrap();
    assert_eq!(report, SweepReport { destroyed: 1, flagged: 0 });
    assert_eq!(pool.tracked_count(), 0);

    let obj = pool.acquire(()).await.unwrap();
    assert_eq!(obj.num, 1);
    assert_ne!(obj.id(), old_id);
}

#[tokio::test(start_paused = true)]
async fn test_scheduled_sweep() {
    let (pool, ledger) = things(PoolConfiguration::new().with_cleanup_interval(Duration::from_secs(1)));

    let a = pool.acquire(()).await.unwrap();
    let b = pool.acquire(()).await.unwrap();
    drop(a);
    drop(b);

    ledger.invalidate(1);
    sleep(Duration::from_millis(1500)).await;

    assert_eq!(pool.tracked_count(), 1);
    assert_eq!(ledger.destroyed(), vec![1]);
    assert!(pool.get_metrics().sweeps >= 1);
}

#[tokio::test]
async fn test_sweep_spares_checked_out_items() {
    let (pool, ledger) = things(PoolConfiguration::new());

    let held = pool.acquire(()).await.unwrap();
    ledger.invalidate(0);

    let report = pool.sweep().unwrap();
    assert_eq!(report, SweepReport { destroyed: 0, flagged: 1 });
    assert_eq!(held.num, 0);
    assert!(ledger.destroyed().is_empty());

    // re-validated on the way back
    pool.release(held).unwrap();
    assert_eq!(ledger.destroyed(), vec![0]);
    assert_eq!(pool.tracked_count(), 0);
}

#[tokio::test]
async fn test_failed_revalidation_backfills_waiters() {
    let (pool, ledger) = things(PoolConfiguration::new().with_max_size(1));

    let held = pool.acquire(()).await.unwrap();
    let waiting = pool.acquire(());
    ledger.invalidate(0);
    pool.sweep().unwrap();

    drop(held);
    let obj = waiting.await.unwrap();
    assert_eq!(obj.num, 1);
    assert_eq!(ledger.destroyed(), vec![0]);
}

#[tokio::test]
async fn test_backfill_reports_validation_failure_to_each_waiter() {
    let (pool, ledger) = things(PoolConfiguration::new().with_max_size(1));

    let held = pool.acquire(()).await.unwrap();
    let first = pool.acquire(());
    let second = pool.acquire(());
    assert_eq!(pool.pending_count(), 2);

    for num in 0..3 {
        ledger.invalidate(num);
    }
    pool.sweep().unwrap();
    pool.release(held).unwrap();

    assert_eq!(first.await.unwrap_err(), PoolError::ValidationFailed);
    assert_eq!(second.await.unwrap_err(), PoolError::ValidationFailed);
    assert_eq!(pool.tracked_count(), 0);
    assert_eq!(pool.pending_count(), 0);
    assert_eq!(ledger.destroyed(), vec![0, 1, 2]);
}

#[tokio::test]
async fn test_waiter_leaving_during_backfill_is_not_counted() {
    let slot: Arc<Mutex<Option<Acquire<usize, bool>>>> = Arc::new(Mutex::new(None));
    let leaving = Arc::clone(&slot);
    let healthy = Arc::new(AtomicBool::new(true));
    let check = Arc::clone(&healthy);
    let counter = Arc::new(AtomicUsize::new(0));
    let next = Arc::clone(&counter);
    let config = PoolConfiguration::<usize, bool>::new()
        .with_create(move || next.fetch_add(1, Ordering::SeqCst))
        .with_init(move |_, leave| {
            if leave {
                drop(leaving.lock().take());
            }
        })
        .with_validation(move |num| *num != 0 || check.load(Ordering::SeqCst))
        .with_max_size(1);
    let pool = Pool::new(config).unwrap();

    let held = pool.acquire(false).await.unwrap();
    *slot.lock() = Some(pool.acquire(true));
    let staying = pool.acquire(false);

    healthy.store(false, Ordering::SeqCst);
    pool.sweep().unwrap();
    pool.release(held).unwrap();

    let obj = staying.await.unwrap();
    assert_eq!(*obj, 1);
    let metrics = pool.get_metrics();
    assert_eq!(metrics.total_acquired, 2);
    assert_eq!(metrics.direct_handoffs, 1);
}

#[test]
fn test_runtime_without_timers_still_serves() {
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    runtime.block_on(async {
        let (pool, ledger) = things(
            PoolConfiguration::new()
                .with_idle_timeout(Duration::from_millis(10))
                .with_cleanup_interval(Duration::from_millis(10)),
        );

        let obj = pool.acquire(()).await.unwrap();
        pool.release(obj).unwrap();
        tokio::task::yield_now().await;

        let obj = pool.acquire(()).await.unwrap();
        assert_eq!(obj.num, 0);
        drop(obj);
        assert_eq!(pool.idle_count(), 1);
        assert!(ledger.destroyed().is_empty());
        pool.destroy().unwrap();
    });
}

#[tokio::test]
async fn test_transient_invalidity_retries() {
    let rejections = Arc::new(AtomicUsize::new(0));
    let remaining = Arc::clone(&rejections);
    let counter = Arc::new(AtomicUsize::new(0));
    let next = Arc::clone(&counter);
    let config = PoolConfiguration::new()
        .with_create(move || next.fetch_add(1, Ordering::SeqCst))
        .with_validation(move |_| {
            remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_err()
        })
        .with_max_size(3);
    let pool: Pool<usize> = Pool::new(config).unwrap();

    let held = vec![
        pool.acquire(()).await.unwrap(),
        pool.acquire(()).await.unwrap(),
        pool.acquire(()).await.unwrap(),
    ];
    drop(held);

    rejections.store(2, Ordering::SeqCst);
    let obj = pool.acquire(()).await.unwrap();
    assert_eq!(*obj, 2);
    assert_eq!(pool.tracked_count(), 1);
    assert_eq!(pool.get_metrics().validation_failures, 2);
}

#[tokio::test]
async fn test_destroy_rejects_waiters_and_destroys_once() {
    let (pool, ledger) = things(PoolConfiguration::new().with_max_size(2));

    let a = pool.acquire(()).await.unwrap();
    let b = pool.acquire(()).await.unwrap();
    let waiting = pool.acquire(());

    pool.destroy().unwrap();
    assert_eq!(waiting.await.unwrap_err(), PoolError::PoolDestroyed);
    assert!(ledger.destroyed().is_empty());

    drop(a);
    assert_eq!(pool.release(b).unwrap_err(), PoolError::PoolDestroyed);
    assert_eq!(ledger.destroyed(), vec![0, 1]);
    assert_eq!(pool.get_metrics().total_destroyed, 2);
}

#[tokio::test]
async fn test_destroy_clears_idle_items() {
    let (pool, ledger) = things(PoolConfiguration::new());

    let a = pool.acquire(()).await.unwrap();
    let b = pool.acquire(()).await.unwrap();
    drop(a);
    drop(b);

    pool.destroy().unwrap();
    assert_eq!(ledger.destroyed(), vec![0, 1]);
    assert_eq!(pool.tracked_count(), 0);
    assert_eq!(pool.idle_count(), 0);
    assert_eq!(pool.acquire(()).await.unwrap_err(), PoolError::PoolDestroyed);
}

#[tokio::test]
async fn test_dropping_pool_tears_down() {
    let (pool, ledger) = things(PoolConfiguration::new());

    let obj = pool.acquire(()).await.unwrap();
    pool.release(obj).unwrap();
    drop(pool);

    assert_eq!(ledger.destroyed(), vec![0]);
}

#[tokio::test]
async fn test_missing_create_is_a_configuration_error() {
    let result = Pool::<Thing>::new(PoolConfiguration::new());
    assert!(matches!(result, Err(PoolError::Configuration(_))));
}

#[tokio::test]
async fn test_numbered_scenario() {
    let (pool, _) = things(PoolConfiguration::new().with_min_idle(1).with_max_size(3));

    let obj = pool.acquire(()).await.unwrap();
    assert_eq!(*obj, Thing { num: 0 });
    pool.release(obj).unwrap();

    let again = pool.acquire_then((), |obj| obj.num).await.unwrap();
    assert_eq!(again, 0);

    let batch: Vec<_> = (0..3).map(|_| pool.acquire(())).collect();
    let last = pool.acquire(());
    assert!(last.is_queued());

    let mut held = Vec::new();
    for acquire in batch {
        held.push(acquire.await.unwrap());
    }
    let mut nums: Vec<_> = held.iter().map(|obj| obj.num).collect();
    nums.sort();
    assert_eq!(nums, vec![0, 1, 2]);

    let released = held.pop().unwrap();
    let num = released.num;
    pool.release(released).unwrap();

    assert_eq!(last.await.unwrap().num, num);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tasks_share_capacity() {
    let (pool, ledger) = things(PoolConfiguration::new().with_max_size(4));
    let pool = Arc::new(pool);

    let mut handles = Vec::new();
    for _ in 0..32 {
        let pool = Arc::clone(&pool);
        handles.push(tokio::spawn(async move {
            let obj = pool.acquire(()).await.unwrap();
            tokio::task::yield_now().await;
            drop(obj);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert!(ledger.created.load(Ordering::SeqCst) <= 4);
    assert_eq!(pool.pending_count(), 0);
    assert_eq!(pool.status().in_use, 0);
}
