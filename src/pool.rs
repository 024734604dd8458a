//! Core pool: the acquire/release state machine

use crate::config::PoolConfiguration;
use crate::errors::{PoolError, PoolResult};
use crate::eviction::{spawn_sweeper, IdleTimer};
use crate::health::HealthStatus;
use crate::hooks::Hooks;
use crate::logger::PoolLogger;
use crate::metrics::{MetricsExporter, MetricsTracker, Occupancy, PoolMetrics};

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Pool-scoped identity of a tracked resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of one validity sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Idle resources that failed validation and were destroyed
    pub destroyed: usize,

    /// Checked-out resources marked for validation when they come back
    pub flagged: usize,
}

/// A resource checked out of the pool.
///
/// Dropping the guard releases the resource, the same as [`Pool::release`].
pub struct Pooled<T: Send + 'static, A: Send + 'static = ()> {
    value: Option<T>,
    id: ItemId,
    pool: Arc<Shared<T, A>>,
}

impl<T: Send + 'static, A: Send + 'static> Pooled<T, A> {
    fn new(value: T, id: ItemId, pool: Arc<Shared<T, A>>) -> Self {
        Self {
            value: Some(value),
            id,
            pool,
        }
    }

    /// Identity of the underlying item
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Hand the resource back to its pool
    pub fn release(mut self) -> PoolResult<()> {
        match self.value.take() {
            Some(value) => self.pool.checkin(self.id, value),
            None => Ok(()),
        }
    }

    /// Take the value out without releasing it
    fn into_resource(mut self) -> Option<T> {
        self.value.take()
    }
}

impl<T: Send + 'static, A: Send + 'static> Deref for Pooled<T, A> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.value.as_ref().expect("Value already taken")
    }
}

impl<T: Send + 'static, A: Send + 'static> DerefMut for Pooled<T, A> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.value.as_mut().expect("Value already taken")
    }
}

impl<T: Send + fmt::Debug + 'static, A: Send + 'static> fmt::Debug for Pooled<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pooled")
            .field("id", &self.id)
            .field("value", &self.value)
            .finish()
    }
}

impl<T: Send + 'static, A: Send + 'static> Drop for Pooled<T, A> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            // failures are already logged by the pool
            let _ = self.pool.checkin(self.id, value);
        }
    }
}

type Delivery<T, A> = PoolResult<Pooled<T, A>>;

/// Future returned by [`Pool::acquire`].
///
/// The pool decides between idle stock, construction and queueing when
/// `acquire` is called, so queue order follows call order rather than poll
/// order.
pub struct Acquire<T: Send + 'static, A: Send + 'static = ()> {
    state: AcquireState<T, A>,
}

enum AcquireState<T: Send + 'static, A: Send + 'static> {
    Ready(Option<Delivery<T, A>>),
    Waiting(oneshot::Receiver<Delivery<T, A>>),
}

impl<T: Send + 'static, A: Send + 'static> Acquire<T, A> {
    fn ready(result: Delivery<T, A>) -> Self {
        Self {
            state: AcquireState::Ready(Some(result)),
        }
    }

    fn waiting(receiver: oneshot::Receiver<Delivery<T, A>>) -> Self {
        Self {
            state: AcquireState::Waiting(receiver),
        }
    }

    /// Whether this request was queued behind an exhausted pool
    pub fn is_queued(&self) -> bool {
        matches!(self.state, AcquireState::Waiting(_))
    }
}

impl<T: Send + 'static, A: Send + 'static> Unpin for Acquire<T, A> {}

impl<T: Send + 'static, A: Send + 'static> Future for Acquire<T, A> {
    type Output = Delivery<T, A>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.state {
            AcquireState::Ready(result) => match result.take() {
                Some(result) => Poll::Ready(result),
                None => panic!("Acquire polled after completion"),
            },
            // a dropped sender means the pool went away with us still queued
            AcquireState::Waiting(receiver) => Pin::new(receiver)
                .poll(cx)
                .map(|delivery| delivery.unwrap_or(Err(PoolError::PoolDestroyed))),
        }
    }
}

struct Item<T> {
    /// Present while idle, lent out while in use
    resource: Option<T>,
    in_use: bool,
    /// Set by a sweep that found the item checked out
    revalidate: bool,
    timer: Option<IdleTimer>,
}

struct Waiter<T: Send + 'static, A: Send + 'static> {
    args: A,
    sender: oneshot::Sender<Delivery<T, A>>,
}

struct PoolState<T: Send + 'static, A: Send + 'static> {
    items: HashMap<ItemId, Item<T>>,
    idle: VecDeque<ItemId>,
    pending: VecDeque<Waiter<T, A>>,
    /// Removed from tracking while checked out; destroyed on return
    retired: HashSet<ItemId>,
    next_id: u64,
    next_epoch: u64,
    sweeper: Option<JoinHandle<()>>,
    destroyed: bool,
}

impl<T: Send + 'static, A: Send + 'static> PoolState<T, A> {
    fn new() -> Self {
        Self {
            items: HashMap::new(),
            idle: VecDeque::new(),
            pending: VecDeque::new(),
            retired: HashSet::new(),
            next_id: 1,
            next_epoch: 0,
            sweeper: None,
            destroyed: false,
        }
    }

    fn occupancy(&self, capacity: usize) -> Occupancy {
        Occupancy {
            tracked: self.items.len(),
            in_use: self.items.values().filter(|item| item.in_use).count(),
            idle: self.idle.len(),
            pending: self.pending.len(),
            capacity,
        }
    }
}

enum Checkout<T: Send + 'static, A: Send + 'static> {
    Ready(Delivery<T, A>),
    Exhausted(A),
}

struct Shared<T: Send + 'static, A: Send + 'static> {
    state: Mutex<PoolState<T, A>>,
    hooks: Hooks<T, A>,
    log: Arc<dyn PoolLogger>,
    metrics: MetricsTracker,
    runtime: Option<Handle>,
    max_size: usize,
    min_idle: usize,
    idle_timeout: Duration,
    max_validation_retries: usize,
}

impl<T: Send + 'static, A: Send + 'static> Shared<T, A> {
    fn acquire(self: &Arc<Self>, args: A) -> Acquire<T, A> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.destroyed {
            self.log.warn("acquire called on a destroyed pool");
            return Acquire::ready(Err(PoolError::PoolDestroyed));
        }

        match self.checkout(state, args) {
            Checkout::Ready(result) => Acquire::ready(self.count_delivery(result)),
            Checkout::Exhausted(args) => {
                self.log.debug("Queueing request until a resource is available");
                let (sender, receiver) = oneshot::channel();
                state.pending.push_back(Waiter { args, sender });
                MetricsTracker::incr(&self.metrics.queued_requests);
                Acquire::waiting(receiver)
            }
        }
    }

    fn try_acquire(self: &Arc<Self>, args: A) -> Delivery<T, A> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.destroyed {
            return Err(PoolError::PoolDestroyed);
        }

        match self.checkout(state, args) {
            Checkout::Ready(result) => self.count_delivery(result),
            Checkout::Exhausted(_) => Err(PoolError::PoolExhausted),
        }
    }

    fn count_delivery(&self, result: Delivery<T, A>) -> Delivery<T, A> {
        if result.is_ok() {
            MetricsTracker::incr(&self.metrics.total_acquired);
        }
        result
    }

    /// Take an idle resource or build a new one, discarding idle resources
    /// that fail validation up to the retry bound.
    fn checkout(self: &Arc<Self>, state: &mut PoolState<T, A>, args: A) -> Checkout<T, A> {
        let mut discarded = 0;

        loop {
            if let Some(id) = state.idle.pop_front() {
                let Some(resource) = self.take_idle(state, id) else {
                    self.log.error(&format!("Idle queue referenced untracked item {id}"));
                    continue;
                };

                if self.hooks.is_valid(&resource) {
                    self.log.debug(&format!("Acquiring idle resource {id}"));
                    return Checkout::Ready(Ok(self.lend(state, id, resource, args)));
                }

                MetricsTracker::incr(&self.metrics.validation_failures);
                self.discard(state, id, resource);
                discarded += 1;
                if discarded > self.max_validation_retries {
                    self.log.error(&format!("{discarded} idle resources in a row failed validation"));
                    return Checkout::Ready(Err(PoolError::RetriesExhausted(discarded)));
                }
                self.log.warn(&format!("Idle resource {id} wasn't valid, re-acquiring"));
            } else if state.items.len() < self.max_size {
                return Checkout::Ready(self.construct(state, args));
            } else {
                return Checkout::Exhausted(args);
            }
        }
    }

    /// The construct-new branch: create, validate, lend.
    fn construct(self: &Arc<Self>, state: &mut PoolState<T, A>, args: A) -> Delivery<T, A> {
        let id = ItemId(state.next_id);
        state.next_id += 1;

        self.log.debug(&format!("Instantiating new resource {id}"));
        let resource = self.hooks.create();
        MetricsTracker::incr(&self.metrics.total_created);
        state.items.insert(
            id,
            Item {
                resource: None,
                in_use: false,
                revalidate: false,
                timer: None,
            },
        );

        if !self.hooks.is_valid(&resource) {
            MetricsTracker::incr(&self.metrics.validation_failures);
            self.log.error(&format!("Newly constructed resource {id} failed validation"));
            self.discard(state, id, resource);
            return Err(PoolError::ValidationFailed);
        }

        Ok(self.lend(state, id, resource, args))
    }

    /// Pull the resource out of an idle item and disarm its timer
    fn take_idle(&self, state: &mut PoolState<T, A>, id: ItemId) -> Option<T> {
        let item = state.items.get_mut(&id)?;
        if let Some(timer) = item.timer.take() {
            timer.cancel();
        }
        item.resource.take()
    }

    fn lend(self: &Arc<Self>, state: &mut PoolState<T, A>, id: ItemId, mut resource: T, args: A) -> Pooled<T, A> {
        if let Some(item) = state.items.get_mut(&id) {
            item.in_use = true;
        }
        self.hooks.init(&mut resource, args);
        Pooled::new(resource, id, Arc::clone(self))
    }

    fn checkin(self: &Arc<Self>, id: ItemId, resource: T) -> PoolResult<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if state.retired.remove(&id) {
            self.log.debug(&format!("Destroying retired resource {id}"));
            self.hooks.destroy(resource);
            MetricsTracker::incr(&self.metrics.total_destroyed);
            return if state.destroyed { Err(PoolError::PoolDestroyed) } else { Ok(()) };
        }
        if state.destroyed {
            self.log.warn(&format!("release of {id} called on a destroyed pool"));
            return Err(PoolError::PoolDestroyed);
        }

        let Some(item) = state.items.get_mut(&id) else {
            self.log.warn(&format!("release: no such item {id}"));
            return Err(PoolError::InvalidRelease(id));
        };
        if !item.in_use {
            self.log.warn(&format!("release: item {id} wasn't in use"));
            return Err(PoolError::NotInUse(id));
        }

        if std::mem::take(&mut item.revalidate) && !self.hooks.is_valid(&resource) {
            MetricsTracker::incr(&self.metrics.validation_failures);
            self.log.warn(&format!("Resource {id} failed validation on release, destroying"));
            self.discard(state, id, resource);
            self.cycle(state);
            return Ok(());
        }

        self.hand_back(state, id, resource);
        Ok(())
    }

    /// Give a returning resource to the oldest live waiter, or park it idle.
    fn hand_back(self: &Arc<Self>, state: &mut PoolState<T, A>, id: ItemId, mut resource: T) {
        while let Some(waiter) = state.pending.pop_front() {
            if waiter.sender.is_closed() {
                continue;
            }

            self.hooks.init(&mut resource, waiter.args);
            match waiter.sender.send(Ok(Pooled::new(resource, id, Arc::clone(self)))) {
                Ok(()) => {
                    self.log.debug(&format!("Reusing resource {id} for pending request"));
                    MetricsTracker::incr(&self.metrics.direct_handoffs);
                    MetricsTracker::incr(&self.metrics.total_acquired);
                    return;
                }
                // the waiter gave up between the check and the send
                Err(returned) => match returned.ok().and_then(Pooled::into_resource) {
                    Some(back) => resource = back,
                    None => return,
                },
            }
        }

        self.park(state, id, resource);
    }

    fn park(self: &Arc<Self>, state: &mut PoolState<T, A>, id: ItemId, mut resource: T) {
        let arm = state.idle.len() >= self.min_idle;
        let epoch = state.next_epoch;
        state.next_epoch += 1;

        let Some(item) = state.items.get_mut(&id) else {
            return;
        };

        self.log.debug(&format!("Releasing resource {id} to pool"));
        item.in_use = false;
        self.hooks.uninit(&mut resource);
        item.resource = Some(resource);

        if arm {
            if let Some(ref runtime) = self.runtime {
                self.log.debug(&format!("Setting idle timer for surplus resource {id}"));
                let weak = Arc::downgrade(self);
                item.timer = Some(IdleTimer::arm(runtime, self.idle_timeout, epoch, move || {
                    if let Some(shared) = weak.upgrade() {
                        shared.evict_idle(id, epoch);
                    }
                }));
            }
        }

        state.idle.push_back(id);
        MetricsTracker::incr(&self.metrics.total_released);
    }

    fn evict_idle(&self, id: ItemId, epoch: u64) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.destroyed {
            return;
        }

        let Some(item) = state.items.get_mut(&id) else {
            return;
        };
        // reacquired, or re-armed by a later release
        if item.in_use || item.timer.as_ref().map(IdleTimer::epoch) != Some(epoch) {
            return;
        }

        // dropping our own handle detaches instead of aborting this task
        item.timer.take();
        self.log.debug(&format!("Idle resource {id} timed out, destroying"));
        if self.destroy_item(state, id).is_ok() {
            MetricsTracker::incr(&self.metrics.idle_evictions);
        }
    }

    /// Destroy a resource the caller already holds
    fn discard(&self, state: &mut PoolState<T, A>, id: ItemId, resource: T) {
        if let Some(mut item) = state.items.remove(&id) {
            if let Some(timer) = item.timer.take() {
                timer.cancel();
            }
        }
        state.idle.retain(|idle| *idle != id);
        self.hooks.destroy(resource);
        MetricsTracker::incr(&self.metrics.total_destroyed);
    }

    /// Stop tracking an item. Idle resources are destroyed now; checked-out
    /// ones are retired and destroyed when they come back.
    fn destroy_item(&self, state: &mut PoolState<T, A>, id: ItemId) -> PoolResult<()> {
        let Some(mut item) = state.items.remove(&id) else {
            self.log.warn(&format!("Destroy called on nonexistent item {id}"));
            return Err(PoolError::UnknownItem(id));
        };

        if let Some(timer) = item.timer.take() {
            timer.cancel();
        }
        match item.resource.take() {
            Some(resource) => {
                state.idle.retain(|idle| *idle != id);
                self.hooks.destroy(resource);
                MetricsTracker::incr(&self.metrics.total_destroyed);
            }
            None => {
                state.retired.insert(id);
            }
        }
        Ok(())
    }

    /// Serve queued requests with newly constructed resources while there is room.
    fn cycle(self: &Arc<Self>, state: &mut PoolState<T, A>) {
        self.log.debug(&format!(
            "Cycling queue: pending={} tracked={} max={}",
            state.pending.len(),
            state.items.len(),
            self.max_size
        ));

        while state.items.len() < self.max_size {
            let Some(waiter) = state.pending.pop_front() else {
                break;
            };
            if waiter.sender.is_closed() {
                continue;
            }

            match self.construct(state, waiter.args) {
                Ok(pooled) => match waiter.sender.send(Ok(pooled)) {
                    Ok(()) => MetricsTracker::incr(&self.metrics.total_acquired),
                    // the waiter gave up while the resource was being built
                    Err(returned) => {
                        if let Ok(returned) = returned {
                            let id = returned.id;
                            if let Some(resource) = returned.into_resource() {
                                self.hand_back(state, id, resource);
                            }
                        }
                    }
                },
                Err(err) => {
                    let _ = waiter.sender.send(Err(err));
                }
            }
        }
    }

    fn sweep(self: &Arc<Self>) -> PoolResult<SweepReport> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.destroyed {
            return Err(PoolError::PoolDestroyed);
        }

        let mut report = SweepReport::default();
        let mut invalid = Vec::new();
        let mut ids: Vec<ItemId> = state.items.keys().copied().collect();
        ids.sort();

        for id in ids {
            let Some(item) = state.items.get_mut(&id) else {
                continue;
            };
            match item.resource {
                Some(ref resource) => {
                    if !self.hooks.is_valid(resource) {
                        invalid.push(id);
                    }
                }
                // checked out: validated when it comes back
                None => {
                    item.revalidate = true;
                    report.flagged += 1;
                }
            }
        }

        for id in invalid {
            MetricsTracker::incr(&self.metrics.validation_failures);
            self.log.warn(&format!("Sweep found invalid resource {id}"));
            if self.destroy_item(state, id).is_ok() {
                report.destroyed += 1;
            }
        }

        MetricsTracker::incr(&self.metrics.sweeps);
        if report.destroyed > 0 {
            self.cycle(state);
        }
        Ok(report)
    }

    fn run_scheduled_sweep(self: &Arc<Self>) -> bool {
        match self.sweep() {
            Ok(report) if report.destroyed > 0 => {
                self.log.info(&format!("Sweep destroyed {} invalid resources", report.destroyed));
                true
            }
            Ok(_) => true,
            Err(_) => false,
        }
    }

    fn teardown(&self) -> PoolResult<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.destroyed {
            self.log.warn("destroy called on a destroyed pool");
            return Err(PoolError::PoolDestroyed);
        }
        state.destroyed = true;
        self.log.debug("Destroying pool");

        if let Some(sweeper) = state.sweeper.take() {
            sweeper.abort();
        }

        self.log.debug(&format!("Rejecting {} pending requests", state.pending.len()));
        for waiter in state.pending.drain(..) {
            let _ = waiter.sender.send(Err(PoolError::PoolDestroyed));
        }

        let mut ids: Vec<ItemId> = state.items.keys().copied().collect();
        ids.sort();
        self.log.debug(&format!("Destroying {} pooled resources", ids.len()));
        for id in ids {
            let _ = self.destroy_item(state, id);
        }
        state.idle.clear();

        self.log.debug("Done");
        Ok(())
    }
}

/// An async pool of lazily created, reusable resources
///
/// Hooks and the logger run while the pool's state lock is held. They must
/// not call back into the pool, directly or by dropping a [`Pooled`] guard:
/// the lock is not reentrant and doing so deadlocks.
///
/// # Examples
///
/// ```
/// use stockpool::{Pool, PoolConfiguration};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let pool = Pool::new(
///     PoolConfiguration::new()
///         .with_create(|| Vec::<u8>::with_capacity(1024))
///         .with_uninit(|buf: &mut Vec<u8>| buf.clear())
///         .with_max_size(2),
/// )
/// .unwrap();
///
/// let mut buf = pool.acquire(()).await.unwrap();
/// buf.extend_from_slice(b"hello");
/// let id = buf.id();
/// pool.release(buf).unwrap();
///
/// let buf = pool.acquire(()).await.unwrap();
/// assert_eq!(buf.id(), id);
/// assert!(buf.is_empty());
/// # }
/// ```
pub struct Pool<T: Send + 'static, A: Send + 'static = ()> {
    shared: Arc<Shared<T, A>>,
}

impl<T: Send + 'static, A: Send + 'static> Pool<T, A> {
    /// Create a pool. Fails when the configuration has no `create` hook.
    ///
    /// Idle eviction and the sweep run on the tokio runtime current at
    /// construction; without one they are disabled. That runtime must have
    /// its time driver enabled (`enable_time` or `enable_all` on the
    /// builder). Otherwise every timer task panics inside the runtime and
    /// no idle resource is ever evicted, while acquire and release keep
    /// working.
    pub fn new(config: PoolConfiguration<T, A>) -> PoolResult<Self> {
        config.validate()?;
        let hooks = config.build_hooks()?;
        let log = config.logger();
        let runtime = Handle::try_current().ok();

        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState::new()),
            hooks,
            log,
            metrics: MetricsTracker::new(),
            runtime,
            max_size: config.max_size,
            min_idle: config.min_idle,
            idle_timeout: config.idle_timeout,
            max_validation_retries: config.max_validation_retries,
        });

        match (shared.runtime.as_ref(), config.cleanup_interval) {
            (Some(runtime), Some(period)) if shared.hooks.has_validator() => {
                let weak = Arc::downgrade(&shared);
                let sweeper = spawn_sweeper(runtime, period, move || match weak.upgrade() {
                    Some(shared) => shared.run_scheduled_sweep(),
                    None => false,
                });
                shared.state.lock().sweeper = Some(sweeper);
            }
            (None, _) => {
                shared
                    .log
                    .warn("No tokio runtime available; idle eviction and sweeps are disabled");
            }
            _ => {}
        }

        shared.log.debug("Created new pool");
        Ok(Self { shared })
    }

    /// Acquire a resource, waiting in FIFO order when the pool is exhausted.
    ///
    /// `args` is passed to the `init` hook. The returned future fails with
    /// [`PoolError::PoolDestroyed`] if the pool is torn down first.
    pub fn acquire(&self, args: A) -> Acquire<T, A> {
        self.shared.acquire(args)
    }

    /// Acquire without queueing
    pub fn try_acquire(&self, args: A) -> PoolResult<Pooled<T, A>> {
        self.shared.try_acquire(args)
    }

    /// Acquire, then apply `then` to the resource
    pub fn acquire_then<F, R>(&self, args: A, then: F) -> impl Future<Output = PoolResult<R>> + use<T, A, F, R>
    where
        F: FnOnce(Pooled<T, A>) -> R,
    {
        let acquire = self.acquire(args);
        async move { acquire.await.map(then) }
    }

    /// Return a resource to circulation.
    ///
    /// A guard from another pool is rejected with
    /// [`PoolError::InvalidRelease`] and goes back to its own pool instead.
    pub fn release(&self, obj: Pooled<T, A>) -> PoolResult<()> {
        if !Arc::ptr_eq(&obj.pool, &self.shared) {
            self.shared
                .log
                .warn(&format!("release: item {} belongs to another pool", obj.id));
            return Err(PoolError::InvalidRelease(obj.id));
        }
        obj.release()
    }

    /// Run a validity sweep now
    pub fn sweep(&self) -> PoolResult<SweepReport> {
        self.shared.sweep()
    }

    /// Tear the pool down: reject queued requests and destroy every resource.
    ///
    /// Every queued [`Acquire`] resolves to [`PoolError::PoolDestroyed`] and
    /// idle resources go through the `destroy` hook immediately.
    ///
    /// Resources still checked out cannot be destroyed here because their
    /// guards own them. They stop being tracked now, and the `destroy` hook
    /// runs on each of them exactly once, when its guard is released or
    /// dropped. That release returns [`PoolError::PoolDestroyed`]. Once every
    /// guard has come back, the hook has run once for every resource the
    /// pool created and had not already destroyed.
    pub fn destroy(&self) -> PoolResult<()> {
        self.shared.teardown()
    }

    /// Get health status
    pub fn status(&self) -> HealthStatus {
        let state = self.shared.state.lock();
        HealthStatus::new(state.occupancy(self.shared.max_size), state.destroyed)
    }

    /// Get pool metrics
    pub fn get_metrics(&self) -> PoolMetrics {
        let occupancy = self.shared.state.lock().occupancy(self.shared.max_size);
        self.shared.metrics.get_metrics(occupancy)
    }

    /// Export metrics
    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.get_metrics().export()
    }

    /// Export metrics in Prometheus format
    pub fn export_metrics_prometheus(
        &self,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        MetricsExporter::export_prometheus(&self.get_metrics(), pool_name, tags)
    }

    /// Get tracked count
    pub fn tracked_count(&self) -> usize {
        self.shared.state.lock().items.len()
    }

    /// Get idle count
    pub fn idle_count(&self) -> usize {
        self.shared.state.lock().idle.len()
    }

    /// Get pending request count
    pub fn pending_count(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.state.lock().destroyed
    }
}

impl<T: Send + 'static, A: Send + 'static> Drop for Pool<T, A> {
    fn drop(&mut self) {
        if !self.is_destroyed() {
            let _ = self.shared.teardown();
        }
    }
}
