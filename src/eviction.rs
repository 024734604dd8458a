//! Background timers: per-item idle eviction and the periodic sweep

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// An armed idle-eviction timer.
///
/// The epoch identifies this arming. A timer task that already woke up can
/// still be waiting on the state lock when it is cancelled, so the firing
/// side must compare epochs before destroying anything.
#[derive(Debug)]
pub(crate) struct IdleTimer {
    epoch: u64,
    handle: JoinHandle<()>,
}

impl IdleTimer {
    /// Sleep for `delay`, then run `on_fire` unless cancelled first
    pub fn arm<F>(runtime: &Handle, delay: Duration, epoch: u64, on_fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire();
        });
        Self { epoch, handle }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn cancel(self) {
        self.handle.abort();
    }
}

/// Run `tick` every `period`, starting one period from now, until it
/// returns `false`.
pub(crate) fn spawn_sweeper<F>(runtime: &Handle, period: Duration, mut tick: F) -> JoinHandle<()>
where
    F: FnMut() -> bool + Send + 'static,
{
    runtime.spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if !tick() {
                break;
            }
        }
    })
}
