//! Pool configuration options

use crate::errors::{PoolError, PoolResult};
use crate::hooks::{CreateFn, DestroyFn, Hooks, InitFn, UninitFn, ValidateFn};
use crate::logger::{PoolLogger, TracingLogger};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for pool behavior and the resource lifecycle hooks
///
/// `T` is the pooled resource, `A` the argument handed to the `init` hook on
/// every acquisition.
///
/// # Examples
///
/// ```
/// use stockpool::PoolConfiguration;
/// use std::time::Duration;
///
/// let config = PoolConfiguration::<String>::new()
///     .with_create(String::new)
///     .with_max_size(3)
///     .with_min_idle(1)
///     .with_idle_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.max_size, 3);
/// assert_eq!(config.min_idle, 1);
/// assert_eq!(config.cleanup_interval, None);
/// ```
pub struct PoolConfiguration<T, A = ()> {
    /// Maximum number of resources the pool tracks at once
    pub max_size: usize,

    /// Idle resources kept without an eviction timer
    pub min_idle: usize,

    /// How long a surplus idle resource survives before it is destroyed
    pub idle_timeout: Duration,

    /// Interval of the validity sweep; only runs when a validator is set
    pub cleanup_interval: Option<Duration>,

    /// How many invalid idle resources one acquisition discards before failing
    pub max_validation_retries: usize,

    create: Option<CreateFn<T>>,
    init: Option<InitFn<T, A>>,
    uninit: Option<UninitFn<T>>,
    destroy: Option<DestroyFn<T>>,
    validation_function: Option<ValidateFn<T>>,
    logger: Arc<dyn PoolLogger>,
}

impl<T, A> Default for PoolConfiguration<T, A> {
    fn default() -> Self {
        Self {
            max_size: 10,
            min_idle: 0,
            idle_timeout: Duration::from_secs(30),
            cleanup_interval: None,
            max_validation_retries: 8,
            create: None,
            init: None,
            uninit: None,
            destroy: None,
            validation_function: None,
            logger: Arc::new(TracingLogger),
        }
    }
}

impl<T, A> Clone for PoolConfiguration<T, A> {
    fn clone(&self) -> Self {
        Self {
            max_size: self.max_size,
            min_idle: self.min_idle,
            idle_timeout: self.idle_timeout,
            cleanup_interval: self.cleanup_interval,
            max_validation_retries: self.max_validation_retries,
            create: self.create.clone(),
            init: self.init.clone(),
            uninit: self.uninit.clone(),
            destroy: self.destroy.clone(),
            validation_function: self.validation_function.clone(),
            logger: Arc::clone(&self.logger),
        }
    }
}

impl<T, A> fmt::Debug for PoolConfiguration<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfiguration")
            .field("max_size", &self.max_size)
            .field("min_idle", &self.min_idle)
            .field("idle_timeout", &self.idle_timeout)
            .field("cleanup_interval", &self.cleanup_interval)
            .field("max_validation_retries", &self.max_validation_retries)
            .field("has_create", &self.create.is_some())
            .field("has_validation", &self.validation_function.is_some())
            .finish_non_exhaustive()
    }
}

impl<T, A> PoolConfiguration<T, A> {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resource factory. Required.
    pub fn with_create<F>(mut self, create: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.create = Some(Arc::new(create));
        self
    }

    /// Hook applied every time a resource is handed to a consumer
    pub fn with_init<F>(mut self, init: F) -> Self
    where
        F: Fn(&mut T, A) + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(init));
        self
    }

    /// Hook applied when a resource goes back to the idle queue
    pub fn with_uninit<F>(mut self, uninit: F) -> Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.uninit = Some(Arc::new(uninit));
        self
    }

    /// Hook that receives a resource just before the pool forgets it
    pub fn with_destroy<F>(mut self, destroy: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.destroy = Some(Arc::new(destroy));
        self
    }

    /// Validity predicate, checked on acquisition and by the sweep
    ///
    /// # Examples
    ///
    /// ```
    /// use stockpool::PoolConfiguration;
    /// use std::time::Duration;
    ///
    /// let config = PoolConfiguration::<Vec<u8>>::new()
    ///     .with_create(Vec::new)
    ///     .with_validation(|buf| buf.capacity() < 4096)
    ///     .with_cleanup_interval(Duration::from_secs(1));
    ///
    /// assert!(config.sweep_enabled());
    /// ```
    pub fn with_validation<F>(mut self, is_valid: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.validation_function = Some(Arc::new(is_valid));
        self
    }

    /// Set the maximum number of tracked resources
    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Set the idle reserve that is exempt from eviction
    pub fn with_min_idle(mut self, count: usize) -> Self {
        self.min_idle = count;
        self
    }

    /// Set the idle eviction delay
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Enable the periodic validity sweep
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = Some(interval);
        self
    }

    /// Bound the discard-and-retry loop on invalid idle resources
    pub fn with_max_validation_retries(mut self, retries: usize) -> Self {
        self.max_validation_retries = retries;
        self
    }

    /// Replace the default `tracing` logger
    pub fn with_logger(mut self, logger: Arc<dyn PoolLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Whether a sweep would run: needs both an interval and a validator
    pub fn sweep_enabled(&self) -> bool {
        self.cleanup_interval.is_some() && self.validation_function.is_some()
    }

    pub(crate) fn logger(&self) -> Arc<dyn PoolLogger> {
        Arc::clone(&self.logger)
    }

    pub(crate) fn validate(&self) -> PoolResult<()> {
        if self.create.is_none() {
            return Err(PoolError::Configuration("a create hook is required"));
        }
        if self.max_size == 0 {
            return Err(PoolError::Configuration("max_size must be at least 1"));
        }
        if self.cleanup_interval.is_some_and(|interval| interval.is_zero()) {
            return Err(PoolError::Configuration("cleanup interval must be non-zero"));
        }
        Ok(())
    }

    pub(crate) fn build_hooks(&self) -> PoolResult<Hooks<T, A>> {
        let create = self
            .create
            .clone()
            .ok_or(PoolError::Configuration("a create hook is required"))?;

        Ok(Hooks::new(
            create,
            self.init.clone(),
            self.uninit.clone(),
            self.destroy.clone(),
            self.validation_function.clone(),
        ))
    }
}
