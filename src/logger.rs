//! Pluggable logging for pool lifecycle events

/// Sink for the pool's lifecycle messages.
///
/// Implementations are called while the pool's state lock is held, so they
/// must not call back into the pool.
///
/// # Examples
///
/// ```
/// use stockpool::{PoolConfiguration, PoolLogger};
/// use std::sync::Arc;
///
/// struct Stdout;
///
/// impl PoolLogger for Stdout {
///     fn debug(&self, message: &str) { println!("debug: {message}"); }
///     fn info(&self, message: &str) { println!("info: {message}"); }
///     fn warn(&self, message: &str) { println!("warn: {message}"); }
///     fn error(&self, message: &str) { println!("error: {message}"); }
/// }
///
/// let config = PoolConfiguration::<u32>::new()
///     .with_create(|| 7)
///     .with_logger(Arc::new(Stdout));
/// ```
pub trait PoolLogger: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards pool messages to `tracing` under the `stockpool` target.
///
/// Nothing is emitted until the host application installs a subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl PoolLogger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "stockpool", "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "stockpool", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "stockpool", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "stockpool", "{}", message);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl PoolLogger for NoopLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}
