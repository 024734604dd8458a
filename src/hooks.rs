//! Lifecycle hooks supplied by the pool owner

use std::sync::Arc;

pub(crate) type CreateFn<T> = Arc<dyn Fn() -> T + Send + Sync>;
pub(crate) type InitFn<T, A> = Arc<dyn Fn(&mut T, A) + Send + Sync>;
pub(crate) type UninitFn<T> = Arc<dyn Fn(&mut T) + Send + Sync>;
pub(crate) type DestroyFn<T> = Arc<dyn Fn(T) + Send + Sync>;
pub(crate) type ValidateFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// The resolved hook set a running pool calls into.
///
/// Every hook runs with the pool's state lock held.
pub(crate) struct Hooks<T, A> {
    create: CreateFn<T>,
    init: Option<InitFn<T, A>>,
    uninit: Option<UninitFn<T>>,
    destroy: Option<DestroyFn<T>>,
    is_valid: Option<ValidateFn<T>>,
}

impl<T, A> Hooks<T, A> {
    pub fn new(
        create: CreateFn<T>,
        init: Option<InitFn<T, A>>,
        uninit: Option<UninitFn<T>>,
        destroy: Option<DestroyFn<T>>,
        is_valid: Option<ValidateFn<T>>,
    ) -> Self {
        Self {
            create,
            init,
            uninit,
            destroy,
            is_valid,
        }
    }

    pub fn create(&self) -> T {
        (self.create)()
    }

    pub fn init(&self, resource: &mut T, args: A) {
        if let Some(ref init) = self.init {
            init(resource, args);
        }
    }

    pub fn uninit(&self, resource: &mut T) {
        if let Some(ref uninit) = self.uninit {
            uninit(resource);
        }
    }

    pub fn destroy(&self, resource: T) {
        match self.destroy {
            Some(ref destroy) => destroy(resource),
            None => drop(resource),
        }
    }

    /// Without a validator every resource is valid.
    pub fn is_valid(&self, resource: &T) -> bool {
        self.is_valid.as_ref().is_none_or(|check| check(resource))
    }

    pub fn has_validator(&self) -> bool {
        self.is_valid.is_some()
    }
}
