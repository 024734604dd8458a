//! Error types for the resource pool

use crate::pool::ItemId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Invalid pool configuration: {0}")]
    Configuration(&'static str),

    #[error("Released item {0} is not tracked by this pool")]
    InvalidRelease(ItemId),

    #[error("Released item {0} was not in use")]
    NotInUse(ItemId),

    #[error("Cannot destroy item {0}: not tracked by this pool")]
    UnknownItem(ItemId),

    #[error("Pool destroyed")]
    PoolDestroyed,

    #[error("Newly created resource failed validation")]
    ValidationFailed,

    #[error("Gave up after {0} idle resources failed validation")]
    RetriesExhausted(usize),

    #[error("Pool is at maximum capacity")]
    PoolExhausted,
}

pub type PoolResult<T> = Result<T, PoolError>;
