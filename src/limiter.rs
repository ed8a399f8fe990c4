//! Counting permit pool used to bound the number of in-flight Elasticsearch requests.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, SemaphorePermit};

/// Default number of requests allowed in flight at once.
pub const DEFAULT_CAPACITY: usize = 10;

/// Fixed-capacity pool of permits.
///
/// Waiters are served in first-come, first-served order, so a caller cannot be starved
/// by others repeatedly grabbing freed permits. Cloning the pool shares the same permits.
#[derive(Debug, Clone)]
pub struct PermitPool {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// Permit borrowed from a [`PermitPool`]; returned to the pool when dropped.
#[derive(Debug)]
pub struct Permit<'a> {
    _permit: SemaphorePermit<'a>,
}

/// Permit that can be moved to another task; returned to the pool when dropped.
#[derive(Debug)]
pub struct OwnedPermit {
    _permit: OwnedSemaphorePermit,
}

/// Error returned when waiting for a permit is aborted because the pool was [closed](PermitPool::close).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("interrupted while waiting for a permit")]
pub struct Interrupted;

impl PermitPool {
    pub fn new(capacity: usize) -> Self {
        Self { semaphore: Arc::new(Semaphore::new(capacity)), capacity }
    }

    /// Waits until a permit is available.
    pub async fn get_permit(&self) -> Result<Permit<'_>, Interrupted> {
        self.semaphore
            .acquire()
            .await
            .map(|permit| Permit { _permit: permit })
            .map_err(|_| Interrupted)
    }

    /// Waits until a permit is available, returning a permit that is not tied to the pool's lifetime.
    pub async fn get_owned_permit(&self) -> Result<OwnedPermit, Interrupted> {
        Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map(|permit| OwnedPermit { _permit: permit })
            .map_err(|_| Interrupted)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of permits that can currently be acquired without waiting.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Number of permits currently held.
    pub fn in_use(&self) -> usize {
        self.capacity - self.available()
    }

    /// Closes the pool: current and future waiters fail with [`Interrupted`].
    ///
    /// Permits already held are unaffected and are still returned when dropped.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }
}

impl Default for PermitPool {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
