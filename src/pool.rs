//! Generic object pool for per-tick scratch structures
//!
//! Bounds garbage from perception snapshots and steering scratch buffers.
//! Exhaustion degrades to direct construction: `acquire` never blocks and
//! never fails.

use std::sync::Mutex;

/// Counters exposed for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Objects built fresh by the factory
    pub created: u64,
    /// Acquisitions served from the free shelf
    pub reused: u64,
    /// Releases dropped because the shelf was full
    pub dropped: u64,
    /// Objects currently on the free shelf
    pub free: usize,
    /// Shelf capacity
    pub capacity: usize,
}

/// Bounded pool of reusable `T`s
pub struct ObjectPool<T> {
    factory: Box<dyn Fn() -> T + Send + Sync>,
    reset: Box<dyn Fn(&mut T) + Send + Sync>,
    inner: Mutex<PoolInner<T>>,
    capacity: usize,
}

struct PoolInner<T> {
    free: Vec<T>,
    created: u64,
    reused: u64,
    dropped: u64,
}

impl<T> ObjectPool<T> {
    pub fn new<F, R>(capacity: usize, factory: F, reset: R) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        R: Fn(&mut T) + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            reset: Box::new(reset),
            inner: Mutex::new(PoolInner {
                free: Vec::with_capacity(capacity.min(64)),
                created: 0,
                reused: 0,
                dropped: 0,
            }),
            capacity,
        }
    }

    /// Take an object off the shelf, or build one if the shelf is empty
    pub fn acquire(&self) -> T {
        // A poisoned lock means another thread panicked mid-push; the
        // shelf contents are still valid objects, so keep serving.
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(obj) = inner.free.pop() {
            inner.reused += 1;
            return obj;
        }
        inner.created += 1;
        drop(inner);
        (self.factory)()
    }

    /// Reset and return an object; dropped silently when the shelf is full
    pub fn release(&self, mut obj: T) {
        (self.reset)(&mut obj);
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.free.len() < self.capacity {
            inner.free.push(obj);
        } else {
            inner.dropped += 1;
        }
    }

    pub fn stats(&self) -> PoolStats {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        PoolStats {
            created: inner.created,
            reused: inner.reused,
            dropped: inner.dropped,
            free: inner.free.len(),
            capacity: self.capacity,
        }
    }
}
