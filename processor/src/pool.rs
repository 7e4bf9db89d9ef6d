//! Free-list pool for processor instances.
//!
//! Taking moves the instance out under the lock, so at most one holder can
//! ever own a slot. Pooling only saves allocations between passes; dropping
//! an instance instead of returning it is always correct.

use std::sync::{Mutex, PoisonError};

pub struct Pool<T> {
    slots: Mutex<Vec<T>>,
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
        }
    }

    /// Take a recycled instance, if one is available.
    pub fn take(&self) -> Option<T> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
    }

    /// Return an instance for reuse.
    pub fn put(&self, item: T) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(item);
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn take_from_empty_is_none() {
        let pool: Pool<u32> = Pool::new();
        assert!(pool.take().is_none());
    }

    #[test]
    fn put_then_take_roundtrips() {
        let pool = Pool::new();
        pool.put(7u32);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.take(), Some(7));
        assert!(pool.take().is_none());
    }

    #[test]
    fn each_instance_has_one_holder() {
        let pool = Arc::new(Pool::new());
        pool.put(1u32);
        pool.put(2u32);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = pool.clone();
                std::thread::spawn(move || pool.take())
            })
            .collect();
        let taken: Vec<u32> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();
        assert_eq!(taken.len(), 2);
        assert_ne!(taken[0], taken[1]);
    }
}
