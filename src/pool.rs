//! Reusable-instance queue for short-lived entities.
//!
//! `get` hands out a parked instance when one is available and otherwise
//! allocates through the factory; the pool never caps its size. Instances
//! are moved in and out by value, so the pool cannot tell whether a returned
//! value ever came from it. That is the caller's business.

use std::collections::VecDeque;

/// Lifecycle hooks run when an instance leaves or re-enters the pool.
pub trait Poolable {
    fn activate(&mut self);
    fn deactivate(&mut self);
}

pub struct ObjectPool<T> {
    available: VecDeque<T>,
    factory: Box<dyn Fn() -> T>,
    allocated: usize,
}

impl<T: Poolable> ObjectPool<T> {
    /// Build a pool pre-filled with `initial_size` inactive instances.
    pub fn new(initial_size: usize, factory: impl Fn() -> T + 'static) -> Self {
        let mut pool = ObjectPool {
            available: VecDeque::with_capacity(initial_size),
            factory: Box::new(factory),
            allocated: 0,
        };
        for _ in 0..initial_size {
            let mut item = pool.allocate();
            item.deactivate();
            pool.available.push_back(item);
        }
        pool
    }

    fn allocate(&mut self) -> T {
        self.allocated += 1;
        (self.factory)()
    }

    pub fn get(&mut self) -> T {
        let mut item = match self.available.pop_front() {
            Some(item) => item,
            None => self.allocate(),
        };
        item.activate();
        item
    }

    pub fn return_to_pool(&mut self, mut item: T) {
        item.deactivate();
        self.available.push_back(item);
    }

    /// Instances parked and ready for reuse.
    pub fn available(&self) -> usize {
        self.available.len()
    }

    /// Distinct instances ever created by this pool.
    pub fn allocated(&self) -> usize {
        self.allocated
    }
}
