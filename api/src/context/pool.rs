//! Bounded free-list of request contexts

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam::queue::ArrayQueue;

use super::RequestContext;

/// Lock-free pool of [`RequestContext`]s shared by every worker.
///
/// `acquire` never blocks: an empty pool allocates a fresh context. Contexts
/// released into a full pool are dropped.
#[derive(Clone)]
pub struct ContextPool {
    free: Arc<ArrayQueue<Box<RequestContext>>>,
    allocated: Arc<AtomicUsize>,
}

impl ContextPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Arc::new(ArrayQueue::new(capacity.max(1))),
            allocated: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Take a cleared context, reusing an idle one when available
    pub fn acquire(&self) -> PooledContext {
        let ctx = self.free.pop().unwrap_or_else(|| {
            self.allocated.fetch_add(1, Ordering::Relaxed);
            Box::default()
        });
        PooledContext {
            ctx: Some(ctx),
            free: Arc::clone(&self.free),
        }
    }

    pub fn capacity(&self) -> usize {
        self.free.capacity()
    }

    /// Contexts currently waiting in the pool
    pub fn idle(&self) -> usize {
        self.free.len()
    }

    /// Contexts allocated over the pool's lifetime
    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for ContextPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextPool")
            .field("capacity", &self.capacity())
            .field("idle", &self.idle())
            .field("allocated", &self.allocated())
            .finish()
    }
}

/// Exclusive handle on a pooled context.
///
/// Dropping it clears the context and returns it to the pool, on normal
/// completion and while unwinding alike.
pub struct PooledContext {
    ctx: Option<Box<RequestContext>>,
    free: Arc<ArrayQueue<Box<RequestContext>>>,
}

impl Deref for PooledContext {
    type Target = RequestContext;

    fn deref(&self) -> &RequestContext {
        // Only `drop` empties the slot
        self.ctx.as_deref().unwrap_or_else(|| unreachable!("context used after release"))
    }
}

impl DerefMut for PooledContext {
    fn deref_mut(&mut self) -> &mut RequestContext {
        self.ctx
            .as_deref_mut()
            .unwrap_or_else(|| unreachable!("context used after release"))
    }
}

impl Drop for PooledContext {
    fn drop(&mut self) {
        if let Some(mut ctx) = self.ctx.take() {
            ctx.reset();
            // A full pool simply drops the surplus context
            let _ = self.free.push(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tg_core::domain::Identity;

    #[test]
    fn test_context_is_reused_and_cleared() {
        let pool = ContextPool::new(1);

        let first_addr = {
            let mut ctx = pool.acquire();
            ctx.set_identity(Identity::new(1, "alice"));
            ctx.payload("done");
            &*ctx as *const RequestContext as usize
        };
        assert_eq!(pool.idle(), 1);

        let ctx = pool.acquire();
        assert_eq!(&*ctx as *const RequestContext as usize, first_addr);
        assert!(ctx.identity().is_none());
        assert!(!ctx.is_responded());
        assert_eq!(pool.allocated(), 1);
    }

    #[test]
    fn test_empty_pool_allocates_and_full_pool_drops() {
        let pool = ContextPool::new(1);
        let a = pool.acquire();
        let b = pool.acquire();
        assert_eq!(pool.allocated(), 2);

        drop(a);
        drop(b);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_released_while_unwinding() {
        let pool = ContextPool::new(4);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut ctx = pool.acquire();
            ctx.set_identity(Identity::new(2, "bob"));
            panic!("handler blew up");
        }));
        assert!(result.is_err());
        assert_eq!(pool.idle(), 1);
        assert!(pool.acquire().identity().is_none());
    }

    #[test]
    fn test_concurrent_acquire_release() {
        let pool = ContextPool::new(8);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let pool = pool.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let mut ctx = pool.acquire();
                        assert!(ctx.identity().is_none());
                        ctx.set_identity(Identity::new(i, "worker"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(pool.idle() <= pool.capacity());
    }
}
