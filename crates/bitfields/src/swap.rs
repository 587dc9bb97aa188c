//! Atomically replaced active scene.
//!
//! ```text
//! rebuild ──build new──> store() ──swap Arc──> [current] <── load() ── frame
//!                                    │
//!                                    └── old Arc dropped when the last
//!                                        in-flight frame releases it
//! ```
//!
//! Readers clone the `Arc` under a short read lock and never hold the lock
//! while drawing, so a rebuild never waits on a frame and a frame never
//! sees a half-replaced scene.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Slot holding the current value of `T`.
pub struct SwapSlot<T> {
    current: RwLock<Option<Arc<T>>>,
    generation: AtomicU64,
}

impl<T> SwapSlot<T> {
    /// Empty slot, generation 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current value.
    #[must_use]
    pub fn load(&self) -> Option<Arc<T>> {
        self.current.read().clone()
    }

    /// Publishes a fully built value. Returns the new snapshot and the
    /// previous one, if any.
    pub fn store(&self, value: T) -> (Arc<T>, Option<Arc<T>>) {
        let next = Arc::new(value);
        let previous = self.current.write().replace(Arc::clone(&next));
        self.generation.fetch_add(1, Ordering::Release);
        (next, previous)
    }

    /// Number of values published so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Returns true if nothing has been published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.read().is_none()
    }
}

impl<T> Default for SwapSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for SwapSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapSlot")
            .field("generation", &self.generation())
            .field("occupied", &!self.is_empty())
            .finish()
    }
}
