//! Write-once cell for values latched from hardware at init time.
//!
//! Hardware identity (silicon revision, capability words) is read once
//! during probe and never changes afterwards. [`WriteOnce`] stores such a
//! value behind `&self`, rejects any second write, and can be read from
//! interrupt and deferred-work context without locking.

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;

use crate::sync::loom_compat::{AtomicU8, Ordering};

const EMPTY: u8 = 0;
const WRITING: u8 = 1;
const READY: u8 = 2;

/// A cell that can be written exactly once and read any number of times.
pub struct WriteOnce<T: Copy> {
    state: AtomicU8,
    value: UnsafeCell<MaybeUninit<T>>,
}

// SAFETY: The value is written by exactly one thread (the one that wins the
// EMPTY -> WRITING transition) and only read after READY is published with
// Release ordering.
unsafe impl<T: Copy + Send> Send for WriteOnce<T> {}
// SAFETY: Same as above.
unsafe impl<T: Copy + Send + Sync> Sync for WriteOnce<T> {}

impl<T: Copy> WriteOnce<T> {
    /// Creates an empty cell.
    #[cfg(not(loom))]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// Creates an empty cell.
    #[cfg(loom)]
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// Stores `value` if the cell is empty.
    ///
    /// Returns `Err(value)` if the cell was already written (or a write is
    /// in progress on another CPU).
    pub fn set(&self, value: T) -> Result<(), T> {
        if self
            .state
            .compare_exchange(EMPTY, WRITING, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(value);
        }
        // SAFETY: Winning the CAS gives this thread exclusive write access.
        unsafe { (*self.value.get()).write(value) };
        self.state.store(READY, Ordering::Release);
        Ok(())
    }

    /// Returns the stored value, or `None` if nothing was written yet.
    pub fn get(&self) -> Option<T> {
        if self.state.load(Ordering::Acquire) == READY {
            // SAFETY: READY is only published after the value is initialized,
            // and the value is never written again.
            Some(unsafe { (*self.value.get()).assume_init() })
        } else {
            None
        }
    }
}

impl<T: Copy> Default for WriteOnce<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + core::fmt::Debug> core::fmt::Debug for WriteOnce<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("WriteOnce").field(&self.get()).finish()
    }
}
