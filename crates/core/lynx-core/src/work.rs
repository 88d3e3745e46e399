//! Single-slot deferred work.
//!
//! A [`DelayedWork`] is one pending-or-not slot with a due time, packed into
//! a single atomic word:
//!
//! ```text
//!  63        62        61..0
//! PENDING  RUNNING   due time (µs)
//! ```
//!
//! Scheduling while the slot is already pending is coalesced: the caller
//! gets `false` and the original due time stands. The executor claims the
//! slot once the due time has passed; the claim clears `PENDING` (so the
//! work may be re-armed while it runs) and sets `RUNNING` until the
//! [`WorkClaim`] is dropped. At most one claim exists at a time.
//!
//! There is no cancellation.

use crate::sync::loom_compat::{AtomicU64, Ordering};

const PENDING: u64 = 1 << 63;
const RUNNING: u64 = 1 << 62;
const DUE_MASK: u64 = RUNNING - 1;

/// A single-slot, coalescing, delayed work item.
pub struct DelayedWork {
    state: AtomicU64,
}

impl DelayedWork {
    /// Creates an idle work slot.
    #[cfg(not(loom))]
    pub const fn new() -> Self {
        Self {
            state: AtomicU64::new(0),
        }
    }

    /// Creates an idle work slot.
    #[cfg(loom)]
    pub fn new() -> Self {
        Self {
            state: AtomicU64::new(0),
        }
    }

    /// Arms the slot to run `delay_us` after `now_us`.
    ///
    /// Returns `false` if the slot was already pending; the earlier request
    /// is kept unchanged.
    pub fn schedule(&self, now_us: u64, delay_us: u64) -> bool {
        let due = now_us.saturating_add(delay_us) & DUE_MASK;
        let mut cur = self.state.load(Ordering::Relaxed);
        loop {
            if cur & PENDING != 0 {
                return false;
            }
            let new = (cur & RUNNING) | PENDING | due;
            match self
                .state
                .compare_exchange_weak(cur, new, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return true,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Returns `true` if the slot is armed and not yet claimed.
    pub fn is_pending(&self) -> bool {
        self.state.load(Ordering::Acquire) & PENDING != 0
    }

    /// Returns `true` while a [`WorkClaim`] is alive.
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) & RUNNING != 0
    }

    /// Returns the due time of the pending request, if any.
    pub fn due_us(&self) -> Option<u64> {
        let cur = self.state.load(Ordering::Acquire);
        (cur & PENDING != 0).then_some(cur & DUE_MASK)
    }

    /// Claims the slot if it is pending, due at `now_us`, and not running.
    pub fn claim(&self, now_us: u64) -> Option<WorkClaim<'_>> {
        let mut cur = self.state.load(Ordering::Relaxed);
        loop {
            if cur & PENDING == 0 || cur & RUNNING != 0 || cur & DUE_MASK > now_us {
                return None;
            }
            match self
                .state
                .compare_exchange_weak(cur, RUNNING, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return Some(WorkClaim { work: self }),
                Err(actual) => cur = actual,
            }
        }
    }

    /// Claims the slot and runs `f` if it is due. Returns whether `f` ran.
    pub fn run_if_due(&self, now_us: u64, f: impl FnOnce()) -> bool {
        match self.claim(now_us) {
            Some(_claim) => {
                f();
                true
            }
            None => false,
        }
    }
}

impl Default for DelayedWork {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for DelayedWork {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DelayedWork")
            .field("pending", &self.is_pending())
            .field("running", &self.is_running())
            .finish()
    }
}

/// Exclusive right to execute a [`DelayedWork`]; clears `RUNNING` on drop.
#[must_use = "dropping the claim immediately marks the work as finished"]
pub struct WorkClaim<'a> {
    work: &'a DelayedWork,
}

impl Drop for WorkClaim<'_> {
    fn drop(&mut self) {
        self.work.state.fetch_and(!RUNNING, Ordering::Release);
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn schedule_coalesces_while_pending() {
        let work = DelayedWork::new();
        assert!(work.schedule(0, 1000));
        assert!(!work.schedule(500, 1000));
        assert_eq!(work.due_us(), Some(1000));
    }

    #[test]
    fn claim_waits_for_due_time() {
        let work = DelayedWork::new();
        work.schedule(100, 1000);
        assert!(work.claim(1099).is_none());
        let claim = work.claim(1100);
        assert!(claim.is_some());
        assert!(!work.is_pending());
        assert!(work.is_running());
        drop(claim);
        assert!(!work.is_running());
    }

    #[test]
    fn rearm_while_running() {
        let work = DelayedWork::new();
        work.schedule(0, 0);
        let claim = work.claim(0).unwrap();
        assert!(work.schedule(10, 1000));
        // Still running: a second claim must wait.
        assert!(work.claim(2000).is_none());
        drop(claim);
        assert!(work.run_if_due(2000, || {}));
        assert!(!work.is_pending());
    }

    #[test]
    fn idle_slot_never_runs() {
        let work = DelayedWork::new();
        let mut ran = false;
        assert!(!work.run_if_due(u64::MAX >> 2, || ran = true));
        assert!(!ran);
    }
}

#[cfg(all(test, loom))]
mod loom_tests {
    use super::*;
    use loom::sync::Arc;
    use loom::thread;

    #[test]
    fn concurrent_schedule_admits_one() {
        loom::model(|| {
            let work = Arc::new(DelayedWork::new());
            let other = work.clone();
            let t = thread::spawn(move || other.schedule(0, 1000));
            let a = work.schedule(0, 1000);
            let b = t.join().unwrap();
            assert!(a ^ b);
            assert!(work.is_pending());
        });
    }

    #[test]
    fn schedule_racing_claim_is_not_lost() {
        loom::model(|| {
            let work = Arc::new(DelayedWork::new());
            assert!(work.schedule(0, 0));
            let other = work.clone();
            let t = thread::spawn(move || other.schedule(5, 0));
            let claimed = work.claim(10).is_some();
            let rearmed = t.join().unwrap();
            assert!(claimed);
            assert_eq!(work.is_pending(), rearmed);
            assert!(!work.is_running());
        });
    }
}
