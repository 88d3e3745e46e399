//! Synchronization primitives for the drivers.
//!
//! [`SpinLock`] is const-constructable and usable from interrupt context.
//! The loom shim lets the lock-free pieces of this crate run under loom's
//! deterministic scheduler without code changes.

mod spinlock;

pub(crate) mod loom_compat;

pub use spinlock::{SpinLock, SpinLockGuard};
