//! Loom compatibility shim.
//!
//! Under `cfg(loom)` the atomics come from loom so the state machines built
//! on them can be model-checked. Otherwise they are the `core` atomics.

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicU8, AtomicU64, Ordering};

#[cfg(not(loom))]
pub(crate) use core::sync::atomic::{AtomicU8, AtomicU64, Ordering};
