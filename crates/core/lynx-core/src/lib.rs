//! Core primitives shared by the Lynx driver crates.
//!
//! This crate contains the host-testable pieces every driver leans on:
//! leveled logging through a pluggable sink, spin-based locking, the
//! single-slot deferred work item used for interrupt-triggered recovery,
//! and a handful of bit-manipulation helpers.
//!
//! Nothing here touches hardware, so it builds and tests on the host with
//! `cargo test` and under loom.

#![cfg_attr(not(any(test, feature = "capture")), no_std)]
#![warn(missing_docs)]

pub mod bits;
pub mod cell;
pub mod log;
pub mod static_assert;
pub mod sync;
pub mod work;
