//! Typed register access for the Lynx drivers.
//!
//! Register blocks are generated by [`register_block!`] and are generic over
//! a [`RegisterIo`] backend. On hardware the backend is an [`MmioWindow`]
//! (possibly wrapped in [`Endian`] for big-endian IP blocks); in host tests
//! it is [`mock::MockRegisters`].
//!
//! # Example
//!
//! ```ignore
//! use lynx_mmio::{register_block, RegisterIo};
//!
//! register_block! {
//!     /// PCIe PF control block.
//!     pub PfRegs {
//!         [0x018; u32; rw] int_stat,
//!         [0x7fc; u32; rw] dbg,
//!     }
//! }
//!
//! let pf = PfRegs::new(csr.at(0xc0000));
//! let ltssm = pf.dbg() & 0x3f;
//! ```

#![cfg_attr(not(any(test, feature = "mock")), no_std)]
#![warn(missing_docs)]

extern crate self as lynx_mmio;

mod io;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod window;

pub use io::{Endian, Endianness, RegisterIo, SubWindow};
pub use lynx_mmio_macros::register_block;
pub use window::MmioWindow;
