//! Driver model for the Lynx platform drivers.
//!
//! This crate defines the contract between the drivers and the kernel that
//! hosts them:
//!
//! - **Resources**: [`IrqLine`], [`MemResource`] and firmware nodes
//!   ([`FwNode`]) describing what a device was given.
//! - **Identity**: the base [`Driver`] trait and [`DeviceMatch`] tables.
//! - **Categories**: [`PlatformDriver`], probed once per matching node.
//! - **Subsystem contracts**: IRQ/MSI domains ([`irq`]), PCI host bridges
//!   ([`pci`]), MDIO buses ([`mdio`]) and the [`KernelServices`] a driver may
//!   call back into.
//!
//! The kernel stays the caller: it matches nodes, probes drivers, delivers
//! interrupts and runs deferred work through these traits.

#![cfg_attr(not(any(test, feature = "mock")), no_std)]

pub mod category;
pub mod driver;
pub mod error;
pub mod fwnode;
pub mod irq;
pub mod mdio;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod pci;
pub mod resource;
pub mod services;

pub use category::PlatformDriver;
pub use driver::{Driver, DriverInfo, DriverType};
pub use error::DriverError;
pub use fwnode::{DeviceMatch, FwHandle, FwNode};
pub use irq::{IrqFlags, IrqHandler, IrqReturn};
pub use resource::{IrqLine, MappedRegion, MemResource};
pub use services::KernelServices;
