//! Platform drivers for NXP Layerscape SoCs.
//!
//! Each driver is a [`PlatformDriver`](lynx_driver_api::PlatformDriver) the
//! host kernel probes against a matching firmware node, plus whatever
//! subsystem contract it serves (PCI config access, MSI domains, MDIO).

#![cfg_attr(not(test), no_std)]

extern crate alloc;

// ── Subsystem modules ───────────────────────────────────────────────────

pub mod irqchip;
pub mod net;
pub mod pci;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use self::irqchip::its_fsl_mc_msi;
pub use self::net::{ocelot, xgmac_mdio};
pub use self::pci::{layerscape_gen4, mobiveil};

#[cfg(test)]
pub(crate) mod testutil;
