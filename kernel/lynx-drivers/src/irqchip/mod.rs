//! Interrupt controller drivers.

pub mod its_fsl_mc_msi;
