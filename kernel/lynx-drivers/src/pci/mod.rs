//! PCIe host bridge drivers.

pub mod layerscape_gen4;
pub mod mobiveil;
