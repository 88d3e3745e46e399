//! Base driver trait and metadata types.

/// The kind of hardware a driver manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverType {
    /// Interrupt controller or MSI domain.
    InterruptController,
    /// PCIe host bridge / root complex.
    PciHost,
    /// MDIO bus controller.
    Mdio,
    /// Ethernet switch or MAC.
    Network,
}

/// Static metadata describing a driver.
#[derive(Debug, Clone, Copy)]
pub struct DriverInfo {
    /// Short name of the driver (e.g. "layerscape-pcie-gen4").
    pub name: &'static str,
    /// The kind of hardware this driver manages.
    pub driver_type: DriverType,
    /// Human-readable description.
    pub description: &'static str,
}

/// Base trait that all drivers implement to provide identity and metadata.
pub trait Driver {
    /// Returns static information about this driver.
    fn info(&self) -> DriverInfo;
}
