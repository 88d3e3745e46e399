//! MDIO bus contract.

use crate::error::DriverError;

/// Flag in a register number selecting a Clause 45 access.
///
/// Clause 45 register numbers carry the MMD (device address) in bits 16..21
/// and the register address in bits 0..16.
pub const MII_ADDR_C45: u32 = 1 << 30;

/// Number of PHY addresses on an MDIO bus.
pub const PHY_MAX_ADDR: u8 = 32;

/// Builds a Clause 45 register number.
#[must_use]
pub const fn mii_c45_regnum(devad: u8, reg: u16) -> u32 {
    MII_ADDR_C45 | ((devad as u32 & 0x1f) << 16) | reg as u32
}

/// An MDIO bus master.
pub trait MdioBus {
    /// Bus identifier shown by the host.
    fn name(&self) -> &str;

    /// Reads register `regnum` of the PHY at `phy_addr`.
    ///
    /// # Errors
    ///
    /// [`DriverError::Timeout`] if the controller stays busy.
    fn read(&self, phy_addr: u8, regnum: u32) -> Result<u16, DriverError>;

    /// Writes register `regnum` of the PHY at `phy_addr`.
    ///
    /// # Errors
    ///
    /// [`DriverError::Timeout`] if the controller stays busy.
    fn write(&self, phy_addr: u8, regnum: u32, value: u16) -> Result<(), DriverError>;
}

/// A PHY declared by firmware rather than discovered by scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhyDescriptor {
    /// Address on the bus.
    pub addr: u8,
    /// Clause 22 PHY identifier (`id1 << 16 | id2`).
    pub phy_id: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c45_regnum_layout() {
        let regnum = mii_c45_regnum(1, 0x0007);
        assert_eq!(regnum & MII_ADDR_C45, MII_ADDR_C45);
        assert_eq!((regnum >> 16) & 0x1f, 1);
        assert_eq!(regnum & 0xffff, 0x0007);
    }
}
