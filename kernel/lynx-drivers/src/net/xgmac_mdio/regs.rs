//! QorIQ 10G MDIO controller registers.
//!
//! The block is 16 words; only the last four are used.

use bitflags::bitflags;
use lynx_mmio::register_block;

bitflags! {
    /// `MDIO_STAT`: configuration and status.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MdioStat: u32 {
        /// Transaction in progress.
        const BSY = 1 << 0;
        /// The last read got no answer.
        const RD_ER = 1 << 1;
        /// Clause 45 framing.
        const ENC = 1 << 6;
    }
}

/// `MDIO_CTL`: start a read.
pub const MDIO_CTL_READ: u32 = 1 << 15;

/// `MDIO_CTL` device (MMD or Clause 22 register) address field.
pub const fn ctl_dev_addr(dev_addr: u32) -> u32 {
    dev_addr & 0x1f
}

/// `MDIO_CTL` port (PHY) address field.
pub const fn ctl_port_addr(phy_addr: u32) -> u32 {
    (phy_addr & 0x1f) << 5
}

/// `MDIO_STAT` clock divider field.
pub const fn stat_clkdiv(div: u32) -> u32 {
    ((div >> 1) & 0xff) << 8
}

register_block! {
    /// The controller register block.
    pub XgmacRegs {
        /// Configuration and status.
        [0x30; u32; rw] stat => MdioStat,
        /// Control: port and device address, read strobe.
        [0x34; u32; rw] ctl,
        /// Data.
        [0x38; u32; rw] data,
        /// Clause 45 register address.
        [0x3c; u32; rw] addr,
    }
}
