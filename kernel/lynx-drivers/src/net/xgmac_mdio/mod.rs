//! Freescale QorIQ 10G MDIO controller.
//!
//! One controller serves both Clause 22 and Clause 45 PHYs; the `ENC` bit in
//! `MDIO_STAT` selects the framing per access. Every step of a transaction
//! waits for `BSY` to clear by spinning at most [`BUSY_POLL_ATTEMPTS`] times.
//!
//! The register block is big-endian unless the node carries
//! `little-endian`. Parts with erratum A-011043 raise `RD_ER` spuriously, so
//! on those the data register is trusted regardless.

pub mod regs;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use lynx_core::{dev_dbg, dev_err};
use lynx_driver_api::fwnode::DeviceMatch;
use lynx_driver_api::mdio::{MdioBus, PhyDescriptor, MII_ADDR_C45, PHY_MAX_ADDR};
use lynx_driver_api::{
    Driver, DriverError, DriverInfo, DriverType, FwNode, KernelServices, MappedRegion,
    PlatformDriver,
};
use lynx_mmio::{Endian, Endianness, RegisterIo};

use self::regs::{ctl_dev_addr, ctl_port_addr, MdioStat, XgmacRegs, MDIO_CTL_READ};

/// Spins allowed while waiting for `BSY` to clear.
pub const BUSY_POLL_ATTEMPTS: u32 = 1000;

/// What the probe is handed.
pub struct XgmacMdioResources<'a, B, S> {
    /// The controller's firmware node.
    pub node: &'a dyn FwNode,
    /// Register block (`reg` entry 0).
    pub regs: Option<MappedRegion<B>>,
    /// Kernel services.
    pub services: &'a S,
}

/// A probed MDIO controller.
pub struct XgmacMdio<'a, B, S> {
    node: &'a dyn FwNode,
    regs: XgmacRegs<Endian<B>>,
    services: &'a S,
    bus_id: String,
    has_a011043: bool,
    phys: Vec<PhyDescriptor>,
}

/// Parses an ACPI PHY compatible string of the form
/// `ethernet-phy-idAAAA.BBBB` into a Clause 22 PHY id.
///
/// Each half is up to four hex digits; anything after the second half is
/// ignored.
pub fn parse_phy_id(compatible: &str) -> Option<u32> {
    let rest = compatible.strip_prefix("ethernet-phy-id")?;
    let (upper, rest) = hex4(rest)?;
    let (lower, _) = hex4(rest.strip_prefix('.')?)?;
    Some((upper << 16) | lower)
}

fn hex4(s: &str) -> Option<(u32, &str)> {
    let len = s
        .bytes()
        .take(4)
        .take_while(u8::is_ascii_hexdigit)
        .count();
    if len == 0 {
        return None;
    }
    let val = u32::from_str_radix(&s[..len], 16).ok()?;
    Some((val, &s[len..]))
}

impl<'a, B: RegisterIo, S: KernelServices> XgmacMdio<'a, B, S> {
    /// Bus identifier: the register block's physical address in hex.
    pub fn bus_id(&self) -> &str {
        &self.bus_id
    }

    /// Register byte order in use.
    pub fn endianness(&self) -> Endianness {
        self.regs.io().order()
    }

    /// Whether erratum A-011043 handling is active.
    pub fn has_a011043(&self) -> bool {
        self.has_a011043
    }

    /// PHYs declared by ACPI child nodes.
    pub fn phys(&self) -> &[PhyDescriptor] {
        &self.phys
    }

    fn wait_not_busy(&self, what: &str) -> Result<(), DriverError> {
        let mut timeout = BUSY_POLL_ATTEMPTS;
        while self.regs.stat().contains(MdioStat::BSY) && timeout > 0 {
            self.services.cpu_relax();
            timeout -= 1;
        }
        if timeout == 0 {
            dev_err!(self.node.name(), "timeout waiting for {}", what);
            return Err(DriverError::Timeout);
        }
        Ok(())
    }

    /// Selects the framing and addresses the register; returns the control
    /// word and the device address.
    fn setup(&self, phy_addr: u8, regnum: u32) -> Result<(u32, u32), DriverError> {
        let c45 = regnum & MII_ADDR_C45 != 0;
        let mut stat = self.regs.stat();
        let dev_addr = if c45 {
            stat.insert(MdioStat::ENC);
            (regnum >> 16) & 0x1f
        } else {
            stat.remove(MdioStat::ENC);
            regnum & 0x1f
        };
        self.regs.set_stat(stat);
        self.wait_not_busy("bus to be free")?;

        let ctl = ctl_port_addr(u32::from(phy_addr)) | ctl_dev_addr(dev_addr);
        self.regs.set_ctl(ctl);

        if c45 {
            self.regs.set_addr(regnum & 0xffff);
            self.wait_not_busy("bus to be free")?;
        }
        Ok((ctl, dev_addr))
    }

    fn acpi_phys(node: &dyn FwNode) -> Result<Vec<PhyDescriptor>, DriverError> {
        let mut phys = Vec::with_capacity(node.child_count());
        for child in (0..node.child_count()).filter_map(|i| node.child(i)) {
            let Some(addr) = child.property_u32("reg") else {
                dev_err!(node.name(), "failed to get reg");
                return Err(DriverError::ResourceUnavailable);
            };
            let addr = match u8::try_from(addr) {
                Ok(a) if a < PHY_MAX_ADDR => a,
                _ => {
                    dev_err!(node.name(), "{}: PHY address {} out of range", child.name(), addr);
                    return Err(DriverError::InvalidArgument);
                }
            };
            let Some(phy_id) = child.property_str("compatible").and_then(parse_phy_id) else {
                dev_err!(node.name(), "{}: no ethernet-phy-id compatible", child.name());
                return Err(DriverError::InvalidArgument);
            };
            phys.push(PhyDescriptor { addr, phy_id });
        }
        Ok(phys)
    }
}

impl<B: RegisterIo, S: KernelServices> MdioBus for XgmacMdio<'_, B, S> {
    fn name(&self) -> &str {
        &self.bus_id
    }

    fn read(&self, phy_addr: u8, regnum: u32) -> Result<u16, DriverError> {
        let (ctl, dev_addr) = self.setup(phy_addr, regnum)?;

        self.regs.set_ctl(ctl | MDIO_CTL_READ);
        self.wait_not_busy("operation to complete")?;

        if self.regs.stat().contains(MdioStat::RD_ER) && !self.has_a011043 {
            dev_err!(
                self.node.name(),
                "Error while reading PHY{} reg at {}.{}",
                phy_addr,
                dev_addr,
                regnum & 0xffff
            );
            return Ok(0xffff);
        }

        let value = (self.regs.data() & 0xffff) as u16;
        dev_dbg!(self.node.name(), "read {:04x}", value);
        Ok(value)
    }

    fn write(&self, phy_addr: u8, regnum: u32, value: u16) -> Result<(), DriverError> {
        self.setup(phy_addr, regnum)?;
        self.regs.set_data(u32::from(value));
        self.wait_not_busy("operation to complete")
    }
}

impl<B, S> Driver for XgmacMdio<'_, B, S> {
    fn info(&self) -> DriverInfo {
        DriverInfo {
            name: "fsl-fman_xmdio",
            driver_type: DriverType::Mdio,
            description: "Freescale QorIQ 10G MDIO Controller",
        }
    }
}

impl<'a, B: RegisterIo, S: KernelServices> PlatformDriver for XgmacMdio<'a, B, S> {
    const MATCH: DeviceMatch = DeviceMatch {
        of_compatible: &["fsl,fman-xmdio", "fsl,fman-memac-mdio"],
        acpi_hid: &["NXP0006"],
    };

    type Resources = XgmacMdioResources<'a, B, S>;

    fn probe(res: Self::Resources) -> Result<Self, DriverError> {
        let node = res.node;
        let Some(region) = res.regs else {
            dev_err!(node.name(), "could not obtain address");
            return Err(DriverError::DeviceNotFound);
        };

        // ACPI nodes carry no endianness property; their blocks are big-endian.
        let order = if !node.is_acpi() && node.property_present("little-endian") {
            Endianness::Little
        } else {
            Endianness::Big
        };
        let phys = if node.is_acpi() {
            Self::acpi_phys(node)?
        } else {
            Vec::new()
        };

        Ok(Self {
            node,
            regs: XgmacRegs::new(Endian::new(region.io, order)),
            services: res.services,
            bus_id: format!("{:x}", region.res.start()),
            has_a011043: node.property_present("fsl,erratum-a011043"),
            phys,
        })
    }
}
