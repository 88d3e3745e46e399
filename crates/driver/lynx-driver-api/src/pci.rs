//! PCI host-bridge contracts and configuration-space definitions.

use core::fmt;

use lynx_mmio::RegisterIo;

use crate::error::DriverError;
use crate::resource::MemResource;

/// Vendor ID (16 bits).
pub const PCI_VENDOR_ID: u16 = 0x00;
/// Command register (16 bits).
pub const PCI_COMMAND: u16 = 0x04;
/// Enable I/O space decoding.
pub const PCI_COMMAND_IO: u32 = 0x1;
/// Enable memory space decoding.
pub const PCI_COMMAND_MEMORY: u32 = 0x2;
/// Enable bus mastering.
pub const PCI_COMMAND_MASTER: u32 = 0x4;
/// Revision ID (8 bits).
pub const PCI_REVISION_ID: u16 = 0x08;
/// Header type (8 bits).
pub const PCI_HEADER_TYPE: u16 = 0x0e;
/// Header type of a PCI-to-PCI bridge.
pub const PCI_HEADER_TYPE_BRIDGE: u8 = 1;
/// Primary/secondary/subordinate bus numbers (type 1 header).
pub const PCI_PRIMARY_BUS: u16 = 0x18;
/// Bridge control register (16 bits, type 1 header).
pub const PCI_BRIDGE_CONTROL: u16 = 0x3e;
/// Secondary bus reset bit in [`PCI_BRIDGE_CONTROL`].
pub const PCI_BRIDGE_CTL_BUS_RESET: u16 = 0x40;
/// Class code of a PCI-to-PCI bridge.
pub const PCI_CLASS_BRIDGE_PCI: u32 = 0x0604;

/// PCI bus/device/function address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciAddress {
    /// Bus number (0-255).
    pub bus: u8,
    /// Device number (0-31).
    pub device: u8,
    /// Function number (0-7).
    pub function: u8,
}

impl PciAddress {
    /// Builds an address from a bus number and a packed devfn.
    #[must_use]
    pub const fn from_devfn(bus: u8, devfn: u8) -> Self {
        Self {
            bus,
            device: pci_slot(devfn),
            function: pci_func(devfn),
        }
    }

    /// Packs device and function into a devfn byte.
    #[must_use]
    pub const fn devfn(&self) -> u8 {
        (self.device << 3) | (self.function & 0x7)
    }
}

impl fmt::Display for PciAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}:{:02x}.{}", self.bus, self.device, self.function)
    }
}

/// Device number of a devfn.
#[must_use]
pub const fn pci_slot(devfn: u8) -> u8 {
    (devfn >> 3) & 0x1f
}

/// Function number of a devfn.
#[must_use]
pub const fn pci_func(devfn: u8) -> u8 {
    devfn & 0x07
}

/// A bus as seen by config accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciBus {
    /// This bus's number.
    pub number: u8,
    /// Number of the bus the upstream bridge sits on.
    pub primary: u8,
}

/// Status codes of config accesses, as the PCI core understands them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PciBiosError {
    /// No device answers at this address; reads return all ones.
    DeviceNotFound,
    /// Offset or access size is invalid.
    BadRegisterNumber,
    /// The accessor is not implemented.
    FuncNotSupported,
}

impl From<PciBiosError> for DriverError {
    fn from(err: PciBiosError) -> Self {
        match err {
            PciBiosError::DeviceNotFound => DriverError::DeviceNotFound,
            PciBiosError::BadRegisterNumber => DriverError::InvalidArgument,
            PciBiosError::FuncNotSupported => DriverError::Unsupported,
        }
    }
}

/// A config-space location resolved by [`PciOps::map_bus`].
pub struct ConfigRef<'a> {
    /// Register space holding the config header.
    pub io: &'a dyn RegisterIo,
    /// Byte offset of the accessed register within `io`.
    pub offset: usize,
}

/// Config-space accessors supplied by a host bridge driver.
pub trait PciOps {
    /// Resolves `(bus, devfn, offset)` to a register location, or `None`
    /// if no device can be there.
    fn map_bus(&self, bus: &PciBus, devfn: u8, offset: u16) -> Option<ConfigRef<'_>>;

    /// Reads `size` bytes of config space.
    ///
    /// # Errors
    ///
    /// See [`PciBiosError`].
    fn read(&self, bus: &PciBus, devfn: u8, offset: u16, size: u8) -> Result<u32, PciBiosError> {
        generic_config_read(self, bus, devfn, offset, size)
    }

    /// Writes `size` bytes of config space.
    ///
    /// # Errors
    ///
    /// See [`PciBiosError`].
    fn write(
        &self,
        bus: &PciBus,
        devfn: u8,
        offset: u16,
        size: u8,
        value: u32,
    ) -> Result<(), PciBiosError> {
        generic_config_write(self, bus, devfn, offset, size, value)
    }
}

/// Config read through [`PciOps::map_bus`] with a plain register access.
///
/// # Errors
///
/// [`PciBiosError::DeviceNotFound`] if `map_bus` yields nothing,
/// [`PciBiosError::BadRegisterNumber`] for sizes other than 1, 2 or 4.
pub fn generic_config_read<O: PciOps + ?Sized>(
    ops: &O,
    bus: &PciBus,
    devfn: u8,
    offset: u16,
    size: u8,
) -> Result<u32, PciBiosError> {
    let cfg = ops
        .map_bus(bus, devfn, offset)
        .ok_or(PciBiosError::DeviceNotFound)?;
    match size {
        1 => Ok(cfg.io.read8(cfg.offset).into()),
        2 => Ok(cfg.io.read16(cfg.offset).into()),
        4 => Ok(cfg.io.read32(cfg.offset)),
        _ => Err(PciBiosError::BadRegisterNumber),
    }
}

/// Config write through [`PciOps::map_bus`] with a plain register access.
///
/// # Errors
///
/// As [`generic_config_read`].
pub fn generic_config_write<O: PciOps + ?Sized>(
    ops: &O,
    bus: &PciBus,
    devfn: u8,
    offset: u16,
    size: u8,
    value: u32,
) -> Result<(), PciBiosError> {
    let cfg = ops
        .map_bus(bus, devfn, offset)
        .ok_or(PciBiosError::DeviceNotFound)?;
    match size {
        1 => cfg.io.write8(cfg.offset, value as u8),
        2 => cfg.io.write16(cfg.offset, value as u16),
        4 => cfg.io.write32(cfg.offset, value),
        _ => return Err(PciBiosError::BadRegisterNumber),
    }
    Ok(())
}

/// Reads config space the way the PCI core presents it: failures read as
/// all ones.
pub fn read_config_or_ones<O: PciOps + ?Sized>(
    ops: &O,
    bus: &PciBus,
    devfn: u8,
    offset: u16,
    size: u8,
) -> u32 {
    ops.read(bus, devfn, offset, size).unwrap_or(match size {
        1 => 0xff,
        2 => 0xffff,
        _ => u32::MAX,
    })
}

/// Inclusive range of bus numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusRange {
    /// First bus.
    pub start: u8,
    /// Last bus.
    pub end: u8,
}

/// An ECAM configuration window, as handed to [`EcamOps::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigWindow {
    /// Physical range of the window.
    pub res: MemResource,
    /// Buses decoded by the window.
    pub bus_range: BusRange,
}

/// ECAM quirk operations registered for ACPI-described host bridges.
pub trait EcamOps: PciOps {
    /// Bit position of the bus number in an ECAM address.
    const BUS_SHIFT: u32;

    /// Prepares the window for config accesses.
    ///
    /// # Errors
    ///
    /// Implementation-specific.
    fn init(&mut self, cfg: &ConfigWindow) -> Result<(), DriverError>;
}

/// Kind of a host bridge address window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeWindowKind {
    /// Memory space.
    Mem,
    /// I/O space.
    Io,
    /// Bus-number range; `cpu_start` holds the first bus.
    Bus,
}

/// One entry of the host bridge's `ranges`/`bus-range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeWindow {
    /// Address space kind.
    pub kind: BridgeWindowKind,
    /// CPU-side start address (or first bus number).
    pub cpu_start: u64,
    /// PCI-side start address.
    pub pci_start: u64,
    /// Size in bytes (or number of buses).
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lynx_mmio::mock::MockRegisters;

    struct Flat {
        regs: MockRegisters,
    }

    impl PciOps for Flat {
        fn map_bus(&self, bus: &PciBus, devfn: u8, offset: u16) -> Option<ConfigRef<'_>> {
            (bus.number == 0 && devfn == 0).then_some(ConfigRef {
                io: &self.regs,
                offset: offset.into(),
            })
        }
    }

    const ROOT: PciBus = PciBus { number: 0, primary: 0 };

    #[test]
    fn devfn_packing() {
        let addr = PciAddress::from_devfn(1, (3 << 3) | 2);
        assert_eq!(addr.device, 3);
        assert_eq!(addr.function, 2);
        assert_eq!(addr.devfn(), (3 << 3) | 2);
        assert_eq!(format!("{addr}"), "01:03.2");
    }

    #[test]
    fn generic_read_sizes() {
        let ops = Flat { regs: MockRegisters::new() };
        ops.regs.poke(0x0c, 0x0001_0000);
        ops.regs.poke(0x00, 0x8d80_1957);
        assert_eq!(ops.read(&ROOT, 0, PCI_VENDOR_ID, 2), Ok(0x1957));
        assert_eq!(ops.read(&ROOT, 0, PCI_HEADER_TYPE, 1), Ok(1));
        assert_eq!(ops.read(&ROOT, 0, 0, 4), Ok(0x8d80_1957));
        assert_eq!(
            ops.read(&ROOT, 0, 0, 3),
            Err(PciBiosError::BadRegisterNumber)
        );
    }

    #[test]
    fn missing_device_reads_all_ones() {
        let ops = Flat { regs: MockRegisters::new() };
        assert_eq!(ops.read(&ROOT, 8, 0, 4), Err(PciBiosError::DeviceNotFound));
        assert_eq!(read_config_or_ones(&ops, &ROOT, 8, 0, 2), 0xffff);
        assert_eq!(read_config_or_ones(&ops, &ROOT, 8, 0, 4), u32::MAX);
    }

    #[test]
    fn generic_write_sizes() {
        let ops = Flat { regs: MockRegisters::new() };
        ops.regs.poke(0x3c, 0x0040_01ff);
        ops.write(&ROOT, 0, PCI_BRIDGE_CONTROL, 2, 0).unwrap();
        assert_eq!(ops.regs.peek(0x3c), 0x0000_01ff);
        assert_eq!(
            ops.write(&ROOT, 1, 0, 4, 0),
            Err(PciBiosError::DeviceNotFound)
        );
    }

    #[test]
    fn bios_errors_map_to_driver_errors() {
        assert_eq!(
            DriverError::from(PciBiosError::FuncNotSupported),
            DriverError::Unsupported
        );
    }
}
