//! ECAM quirk ops for ACPI-described Gen4 controllers.
//!
//! The table exists so the MCFG quirk can be registered, but none of the
//! accessors are implemented: `init` refuses the window and config accesses
//! report [`PciBiosError::FuncNotSupported`], so the PCI core never scans a
//! bus through it.

use lynx_core::kwarn;
use lynx_driver_api::pci::{ConfigRef, ConfigWindow, EcamOps, PciBiosError, PciBus, PciOps};
use lynx_driver_api::DriverError;

/// ECAM ops for the Layerscape Gen4 MCFG quirk.
#[derive(Debug, Default)]
pub struct LsPcieG4EcamOps;

// TODO: route ECAM accesses through the PAB config window the way the
// device-tree path does, then implement init and the accessors.
impl EcamOps for LsPcieG4EcamOps {
    const BUS_SHIFT: u32 = 24;

    fn init(&mut self, cfg: &ConfigWindow) -> Result<(), DriverError> {
        kwarn!(
            "layerscape-pcie-gen4: ECAM window {:#x} (buses {:#x}-{:#x}) not supported",
            cfg.res.start(),
            cfg.bus_range.start,
            cfg.bus_range.end
        );
        Err(DriverError::Unsupported)
    }
}

impl PciOps for LsPcieG4EcamOps {
    fn map_bus(&self, _bus: &PciBus, _devfn: u8, _offset: u16) -> Option<ConfigRef<'_>> {
        None
    }

    fn read(
        &self,
        _bus: &PciBus,
        _devfn: u8,
        _offset: u16,
        _size: u8,
    ) -> Result<u32, PciBiosError> {
        Err(PciBiosError::FuncNotSupported)
    }

    fn write(
        &self,
        _bus: &PciBus,
        _devfn: u8,
        _offset: u16,
        _size: u8,
        _value: u32,
    ) -> Result<(), PciBiosError> {
        Err(PciBiosError::FuncNotSupported)
    }
}

#[cfg(test)]
mod tests {
    use lynx_driver_api::pci::{read_config_or_ones, BusRange};
    use lynx_driver_api::MemResource;

    use super::*;

    #[test]
    fn init_refuses_window() {
        let mut ops = LsPcieG4EcamOps;
        let cfg = ConfigWindow {
            res: MemResource::new(0x80_0000_0000, 0x1000_0000),
            bus_range: BusRange { start: 0, end: 0xff },
        };
        assert_eq!(ops.init(&cfg), Err(DriverError::Unsupported));
        assert_eq!(LsPcieG4EcamOps::BUS_SHIFT, 24);
    }

    #[test]
    fn accessors_are_unsupported() {
        let ops = LsPcieG4EcamOps;
        let bus = PciBus { number: 0, primary: 0 };
        assert!(ops.map_bus(&bus, 0, 0).is_none());
        assert_eq!(ops.read(&bus, 0, 0, 4), Err(PciBiosError::FuncNotSupported));
        assert_eq!(
            ops.write(&bus, 0, 0, 4, 0),
            Err(PciBiosError::FuncNotSupported)
        );
        assert_eq!(read_config_or_ones(&ops, &bus, 0, 0, 4), u32::MAX);
    }
}
