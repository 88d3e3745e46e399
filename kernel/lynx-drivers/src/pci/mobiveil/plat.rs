//! Plain platform driver for Mobiveil GPEX root complexes.
//!
//! Uses the generic link test and the bridge's own INTx/MSI decoding.

use lynx_driver_api::fwnode::DeviceMatch;
use lynx_driver_api::pci::{generic_config_read, ConfigRef, PciBiosError, PciBus, PciOps};
use lynx_driver_api::{
    Driver, DriverError, DriverInfo, DriverType, IrqHandler, IrqReturn, KernelServices,
    PlatformDriver,
};
use lynx_mmio::RegisterIo;

use super::{MobiveilPcie, MobiveilResources, PabOps, RootPortOps};

/// A Mobiveil root complex with no platform quirks.
pub struct MobiveilHost<'a, B, S> {
    pci: MobiveilPcie<'a, B, S>,
}

impl<'a, B: RegisterIo, S: KernelServices> MobiveilHost<'a, B, S> {
    /// The generic controller state.
    pub fn pci(&self) -> &MobiveilPcie<'a, B, S> {
        &self.pci
    }
}

impl<B: RegisterIo, S: KernelServices> PabOps for MobiveilHost<'_, B, S> {
    fn link_up(&self) -> bool {
        self.pci.default_link_up()
    }
}

impl<B: RegisterIo, S: KernelServices> RootPortOps for MobiveilHost<'_, B, S> {
    fn interrupt_init(&self) -> Result<(), DriverError> {
        self.pci.default_interrupt_init()
    }

    fn read_other_conf(
        &self,
        bus: &PciBus,
        devfn: u8,
        offset: u16,
        size: u8,
    ) -> Result<u32, PciBiosError> {
        generic_config_read(self, bus, devfn, offset, size)
    }
}

impl<B: RegisterIo, S: KernelServices> PciOps for MobiveilHost<'_, B, S> {
    fn map_bus(&self, bus: &PciBus, devfn: u8, offset: u16) -> Option<ConfigRef<'_>> {
        self.pci.map_bus(self, bus, devfn, offset)
    }

    fn read(&self, bus: &PciBus, devfn: u8, offset: u16, size: u8) -> Result<u32, PciBiosError> {
        self.pci.config_read(self, bus, devfn, offset, size)
    }
}

impl<B: RegisterIo + Sync, S: KernelServices> IrqHandler for MobiveilHost<'_, B, S> {
    fn handle_irq(&self) -> IrqReturn {
        self.pci.isr();
        IrqReturn::Handled
    }
}

impl<B, S> Driver for MobiveilHost<'_, B, S> {
    fn info(&self) -> DriverInfo {
        DriverInfo {
            name: "mobiveil-pcie",
            driver_type: DriverType::PciHost,
            description: "Mobiveil GPEX PCIe root complex",
        }
    }
}

impl<'a, B: RegisterIo, S: KernelServices> PlatformDriver for MobiveilHost<'a, B, S> {
    const MATCH: DeviceMatch = DeviceMatch {
        of_compatible: &["mbvl,gpex40-pcie"],
        acpi_hid: &[],
    };

    type Resources = MobiveilResources<'a, B, S>;

    fn probe(resources: Self::Resources) -> Result<Self, DriverError> {
        let host = Self {
            pci: MobiveilPcie::new(resources)?,
        };
        host.pci.host_probe(&host)?;
        Ok(host)
    }
}
