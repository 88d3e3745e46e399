//! Interrupt and MSI domain contracts.
//!
//! The host owns the IRQ domain hierarchy. Drivers contribute:
//!
//! - [`IrqHandler`]s for lines they requested;
//! - [`IrqChip`] descriptors for stacked domains, whose callbacks are
//!   forwarded by the host to the parent domain;
//! - [`IrqChipOps`] for chips that touch their own hardware;
//! - [`MsiDomainInfo`] for MSI domains, with an optional prepare hook that
//!   runs before the parent domain allocates vectors.

use bitflags::bitflags;

use crate::error::DriverError;
use crate::fwnode::FwHandle;
use crate::pci::PciAddress;

/// Result of an interrupt handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqReturn {
    /// The interrupt was not raised by this device (shared lines).
    None,
    /// The interrupt was handled.
    Handled,
}

bitflags! {
    /// Flags for requesting an interrupt line.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IrqFlags: u32 {
        /// The line may be shared with other devices.
        const SHARED = 1 << 0;
    }
}

/// A handler for a requested interrupt line.
///
/// Called by the host in interrupt context; must not block.
pub trait IrqHandler: Sync {
    /// Handles one assertion of the line.
    fn handle_irq(&self) -> IrqReturn;
}

/// A child domain a host bridge demultiplexes its interrupt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildDomain {
    /// Legacy INTx; hwirq 1..=4 is INTA..INTD.
    Intx,
    /// The bridge's own MSI vectors.
    Msi,
}

/// How a stacked chip implements one callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipCallback {
    /// Not implemented.
    None,
    /// Forwarded to the parent domain's chip.
    Parent,
    /// Handled by the host's generic MSI domain code.
    MsiDomain,
}

/// Descriptor of an interrupt chip in a stacked domain.
#[derive(Debug, Clone, Copy)]
pub struct IrqChip {
    /// Chip name shown by the host.
    pub name: &'static str,
    /// Masking.
    pub mask: ChipCallback,
    /// Unmasking.
    pub unmask: ChipCallback,
    /// End of interrupt.
    pub eoi: ChipCallback,
    /// CPU affinity changes.
    pub set_affinity: ChipCallback,
}

/// An interrupt chip backed by the driver's own registers.
pub trait IrqChipOps: Sync {
    /// Chip name shown by the host.
    fn name(&self) -> &'static str;
    /// Masks hardware interrupt `hwirq`.
    fn mask(&self, hwirq: u32);
    /// Unmasks hardware interrupt `hwirq`.
    fn unmask(&self, hwirq: u32);
}

bitflags! {
    /// Properties of a management-complex device.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct McDeviceFlags: u32 {
        /// The object is a DPRC (resource container).
        const IS_DPRC = 1 << 0;
    }
}

/// A device on the fsl-mc bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FslMcDevice {
    /// Object flags.
    pub flags: McDeviceFlags,
    /// Isolation context id; doubles as the ITS device id / stream id.
    pub icid: u16,
}

/// The device an MSI allocation is made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsiDevice {
    /// A device on the fsl-mc bus.
    FslMc(FslMcDevice),
    /// A PCI function.
    Pci(PciAddress),
    /// Any other platform device.
    Platform(FwHandle),
}

/// Per-allocation state passed down the domain hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MsiAllocInfo {
    /// Scratch words; `scratchpad[0]` carries the device id to the ITS.
    pub scratchpad: [u64; 2],
    /// Number of vectors the parent is asked to reserve.
    pub nvec: u32,
}

/// A composed MSI message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsiMsg {
    /// Low 32 bits of the doorbell address.
    pub address_lo: u32,
    /// High 32 bits of the doorbell address.
    pub address_hi: u32,
    /// Payload written to the doorbell.
    pub data: u32,
}

impl MsiMsg {
    /// Builds a message for a 64-bit doorbell.
    #[must_use]
    pub const fn new(address: u64, data: u32) -> Self {
        Self {
            address_lo: address as u32,
            address_hi: (address >> 32) as u32,
            data,
        }
    }
}

/// An MSI domain that can prepare allocations.
pub trait MsiDomainOps {
    /// Prepares the allocation of `nvec` vectors for `dev`.
    ///
    /// # Errors
    ///
    /// Domain-specific; e.g. [`DriverError::InvalidArgument`] for devices the
    /// domain cannot serve.
    fn msi_prepare(
        &self,
        dev: &MsiDevice,
        nvec: u32,
        info: &mut MsiAllocInfo,
    ) -> Result<(), DriverError>;
}

/// Hook run by a stacked domain before delegating to its parent.
pub type MsiPrepareFn = fn(
    parent: &dyn MsiDomainOps,
    dev: &MsiDevice,
    nvec: u32,
    info: &mut MsiAllocInfo,
) -> Result<(), DriverError>;

bitflags! {
    /// MSI domain feature flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MsiFlags: u32 {
        /// Use the host's default domain callbacks where none are given.
        const USE_DEF_DOM_OPS = 1 << 0;
        /// Use the host's default chip callbacks where none are given.
        const USE_DEF_CHIP_OPS = 1 << 1;
        /// Domain supports PCI MSI-X.
        const PCI_MSIX = 1 << 2;
    }
}

/// Static description of an MSI domain.
#[derive(Debug, Clone, Copy)]
pub struct MsiDomainInfo {
    /// Feature flags.
    pub flags: MsiFlags,
    /// Chip used for the domain's interrupts.
    pub chip: &'static IrqChip,
    /// Optional prepare hook; without one, prepare goes straight to the parent.
    pub prepare: Option<MsiPrepareFn>,
}

/// A domain stacked on top of a parent MSI domain.
pub struct StackedMsiDomain<'p, P: ?Sized> {
    info: &'static MsiDomainInfo,
    parent: &'p P,
}

impl<'p, P: MsiDomainOps + ?Sized> StackedMsiDomain<'p, P> {
    /// Stacks a domain described by `info` on `parent`.
    pub const fn new(info: &'static MsiDomainInfo, parent: &'p P) -> Self {
        Self { info, parent }
    }

    /// Returns the domain description.
    pub const fn info(&self) -> &'static MsiDomainInfo {
        self.info
    }
}

impl<P: MsiDomainOps> MsiDomainOps for StackedMsiDomain<'_, P> {
    fn msi_prepare(
        &self,
        dev: &MsiDevice,
        nvec: u32,
        info: &mut MsiAllocInfo,
    ) -> Result<(), DriverError> {
        match self.info.prepare {
            Some(prepare) => prepare(self.parent, dev, nvec, info),
            None => self.parent.msi_prepare(dev, nvec, info),
        }
    }
}

/// Kind of domain to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainBus {
    /// Any domain.
    Any,
    /// The nexus domain of an interrupt translation service.
    Nexus,
}

/// The host's interrupt domain registry.
pub trait IrqDomainHost {
    /// The host's domain type.
    type Domain: MsiDomainOps;

    /// Finds the domain registered for `fwnode` with the given bus token.
    ///
    /// Returns `None` if no such domain exists or it carries no MSI info.
    fn find_matching_domain(&self, fwnode: FwHandle, bus: DomainBus) -> Option<&Self::Domain>;

    /// Resolves an ACPI translation id to the handle of its ITS domain.
    fn find_domain_token(&self, translation_id: u32) -> Option<FwHandle>;

    /// Creates an fsl-mc MSI domain for `fwnode` stacked on `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InitFailed`] if the host cannot create it.
    fn create_fsl_mc_msi_domain(
        &self,
        fwnode: FwHandle,
        info: &'static MsiDomainInfo,
        parent: &Self::Domain,
    ) -> Result<(), DriverError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Parent {
        seen: Cell<Option<u32>>,
    }

    impl MsiDomainOps for Parent {
        fn msi_prepare(
            &self,
            _dev: &MsiDevice,
            nvec: u32,
            _info: &mut MsiAllocInfo,
        ) -> Result<(), DriverError> {
            self.seen.set(Some(nvec));
            Ok(())
        }
    }

    static CHIP: IrqChip = IrqChip {
        name: "test",
        mask: ChipCallback::Parent,
        unmask: ChipCallback::Parent,
        eoi: ChipCallback::None,
        set_affinity: ChipCallback::None,
    };

    fn double(
        parent: &dyn MsiDomainOps,
        dev: &MsiDevice,
        nvec: u32,
        info: &mut MsiAllocInfo,
    ) -> Result<(), DriverError> {
        parent.msi_prepare(dev, nvec * 2, info)
    }

    static PLAIN: MsiDomainInfo = MsiDomainInfo {
        flags: MsiFlags::USE_DEF_DOM_OPS,
        chip: &CHIP,
        prepare: None,
    };

    static HOOKED: MsiDomainInfo = MsiDomainInfo {
        flags: MsiFlags::USE_DEF_DOM_OPS,
        chip: &CHIP,
        prepare: Some(double),
    };

    #[test]
    fn stacked_domain_without_hook_forwards() {
        let parent = Parent { seen: Cell::new(None) };
        let domain = StackedMsiDomain::new(&PLAIN, &parent);
        let mut info = MsiAllocInfo::default();
        domain
            .msi_prepare(&MsiDevice::Platform(FwHandle(1)), 3, &mut info)
            .unwrap();
        assert_eq!(parent.seen.get(), Some(3));
    }

    #[test]
    fn stacked_domain_runs_hook() {
        let parent = Parent { seen: Cell::new(None) };
        let domain = StackedMsiDomain::new(&HOOKED, &parent);
        let mut info = MsiAllocInfo::default();
        domain
            .msi_prepare(&MsiDevice::Platform(FwHandle(1)), 3, &mut info)
            .unwrap();
        assert_eq!(parent.seen.get(), Some(6));
    }

    #[test]
    fn msi_msg_splits_address() {
        let msg = MsiMsg::new(0x0000_0034_0000_0010, 4);
        assert_eq!(msg.address_hi, 0x34);
        assert_eq!(msg.address_lo, 0x10);
        assert_eq!(msg.data, 4);
    }
}
