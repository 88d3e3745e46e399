//! fsl-mc MSI domain stacked on the GICv3 ITS.
//!
//! Devices on the Freescale management-complex bus get their MSIs from the
//! ITS, but through a per-DPRC domain: the device id the ITS sees is the
//! container's ICID (which is also its IOMMU stream id), and vectors are
//! reserved in power-of-two blocks of at least 32 so that every object in
//! the container can be served from one ITS device table entry.
//!
//! The driver creates one such domain per ITS, found either through the
//! device tree (`arm,gic-v3-its` nodes with `msi-controller`) or through the
//! ACPI MADT generic translator entries.

use alloc::format;

use lynx_core::bits::roundup_pow_of_two;
use lynx_core::{kerr, kinfo};
use lynx_driver_api::fwnode::{DeviceMatch, FwHandle, FwNode, MadtTranslator};
use lynx_driver_api::irq::{
    ChipCallback, DomainBus, IrqChip, IrqDomainHost, McDeviceFlags, MsiAllocInfo, MsiDevice,
    MsiDomainInfo, MsiDomainOps, MsiFlags,
};
use lynx_driver_api::DriverError;

/// Smallest number of vectors reserved per device.
pub const MIN_VECTORS: u32 = 32;

/// The chip behind every fsl-mc MSI.
pub static ITS_MSI_IRQ_CHIP: IrqChip = IrqChip {
    name: "ITS-fMSI",
    mask: ChipCallback::Parent,
    unmask: ChipCallback::Parent,
    eoi: ChipCallback::Parent,
    set_affinity: ChipCallback::MsiDomain,
};

/// Domain description registered with the host.
pub static ITS_FSL_MC_MSI_DOMAIN_INFO: MsiDomainInfo = MsiDomainInfo {
    flags: MsiFlags::USE_DEF_DOM_OPS.union(MsiFlags::USE_DEF_CHIP_OPS),
    chip: &ITS_MSI_IRQ_CHIP,
    prepare: Some(its_fsl_mc_msi_prepare),
};

/// Device-tree nodes that can parent an fsl-mc domain.
pub const ITS_MATCH: DeviceMatch = DeviceMatch {
    of_compatible: &["arm,gic-v3-its"],
    acpi_hid: &[],
};

/// Number of vectors the parent is asked for when a device wants `nvec`,
/// or `None` if no `u32` power of two covers it.
#[must_use]
pub const fn prepared_vectors(nvec: u32) -> Option<u32> {
    match roundup_pow_of_two(nvec) {
        Some(rounded) if rounded < MIN_VECTORS => Some(MIN_VECTORS),
        rounded => rounded,
    }
}

/// Prepare hook: tags the allocation with the container's ICID and widens
/// it before handing it to the ITS.
///
/// # Errors
///
/// [`DriverError::InvalidArgument`] unless `dev` is an fsl-mc DPRC, or if
/// `nvec` exceeds `1 << 31`; anything the parent returns.
pub fn its_fsl_mc_msi_prepare(
    parent: &dyn MsiDomainOps,
    dev: &MsiDevice,
    nvec: u32,
    info: &mut MsiAllocInfo,
) -> Result<(), DriverError> {
    let MsiDevice::FslMc(mc_dev) = dev else {
        return Err(DriverError::InvalidArgument);
    };
    if !mc_dev.flags.contains(McDeviceFlags::IS_DPRC) {
        return Err(DriverError::InvalidArgument);
    }

    let Some(nvec) = prepared_vectors(nvec) else {
        kerr!("fsl-mc: cannot allocate {} MSI vectors", nvec);
        return Err(DriverError::InvalidArgument);
    };
    info.scratchpad[0] = u64::from(mc_dev.icid);
    info.nvec = nvec;
    parent.msi_prepare(dev, nvec, info)
}

/// Creates the fsl-mc domain on top of the ITS registered for `handle`.
///
/// # Errors
///
/// [`DriverError::DomainLookupFailure`] if the host has no ITS nexus domain
/// for `handle`; whatever the host returns when creating the domain.
pub fn init_one<H: IrqDomainHost>(
    host: &H,
    handle: FwHandle,
    name: &str,
) -> Result<(), DriverError> {
    let Some(parent) = host.find_matching_domain(handle, DomainBus::Nexus) else {
        kerr!("{}: unable to locate ITS domain", name);
        return Err(DriverError::DomainLookupFailure);
    };

    host.create_fsl_mc_msi_domain(handle, &ITS_FSL_MC_MSI_DOMAIN_INFO, parent)
        .inspect_err(|_| kerr!("{}: unable to create fsl-mc domain", name))?;

    kinfo!("fsl-mc MSI: {} domain created", name);
    Ok(())
}

/// Creates a domain for every usable ITS node. Returns how many were created.
///
/// Nodes that are disabled or lack `msi-controller` are skipped; a failure
/// on one node does not stop the others.
pub fn of_init<H: IrqDomainHost>(host: &H, nodes: &[&dyn FwNode]) -> usize {
    let mut created = 0;
    for &np in nodes {
        if !ITS_MATCH.matches(np) || !np.is_available() {
            continue;
        }
        if !np.property_present("msi-controller") {
            continue;
        }
        if init_one(host, np.handle(), np.name()).is_ok() {
            created += 1;
        }
    }
    created
}

/// Creates a domain for every MADT translator whose id resolves to an ITS.
/// Returns how many were created.
pub fn acpi_init<H: IrqDomainHost>(host: &H, translators: &[MadtTranslator]) -> usize {
    let mut created = 0;
    for its in translators {
        let name = format!("ITS@{:#x}", its.base_address);
        let Some(handle) = host.find_domain_token(its.translation_id) else {
            kerr!("{}: unable to locate ITS domain handle", name);
            continue;
        };
        if init_one(host, handle, &name).is_ok() {
            created += 1;
        }
    }
    created
}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;

    use lynx_core::log::{capture, LogLevel};
    use lynx_driver_api::irq::FslMcDevice;
    use lynx_driver_api::mock::MockNode;
    use lynx_driver_api::pci::PciAddress;

    use super::*;

    #[derive(Default)]
    struct Its {
        asked: RefCell<Vec<(u32, u64)>>,
    }

    impl MsiDomainOps for Its {
        fn msi_prepare(
            &self,
            _dev: &MsiDevice,
            nvec: u32,
            info: &mut MsiAllocInfo,
        ) -> Result<(), DriverError> {
            self.asked.borrow_mut().push((nvec, info.scratchpad[0]));
            Ok(())
        }
    }

    #[derive(Default)]
    struct Host {
        itses: Vec<(FwHandle, Its)>,
        tokens: Vec<(u32, FwHandle)>,
        created: RefCell<Vec<FwHandle>>,
        refuse: bool,
    }

    impl IrqDomainHost for Host {
        type Domain = Its;

        fn find_matching_domain(&self, fwnode: FwHandle, bus: DomainBus) -> Option<&Its> {
            assert_eq!(bus, DomainBus::Nexus);
            self.itses.iter().find(|(h, _)| *h == fwnode).map(|(_, d)| d)
        }

        fn find_domain_token(&self, translation_id: u32) -> Option<FwHandle> {
            self.tokens
                .iter()
                .find(|(id, _)| *id == translation_id)
                .map(|(_, h)| *h)
        }

        fn create_fsl_mc_msi_domain(
            &self,
            fwnode: FwHandle,
            info: &'static MsiDomainInfo,
            _parent: &Its,
        ) -> Result<(), DriverError> {
            assert_eq!(info.chip.name, "ITS-fMSI");
            if self.refuse {
                return Err(DriverError::InitFailed);
            }
            self.created.borrow_mut().push(fwnode);
            Ok(())
        }
    }

    fn dprc(icid: u16) -> MsiDevice {
        MsiDevice::FslMc(FslMcDevice {
            flags: McDeviceFlags::IS_DPRC,
            icid,
        })
    }

    #[test]
    fn small_requests_round_up_to_32() {
        for n in [0, 1, 5, 17, 31, 32] {
            assert_eq!(prepared_vectors(n), Some(32), "nvec {n}");
        }
    }

    #[test]
    fn large_requests_round_to_power_of_two() {
        assert_eq!(prepared_vectors(33), Some(64));
        assert_eq!(prepared_vectors(64), Some(64));
        assert_eq!(prepared_vectors(65), Some(128));
        assert_eq!(prepared_vectors(1000), Some(1024));
        assert_eq!(prepared_vectors(1 << 31), Some(1 << 31));
        assert_eq!(prepared_vectors((1 << 31) + 1), None);
    }

    #[test]
    fn prepare_rejects_requests_beyond_u32_power_of_two() {
        capture::install();
        let its = Its::default();
        let mut info = MsiAllocInfo::default();
        assert_eq!(
            its_fsl_mc_msi_prepare(&its, &dprc(7), (1 << 31) + 1, &mut info),
            Err(DriverError::InvalidArgument)
        );
        assert!(its.asked.borrow().is_empty());
        assert_eq!(info.nvec, 0);
        assert!(capture::take().iter().any(|(l, m)| *l == LogLevel::Error
            && m == "fsl-mc: cannot allocate 2147483649 MSI vectors"));
    }

    #[test]
    fn prepare_passes_icid_and_rounded_count_to_parent() {
        let its = Its::default();
        let mut info = MsiAllocInfo::default();
        its_fsl_mc_msi_prepare(&its, &dprc(0x2a), 40, &mut info).unwrap();
        assert_eq!(*its.asked.borrow(), vec![(64, 0x2a)]);
        assert_eq!(info.scratchpad[0], 0x2a);
        assert_eq!(info.nvec, 64);
    }

    #[test]
    fn prepare_rejects_non_dprc_devices() {
        let its = Its::default();
        let mut info = MsiAllocInfo::default();
        let plain = MsiDevice::FslMc(FslMcDevice {
            flags: McDeviceFlags::empty(),
            icid: 3,
        });
        assert_eq!(
            its_fsl_mc_msi_prepare(&its, &plain, 4, &mut info),
            Err(DriverError::InvalidArgument)
        );
        let pci = MsiDevice::Pci(PciAddress::from_devfn(1, 0));
        assert_eq!(
            its_fsl_mc_msi_prepare(&its, &pci, 4, &mut info),
            Err(DriverError::InvalidArgument)
        );
        assert!(its.asked.borrow().is_empty());
    }

    #[test]
    fn of_init_skips_unusable_nodes_and_continues_past_failures() {
        capture::install();
        let host = Host {
            itses: vec![(FwHandle(1), Its::default()), (FwHandle(4), Its::default())],
            ..Host::default()
        };
        let good = MockNode::new("msi-controller@6020000", 1)
            .compatible("arm,gic-v3-its")
            .flag("msi-controller");
        let orphan = MockNode::new("msi-controller@6040000", 2)
            .compatible("arm,gic-v3-its")
            .flag("msi-controller");
        let disabled = MockNode::new("msi-controller@6060000", 3)
            .compatible("arm,gic-v3-its")
            .flag("msi-controller")
            .disabled();
        let not_msi = MockNode::new("its@6080000", 4).compatible("arm,gic-v3-its");
        let nodes: [&dyn FwNode; 4] = [&orphan, &disabled, &not_msi, &good];

        assert_eq!(of_init(&host, &nodes), 1);
        assert_eq!(*host.created.borrow(), vec![FwHandle(1)]);

        let lines = capture::take();
        assert!(lines.iter().any(|(l, m)| *l == LogLevel::Error
            && m == "msi-controller@6040000: unable to locate ITS domain"));
        assert!(lines
            .iter()
            .any(|(_, m)| m == "fsl-mc MSI: msi-controller@6020000 domain created"));
    }

    #[test]
    fn init_one_reports_missing_parent() {
        let host = Host::default();
        assert_eq!(
            init_one(&host, FwHandle(9), "its"),
            Err(DriverError::DomainLookupFailure)
        );
    }

    #[test]
    fn init_one_propagates_creation_failure() {
        let host = Host {
            itses: vec![(FwHandle(1), Its::default())],
            refuse: true,
            ..Host::default()
        };
        assert_eq!(
            init_one(&host, FwHandle(1), "its"),
            Err(DriverError::InitFailed)
        );
    }

    #[test]
    fn acpi_init_resolves_translation_ids() {
        capture::install();
        let host = Host {
            itses: vec![(FwHandle(7), Its::default())],
            tokens: vec![(0, FwHandle(7))],
            ..Host::default()
        };
        let madt = [
            MadtTranslator {
                base_address: 0x602_0000,
                translation_id: 0,
            },
            MadtTranslator {
                base_address: 0x604_0000,
                translation_id: 1,
            },
        ];
        assert_eq!(acpi_init(&host, &madt), 1);
        assert_eq!(*host.created.borrow(), vec![FwHandle(7)]);
        let lines = capture::take();
        assert!(lines
            .iter()
            .any(|(_, m)| m == "ITS@0x6040000: unable to locate ITS domain handle"));
        assert!(lines
            .iter()
            .any(|(_, m)| m == "fsl-mc MSI: ITS@0x6020000 domain created"));
    }
}
