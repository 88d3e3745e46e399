//! NXP Layerscape Gen4 PCIe controller (LX2160A rev1).
//!
//! A Mobiveil GPEX root complex with NXP's PF and LUT blocks bolted on. The
//! driver adds three things to the generic layer:
//!
//! - link-up detection from the LTSSM field of the PF debug register;
//! - two silicon workarounds for revision 1.0 (`0x10`);
//! - recovery from a hot reset signalled by the link partner.
//!
//! # Reset recovery
//!
//! ```text
//!  LinkDown ──host init──▶ Training ──LTSSM = L0──▶ LinkUp
//!     ▲                       │                       │
//!     │◀──training timeout────┘              PAB reset interrupt
//!     │                                               ▼
//!     └──────handshake timeout──────────────── ResetInProgress
//! ```
//!
//! The interrupt handler only acknowledges the status and arms the reset
//! work 1 ms out; all polling happens when the host runs the work through
//! [`LsPcieG4::run_pending_reset`].

pub mod acpi;

use core::sync::atomic::{AtomicU8, Ordering};

use bitflags::bitflags;
use lynx_core::cell::WriteOnce;
use lynx_core::work::DelayedWork;
use lynx_core::{dev_err, dev_info, static_assert};
use lynx_driver_api::fwnode::DeviceMatch;
use lynx_driver_api::pci::{
    generic_config_read, ConfigRef, PciBiosError, PciBus, PciOps, PCI_BRIDGE_CONTROL,
    PCI_BRIDGE_CTL_BUS_RESET, PCI_HEADER_TYPE, PCI_HEADER_TYPE_BRIDGE, PCI_REVISION_ID,
    PCI_VENDOR_ID,
};
use lynx_driver_api::{
    Driver, DriverError, DriverInfo, DriverType, IrqFlags, IrqHandler, IrqReturn,
    KernelServices, PlatformDriver,
};
use lynx_mmio::{register_block, RegisterIo, SubWindow};

use super::mobiveil::regs::{MiscIntr, ACK_LAT_TO_VAL_MASK};
use super::mobiveil::{MobiveilPcie, MobiveilResources, PabOps, RootPortOps};

/// Silicon revision 1.0, which needs both workarounds.
pub const REV_1_0: u8 = 0x10;

/// LTSSM encoding of L0.
pub const LTSSM_L0: u32 = 0x2d;
/// LTSSM field of `PF_DBG`.
pub const PF_DBG_LTSSM_MASK: u32 = 0x3f;

static_assert!(LTSSM_L0 & PF_DBG_LTSSM_MASK == LTSSM_L0);

const LUT_OFFSET: usize = 0x8_0000;
const PF_OFFSET: usize = 0xc_0000;

/// Reset handshake polls before giving up.
const RESET_POLL_ATTEMPTS: u32 = 100;
/// Link training polls after a reset.
const LINK_TRAINING_ATTEMPTS: u32 = 100;
/// Delay between the reset interrupt and the recovery work, in microseconds.
const RESET_WORK_DELAY_US: u64 = 1000;

bitflags! {
    /// `PF_INT_STAT` bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PfIntStat: u32 {
        /// The PAB has entered reset.
        const PABRST = 1 << 31;
    }

    /// `PF_DBG` control bits (the low bits carry the LTSSM state).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PfDbg: u32 {
        /// Write enable for the other control bits.
        const WE = 1 << 31;
        /// Releases the PAB from reset.
        const PABR = 1 << 27;
    }

    /// `LUT_GCR` bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LutGcr: u32 {
        /// Relaxed read ordering enable.
        const RRE = 1 << 0;
    }
}

register_block! {
    /// Physical function control block, at `0xc0000` in the CSR window.
    pub PfRegs {
        /// Interrupt status.
        [0x018; u32; rw] int_stat => PfIntStat,
        /// Debug control and LTSSM state.
        [0x7fc; u32; rw] dbg => PfDbg,
    }
}

register_block! {
    /// Stream-id lookup table block, at `0x80000` in the CSR window.
    pub LutRegs {
        /// General control.
        [0x28; u32; rw] gcr => LutGcr,
    }
}

/// Where the link is in its life cycle.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No link; devices below the root port are unreachable.
    LinkDown = 0,
    /// The hardware has been re-initialized and the link is training.
    Training = 1,
    /// The link is in L0.
    LinkUp = 2,
    /// A hot reset was signalled; recovery work is pending or running.
    ResetInProgress = 3,
}

impl LinkState {
    const fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::Training,
            2 => Self::LinkUp,
            3 => Self::ResetInProgress,
            _ => Self::LinkDown,
        }
    }
}

/// Layerscape Gen4 root complex.
pub struct LsPcieG4<'a, B, S> {
    pci: MobiveilPcie<'a, B, S>,
    rev: WriteOnce<u8>,
    reset_work: DelayedWork,
    state: AtomicU8,
}

impl<'a, B: RegisterIo, S: KernelServices> LsPcieG4<'a, B, S> {
    /// The generic controller state.
    pub fn pci(&self) -> &MobiveilPcie<'a, B, S> {
        &self.pci
    }

    /// Silicon revision, or 0 before the first host init.
    pub fn rev(&self) -> u8 {
        self.rev.get().unwrap_or(0)
    }

    /// Current link state.
    pub fn link_state(&self) -> LinkState {
        LinkState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// The reset work slot, for the host's executor.
    pub fn reset_work(&self) -> &DelayedWork {
        &self.reset_work
    }

    fn set_state(&self, state: LinkState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn pf(&self) -> PfRegs<SubWindow<&B>> {
        PfRegs::new(self.pci.csr().raw().at(PF_OFFSET))
    }

    fn lut(&self) -> LutRegs<SubWindow<&B>> {
        LutRegs::new(self.pci.csr().raw().at(LUT_OFFSET))
    }

    fn is_bridge(&self) -> bool {
        self.pci.csr().read8(PCI_HEADER_TYPE.into()) & 0x7f == PCI_HEADER_TYPE_BRIDGE
    }

    /// Erratum A-011451: the default ACK latency timeout is too long.
    fn workaround_a011451(&self) {
        let pab = self.pci.pab();
        let val = pab.gpex_ack_replay_to() & !ACK_LAT_TO_VAL_MASK;
        pab.set_gpex_ack_replay_to(val | 4);
    }

    /// Runs the reset work if it is due. Returns `true` if it ran.
    ///
    /// Process context: the recovery sleeps between polls.
    pub fn run_pending_reset(&self) -> bool {
        let now = self.pci.services().now_us();
        self.reset_work.run_if_due(now, || self.recover_from_reset())
    }

    fn recover_from_reset(&self) {
        let csr = self.pci.csr();
        let ctrl = csr.read16(PCI_BRIDGE_CONTROL.into());
        csr.write16(PCI_BRIDGE_CONTROL.into(), ctrl & !PCI_BRIDGE_CTL_BUS_RESET);

        if self.reinit_hw().is_err() {
            self.set_state(LinkState::LinkDown);
            return;
        }

        self.set_state(LinkState::Training);
        if self.wait_for_link() {
            self.set_state(LinkState::LinkUp);
        } else {
            dev_err!(self.pci.name(), "link training timeout");
            self.set_state(LinkState::LinkDown);
        }
    }

    /// Waits for the PAB to finish its reset, releases it and re-runs the
    /// host init.
    fn reinit_hw(&self) -> Result<(), DriverError> {
        let services = self.pci.services();
        let pab = self.pci.pab();
        let pf = self.pf();

        // Reset entered and the bridge idle.
        let ready =
            || pf.int_stat().contains(PfIntStat::PABRST) && pab.activity_stat() == 0;
        let mut attempts = 1;
        while !ready() {
            if attempts == RESET_POLL_ATTEMPTS {
                dev_err!(self.pci.name(), "poll PABRST&PABACT timeout");
                return Err(DriverError::Timeout);
            }
            services.usleep_range(10, 15);
            attempts += 1;
        }

        pf.set_dbg(pf.dbg() | PfDbg::WE);
        pf.set_dbg(pf.dbg() | PfDbg::PABR);
        pf.set_dbg(pf.dbg() - PfDbg::WE);

        self.pci.host_init(self, true)
    }

    fn wait_for_link(&self) -> bool {
        for _ in 0..LINK_TRAINING_ATTEMPTS {
            if self.link_up() {
                return true;
            }
            self.pci.services().usleep_range(200, 250);
        }
        false
    }
}

impl<B: RegisterIo, S: KernelServices> PabOps for LsPcieG4<'_, B, S> {
    fn link_up(&self) -> bool {
        self.pf().dbg().bits() & PF_DBG_LTSSM_MASK == LTSSM_L0
    }

    fn host_init(&self) -> Result<(), DriverError> {
        // Latched on first init; a reset does not change the silicon.
        let _ = self.rev.set(self.pci.csr().read8(PCI_REVISION_ID.into()));
        if self.rev() == REV_1_0 {
            self.workaround_a011451();
        }
        Ok(())
    }
}

impl<B: RegisterIo, S: KernelServices> RootPortOps for LsPcieG4<'_, B, S> {
    fn interrupt_init(&self) -> Result<(), DriverError> {
        let name = self.pci.name();
        let Some(irq) = self.pci.node().irq_by_name("intr") else {
            dev_err!(name, "Can't get 'intr' irq");
            return Err(DriverError::ResourceUnavailable);
        };
        self.pci
            .services()
            .request_irq(irq, IrqFlags::SHARED, name)
            .inspect_err(|_| dev_err!(name, "Can't register PCIe IRQ"))?;

        self.pci.pab().set_intp_amba_misc_enb(
            MiscIntr::INTX
                | MiscIntr::MSI
                | MiscIntr::RESET
                | MiscIntr::PCIE_UE
                | MiscIntr::IE_PMREDI
                | MiscIntr::IE_EC,
        );
        Ok(())
    }

    fn read_other_conf(
        &self,
        bus: &PciBus,
        devfn: u8,
        offset: u16,
        size: u8,
    ) -> Result<u32, PciBiosError> {
        // Rev 1.0 can return a stale vendor id with relaxed reads enabled.
        let strict = self.rev() == REV_1_0 && offset == PCI_VENDOR_ID;
        if strict {
            self.lut().set_gcr(LutGcr::empty());
        }
        let ret = generic_config_read(self, bus, devfn, offset, size);
        if strict {
            self.lut().set_gcr(LutGcr::RRE);
        }
        ret
    }
}

impl<B: RegisterIo, S: KernelServices> PciOps for LsPcieG4<'_, B, S> {
    fn map_bus(&self, bus: &PciBus, devfn: u8, offset: u16) -> Option<ConfigRef<'_>> {
        self.pci.map_bus(self, bus, devfn, offset)
    }

    fn read(&self, bus: &PciBus, devfn: u8, offset: u16, size: u8) -> Result<u32, PciBiosError> {
        self.pci.config_read(self, bus, devfn, offset, size)
    }
}

impl<B: RegisterIo + Sync, S: KernelServices> IrqHandler for LsPcieG4<'_, B, S> {
    fn handle_irq(&self) -> IrqReturn {
        let pab = self.pci.pab();
        let val = pab.intp_amba_misc_stat();
        if val.is_empty() {
            return IrqReturn::None;
        }

        if val.contains(MiscIntr::RESET) {
            self.set_state(LinkState::ResetInProgress);
            let now = self.pci.services().now_us();
            self.reset_work.schedule(now, RESET_WORK_DELAY_US);
        }

        pab.set_intp_amba_misc_stat(val);
        IrqReturn::Handled
    }
}

impl<B, S> Driver for LsPcieG4<'_, B, S> {
    fn info(&self) -> DriverInfo {
        DriverInfo {
            name: "layerscape-pcie-gen4",
            driver_type: DriverType::PciHost,
            description: "NXP Layerscape Gen4 PCIe controller",
        }
    }
}

impl<'a, B: RegisterIo, S: KernelServices> PlatformDriver for LsPcieG4<'a, B, S> {
    const MATCH: DeviceMatch = DeviceMatch {
        of_compatible: &["fsl,lx2160a-pcie"],
        acpi_hid: &[],
    };

    type Resources = MobiveilResources<'a, B, S>;

    fn probe(resources: Self::Resources) -> Result<Self, DriverError> {
        let node = resources.node;
        if node.phandle("msi-parent", 0).is_none() {
            dev_err!(node.name(), "failed to find msi-parent");
            return Err(DriverError::ResourceUnavailable);
        }

        let pcie = Self {
            pci: MobiveilPcie::new(resources)?,
            rev: WriteOnce::new(),
            reset_work: DelayedWork::new(),
            state: AtomicU8::new(LinkState::LinkDown as u8),
        };

        pcie.pci
            .host_probe(&pcie)
            .inspect_err(|_| dev_err!(node.name(), "fail to probe"))?;

        if !pcie.is_bridge() {
            return Err(DriverError::DeviceNotFound);
        }

        if pcie.link_up() {
            pcie.set_state(LinkState::LinkUp);
        }
        dev_info!(
            node.name(),
            "rev {:#04x}, link {:?}",
            pcie.rev(),
            pcie.link_state()
        );
        Ok(pcie)
    }
}

#[cfg(test)]
mod tests {
    use lynx_core::log::{capture, LogLevel};
    use lynx_driver_api::mock::{MockNode, MockServices};
    use lynx_mmio::mock::MockRegisters;

    use super::*;
    use crate::pci::mobiveil::tests::{resources, TestIo};
    use crate::testutil::{logged, take_logs, PagedMock};

    const PF_INT_STAT: usize = PF_OFFSET + 0x18;
    const PF_DBG: usize = PF_OFFSET + 0x7fc;
    const LUT_GCR: usize = LUT_OFFSET + 0x28;
    const MISC_STAT: usize = 0xb1c;
    const ACK_REPLAY_TO: usize = 0x438;

    struct Rig {
        node: MockNode,
        hw: PagedMock,
        cfg: MockRegisters,
        svc: MockServices,
    }

    impl Rig {
        fn new() -> Self {
            Self::with_node(
                MockNode::new("pcie@3600000", 9)
                    .compatible("fsl,lx2160a-pcie")
                    .phandles("msi-parent", &[3])
                    .irq("intr", 140),
            )
        }

        fn with_node(node: MockNode) -> Self {
            capture::install();
            let hw = PagedMock::new();
            hw.regs.write_one_to_clear(MISC_STAT);
            Self {
                node,
                hw,
                cfg: MockRegisters::new(),
                svc: MockServices::new(),
            }
        }

        /// Controller state without running probe.
        fn bare(&self) -> LsPcieG4<'_, TestIo<'_>, MockServices> {
            LsPcieG4 {
                pci: MobiveilPcie::new(resources(&self.node, &self.hw, &self.cfg, &self.svc))
                    .unwrap(),
                rev: WriteOnce::new(),
                reset_work: DelayedWork::new(),
                state: AtomicU8::new(LinkState::LinkUp as u8),
            }
        }

        fn probe(&self) -> Result<LsPcieG4<'_, TestIo<'_>, MockServices>, DriverError> {
            LsPcieG4::probe(resources(&self.node, &self.hw, &self.cfg, &self.svc))
        }

        /// Raises the reset interrupt and lets the work come due.
        fn signal_reset(&self, pcie: &LsPcieG4<'_, TestIo<'_>, MockServices>) {
            self.hw.regs.poke(MISC_STAT, MiscIntr::RESET.bits());
            assert_eq!(pcie.handle_irq(), IrqReturn::Handled);
            self.svc.advance_us(RESET_WORK_DELAY_US);
        }
    }

    #[test]
    fn link_up_iff_ltssm_is_l0() {
        let rig = Rig::new();
        let pcie = rig.bare();
        for (dbg, up) in [
            (0x2d, true),
            (0x8800_002d, true),
            (0x40 | 0x2d, true),
            (0x2c, false),
            (0x11, false),
            (0, false),
        ] {
            rig.hw.regs.poke(PF_DBG, dbg);
            assert_eq!(pcie.link_up(), up, "dbg = {dbg:#x}");
        }
    }

    #[test]
    fn ack_timeout_workaround_only_on_rev_1_0() {
        let rig = Rig::new();
        rig.hw.regs.poke(0x08, 0x0604_0010);
        rig.hw.regs.poke(ACK_REPLAY_TO, 0xdead_1fff);
        let pcie = rig.bare();
        PabOps::host_init(&pcie).unwrap();
        assert_eq!(pcie.rev(), REV_1_0);
        assert_eq!(rig.hw.regs.peek(ACK_REPLAY_TO), 0xdead_0004);

        let rig = Rig::new();
        rig.hw.regs.poke(0x08, 0x0604_0020);
        rig.hw.regs.poke(ACK_REPLAY_TO, 0xdead_1fff);
        let pcie = rig.bare();
        PabOps::host_init(&pcie).unwrap();
        assert_eq!(pcie.rev(), 0x20);
        assert!(rig.hw.regs.writes_to(ACK_REPLAY_TO).is_empty());
    }

    #[test]
    fn revision_is_latched_on_first_init() {
        let rig = Rig::new();
        rig.hw.regs.poke(0x08, 0x20);
        let pcie = rig.bare();
        PabOps::host_init(&pcie).unwrap();
        rig.hw.regs.poke(0x08, 0x10);
        PabOps::host_init(&pcie).unwrap();
        assert_eq!(pcie.rev(), 0x20);
        assert!(rig.hw.regs.writes_to(ACK_REPLAY_TO).is_empty());
    }

    #[test]
    fn handler_ignores_zero_status() {
        let rig = Rig::new();
        let pcie = rig.bare();
        assert_eq!(pcie.handle_irq(), IrqReturn::None);
        assert!(rig.hw.regs.writes_to(MISC_STAT).is_empty());
        assert!(!pcie.reset_work().is_pending());
    }

    #[test]
    fn handler_clears_status_and_schedules_reset_once() {
        let rig = Rig::new();
        let pcie = rig.bare();
        rig.hw.regs.poke(MISC_STAT, (MiscIntr::RESET | MiscIntr::INTA).bits());

        assert_eq!(pcie.handle_irq(), IrqReturn::Handled);
        assert_eq!(rig.hw.regs.peek(MISC_STAT), 0);
        assert!(pcie.reset_work().is_pending());
        assert_eq!(pcie.reset_work().due_us(), Some(RESET_WORK_DELAY_US));
        assert_eq!(pcie.link_state(), LinkState::ResetInProgress);

        // A second reset while the first is pending is coalesced.
        rig.svc.advance_us(500);
        rig.hw.regs.poke(MISC_STAT, MiscIntr::RESET.bits());
        assert_eq!(pcie.handle_irq(), IrqReturn::Handled);
        assert_eq!(pcie.reset_work().due_us(), Some(RESET_WORK_DELAY_US));

        // No polling from interrupt context.
        assert!(rig.svc.sleeps().is_empty());
        assert_eq!(rig.hw.regs.reads(PF_INT_STAT), 0);
    }

    #[test]
    fn handler_without_reset_bit_does_not_schedule() {
        let rig = Rig::new();
        let pcie = rig.bare();
        rig.hw.regs.poke(MISC_STAT, MiscIntr::MSI.bits());
        assert_eq!(pcie.handle_irq(), IrqReturn::Handled);
        assert!(!pcie.reset_work().is_pending());
        assert_eq!(pcie.link_state(), LinkState::LinkUp);
    }

    #[test]
    fn reset_work_waits_for_due_time() {
        let rig = Rig::new();
        let pcie = rig.bare();
        rig.hw.regs.poke(MISC_STAT, MiscIntr::RESET.bits());
        pcie.handle_irq();
        assert!(!pcie.run_pending_reset());
        assert_eq!(rig.hw.regs.reads(PF_INT_STAT), 0);
    }

    #[test]
    fn completed_handshake_needs_no_delay() {
        let rig = Rig::new();
        rig.hw.regs.poke(0x3c, u32::from(PCI_BRIDGE_CTL_BUS_RESET | 0x3) << 16);
        rig.hw.regs.poke(PF_INT_STAT, PfIntStat::PABRST.bits());
        rig.hw.regs.poke(PF_DBG, LTSSM_L0);
        let pcie = rig.bare();
        rig.signal_reset(&pcie);

        assert!(pcie.run_pending_reset());
        assert!(rig.svc.sleeps().is_empty());
        assert_eq!(rig.hw.regs.reads(PF_INT_STAT), 1);
        assert_eq!(rig.hw.regs.peek(0x3c) >> 16, 0x3);
        assert_eq!(
            rig.hw.regs.writes_to(PF_DBG),
            vec![
                PfDbg::WE.bits() | LTSSM_L0,
                (PfDbg::WE | PfDbg::PABR).bits() | LTSSM_L0,
                PfDbg::PABR.bits() | LTSSM_L0,
            ]
        );
        // Host init re-ran without link bring-up.
        assert_eq!(pcie.pci().ob_wins_configured(), 3);
        assert_eq!(pcie.link_state(), LinkState::LinkUp);
    }

    #[test]
    fn handshake_gives_up_after_100_attempts() {
        let rig = Rig::new();
        let pcie = rig.bare();
        rig.signal_reset(&pcie);

        assert!(pcie.run_pending_reset());
        assert_eq!(rig.hw.regs.reads(PF_INT_STAT), 100);
        assert_eq!(rig.svc.sleeps(), vec![(10, 15); 99]);
        assert!(rig.hw.regs.writes_to(PF_DBG).is_empty());
        assert!(logged(
            &take_logs(),
            LogLevel::Error,
            "poll PABRST&PABACT timeout"
        ));
        assert_eq!(pcie.link_state(), LinkState::LinkDown);
        assert!(!pcie.reset_work().is_running());
    }

    #[test]
    fn busy_bridge_also_times_out() {
        let rig = Rig::new();
        rig.hw.regs.poke(PF_INT_STAT, PfIntStat::PABRST.bits());
        rig.hw.regs.poke(0x81c, 1);
        let pcie = rig.bare();
        rig.signal_reset(&pcie);

        assert!(pcie.run_pending_reset());
        assert_eq!(rig.hw.regs.reads(0x81c), 100);
        assert_eq!(pcie.link_state(), LinkState::LinkDown);
    }

    #[test]
    fn link_training_timeout_is_logged() {
        let rig = Rig::new();
        rig.hw.regs.poke(PF_INT_STAT, PfIntStat::PABRST.bits());
        let pcie = rig.bare();
        rig.signal_reset(&pcie);

        assert!(pcie.run_pending_reset());
        assert_eq!(rig.svc.sleeps(), vec![(200, 250); 100]);
        assert!(logged(&take_logs(), LogLevel::Error, "link training timeout"));
        assert_eq!(pcie.link_state(), LinkState::LinkDown);
    }

    #[test]
    fn vendor_id_reads_disable_relaxed_ordering_on_rev_1_0() {
        let rig = Rig::new();
        rig.hw.regs.poke(0x08, 0x10);
        rig.hw.regs.poke(PF_DBG, LTSSM_L0);
        rig.cfg.poke(0x00, 0x8d80_1957);
        let pcie = rig.bare();
        PabOps::host_init(&pcie).unwrap();
        let bus = PciBus { number: 1, primary: 0 };

        assert_eq!(pcie.read(&bus, 0, PCI_VENDOR_ID, 2), Ok(0x1957));
        assert_eq!(rig.hw.regs.writes_to(LUT_GCR), vec![0, LutGcr::RRE.bits()]);

        rig.hw.regs.clear_log();
        assert_eq!(pcie.read(&bus, 0, 0x02, 2), Ok(0x8d80));
        assert!(rig.hw.regs.writes_to(LUT_GCR).is_empty());
    }

    #[test]
    fn vendor_id_reads_untouched_on_later_revisions() {
        let rig = Rig::new();
        rig.hw.regs.poke(0x08, 0x20);
        rig.hw.regs.poke(PF_DBG, LTSSM_L0);
        let pcie = rig.bare();
        PabOps::host_init(&pcie).unwrap();
        let bus = PciBus { number: 1, primary: 0 };

        pcie.read(&bus, 0, PCI_VENDOR_ID, 2).unwrap();
        assert!(rig.hw.regs.writes_to(LUT_GCR).is_empty());
    }

    #[test]
    fn interrupt_init_requests_shared_line() {
        let rig = Rig::new();
        let pcie = rig.bare();
        pcie.interrupt_init().unwrap();

        let reqs = rig.svc.irq_requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].irq, 140);
        assert_eq!(reqs[0].flags, IrqFlags::SHARED);
        assert_eq!(rig.hw.regs.peek(0xb0c), 0x6000_03ea);
    }

    #[test]
    fn interrupt_init_needs_intr_line() {
        let rig = Rig::with_node(MockNode::new("pcie@3600000", 9).irq("aer", 141));
        let pcie = rig.bare();
        assert_eq!(
            pcie.interrupt_init(),
            Err(DriverError::ResourceUnavailable)
        );
        assert!(logged(&take_logs(), LogLevel::Error, "Can't get 'intr' irq"));
    }

    #[test]
    fn probe_requires_msi_parent() {
        let rig = Rig::with_node(MockNode::new("pcie@3600000", 9).irq("intr", 140));
        assert_eq!(rig.probe().err(), Some(DriverError::ResourceUnavailable));
        assert!(logged(&take_logs(), LogLevel::Error, "failed to find msi-parent"));
        assert!(rig.hw.regs.writes().is_empty());
    }

    #[test]
    fn probe_rejects_non_bridge_header() {
        let rig = Rig::new();
        rig.hw.regs.poke(PF_DBG, LTSSM_L0);
        assert_eq!(rig.probe().err(), Some(DriverError::DeviceNotFound));
    }

    #[test]
    fn probe_brings_up_bridge() {
        let rig = Rig::new();
        rig.hw.regs.poke(0x08, 0x10);
        rig.hw.regs.poke(0x0c, u32::from(PCI_HEADER_TYPE_BRIDGE) << 16);
        rig.hw.regs.poke(PF_DBG, LTSSM_L0);

        let pcie = rig.probe().unwrap();
        assert_eq!(pcie.rev(), REV_1_0);
        assert_eq!(pcie.link_state(), LinkState::LinkUp);
        assert_eq!(rig.hw.regs.peek(ACK_REPLAY_TO) & 0x1fff, 4);
        assert_eq!(rig.svc.irq_requests().len(), 1);
        assert!(rig.svc.sleeps().is_empty());
        assert!(LsPcieG4::<TestIo<'_>, MockServices>::MATCH.matches(&rig.node));
        assert_eq!(pcie.info().name, "layerscape-pcie-gen4");
    }

    #[test]
    fn probe_with_link_down_still_succeeds() {
        let rig = Rig::new();
        rig.hw.regs.poke(0x0c, u32::from(PCI_HEADER_TYPE_BRIDGE) << 16);

        let pcie = rig.probe().unwrap();
        assert_eq!(pcie.link_state(), LinkState::LinkDown);
        assert_eq!(rig.svc.sleeps().len(), 10);
    }
}
