//! Root complex bring-up, config-space routing and the default interrupt
//! path.

use lynx_core::{dev_dbg, dev_err, dev_info};
use lynx_driver_api::irq::{
    ChildDomain, ChipCallback, IrqChip, IrqChipOps, IrqFlags, MsiDomainInfo, MsiFlags, MsiMsg,
};
use lynx_driver_api::pci::{
    generic_config_read, pci_func, pci_slot, BridgeWindowKind, ConfigRef, PciBiosError, PciBus,
    PciOps, PCI_CLASS_BRIDGE_PCI, PCI_COMMAND, PCI_COMMAND_IO, PCI_COMMAND_MASTER,
    PCI_COMMAND_MEMORY, PCI_PRIMARY_BUS,
};
use lynx_driver_api::{DriverError, KernelServices};
use lynx_mmio::RegisterIo;

use super::regs::{
    MiscIntr, MsiRegs, PabCtrl, WindowType, APIO_EN_MASK, AXI_WINDOW_ALIGN_MASK, IB_WIN_SIZE,
    PAB_BUS_SHIFT, PAB_CTRL, PAB_DEVICE_SHIFT, PAB_FUNCTION_SHIFT, PAB_INTX_START, PCI_NUM_INTX,
    PCI_NUM_MSI, PIO_ENABLE, WIN_ENABLE, WIN_SIZE_MASK, WIN_TYPE_MASK, WIN_TYPE_SHIFT,
};
use super::{MobiveilPcie, PabOps, RootPortOps};

/// Link polls during first bring-up.
const LINK_WAIT_MAX_RETRIES: u32 = 10;
/// Shortest pause between link polls, in microseconds.
const LINK_WAIT_MIN_US: u64 = 90_000;
/// Longest pause between link polls, in microseconds.
const LINK_WAIT_MAX_US: u64 = 100_000;

/// Size of the MSI doorbell region.
const MSI_REGION_SIZE: u32 = 4096;

/// Chip of the PCI MSI domain the host stacks on the bridge's vectors.
pub static MOBIVEIL_MSI_IRQ_CHIP: IrqChip = IrqChip {
    name: "Mobiveil PCIe MSI",
    mask: ChipCallback::MsiDomain,
    unmask: ChipCallback::MsiDomain,
    eoi: ChipCallback::None,
    set_affinity: ChipCallback::None,
};

/// PCI MSI domain description for the default interrupt path.
pub static MOBIVEIL_MSI_DOMAIN_INFO: MsiDomainInfo = MsiDomainInfo {
    flags: MsiFlags::USE_DEF_DOM_OPS
        .union(MsiFlags::USE_DEF_CHIP_OPS)
        .union(MsiFlags::PCI_MSIX),
    chip: &MOBIVEIL_MSI_IRQ_CHIP,
    prepare: None,
};

const fn lower_32_bits(v: u64) -> u32 {
    v as u32
}

const fn upper_32_bits(v: u64) -> u32 {
    (v >> 32) as u32
}

// ---------------------------------------------------------------------------
// Address translation windows
// ---------------------------------------------------------------------------

impl<B: RegisterIo, S: KernelServices> MobiveilPcie<'_, B, S> {
    /// Programs outbound (AXI to PCIe) window `win`.
    ///
    /// Windows past the `apio-wins` budget, or of zero size, are refused and
    /// logged.
    pub fn program_ob_window(
        &self,
        win: u32,
        cpu_addr: u64,
        pci_addr: u64,
        ty: WindowType,
        size: u64,
    ) {
        if win >= self.apio_wins {
            dev_err!(self.name(), "max outbound windows reached");
            return;
        }
        if size == 0 {
            dev_err!(self.name(), "refusing zero-size outbound window {}", win);
            return;
        }
        let n = win as usize;
        let pab = self.pab();
        let size64 = !(size - 1);

        let mut value = pab.axi_amap_ctrl(n);
        value &= !((WIN_TYPE_MASK << WIN_TYPE_SHIFT) | WIN_SIZE_MASK);
        value |= WIN_ENABLE | ((ty as u32) << WIN_TYPE_SHIFT) | (lower_32_bits(size64) & WIN_SIZE_MASK);
        pab.set_axi_amap_ctrl(n, value);
        pab.set_ext_axi_amap_size(n, upper_32_bits(size64));

        pab.set_axi_amap_axi_win(n, lower_32_bits(cpu_addr) & !AXI_WINDOW_ALIGN_MASK);
        pab.set_ext_axi_amap_axi_win(n, upper_32_bits(cpu_addr));

        pab.set_axi_amap_pex_win_l(n, lower_32_bits(pci_addr));
        pab.set_axi_amap_pex_win_h(n, upper_32_bits(pci_addr));

        self.wins.lock().ob_wins_configured += 1;
    }

    /// Programs inbound (PCIe to AXI) window `win`.
    ///
    /// Windows past the `ppio-wins` budget, or of zero size, are refused and
    /// logged.
    pub fn program_ib_window(
        &self,
        win: u32,
        cpu_addr: u64,
        pci_addr: u64,
        ty: WindowType,
        size: u64,
    ) {
        if win >= self.ppio_wins {
            dev_err!(self.name(), "max inbound windows reached");
            return;
        }
        if size == 0 {
            dev_err!(self.name(), "refusing zero-size inbound window {}", win);
            return;
        }
        let n = win as usize;
        let pab = self.pab();
        let size64 = !(size - 1);

        let mut value = pab.pex_amap_ctrl(n);
        value &= !((WIN_TYPE_MASK << WIN_TYPE_SHIFT) | WIN_SIZE_MASK);
        value |= WIN_ENABLE | ((ty as u32) << WIN_TYPE_SHIFT) | (lower_32_bits(size64) & WIN_SIZE_MASK);
        pab.set_pex_amap_ctrl(n, value);
        pab.set_ext_pex_amap_sizen(n, upper_32_bits(size64));

        pab.set_pex_amap_axi_win(n, lower_32_bits(cpu_addr));
        pab.set_ext_pex_amap_axi_win(n, upper_32_bits(cpu_addr));

        pab.set_pex_amap_pex_win_l(n, lower_32_bits(pci_addr));
        pab.set_pex_amap_pex_win_h(n, upper_32_bits(pci_addr));

        self.wins.lock().ib_wins_configured += 1;
    }

    /// Disables outbound window `win`.
    pub fn disable_ob_window(&self, win: u32) {
        let pab = self.pab();
        let n = win as usize;
        pab.set_axi_amap_ctrl(n, pab.axi_amap_ctrl(n) & !WIN_ENABLE);
    }

    /// Disables inbound window `win`.
    pub fn disable_ib_window(&self, win: u32) {
        let pab = self.pab();
        let n = win as usize;
        pab.set_pex_amap_ctrl(n, pab.pex_amap_ctrl(n) & !WIN_ENABLE);
    }

    // -----------------------------------------------------------------------
    // Bring-up
    // -----------------------------------------------------------------------

    /// Waits for the link to reach L0.
    ///
    /// # Errors
    ///
    /// [`DriverError::Timeout`] after [`LINK_WAIT_MAX_RETRIES`] polls.
    pub fn bringup_link<P: PabOps + ?Sized>(&self, pab: &P) -> Result<(), DriverError> {
        for _ in 0..LINK_WAIT_MAX_RETRIES {
            if pab.link_up() {
                return Ok(());
            }
            self.services.usleep_range(LINK_WAIT_MIN_US, LINK_WAIT_MAX_US);
        }
        dev_err!(self.name(), "link never came up");
        Err(DriverError::Timeout)
    }

    /// Programs the root complex for operation.
    ///
    /// The first initialization (`reinit == false`) disables every window
    /// and waits for the link; a link that stays down is logged and the
    /// bridge is set up anyway. After a hardware reset (`reinit == true`)
    /// both steps are skipped and the window counters start over.
    ///
    /// # Errors
    ///
    /// Whatever the platform [`PabOps::host_init`] returns.
    pub fn host_init<P: PabOps + ?Sized>(&self, pab: &P, reinit: bool) -> Result<(), DriverError> {
        if !reinit {
            for win in 0..self.apio_wins {
                self.disable_ob_window(win);
            }
            for win in 0..self.ppio_wins {
                self.disable_ib_window(win);
            }
            if self.bringup_link(pab).is_err() {
                dev_info!(self.name(), "link bring-up failed");
            }
        }
        {
            let mut wins = self.wins.lock();
            wins.ob_wins_configured = 0;
            wins.ib_wins_configured = 0;
        }

        let csr = &self.csr;
        let regs = self.pab();

        // Primary 0, secondary 1, subordinate 0xff.
        let value = csr.read32(PCI_PRIMARY_BUS.into());
        csr.write32(PCI_PRIMARY_BUS.into(), (value & 0xff00_0000) | 0x00ff_0100);

        csr.modify32(
            PCI_COMMAND.into(),
            0,
            PCI_COMMAND_IO | PCI_COMMAND_MEMORY | PCI_COMMAND_MASTER,
        );
        csr.modify32(PAB_CTRL, 0, (PabCtrl::AMBA_PIO | PabCtrl::PEX_PIO).bits());
        regs.set_axi_pio_ctrl(regs.axi_pio_ctrl() | APIO_EN_MASK);
        regs.set_pex_pio_ctrl(regs.pex_pio_ctrl() | PIO_ENABLE);

        // Window 0 out is config space, window 0 in takes all upstream
        // traffic; the bridge ranges get the remaining outbound windows.
        self.program_ob_window(
            0,
            self.ob_io_res.start(),
            0,
            WindowType::Cfg,
            self.ob_io_res.size(),
        );
        self.program_ib_window(0, 0, 0, WindowType::Mem, IB_WIN_SIZE);

        for win in self.windows {
            let ty = match win.kind {
                BridgeWindowKind::Mem => WindowType::Mem,
                BridgeWindowKind::Io => WindowType::Io,
                BridgeWindowKind::Bus => {
                    self.wins.lock().root_bus_nr = win.cpu_start as u8;
                    continue;
                }
            };
            let idx = self.ob_wins_configured();
            self.program_ob_window(idx, win.cpu_start, win.pci_start, ty, win.size);
        }

        let class = regs.intp_axi_pio_class() & 0xff;
        regs.set_intp_axi_pio_class(class | (PCI_CLASS_BRIDGE_PCI << 16));

        pab.host_init()
    }

    /// First-time setup: [`host_init`](Self::host_init) followed by the
    /// platform's interrupt setup.
    ///
    /// # Errors
    ///
    /// Errors of either step, logged.
    pub fn host_probe<P: PabOps + RootPortOps + ?Sized>(&self, ops: &P) -> Result<(), DriverError> {
        self.host_init(ops, false)
            .inspect_err(|_| dev_err!(self.name(), "failed to initialize host"))?;
        ops.interrupt_init()
            .inspect_err(|_| dev_err!(self.name(), "interrupt init failed"))
    }

    // -----------------------------------------------------------------------
    // Config space
    // -----------------------------------------------------------------------

    /// Returns `false` for addresses where no device can answer.
    pub fn valid_device<P: PabOps + ?Sized>(&self, pab: &P, bus: &PciBus, devfn: u8) -> bool {
        let root = self.root_bus_nr();

        // No link, no devices.
        if bus.number > root && !pab.link_up() {
            return false;
        }
        // One device per root port.
        if bus.number == root && devfn > 0 {
            return false;
        }
        // Only one device directly below the root port.
        if bus.primary == root && pci_slot(devfn) > 0 {
            return false;
        }
        true
    }

    /// Routes a config access: the root port through the CSR window, other
    /// devices through the config window with the BDF programmed into
    /// outbound window 0.
    pub fn map_bus<P: PabOps + ?Sized>(
        &self,
        pab: &P,
        bus: &PciBus,
        devfn: u8,
        offset: u16,
    ) -> Option<ConfigRef<'_>> {
        if !self.valid_device(pab, bus, devfn) {
            return None;
        }

        if bus.number == self.root_bus_nr() {
            return Some(ConfigRef {
                io: &self.csr,
                offset: offset.into(),
            });
        }

        let value = (u32::from(bus.number) << PAB_BUS_SHIFT)
            | (u32::from(pci_slot(devfn)) << PAB_DEVICE_SHIFT)
            | (u32::from(pci_func(devfn)) << PAB_FUNCTION_SHIFT);
        self.pab().set_axi_amap_pex_win_l(0, value);

        Some(ConfigRef {
            io: &self.config,
            offset: offset.into(),
        })
    }

    /// Config read: root bus through the generic accessor, everything below
    /// through [`RootPortOps::read_other_conf`].
    ///
    /// # Errors
    ///
    /// See [`PciBiosError`].
    pub fn config_read<P: RootPortOps + PciOps + ?Sized>(
        &self,
        ops: &P,
        bus: &PciBus,
        devfn: u8,
        offset: u16,
        size: u8,
    ) -> Result<u32, PciBiosError> {
        if bus.number > self.root_bus_nr() {
            return ops.read_other_conf(bus, devfn, offset, size);
        }
        generic_config_read(ops, bus, devfn, offset, size)
    }

    // -----------------------------------------------------------------------
    // Default interrupt path
    // -----------------------------------------------------------------------

    /// Points the MSI receiver at the CSR window and enables it.
    ///
    /// # Errors
    ///
    /// [`DriverError::ResourceUnavailable`] without an `apb_csr` region.
    pub fn enable_msi(&self) -> Result<(), DriverError> {
        let Some(apb) = &self.apb_csr else {
            dev_err!(self.name(), "missing apb_csr resource");
            return Err(DriverError::ResourceUnavailable);
        };
        let msi = MsiRegs::new(apb);
        msi.set_base_lo(lower_32_bits(self.pcie_reg_base));
        msi.set_base_hi(upper_32_bits(self.pcie_reg_base));
        msi.set_size(MSI_REGION_SIZE);
        msi.set_enable(1);
        Ok(())
    }

    /// Interrupt setup for platforms that use the bridge's INTx and MSI
    /// decoding: enables the MSI receiver, claims the first interrupt of the
    /// node for [`isr`](Self::isr) and unmasks INTx and MSI.
    ///
    /// # Errors
    ///
    /// [`DriverError::ResourceUnavailable`] if `apb_csr` or the interrupt is
    /// missing, or the interrupt cannot be claimed.
    pub fn default_interrupt_init(&self) -> Result<(), DriverError> {
        self.enable_msi()?;

        let Some(irq) = self.node.irq(0) else {
            dev_err!(self.name(), "failed to map IRQ");
            return Err(DriverError::ResourceUnavailable);
        };
        self.services
            .request_irq(irq, IrqFlags::empty(), self.name())
            .inspect_err(|_| dev_err!(self.name(), "failed to request IRQ {}", irq.number()))?;

        self.pab()
            .set_intp_amba_misc_enb(MiscIntr::INTX | MiscIntr::MSI);
        Ok(())
    }

    fn intx_bit(&self, hwirq: u32) -> Option<MiscIntr> {
        if !(1..=PCI_NUM_INTX).contains(&hwirq) {
            dev_err!(self.name(), "invalid INTx {}", hwirq);
            return None;
        }
        Some(MiscIntr::from_bits_retain(1 << (hwirq + PAB_INTX_START - 1)))
    }

    /// Masks INTx `hwirq` (1 = INTA .. 4 = INTD).
    ///
    /// Out-of-range values are logged and ignored.
    pub fn mask_intx(&self, hwirq: u32) {
        let Some(bit) = self.intx_bit(hwirq) else {
            return;
        };
        let pab = self.pab();
        let _guard = self.intx_mask_lock.lock();
        pab.set_intp_amba_misc_enb(pab.intp_amba_misc_enb() - bit);
    }

    /// Unmasks INTx `hwirq` (1 = INTA .. 4 = INTD).
    ///
    /// Out-of-range values are logged and ignored.
    pub fn unmask_intx(&self, hwirq: u32) {
        let Some(bit) = self.intx_bit(hwirq) else {
            return;
        };
        let pab = self.pab();
        let _guard = self.intx_mask_lock.lock();
        pab.set_intp_amba_misc_enb(pab.intp_amba_misc_enb() | bit);
    }

    /// Reserves the lowest free MSI vector.
    ///
    /// # Errors
    ///
    /// [`DriverError::NoSpace`] when all vectors are in use.
    pub fn msi_alloc(&self) -> Result<u32, DriverError> {
        let mut in_use = self.msi_in_use.lock();
        let bit = (!*in_use).trailing_zeros();
        if bit >= PCI_NUM_MSI {
            return Err(DriverError::NoSpace);
        }
        *in_use |= 1 << bit;
        Ok(bit)
    }

    /// Releases MSI vector `hwirq`. Freeing an unused vector is logged.
    pub fn msi_free(&self, hwirq: u32) {
        let mut in_use = self.msi_in_use.lock();
        if hwirq >= PCI_NUM_MSI || *in_use & (1 << hwirq) == 0 {
            dev_err!(self.name(), "trying to free unused MSI#{}", hwirq);
            return;
        }
        *in_use &= !(1 << hwirq);
    }

    /// Message a device writes to raise MSI vector `hwirq`.
    pub fn compose_msi_msg(&self, hwirq: u32) -> MsiMsg {
        let addr = self.pcie_reg_base + u64::from(hwirq) * 4;
        let msg = MsiMsg::new(addr, hwirq);
        dev_dbg!(
            self.name(),
            "msi#{} address_hi {:#x} address_lo {:#x}",
            hwirq,
            msg.address_hi,
            msg.address_lo
        );
        msg
    }

    /// MSI vectors cannot be steered; every vector goes to the bridge
    /// interrupt.
    ///
    /// # Errors
    ///
    /// Always [`DriverError::InvalidArgument`].
    pub fn msi_set_affinity(&self) -> Result<(), DriverError> {
        Err(DriverError::InvalidArgument)
    }

    /// Chained handler for the bridge interrupt: demultiplexes INTx and
    /// drains the MSI FIFO into the child domains.
    pub fn isr(&self) {
        let pab = self.pab();
        let owner = self.node.handle();

        let intr_status = pab.intp_amba_misc_stat() & pab.intp_amba_misc_enb();

        if intr_status.intersects(MiscIntr::INTX) {
            let pending = || (pab.intp_amba_misc_stat() & MiscIntr::INTX).bits() >> PAB_INTX_START;
            let mut shifted = pending();
            while shifted != 0 {
                for bit in (0..PCI_NUM_INTX).filter(|&b| shifted & (1 << b) != 0) {
                    if !self
                        .services
                        .handle_child_irq(owner, ChildDomain::Intx, bit + 1)
                    {
                        dev_err!(self.name(), "unexpected IRQ, INT{}", bit);
                    }
                    pab.set_intp_amba_misc_stat(MiscIntr::from_bits_retain(
                        1 << (PAB_INTX_START + bit),
                    ));
                }
                shifted = pending();
            }
        }

        if let Some(apb) = &self.apb_csr {
            let msi = MsiRegs::new(apb);
            while msi.status() & 1 != 0 {
                let data = msi.data();
                // The FIFO only pops once the address has been read too.
                let lo = msi.addr_l();
                let hi = msi.addr_h();
                dev_dbg!(
                    self.name(),
                    "MSI registers, data: {:08x}, addr: {:08x}:{:08x}",
                    data,
                    hi,
                    lo
                );
                self.services.handle_child_irq(owner, ChildDomain::Msi, data);
            }
        }

        pab.set_intp_amba_misc_stat(intr_status);
    }
}

impl<B: RegisterIo + Sync, S: KernelServices> IrqChipOps for MobiveilPcie<'_, B, S> {
    fn name(&self) -> &'static str {
        "mobiveil_pcie:intx"
    }

    fn mask(&self, hwirq: u32) {
        self.mask_intx(hwirq);
    }

    fn unmask(&self, hwirq: u32) {
        self.unmask_intx(hwirq);
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use lynx_core::log::{capture, LogLevel};
    use lynx_driver_api::mock::{MockNode, MockServices};
    use lynx_driver_api::pci::{read_config_or_ones, BridgeWindow};
    use lynx_driver_api::{FwHandle, MappedRegion, MemResource};
    use lynx_mmio::mock::MockRegisters;

    use super::super::tests::{resources, TestIo, CFG_BASE, CSR_BASE};
    use super::*;
    use crate::testutil::{logged, take_logs, PagedMock};

    struct Plain<'a> {
        pcie: MobiveilPcie<'a, TestIo<'a>, MockServices>,
        up: Cell<bool>,
        hooks: Cell<u32>,
    }

    impl PabOps for Plain<'_> {
        fn link_up(&self) -> bool {
            self.up.get()
        }

        fn host_init(&self) -> Result<(), DriverError> {
            self.hooks.set(self.hooks.get() + 1);
            Ok(())
        }
    }

    impl RootPortOps for Plain<'_> {
        fn interrupt_init(&self) -> Result<(), DriverError> {
            self.pcie.default_interrupt_init()
        }

        fn read_other_conf(
            &self,
            _bus: &PciBus,
            _devfn: u8,
            _offset: u16,
            _size: u8,
        ) -> Result<u32, PciBiosError> {
            Ok(0xdead)
        }
    }

    impl PciOps for Plain<'_> {
        fn map_bus(&self, bus: &PciBus, devfn: u8, offset: u16) -> Option<ConfigRef<'_>> {
            self.pcie.map_bus(self, bus, devfn, offset)
        }

        fn read(&self, bus: &PciBus, devfn: u8, offset: u16, size: u8) -> Result<u32, PciBiosError> {
            self.pcie.config_read(self, bus, devfn, offset, size)
        }
    }

    struct Rig {
        node: MockNode,
        hw: PagedMock,
        cfg: MockRegisters,
        apb: MockRegisters,
        svc: MockServices,
    }

    impl Rig {
        fn new(node: MockNode) -> Self {
            capture::install();
            Self {
                node,
                hw: PagedMock::new(),
                cfg: MockRegisters::new(),
                apb: MockRegisters::new(),
                svc: MockServices::new(),
            }
        }

        fn plain(&self, up: bool) -> Plain<'_> {
            let mut res = resources(&self.node, &self.hw, &self.cfg, &self.svc);
            res.apb_csr = Some(MappedRegion {
                io: &self.apb,
                res: MemResource::new(0x34_0010_0000, 0x1000),
            });
            Plain {
                pcie: MobiveilPcie::new(res).unwrap(),
                up: Cell::new(up),
                hooks: Cell::new(0),
            }
        }
    }

    fn node() -> MockNode {
        MockNode::new("pcie@3400000", 5).irq("intr", 118)
    }

    #[test]
    fn host_init_programs_bridge_and_windows() {
        let rig = Rig::new(node());
        rig.hw.regs.poke(0x18, 0xab00_0000);
        rig.hw.regs.poke(0x474, 0x1234_5678);
        let p = rig.plain(true);

        p.pcie.host_init(&p, false).unwrap();

        let regs = &rig.hw.regs;
        assert_eq!(regs.peek(0x18), 0xabff_0100);
        assert_eq!(regs.peek(0x04) & 0x7, 0x7);
        assert_eq!(regs.peek(PAB_CTRL) & 0x3, 0x3);
        assert_eq!(regs.peek(0x840) & 0xf, 0xf);
        assert_eq!(regs.peek(0x8c0) & 0x1, 0x1);

        // Outbound 0: config window.
        assert_eq!(regs.peek(0xba0), 0xf000_0001);
        assert_eq!(regs.peek(0xba4), lower_32_bits(CFG_BASE));
        assert_eq!(regs.peek(0x80a0), upper_32_bits(CFG_BASE));
        // Outbound 1: memory range.
        assert_eq!(regs.peek(0xbb0), 0xc000_0005);
        assert_eq!(regs.peek(0xbb4), 0x4000_0000);
        assert_eq!(regs.peek(0x80a4), 0x90);
        assert_eq!(regs.peek(0xbb8), 0x4000_0000);
        assert_eq!(regs.peek(0xbaf4), 0xffff_ffff);
        // Outbound 2: I/O range.
        assert_eq!(regs.peek(0xbc0), 0xffff_0003);
        // Inbound 0: 256 GiB of memory.
        assert_eq!(regs.peek(0x4ba0), 0x5);
        assert_eq!(regs.peek(0xbef0), 0xffff_ffc0);

        assert_eq!(regs.peek(0x474), 0x0604_0078);
        assert_eq!(p.pcie.ob_wins_configured(), 3);
        assert_eq!(p.pcie.ib_wins_configured(), 1);
        assert_eq!(p.pcie.root_bus_nr(), 0);
        assert_eq!(p.hooks.get(), 1);
        assert!(rig.svc.sleeps().is_empty());
    }

    #[test]
    fn host_init_continues_when_link_stays_down() {
        let rig = Rig::new(node());
        let p = rig.plain(false);

        assert_eq!(p.pcie.host_init(&p, false), Ok(()));
        assert_eq!(rig.svc.sleeps(), vec![(90_000, 100_000); 10]);
        let lines = take_logs();
        assert!(logged(&lines, LogLevel::Error, "link never came up"));
        assert!(logged(&lines, LogLevel::Info, "link bring-up failed"));
        assert_eq!(p.hooks.get(), 1);
    }

    #[test]
    fn reinit_skips_bringup_and_reuses_windows() {
        let rig = Rig::new(node());
        let p = rig.plain(true);
        p.pcie.host_init(&p, false).unwrap();
        rig.hw.regs.clear_log();
        p.up.set(false);

        p.pcie.host_init(&p, true).unwrap();
        assert!(rig.svc.sleeps().is_empty());
        assert_eq!(p.pcie.ob_wins_configured(), 3);
        assert_eq!(p.pcie.ib_wins_configured(), 1);
        assert!(rig.hw.regs.writes_to(0xbd0).is_empty());
        assert_eq!(rig.hw.regs.peek(0xbc0) & WIN_ENABLE, WIN_ENABLE);
    }

    #[test]
    fn windows_past_budget_are_refused() {
        let rig = Rig::new(node().u32_prop("apio-wins", 2));
        let p = rig.plain(true);
        p.pcie.host_init(&p, false).unwrap();

        assert_eq!(p.pcie.ob_wins_configured(), 2);
        assert_eq!(rig.hw.regs.peek(0xbc0), 0);
        assert!(logged(&take_logs(), LogLevel::Error, "max outbound windows reached"));
    }

    #[test]
    fn zero_size_windows_are_refused() {
        static EMPTY: [BridgeWindow; 1] = [BridgeWindow {
            kind: BridgeWindowKind::Mem,
            cpu_start: 0x90_4000_0000,
            pci_start: 0x4000_0000,
            size: 0,
        }];
        let rig = Rig::new(node());
        let mut res = resources(&rig.node, &rig.hw, &rig.cfg, &rig.svc);
        res.windows = &EMPTY;
        let p = Plain {
            pcie: MobiveilPcie::new(res).unwrap(),
            up: Cell::new(true),
            hooks: Cell::new(0),
        };

        p.pcie.host_init(&p, false).unwrap();
        assert_eq!(p.pcie.ob_wins_configured(), 1);
        assert_eq!(rig.hw.regs.peek(0xbb0), 0);

        p.pcie.program_ib_window(1, 0, 0, WindowType::Mem, 0);
        assert_eq!(p.pcie.ib_wins_configured(), 1);
        assert_eq!(rig.hw.regs.peek(0x4bb0), 0);

        let lines = take_logs();
        assert!(logged(&lines, LogLevel::Error, "refusing zero-size outbound window 1"));
        assert!(logged(&lines, LogLevel::Error, "refusing zero-size inbound window 1"));
    }

    #[test]
    fn config_routing() {
        let rig = Rig::new(node());
        let p = rig.plain(true);
        p.pcie.host_init(&p, false).unwrap();
        let root = PciBus { number: 0, primary: 0 };
        let below = PciBus { number: 1, primary: 0 };
        let deeper = PciBus { number: 2, primary: 1 };

        assert!(p.map_bus(&root, 0, 0).is_some());
        assert!(p.map_bus(&root, 8, 0).is_none());
        assert!(p.map_bus(&below, 1 << 3, 0).is_none());

        assert!(p.map_bus(&below, 0, 0).is_some());
        assert_eq!(rig.hw.regs.peek(0xba8), 1 << 24);

        assert!(p.map_bus(&deeper, (3 << 3) | 2, 0).is_some());
        assert_eq!(rig.hw.regs.peek(0xba8), (2 << 24) | (3 << 19) | (2 << 16));

        p.up.set(false);
        assert!(p.map_bus(&below, 0, 0).is_none());
        assert!(p.map_bus(&root, 0, 0).is_some());
    }

    #[test]
    fn config_read_dispatch() {
        let rig = Rig::new(node());
        rig.hw.regs.poke(0x00, 0x8d80_1957);
        let p = rig.plain(true);
        let root = PciBus { number: 0, primary: 0 };
        let below = PciBus { number: 1, primary: 0 };

        assert_eq!(p.read(&root, 0, 0, 2), Ok(0x1957));
        assert_eq!(p.read(&below, 0, 0, 4), Ok(0xdead));
        assert_eq!(read_config_or_ones(&p, &root, 8, 0, 4), u32::MAX);
    }

    #[test]
    fn default_interrupt_init_enables_msi_and_intx() {
        let rig = Rig::new(node());
        let p = rig.plain(true);

        p.interrupt_init().unwrap();
        assert_eq!(rig.apb.peek(0x04), lower_32_bits(CSR_BASE));
        assert_eq!(rig.apb.peek(0x08), upper_32_bits(CSR_BASE));
        assert_eq!(rig.apb.peek(0x0c), 4096);
        assert_eq!(rig.apb.peek(0x14), 1);
        assert_eq!(rig.hw.regs.peek(0xb0c), 0x1e8);
        let reqs = rig.svc.irq_requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].irq, 118);
        assert_eq!(reqs[0].flags, IrqFlags::empty());
    }

    #[test]
    fn default_interrupt_init_needs_irq_and_apb() {
        let rig = Rig::new(MockNode::new("pcie@3400000", 5));
        let p = rig.plain(true);
        assert_eq!(p.interrupt_init(), Err(DriverError::ResourceUnavailable));

        let rig = Rig::new(node());
        let p = Plain {
            pcie: MobiveilPcie::new(resources(&rig.node, &rig.hw, &rig.cfg, &rig.svc)).unwrap(),
            up: Cell::new(true),
            hooks: Cell::new(0),
        };
        assert_eq!(p.interrupt_init(), Err(DriverError::ResourceUnavailable));
        assert!(logged(&take_logs(), LogLevel::Error, "missing apb_csr resource"));
    }

    #[test]
    fn intx_mask_and_unmask() {
        let rig = Rig::new(node());
        let p = rig.plain(true);
        let chip: &dyn IrqChipOps = &p.pcie;

        chip.unmask(1);
        chip.unmask(4);
        assert_eq!(rig.hw.regs.peek(0xb0c), (1 << 5) | (1 << 8));
        chip.mask(1);
        assert_eq!(rig.hw.regs.peek(0xb0c), 1 << 8);
        assert_eq!(chip.name(), "mobiveil_pcie:intx");
    }

    #[test]
    fn out_of_range_intx_leaves_misc_enable_alone() {
        let rig = Rig::new(node());
        rig.hw.regs.poke(0xb0c, MiscIntr::MSI.bits());
        let p = rig.plain(true);

        p.pcie.unmask_intx(0);
        p.pcie.unmask_intx(5);
        p.pcie.unmask_intx(31);
        p.pcie.mask_intx(u32::MAX);
        assert_eq!(rig.hw.regs.peek(0xb0c), MiscIntr::MSI.bits());
        assert!(rig.hw.regs.writes_to(0xb0c).is_empty());
        assert!(logged(&take_logs(), LogLevel::Error, "invalid INTx 31"));
    }

    #[test]
    fn msi_vectors_allocate_lowest_free() {
        let rig = Rig::new(node());
        let p = rig.plain(true);

        for expect in 0..16 {
            assert_eq!(p.pcie.msi_alloc(), Ok(expect));
        }
        assert_eq!(p.pcie.msi_alloc(), Err(DriverError::NoSpace));

        p.pcie.msi_free(3);
        assert_eq!(p.pcie.msi_alloc(), Ok(3));

        p.pcie.msi_free(7);
        p.pcie.msi_free(7);
        assert!(logged(&take_logs(), LogLevel::Error, "trying to free unused MSI#7"));
    }

    #[test]
    fn msi_message_points_into_csr_window() {
        let rig = Rig::new(node());
        let p = rig.plain(true);
        let msg = p.pcie.compose_msi_msg(5);
        assert_eq!(msg, MsiMsg::new(CSR_BASE + 20, 5));
        assert_eq!(p.pcie.msi_set_affinity(), Err(DriverError::InvalidArgument));
    }

    #[test]
    fn isr_dispatches_intx_and_drains_msi_fifo() {
        let rig = Rig::new(node());
        let p = rig.plain(true);
        let stat = 0xb1c;
        rig.hw.regs.write_one_to_clear(stat);
        rig.hw.regs.poke(stat, (MiscIntr::INTA | MiscIntr::INTC | MiscIntr::MSI).bits());
        rig.hw.regs.poke(0xb0c, (MiscIntr::INTX | MiscIntr::MSI).bits());
        rig.svc.map_child_irq(FwHandle(5), ChildDomain::Intx, 1);
        rig.apb.script(0x18, &[1, 1, 0]);
        rig.apb.script(0x20, &[7, 9]);

        p.pcie.isr();

        assert_eq!(
            rig.svc.dispatched(),
            vec![
                (ChildDomain::Intx, 1),
                (ChildDomain::Intx, 3),
                (ChildDomain::Msi, 7),
                (ChildDomain::Msi, 9),
            ]
        );
        assert_eq!(rig.hw.regs.peek(stat), 0);
        assert_eq!(rig.apb.reads(0x24), 2);
        assert_eq!(rig.apb.reads(0x28), 2);
        assert!(logged(&take_logs(), LogLevel::Error, "unexpected IRQ, INT2"));
    }
}
