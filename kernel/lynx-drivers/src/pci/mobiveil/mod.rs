//! Mobiveil GPEX PCIe root complex, the generic layer.
//!
//! The Mobiveil IP is shared by several SoCs; each platform driver embeds a
//! [`MobiveilPcie`] and plugs its quirks in through two traits:
//!
//! - [`PabOps`]: link-up detection and extra host initialization;
//! - [`RootPortOps`]: interrupt setup and config reads below the root port.
//!
//! The generic layer owns the CSR window, address translation windows,
//! config-space routing and the default INTx/MSI interrupt path. The
//! Layerscape Gen4 driver replaces the interrupt path; [`plat`] is the plain
//! platform driver that uses it.

pub mod host;
pub mod plat;
pub mod regs;

use lynx_core::sync::SpinLock;
use lynx_core::{dev_err, dev_warn, kerr};
use lynx_driver_api::pci::{BridgeWindow, PciBiosError, PciBus};
use lynx_driver_api::{DriverError, FwNode, KernelServices, MappedRegion, MemResource};
use lynx_mmio::RegisterIo;

use self::regs::{
    LTSSM_STATUS_L0, LTSSM_STATUS_L0_MASK, MAX_PIO_WINDOWS, PAB_CTRL, PAGE_SEL_MASK,
    PAGE_SEL_SHIFT, PAGED_ADDR_BNDRY, PabRegs, offset_to_page_addr, offset_to_page_idx,
};

// ---------------------------------------------------------------------------
// Paged CSR access
// ---------------------------------------------------------------------------

/// The CSR window with the PAB paging scheme applied.
///
/// Offsets below `0xc00` are accessed directly with the page select
/// cleared; higher offsets select their page in `PAB_CTRL` first. Only
/// naturally aligned accesses reach the hardware: a misaligned read returns
/// zero and a misaligned write is dropped, both logged.
///
/// Page selection and the access are two separate bus cycles. The host
/// serializes config accesses; the interrupt path only touches unpaged
/// registers.
pub struct PagedCsr<B> {
    io: B,
}

impl<B: RegisterIo> PagedCsr<B> {
    /// Wraps the raw CSR window.
    pub const fn new(io: B) -> Self {
        Self { io }
    }

    /// The raw window, for blocks outside the PAB register file.
    pub fn raw(&self) -> &B {
        &self.io
    }

    fn select_page(&self, idx: u32) {
        let mut val = self.io.read32(PAB_CTRL);
        val &= !(PAGE_SEL_MASK << PAGE_SEL_SHIFT);
        val |= (idx & PAGE_SEL_MASK) << PAGE_SEL_SHIFT;
        self.io.write32(PAB_CTRL, val);
    }

    /// Selects the page for `off` and returns the address to access.
    fn comp_addr(&self, off: usize) -> usize {
        if off < PAGED_ADDR_BNDRY {
            self.select_page(0);
            return off;
        }
        self.select_page(offset_to_page_idx(off));
        offset_to_page_addr(off)
    }

    fn aligned(off: usize, size: usize, write: bool) -> bool {
        if off & (size - 1) == 0 {
            return true;
        }
        if write {
            kerr!("mobiveil: write CSR address {:#x} failed", off);
        } else {
            kerr!("mobiveil: read CSR address {:#x} failed", off);
        }
        false
    }
}

impl<B: RegisterIo> RegisterIo for PagedCsr<B> {
    fn read8(&self, offset: usize) -> u8 {
        let addr = self.comp_addr(offset);
        self.io.read8(addr)
    }

    fn read16(&self, offset: usize) -> u16 {
        if !Self::aligned(offset, 2, false) {
            return 0;
        }
        let addr = self.comp_addr(offset);
        self.io.read16(addr)
    }

    fn read32(&self, offset: usize) -> u32 {
        if !Self::aligned(offset, 4, false) {
            return 0;
        }
        let addr = self.comp_addr(offset);
        self.io.read32(addr)
    }

    fn write8(&self, offset: usize, value: u8) {
        let addr = self.comp_addr(offset);
        self.io.write8(addr, value);
    }

    fn write16(&self, offset: usize, value: u16) {
        if Self::aligned(offset, 2, true) {
            let addr = self.comp_addr(offset);
            self.io.write16(addr, value);
        }
    }

    fn write32(&self, offset: usize, value: u32) {
        if Self::aligned(offset, 4, true) {
            let addr = self.comp_addr(offset);
            self.io.write32(addr, value);
        }
    }
}

// ---------------------------------------------------------------------------
// Platform hooks
// ---------------------------------------------------------------------------

/// PAB-level hooks of a platform driver.
pub trait PabOps {
    /// Returns `true` if the PCIe link is in L0.
    fn link_up(&self) -> bool;

    /// Platform-specific initialization, run last in
    /// [`MobiveilPcie::host_init`].
    ///
    /// # Errors
    ///
    /// Platform-specific; aborts the first initialization.
    fn host_init(&self) -> Result<(), DriverError> {
        Ok(())
    }
}

/// Root-port hooks of a platform driver.
pub trait RootPortOps {
    /// Sets up interrupt delivery.
    ///
    /// # Errors
    ///
    /// [`DriverError::ResourceUnavailable`] if the interrupt or its
    /// registers cannot be obtained.
    fn interrupt_init(&self) -> Result<(), DriverError>;

    /// Reads config space of a device below the root bus.
    ///
    /// # Errors
    ///
    /// See [`PciBiosError`].
    fn read_other_conf(
        &self,
        bus: &PciBus,
        devfn: u8,
        offset: u16,
        size: u8,
    ) -> Result<u32, PciBiosError>;
}

// ---------------------------------------------------------------------------
// Probe resources
// ---------------------------------------------------------------------------

/// What a Mobiveil-based driver is probed with.
pub struct MobiveilResources<'a, B, S> {
    /// The controller's firmware node.
    pub node: &'a dyn FwNode,
    /// The `csr_axi_slave` region.
    pub csr: Option<MappedRegion<B>>,
    /// The `config_axi_slave` region.
    pub config: Option<MappedRegion<B>>,
    /// The `apb_csr` region; only the default interrupt path needs it.
    pub apb_csr: Option<MappedRegion<B>>,
    /// Host bridge windows from `ranges` and `bus-range`.
    pub windows: &'a [BridgeWindow],
    /// Kernel services.
    pub services: &'a S,
}

// ---------------------------------------------------------------------------
// MobiveilPcie
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct WindowState {
    ob_wins_configured: u32,
    ib_wins_configured: u32,
    root_bus_nr: u8,
}

/// Generic Mobiveil root complex state.
pub struct MobiveilPcie<'a, B, S> {
    node: &'a dyn FwNode,
    services: &'a S,
    /// CSR window; also the root port's config space.
    csr: PagedCsr<B>,
    /// Physical base of the CSR window; MSI doorbells live here.
    pcie_reg_base: u64,
    /// Config window for devices below the root port.
    config: B,
    /// Physical range of the config window.
    ob_io_res: MemResource,
    /// MSI receiver registers, if mapped.
    apb_csr: Option<B>,
    apio_wins: u32,
    ppio_wins: u32,
    windows: &'a [BridgeWindow],
    wins: SpinLock<WindowState>,
    /// Serializes read-modify-write of the INTx enable mask.
    intx_mask_lock: SpinLock<()>,
    /// MSI vectors in use, one bit per vector.
    msi_in_use: SpinLock<u16>,
}

impl<'a, B: RegisterIo, S: KernelServices> MobiveilPcie<'a, B, S> {
    /// Takes the regions and window budgets from the probe resources.
    ///
    /// # Errors
    ///
    /// [`DriverError::ResourceUnavailable`] if `csr_axi_slave` or
    /// `config_axi_slave` is missing.
    pub fn new(res: MobiveilResources<'a, B, S>) -> Result<Self, DriverError> {
        let node = res.node;
        let Some(config) = res.config else {
            dev_err!(node.name(), "missing config_axi_slave resource");
            return Err(DriverError::ResourceUnavailable);
        };
        let Some(csr) = res.csr else {
            dev_err!(node.name(), "missing csr_axi_slave resource");
            return Err(DriverError::ResourceUnavailable);
        };

        Ok(Self {
            node,
            services: res.services,
            csr: PagedCsr::new(csr.io),
            pcie_reg_base: csr.res.start(),
            config: config.io,
            ob_io_res: config.res,
            apb_csr: res.apb_csr.map(|r| r.io),
            apio_wins: window_budget(node, "apio-wins"),
            ppio_wins: window_budget(node, "ppio-wins"),
            windows: res.windows,
            wins: SpinLock::new(WindowState::default()),
            intx_mask_lock: SpinLock::new(()),
            msi_in_use: SpinLock::new(0),
        })
    }

    /// The controller's firmware node.
    pub fn node(&self) -> &'a dyn FwNode {
        self.node
    }

    /// Log prefix.
    pub fn name(&self) -> &'a str {
        self.node.name()
    }

    /// Kernel services the controller was probed with.
    pub fn services(&self) -> &'a S {
        self.services
    }

    /// Paged CSR access.
    pub fn csr(&self) -> &PagedCsr<B> {
        &self.csr
    }

    /// Typed PAB registers.
    pub fn pab(&self) -> PabRegs<&PagedCsr<B>> {
        PabRegs::new(&self.csr)
    }

    /// Number of outbound windows firmware granted.
    pub fn apio_wins(&self) -> u32 {
        self.apio_wins
    }

    /// Number of inbound windows firmware granted.
    pub fn ppio_wins(&self) -> u32 {
        self.ppio_wins
    }

    /// Root bus number, from the bridge's bus range.
    pub fn root_bus_nr(&self) -> u8 {
        self.wins.lock().root_bus_nr
    }

    /// Outbound windows programmed so far.
    pub fn ob_wins_configured(&self) -> u32 {
        self.wins.lock().ob_wins_configured
    }

    /// Inbound windows programmed so far.
    pub fn ib_wins_configured(&self) -> u32 {
        self.wins.lock().ib_wins_configured
    }

    /// Link-up test from the GPEX LTSSM status, for platforms without their
    /// own.
    pub fn default_link_up(&self) -> bool {
        self.pab().ltssm_status() & LTSSM_STATUS_L0_MASK == LTSSM_STATUS_L0
    }
}

/// Reads a window budget, defaulting to (and capped at) the hardware count.
fn window_budget(node: &dyn FwNode, prop: &str) -> u32 {
    match node.property_u32(prop) {
        None => MAX_PIO_WINDOWS,
        Some(n) if n > MAX_PIO_WINDOWS => {
            dev_warn!(node.name(), "{} = {} exceeds {}", prop, n, MAX_PIO_WINDOWS);
            MAX_PIO_WINDOWS
        }
        Some(n) => n,
    }
}
