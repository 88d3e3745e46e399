//! Mobiveil GPEX register definitions.
//!
//! The PAB (PCIe-AXI bridge) registers live in the CSR window. Everything at
//! or above [`PAGED_ADDR_BNDRY`] is reached through a 1 KiB paged window; see
//! [`PagedCsr`](super::PagedCsr). The MSI receiver has its own small block in
//! the `apb_csr` window.

use bitflags::bitflags;
use lynx_mmio::register_block;

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

/// First CSR offset that is only reachable through the paged window.
pub const PAGED_ADDR_BNDRY: usize = 0xc00;
/// Offset bits addressed inside one page.
pub const PAGE_LO_MASK: usize = 0x3ff;
/// Shift from a CSR offset to its page index.
pub const PAGE_SEL_OFFSET_SHIFT: usize = 10;
/// Page index field in `PAB_CTRL`.
pub const PAGE_SEL_SHIFT: u32 = 13;
/// Width mask of the page index field.
pub const PAGE_SEL_MASK: u32 = 0x3f;

/// Page that holds CSR offset `off`.
#[must_use]
pub const fn offset_to_page_idx(off: usize) -> u32 {
    ((off >> PAGE_SEL_OFFSET_SHIFT) as u32) & PAGE_SEL_MASK
}

/// Address of CSR offset `off` inside the paged window.
#[must_use]
pub const fn offset_to_page_addr(off: usize) -> usize {
    (off & PAGE_LO_MASK) | PAGED_ADDR_BNDRY
}

// ---------------------------------------------------------------------------
// Register offsets used outside the register block
// ---------------------------------------------------------------------------

/// PAB control register; holds the page select field.
pub const PAB_CTRL: usize = 0x808;

/// LTSSM state in the GPEX status register.
pub const LTSSM_STATUS_L0_MASK: u32 = 0x3f;
/// LTSSM encoding of L0.
pub const LTSSM_STATUS_L0: u32 = 0x2d;

/// ACK latency timeout field of `GPEX_ACK_REPLAY_TO`.
pub const ACK_LAT_TO_VAL_MASK: u32 = 0x1fff;

/// Bus number position in `PAB_AXI_AMAP_PEX_WIN_L`.
pub const PAB_BUS_SHIFT: u32 = 24;
/// Device number position in `PAB_AXI_AMAP_PEX_WIN_L`.
pub const PAB_DEVICE_SHIFT: u32 = 19;
/// Function number position in `PAB_AXI_AMAP_PEX_WIN_L`.
pub const PAB_FUNCTION_SHIFT: u32 = 16;

// ---------------------------------------------------------------------------
// Window programming
// ---------------------------------------------------------------------------

/// Default number of outbound (APIO) and inbound (PPIO) windows.
pub const MAX_PIO_WINDOWS: u32 = 8;
/// Window enable bit in both AMAP control registers.
pub const WIN_ENABLE: u32 = 1 << 0;
/// Window type position in both AMAP control registers.
pub const WIN_TYPE_SHIFT: u32 = 1;
/// Window type width mask.
pub const WIN_TYPE_MASK: u32 = 0x3;
/// Size bits held in the AMAP control registers.
pub const WIN_SIZE_MASK: u32 = 0xffff_fc00;
/// Low address bits ignored by the outbound AXI window base.
pub const AXI_WINDOW_ALIGN_MASK: u32 = 0x3;
/// Size of the default inbound window.
pub const IB_WIN_SIZE: u64 = 256 * 1024 * 1024 * 1024;

/// Address space an AMAP window translates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum WindowType {
    /// Configuration space.
    Cfg = 0,
    /// I/O space.
    Io = 1,
    /// Memory space.
    Mem = 2,
}

// ---------------------------------------------------------------------------
// Interrupt status / enable
// ---------------------------------------------------------------------------

/// First INTx bit in [`MiscIntr`].
pub const PAB_INTX_START: u32 = 5;
/// Number of legacy INTx lines.
pub const PCI_NUM_INTX: u32 = 4;
/// Number of MSI vectors the receiver decodes.
pub const PCI_NUM_MSI: u32 = 16;

bitflags! {
    /// `PAB_INTP_AMBA_MISC_ENB` / `PAB_INTP_AMBA_MISC_STAT` bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MiscIntr: u32 {
        /// Reset request from the PCIe link.
        const RESET = 1 << 1;
        /// MSI received.
        const MSI = 1 << 3;
        /// INTA asserted.
        const INTA = 1 << 5;
        /// INTB asserted.
        const INTB = 1 << 6;
        /// INTC asserted.
        const INTC = 1 << 7;
        /// INTD asserted.
        const INTD = 1 << 8;
        /// All INTx lines.
        const INTX = Self::INTA.bits() | Self::INTB.bits() | Self::INTC.bits() | Self::INTD.bits();
        /// Uncorrectable PCIe error.
        const PCIE_UE = 1 << 9;
        /// PME / power-management request.
        const IE_PMREDI = 1 << 29;
        /// Internal error.
        const IE_EC = 1 << 30;
    }
}

bitflags! {
    /// `PAB_CTRL` enables (the page select field is handled separately).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PabCtrl: u32 {
        /// AXI-to-PCIe PIO.
        const AMBA_PIO = 1 << 0;
        /// PCIe-to-AXI PIO.
        const PEX_PIO = 1 << 1;
    }
}

/// Enables in `PAB_AXI_PIO_CTRL` (PIO, memory, I/O and config windows).
pub const APIO_EN_MASK: u32 = 0xf;
/// PIO enable in `PAB_PEX_PIO_CTRL`.
pub const PIO_ENABLE: u32 = 1 << 0;

// ---------------------------------------------------------------------------
// Register blocks
// ---------------------------------------------------------------------------

register_block! {
    /// PAB registers, addressed by linear CSR offset.
    pub PabRegs {
        /// GPEX LTSSM status.
        [0x404; u32; ro] ltssm_status,
        /// ACK latency / replay timer.
        [0x438; u32; rw] gpex_ack_replay_to,
        /// Class code reported by the root port.
        [0x474; u32; rw] intp_axi_pio_class,
        /// PAB activity; zero when the bridge is idle.
        [0x81c; u32; ro] activity_stat,
        /// AXI PIO control.
        [0x840; u32; rw] axi_pio_ctrl,
        /// PEX PIO control.
        [0x8c0; u32; rw] pex_pio_ctrl,
        /// Miscellaneous interrupt enable.
        [0xb0c; u32; rw] intp_amba_misc_enb => MiscIntr,
        /// Miscellaneous interrupt status (write one to clear).
        [0xb1c; u32; rw] intp_amba_misc_stat => MiscIntr,
        /// Outbound window control.
        [0xba0; u32; rw; 0x10 * 8] axi_amap_ctrl,
        /// Outbound window AXI base, low half.
        [0xba4; u32; rw; 0x10 * 8] axi_amap_axi_win,
        /// Outbound window PCIe base, low half (carries the BDF for config).
        [0xba8; u32; rw; 0x10 * 8] axi_amap_pex_win_l,
        /// Outbound window PCIe base, high half.
        [0xbac; u32; rw; 0x10 * 8] axi_amap_pex_win_h,
        /// Inbound window control.
        [0x4ba0; u32; rw; 0x10 * 8] pex_amap_ctrl,
        /// Inbound window AXI base, low half.
        [0x4ba4; u32; rw; 0x10 * 8] pex_amap_axi_win,
        /// Inbound window PCIe base, low half.
        [0x4ba8; u32; rw; 0x10 * 8] pex_amap_pex_win_l,
        /// Inbound window PCIe base, high half.
        [0x4bac; u32; rw; 0x10 * 8] pex_amap_pex_win_h,
        /// Outbound window AXI base, high half.
        [0x80a0; u32; rw; 0x4 * 8] ext_axi_amap_axi_win,
        /// Inbound window AXI base, high half.
        [0xb4a0; u32; rw; 0x4 * 8] ext_pex_amap_axi_win,
        /// Outbound window size, high half.
        [0xbaf0; u32; rw; 0x4 * 8] ext_axi_amap_size,
        /// Inbound window size, high half.
        [0xbef0; u32; rw; 0x4 * 8] ext_pex_amap_sizen,
    }
}

register_block! {
    /// MSI receiver registers in the `apb_csr` window.
    pub MsiRegs {
        /// Doorbell base, low half.
        [0x04; u32; wo] base_lo,
        /// Doorbell base, high half.
        [0x08; u32; wo] base_hi,
        /// Doorbell region size.
        [0x0c; u32; wo] size,
        /// Receiver enable.
        [0x14; u32; wo] enable,
        /// FIFO status; bit 0 set while messages are queued.
        [0x18; u32; ro] status,
        /// Data of the message at the FIFO head.
        [0x20; u32; ro] data,
        /// Address of the message at the FIFO head, low half.
        [0x24; u32; ro] addr_l,
        /// Address of the message at the FIFO head, high half.
        [0x28; u32; ro] addr_h,
    }
}
