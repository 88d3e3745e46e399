//! Register access layer for the Microsemi Ocelot/Felix switch family.
//!
//! The switch is split into target blocks (analyzer, queue system,
//! rewriter, ...) that the host maps as separate windows. Register offsets
//! differ between chips, so accesses go through symbolic [`Reg`] names and
//! a per-chip [`ChipDesc`]:
//!
//! ```text
//!   Reg::AnaPgidPgid ──► target Ana, index 19
//!                           │
//!          chip.map[Ana][19] = 0x8c00  + stride * (gi, ri)
//!                           │
//!                  targets[Ana].read32(..)
//! ```
//!
//! Bit fields ([`RegField`]) are resolved the same way and written with
//! read-modify-write.

pub mod regs;
pub mod vsc7514;

use lynx_core::{dev_dbg, dev_err};
use lynx_driver_api::{DriverError, KernelServices};
use lynx_mmio::RegisterIo;

pub use self::regs::{FieldDesc, Reg, RegField, RegMap, Target, TARGET_COUNT, TARGET_OFFSET};
use self::regs::REGFIELD_COUNT;

// ---------------------------------------------------------------------------
// Switch-wide constants
// ---------------------------------------------------------------------------

/// First aggregation PGID.
pub const PGID_AGGR: u32 = 64;
/// First source PGID.
pub const PGID_SRC: u32 = 80;

/// Reserved PGID for frames to the CPU.
pub const PGID_CPU: u32 = PGID_AGGR - 5;
/// Unknown unicast flood mask.
pub const PGID_UC: u32 = PGID_AGGR - 4;
/// Unknown multicast flood mask.
pub const PGID_MC: u32 = PGID_AGGR - 3;
/// Unknown IPv4 multicast flood mask.
pub const PGID_MCIPV4: u32 = PGID_AGGR - 2;
/// Unknown IPv6 multicast flood mask.
pub const PGID_MCIPV6: u32 = PGID_AGGR - 1;
/// First PGID usable for multicast redirection.
pub const PGID_MCRED: u32 = PGID_CPU - 20;

/// Size of a queue-system buffer cell, in bytes.
pub const OCELOT_BUFFER_CELL_SZ: u32 = 60;

/// Injection/extraction frame header length, in 32-bit words.
pub const IFH_LEN: usize = 4;
/// Long prefix of an extraction header (XFH), in bytes.
pub const XFH_LONG_PREFIX_LEN: usize = 32;

/// IFH: bypass the analyzer on injection.
pub const IFH_INJ_BYPASS: u32 = 1 << 31;
/// IFH: disable the pop count.
pub const IFH_INJ_POP_CNT_DISABLE: u32 = 3 << 28;

/// IFH tag type: C-tag.
pub const IFH_TAG_TYPE_C: u32 = 0;
/// IFH tag type: S-tag.
pub const IFH_TAG_TYPE_S: u32 = 1;

/// Port speed encodings used by the MAC configuration registers.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSpeed {
    /// 2.5 Gbit/s.
    Speed2500 = 0,
    /// 1 Gbit/s.
    Speed1000 = 1,
    /// 100 Mbit/s.
    Speed100 = 2,
    /// 10 Mbit/s.
    Speed10 = 3,
}

impl PortSpeed {
    /// Decodes a hardware speed field.
    pub const fn from_u8(val: u8) -> Option<Self> {
        match val {
            0 => Some(Self::Speed2500),
            1 => Some(Self::Speed1000),
            2 => Some(Self::Speed100),
            3 => Some(Self::Speed10),
            _ => None,
        }
    }
}

/// Attempts at polling `SYS_RESET_CFG.MEM_INIT` during reset, 1 ms apart.
pub const MEM_INIT_POLL_ATTEMPTS: u32 = 100;

// ---------------------------------------------------------------------------
// Chip description
// ---------------------------------------------------------------------------

/// Everything that differs between members of the family.
#[derive(Debug)]
pub struct ChipDesc {
    /// Chip name for log messages.
    pub name: &'static str,
    /// Register offset table.
    pub map: RegMap,
    /// Bit-field placements; `None` for fields the chip lacks.
    pub fields: &'static [Option<FieldDesc>; REGFIELD_COUNT],
    /// Registers the switch cannot work without.
    pub required: &'static [Reg],
}

impl ChipDesc {
    /// Placement of `field`, if the chip has it.
    pub fn field(&self, field: RegField) -> Option<FieldDesc> {
        self.fields[field as usize]
    }
}

// ---------------------------------------------------------------------------
// Switch instance
// ---------------------------------------------------------------------------

/// An Ocelot-family switch with its target windows mapped.
pub struct Ocelot<'a, B> {
    name: &'a str,
    chip: &'static ChipDesc,
    targets: [Option<B>; TARGET_COUNT],
}

impl<'a, B: RegisterIo> Ocelot<'a, B> {
    /// Binds `chip`'s layout to the mapped windows, indexed by
    /// [`Target::slot`].
    ///
    /// # Errors
    ///
    /// [`DriverError::ResourceUnavailable`] if a required register has no
    /// offset or its target has no window, or if a field the chip
    /// describes lives in an unreachable register.
    pub fn new(
        name: &'a str,
        chip: &'static ChipDesc,
        targets: [Option<B>; TARGET_COUNT],
    ) -> Result<Self, DriverError> {
        let sw = Self {
            name,
            chip,
            targets,
        };

        for &reg in chip.required {
            if !sw.reachable(reg) {
                dev_err!(name, "{}: required register {} is not mapped", chip.name, reg);
                return Err(DriverError::ResourceUnavailable);
            }
        }
        for desc in chip.fields.iter().flatten() {
            if !sw.reachable(desc.reg) {
                dev_err!(name, "{}: field register {} is not mapped", chip.name, desc.reg);
                return Err(DriverError::ResourceUnavailable);
            }
        }
        Ok(sw)
    }

    /// Device name used as the log prefix.
    pub fn name(&self) -> &str {
        self.name
    }

    /// The chip description in use.
    pub fn chip(&self) -> &'static ChipDesc {
        self.chip
    }

    fn reachable(&self, reg: Reg) -> bool {
        self.targets[reg.target().slot()].is_some() && self.chip.map.offset(reg).is_some()
    }

    fn locate(&self, reg: Reg, extra: Option<u32>) -> Option<(&B, usize)> {
        let io = self.targets[reg.target().slot()].as_ref();
        let off = self
            .chip
            .map
            .offset(reg)
            .zip(extra)
            .and_then(|(off, extra)| off.checked_add(extra));
        match (io, off) {
            (Some(io), Some(off)) => Some((io, off as usize)),
            _ => {
                dev_err!(self.name, "access to unmapped register {}", reg);
                None
            }
        }
    }

    /// Reads `reg` at byte offset `extra` past its base.
    ///
    /// Unmapped registers read as zero.
    pub fn read_at(&self, reg: Reg, extra: u32) -> u32 {
        self.read_in(reg, Some(extra))
    }

    fn read_in(&self, reg: Reg, extra: Option<u32>) -> u32 {
        self.locate(reg, extra).map_or(0, |(io, off)| io.read32(off))
    }

    /// Writes `reg` at byte offset `extra` past its base.
    ///
    /// Writes to unmapped registers are dropped.
    pub fn write_at(&self, reg: Reg, extra: u32, val: u32) {
        self.write_in(reg, Some(extra), val);
    }

    fn write_in(&self, reg: Reg, extra: Option<u32>, val: u32) {
        if let Some((io, off)) = self.locate(reg, extra) {
            io.write32(off, val);
        }
    }

    /// Replaces the bits of `mask` at `reg + extra` with those of `val`.
    pub fn rmw_at(&self, reg: Reg, extra: u32, val: u32, mask: u32) {
        self.rmw_in(reg, Some(extra), val, mask);
    }

    fn rmw_in(&self, reg: Reg, extra: Option<u32>, val: u32, mask: u32) {
        if let Some((io, off)) = self.locate(reg, extra) {
            let cur = io.read32(off);
            io.write32(off, (cur & !mask) | (val & mask));
        }
    }

    /// Reads a single register.
    pub fn read(&self, reg: Reg) -> u32 {
        self.read_at(reg, 0)
    }

    /// Reads instance `(gi, ri)` of a register array.
    pub fn read_ix(&self, reg: Reg, gi: u32, ri: u32) -> u32 {
        self.read_in(reg, reg.stride().offset(gi, ri))
    }

    /// Reads group `gi` of a register array.
    pub fn read_gix(&self, reg: Reg, gi: u32) -> u32 {
        self.read_in(reg, reg.stride().offset(gi, 0))
    }

    /// Reads replica `ri` of a register array.
    pub fn read_rix(&self, reg: Reg, ri: u32) -> u32 {
        self.read_in(reg, reg.stride().offset(0, ri))
    }

    /// Writes a single register.
    pub fn write(&self, reg: Reg, val: u32) {
        self.write_at(reg, 0, val);
    }

    /// Writes instance `(gi, ri)` of a register array.
    pub fn write_ix(&self, reg: Reg, gi: u32, ri: u32, val: u32) {
        self.write_in(reg, reg.stride().offset(gi, ri), val);
    }

    /// Writes group `gi` of a register array.
    pub fn write_gix(&self, reg: Reg, gi: u32, val: u32) {
        self.write_in(reg, reg.stride().offset(gi, 0), val);
    }

    /// Writes replica `ri` of a register array.
    pub fn write_rix(&self, reg: Reg, ri: u32, val: u32) {
        self.write_in(reg, reg.stride().offset(0, ri), val);
    }

    /// Read-modify-write of a single register.
    pub fn rmw(&self, reg: Reg, val: u32, mask: u32) {
        self.rmw_at(reg, 0, val, mask);
    }

    /// Read-modify-write of instance `(gi, ri)`.
    pub fn rmw_ix(&self, reg: Reg, gi: u32, ri: u32, val: u32, mask: u32) {
        self.rmw_in(reg, reg.stride().offset(gi, ri), val, mask);
    }

    /// Read-modify-write of group `gi`.
    pub fn rmw_gix(&self, reg: Reg, gi: u32, val: u32, mask: u32) {
        self.rmw_in(reg, reg.stride().offset(gi, 0), val, mask);
    }

    /// Read-modify-write of replica `ri`.
    pub fn rmw_rix(&self, reg: Reg, ri: u32, val: u32, mask: u32) {
        self.rmw_in(reg, reg.stride().offset(0, ri), val, mask);
    }

    fn field_desc(&self, field: RegField) -> Result<FieldDesc, DriverError> {
        self.chip.field(field).ok_or_else(|| {
            dev_err!(self.name, "{}: no field {:?}", self.chip.name, field);
            DriverError::Unsupported
        })
    }

    /// Reads a bit field, shifted down to bit 0.
    ///
    /// # Errors
    ///
    /// [`DriverError::Unsupported`] if the chip has no such field.
    pub fn field_read(&self, field: RegField) -> Result<u32, DriverError> {
        let desc = self.field_desc(field)?;
        Ok((self.read(desc.reg) & desc.mask()) >> desc.lsb)
    }

    /// Writes a bit field, leaving the rest of the register untouched.
    ///
    /// # Errors
    ///
    /// [`DriverError::Unsupported`] if the chip has no such field.
    pub fn field_write(&self, field: RegField, val: u32) -> Result<(), DriverError> {
        let desc = self.field_desc(field)?;
        self.rmw(desc.reg, val << desc.lsb, desc.mask());
        Ok(())
    }

    /// Initializes the switch memories and enables the core.
    ///
    /// `MEM_INIT` self-clears once the memories are initialized; it is
    /// polled every millisecond.
    ///
    /// # Errors
    ///
    /// [`DriverError::Timeout`] if `MEM_INIT` never clears, or
    /// [`DriverError::Unsupported`] if the chip lacks the reset fields.
    pub fn reset<S: KernelServices + ?Sized>(&self, services: &S) -> Result<(), DriverError> {
        self.field_write(RegField::SysResetCfgMemInit, 1)?;
        self.field_write(RegField::SysResetCfgMemEna, 1)?;

        let mut retries = MEM_INIT_POLL_ATTEMPTS;
        loop {
            services.msleep(1);
            let busy = self.field_read(RegField::SysResetCfgMemInit)? != 0;
            retries -= 1;
            if !busy {
                break;
            }
            if retries == 0 {
                dev_err!(self.name, "switch memory initialization timed out");
                return Err(DriverError::Timeout);
            }
        }

        self.field_write(RegField::SysResetCfgMemEna, 1)?;
        self.field_write(RegField::SysResetCfgCoreEna, 1)?;
        dev_dbg!(self.name, "{}: switch core enabled", self.chip.name);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Per-port registers
// ---------------------------------------------------------------------------

/// The register window of one front port.
///
/// Port blocks repeat per port, so offsets come from the chip map while the
/// window comes from the port.
pub struct OcelotPort<B> {
    regs: B,
    chip: &'static ChipDesc,
    chip_port: u8,
}

impl<B: RegisterIo> OcelotPort<B> {
    /// Wraps the window of port `chip_port`.
    pub const fn new(regs: B, chip: &'static ChipDesc, chip_port: u8) -> Self {
        Self {
            regs,
            chip,
            chip_port,
        }
    }

    /// Port number on the switch.
    pub const fn chip_port(&self) -> u8 {
        self.chip_port
    }

    /// Reads `reg` from the port window; unmapped registers read as zero.
    pub fn readl(&self, reg: Reg) -> u32 {
        self.chip
            .map
            .offset(reg)
            .map_or(0, |off| self.regs.read32(off as usize))
    }

    /// Writes `reg` in the port window; unmapped registers are ignored.
    pub fn writel(&self, reg: Reg, val: u32) {
        if let Some(off) = self.chip.map.offset(reg) {
            self.regs.write32(off as usize, val);
        }
    }
}
