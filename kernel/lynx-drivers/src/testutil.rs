//! Shared fixtures for driver tests.

use lynx_core::log::{capture, LogLevel};
use lynx_mmio::mock::MockRegisters;
use lynx_mmio::RegisterIo;

/// Emulates the Mobiveil CSR window over [`MockRegisters`].
///
/// Offsets `0xc00..0x1000` are a window into the page selected by
/// `PAB_CTRL[18:13]`; the mock underneath is indexed by the linear register
/// offset, so tests can `peek`/`poke` registers by their documented address.
pub struct PagedMock {
    pub regs: MockRegisters,
}

const PAB_CTRL: usize = 0x808;

impl PagedMock {
    pub fn new() -> Self {
        Self {
            regs: MockRegisters::new(),
        }
    }

    fn linear(&self, offset: usize) -> usize {
        if (0xc00..0x1000).contains(&offset) {
            let page = (self.regs.peek(PAB_CTRL) >> 13) & 0x3f;
            ((page as usize) << 10) | (offset & 0x3ff)
        } else {
            offset
        }
    }
}

impl RegisterIo for PagedMock {
    fn read8(&self, offset: usize) -> u8 {
        self.regs.read8(self.linear(offset))
    }
    fn read16(&self, offset: usize) -> u16 {
        self.regs.read16(self.linear(offset))
    }
    fn read32(&self, offset: usize) -> u32 {
        self.regs.read32(self.linear(offset))
    }
    fn write8(&self, offset: usize, value: u8) {
        self.regs.write8(self.linear(offset), value);
    }
    fn write16(&self, offset: usize, value: u16) {
        self.regs.write16(self.linear(offset), value);
    }
    fn write32(&self, offset: usize, value: u32) {
        self.regs.write32(self.linear(offset), value);
    }
}

/// Returns `true` if a captured line at `level` contains `needle`.
pub fn logged(lines: &[(LogLevel, String)], level: LogLevel, needle: &str) -> bool {
    lines.iter().any(|(l, m)| *l == level && m.contains(needle))
}

/// Drains this thread's captured log lines.
pub fn take_logs() -> Vec<(LogLevel, String)> {
    capture::take()
}
