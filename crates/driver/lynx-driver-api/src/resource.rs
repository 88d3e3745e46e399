//! Hardware resources handed to a driver at probe time.

/// A physical memory range from a firmware `reg`/`ranges` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemResource {
    start: u64,
    size: u64,
}

impl MemResource {
    /// Creates a range of `size` bytes at `start`.
    #[must_use]
    pub const fn new(start: u64, size: u64) -> Self {
        Self { start, size }
    }

    /// Returns the first address of the range.
    #[must_use]
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// Returns the size of the range in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns the last address of the range (inclusive).
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.start + self.size.saturating_sub(1)
    }

    /// Returns `true` if `addr` lies inside the range.
    #[must_use]
    pub const fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr - self.start < self.size
    }
}

/// A named `reg` entry the host has already mapped.
///
/// `io` reaches the registers; `res` is the physical range, which drivers
/// need for address translation windows and MSI doorbells.
#[derive(Debug, Clone, Copy)]
pub struct MappedRegion<B> {
    /// Register backend for the mapped range.
    pub io: B,
    /// Physical range as described by firmware.
    pub res: MemResource,
}

/// An exclusive claim on an interrupt line, as resolved by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqLine {
    irq: u32,
}

impl IrqLine {
    /// Creates a new IRQ line descriptor.
    ///
    /// # Safety
    ///
    /// The caller must ensure the interrupt number is valid and the line is
    /// not claimed exclusively by another driver.
    #[must_use]
    pub const unsafe fn new(irq: u32) -> Self {
        Self { irq }
    }

    /// Returns the host interrupt number.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.irq
    }
}
