//! The register backend trait and its adapters.

/// A byte-addressed register space.
///
/// Offsets are relative to the backend's base. Accesses take `&self`: a
/// register space is shared between probe, interrupt and deferred-work
/// context, and serialization (where needed) is the driver's business.
pub trait RegisterIo {
    /// Reads an 8-bit register.
    fn read8(&self, offset: usize) -> u8;
    /// Reads a 16-bit register.
    fn read16(&self, offset: usize) -> u16;
    /// Reads a 32-bit register.
    fn read32(&self, offset: usize) -> u32;
    /// Writes an 8-bit register.
    fn write8(&self, offset: usize, value: u8);
    /// Writes a 16-bit register.
    fn write16(&self, offset: usize, value: u16);
    /// Writes a 32-bit register.
    fn write32(&self, offset: usize, value: u32);

    /// Read-modify-write of a 32-bit register: clears `clear`, then sets `set`.
    fn modify32(&self, offset: usize, clear: u32, set: u32) {
        let val = self.read32(offset);
        self.write32(offset, (val & !clear) | set);
    }

    /// Returns a view of this space starting `offset` bytes in.
    fn at(&self, offset: usize) -> SubWindow<&Self>
    where
        Self: Sized,
    {
        SubWindow::new(self, offset)
    }
}

impl<T: RegisterIo + ?Sized> RegisterIo for &T {
    fn read8(&self, offset: usize) -> u8 {
        (**self).read8(offset)
    }
    fn read16(&self, offset: usize) -> u16 {
        (**self).read16(offset)
    }
    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }
    fn write8(&self, offset: usize, value: u8) {
        (**self).write8(offset, value);
    }
    fn write16(&self, offset: usize, value: u16) {
        (**self).write16(offset, value);
    }
    fn write32(&self, offset: usize, value: u32) {
        (**self).write32(offset, value);
    }
}

/// A backend shifted by a fixed offset; used for sub-blocks such as the PF
/// and LUT regions inside the PCIe controller window.
#[derive(Debug, Clone, Copy)]
pub struct SubWindow<B> {
    io: B,
    offset: usize,
}

impl<B: RegisterIo> SubWindow<B> {
    /// Creates a view of `io` starting at `offset`.
    pub const fn new(io: B, offset: usize) -> Self {
        Self { io, offset }
    }
}

impl<B: RegisterIo> RegisterIo for SubWindow<B> {
    fn read8(&self, offset: usize) -> u8 {
        self.io.read8(self.offset + offset)
    }
    fn read16(&self, offset: usize) -> u16 {
        self.io.read16(self.offset + offset)
    }
    fn read32(&self, offset: usize) -> u32 {
        self.io.read32(self.offset + offset)
    }
    fn write8(&self, offset: usize, value: u8) {
        self.io.write8(self.offset + offset, value);
    }
    fn write16(&self, offset: usize, value: u16) {
        self.io.write16(self.offset + offset, value);
    }
    fn write32(&self, offset: usize, value: u32) {
        self.io.write32(self.offset + offset, value);
    }
}

/// Byte order of a register block relative to the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Registers are little-endian (native on the SoC's cores).
    Little,
    /// Registers are big-endian and must be byte-swapped.
    Big,
}

/// Adapter applying a register block's byte order to 16/32-bit accesses.
///
/// Several QorIQ IP blocks are big-endian on some parts and little-endian on
/// others; the firmware node says which.
#[derive(Debug, Clone, Copy)]
pub struct Endian<B> {
    io: B,
    order: Endianness,
}

impl<B: RegisterIo> Endian<B> {
    /// Wraps `io` with the given byte order.
    pub const fn new(io: B, order: Endianness) -> Self {
        Self { io, order }
    }

    /// Returns the configured byte order.
    pub const fn order(&self) -> Endianness {
        self.order
    }

    fn swap(&self) -> bool {
        self.order == Endianness::Big
    }
}

impl<B: RegisterIo> RegisterIo for Endian<B> {
    fn read8(&self, offset: usize) -> u8 {
        self.io.read8(offset)
    }
    fn read16(&self, offset: usize) -> u16 {
        let v = self.io.read16(offset);
        if self.swap() { v.swap_bytes() } else { v }
    }
    fn read32(&self, offset: usize) -> u32 {
        let v = self.io.read32(offset);
        if self.swap() { v.swap_bytes() } else { v }
    }
    fn write8(&self, offset: usize, value: u8) {
        self.io.write8(offset, value);
    }
    fn write16(&self, offset: usize, value: u16) {
        let v = if self.swap() { value.swap_bytes() } else { value };
        self.io.write16(offset, v);
    }
    fn write32(&self, offset: usize, value: u32) {
        let v = if self.swap() { value.swap_bytes() } else { value };
        self.io.write32(offset, v);
    }
}
