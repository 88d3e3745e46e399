//! Volatile MMIO backend.

use core::ptr::NonNull;

use crate::RegisterIo;

/// A mapped MMIO region accessed with volatile loads and stores.
#[derive(Debug, Clone, Copy)]
pub struct MmioWindow {
    base: NonNull<u8>,
    size: usize,
}

// SAFETY: The window is a plain address range; concurrent volatile accesses
// to device registers are the device's semantics, not a data race on Rust
// memory.
unsafe impl Send for MmioWindow {}
// SAFETY: See above.
unsafe impl Sync for MmioWindow {}

impl MmioWindow {
    /// Creates a window over `size` bytes of MMIO at `base`.
    ///
    /// # Safety
    ///
    /// `base` must point to a mapped device region of at least `size` bytes
    /// that stays mapped for the lifetime of the window and every copy of it.
    pub const unsafe fn new(base: NonNull<u8>, size: usize) -> Self {
        Self { base, size }
    }

    /// Returns the window size in bytes.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the base pointer.
    pub const fn base(&self) -> NonNull<u8> {
        self.base
    }

    #[inline]
    fn ptr<T>(&self, offset: usize) -> *mut T {
        debug_assert!(
            offset + size_of::<T>() <= self.size,
            "MMIO access past end of window"
        );
        debug_assert!(offset % size_of::<T>() == 0, "unaligned MMIO access");
        // SAFETY: In-bounds per the assertion above and the contract of `new`.
        unsafe { self.base.as_ptr().add(offset).cast() }
    }
}

impl RegisterIo for MmioWindow {
    fn read8(&self, offset: usize) -> u8 {
        // SAFETY: `ptr` yields an in-bounds device address.
        unsafe { self.ptr::<u8>(offset).read_volatile() }
    }
    fn read16(&self, offset: usize) -> u16 {
        // SAFETY: See `read8`.
        unsafe { self.ptr::<u16>(offset).read_volatile() }
    }
    fn read32(&self, offset: usize) -> u32 {
        // SAFETY: See `read8`.
        unsafe { self.ptr::<u32>(offset).read_volatile() }
    }
    fn write8(&self, offset: usize, value: u8) {
        // SAFETY: See `read8`.
        unsafe { self.ptr::<u8>(offset).write_volatile(value) }
    }
    fn write16(&self, offset: usize, value: u16) {
        // SAFETY: See `read8`.
        unsafe { self.ptr::<u16>(offset).write_volatile(value) }
    }
    fn write32(&self, offset: usize, value: u32) {
        // SAFETY: See `read8`.
        unsafe { self.ptr::<u32>(offset).write_volatile(value) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volatile_access_hits_backing_memory() {
        let mut backing = [0u32; 4];
        let base = NonNull::new(backing.as_mut_ptr().cast::<u8>()).unwrap();
        // SAFETY: `backing` outlives the window and is 16 bytes.
        let win = unsafe { MmioWindow::new(base, 16) };
        win.write32(4, 0xdead_beef);
        win.write16(8, 0x1234);
        assert_eq!(win.read32(4), 0xdead_beef);
        assert_eq!(win.read16(8), 0x1234);
        drop(win);
        assert_eq!(backing[1], 0xdead_beef);
    }
}
