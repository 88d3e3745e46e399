//! Host-side register backend for driver tests.
//!
//! [`MockRegisters`] models a sparse 32-bit register file. Unwritten
//! registers read as zero. Sub-word accesses operate on little-endian byte
//! lanes of the containing aligned word. Reads of a register can be scripted
//! with a queue of values (the last value sticks), which is how tests model
//! status bits that change while a driver polls them. Registers can be marked
//! write-one-to-clear, like hardware interrupt status registers.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use lynx_core::sync::SpinLock;

use crate::RegisterIo;

/// One recorded write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Write {
    /// Byte offset written.
    pub offset: usize,
    /// Access width in bytes.
    pub width: u8,
    /// Value written (zero-extended).
    pub value: u32,
}

#[derive(Default)]
struct Inner {
    words: BTreeMap<usize, u32>,
    scripts: BTreeMap<usize, VecDeque<u32>>,
    reads: BTreeMap<usize, usize>,
    writes: Vec<Write>,
    w1c: BTreeSet<usize>,
}

impl Inner {
    fn load(&mut self, word: usize) -> u32 {
        *self.reads.entry(word).or_default() += 1;
        if let Some(queue) = self.scripts.get_mut(&word) {
            if queue.len() > 1 {
                if let Some(v) = queue.pop_front() {
                    return v;
                }
            } else if let Some(&v) = queue.front() {
                return v;
            }
        }
        self.words.get(&word).copied().unwrap_or(0)
    }

    fn store(&mut self, offset: usize, width: u8, value: u32) {
        let word = offset & !3;
        let shift = (offset & 3) * 8;
        let mask = match width {
            1 => 0xff << shift,
            2 => 0xffff << shift,
            _ => u32::MAX,
        };
        let old = self.words.get(&word).copied().unwrap_or(0);
        let bits = (value << shift) & mask;
        let new = if self.w1c.contains(&word) {
            old & !bits
        } else {
            (old & !mask) | bits
        };
        self.words.insert(word, new);
        self.writes.push(Write {
            offset,
            width,
            value,
        });
    }
}

/// A sparse, inspectable register file.
#[derive(Default)]
pub struct MockRegisters {
    inner: SpinLock<Inner>,
}

impl MockRegisters {
    /// Creates an all-zero register file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a 32-bit register without recording a write.
    pub fn poke(&self, offset: usize, value: u32) {
        self.inner.lock().words.insert(offset & !3, value);
    }

    /// Returns a 32-bit register without counting a read.
    pub fn peek(&self, offset: usize) -> u32 {
        self.inner.lock().words.get(&(offset & !3)).copied().unwrap_or(0)
    }

    /// Scripts successive 32-bit reads of `offset`; the last value repeats.
    ///
    /// While a script is active, reads ignore written values.
    pub fn script(&self, offset: usize, values: &[u32]) {
        self.inner
            .lock()
            .scripts
            .insert(offset & !3, values.iter().copied().collect());
    }

    /// Makes writes to the word at `offset` clear the bits written as one.
    pub fn write_one_to_clear(&self, offset: usize) {
        self.inner.lock().w1c.insert(offset & !3);
    }

    /// Number of reads that touched the word containing `offset`.
    pub fn reads(&self, offset: usize) -> usize {
        self.inner
            .lock()
            .reads
            .get(&(offset & !3))
            .copied()
            .unwrap_or(0)
    }

    /// All writes so far, in order.
    pub fn writes(&self) -> Vec<Write> {
        self.inner.lock().writes.clone()
    }

    /// Values written to exactly `offset`, in order.
    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.inner
            .lock()
            .writes
            .iter()
            .filter(|w| w.offset == offset)
            .map(|w| w.value)
            .collect()
    }

    /// Forgets recorded writes and read counts, keeping register contents.
    pub fn clear_log(&self) {
        let mut inner = self.inner.lock();
        inner.writes.clear();
        inner.reads.clear();
    }
}

impl RegisterIo for MockRegisters {
    fn read8(&self, offset: usize) -> u8 {
        let word = self.inner.lock().load(offset & !3);
        (word >> ((offset & 3) * 8)) as u8
    }
    fn read16(&self, offset: usize) -> u16 {
        let word = self.inner.lock().load(offset & !3);
        (word >> ((offset & 3) * 8)) as u16
    }
    fn read32(&self, offset: usize) -> u32 {
        self.inner.lock().load(offset & !3)
    }
    fn write8(&self, offset: usize, value: u8) {
        self.inner.lock().store(offset, 1, value.into());
    }
    fn write16(&self, offset: usize, value: u16) {
        self.inner.lock().store(offset, 2, value.into());
    }
    fn write32(&self, offset: usize, value: u32) {
        self.inner.lock().store(offset, 4, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register_block;

    bitflags::bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct Stat: u32 {
            const BSY = 1 << 0;
            const RD_ER = 1 << 1;
        }
    }

    register_block! {
        /// Test block.
        TestRegs {
            [0x30; u32; rw] stat => Stat,
            [0x38; u32; rw] data,
            [0x3c; u32; wo] addr,
            [0x3e; u16; rw] bridge_ctl,
            [0xba0; u32; rw; 0x10 * 8] amap_ctrl,
        }
    }

    #[test]
    fn unwritten_reads_zero() {
        let regs = MockRegisters::new();
        assert_eq!(regs.read32(0x1000), 0);
        assert_eq!(regs.reads(0x1000), 1);
    }

    #[test]
    fn byte_lanes() {
        let regs = MockRegisters::new();
        regs.poke(0x3c, 0x0040_1234);
        assert_eq!(regs.read16(0x3e), 0x0040);
        regs.write16(0x3e, 0x0000);
        assert_eq!(regs.peek(0x3c), 0x0000_1234);
        assert_eq!(regs.read8(0x3c), 0x34);
    }

    #[test]
    fn scripted_reads_stick_on_last() {
        let regs = MockRegisters::new();
        regs.script(0x18, &[0, 0, 0x8000_0000]);
        assert_eq!(regs.read32(0x18), 0);
        assert_eq!(regs.read32(0x18), 0);
        assert_eq!(regs.read32(0x18), 0x8000_0000);
        assert_eq!(regs.read32(0x18), 0x8000_0000);
        assert_eq!(regs.reads(0x18), 4);
    }

    #[test]
    fn write_one_to_clear() {
        let regs = MockRegisters::new();
        regs.write_one_to_clear(0xb1c);
        regs.poke(0xb1c, 0x22);
        regs.write32(0xb1c, 0x02);
        assert_eq!(regs.peek(0xb1c), 0x20);
        assert_eq!(regs.writes_to(0xb1c), vec![0x02]);
    }

    #[test]
    fn generated_accessors() {
        let regs = MockRegisters::new();
        let block = TestRegs::new(&regs);
        regs.poke(0x30, 0x3);
        assert_eq!(block.stat(), Stat::BSY | Stat::RD_ER);
        block.set_data(0xabcd);
        block.set_addr(0x1f);
        block.set_amap_ctrl(2, 0x5);
        assert_eq!(block.amap_ctrl(2), 0x5);
        assert_eq!(regs.peek(0xbc0), 0x5);
        block.set_bridge_ctl(0x40);
        assert_eq!(block.bridge_ctl(), 0x40);
        assert_eq!(regs.writes_to(0x38), vec![0xabcd]);
        assert_eq!(regs.writes().len(), 4);
    }
}
