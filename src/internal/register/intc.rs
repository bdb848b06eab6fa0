//! AXI interrupt controller register block

use super::{read_reg, set_bits, write_reg};

/// Interrupt pending register offset (status AND enable)
pub const IPR_OFFSET: usize = 0x04;
/// Interrupt enable register offset
pub const IER_OFFSET: usize = 0x08;
/// Interrupt acknowledge register offset (write-1-to-clear)
pub const IAR_OFFSET: usize = 0x0C;
/// Master enable register offset
pub const MER_OFFSET: usize = 0x1C;

/// Size of the register block in bytes
pub const BLOCK_SIZE: usize = 0x20;

/// MER: master enable
pub const MER_ME: u32 = 1 << 0;
/// MER: hardware interrupt enable
pub const MER_HIE: u32 = 1 << 1;

/// Volatile accessors for one interrupt controller register block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntcRegs {
    base: usize,
}

impl IntcRegs {
    /// Create accessors for the block at `base`.
    ///
    /// # Safety
    /// `base` must be the address of an interrupt controller register block
    /// (or memory of at least [`BLOCK_SIZE`] bytes standing in for one),
    /// aligned to 4 bytes and valid for the lifetime of the accessor.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Read the pending register
    #[inline(always)]
    pub fn pending(&self) -> u32 {
        // SAFETY: base validity is guaranteed by the constructor contract
        unsafe { read_reg(self.base + IPR_OFFSET) }
    }

    /// Add sources to the enable register
    #[inline(always)]
    pub fn enable(&self, mask: u32) {
        // SAFETY: base validity is guaranteed by the constructor contract
        unsafe { set_bits(self.base + IER_OFFSET, mask) }
    }

    /// Acknowledge sources
    #[inline(always)]
    pub fn acknowledge(&self, mask: u32) {
        // SAFETY: base validity is guaranteed by the constructor contract
        unsafe { write_reg(self.base + IAR_OFFSET, mask) }
    }

    /// Write the master enable register
    #[inline(always)]
    pub fn set_master_enable(&self, value: u32) {
        // SAFETY: base validity is guaranteed by the constructor contract
        unsafe { write_reg(self.base + MER_OFFSET, value) }
    }
}
