//! AXI DMA register block (direct register mode)
//!
//! The block holds two channels: MM2S (memory to stream, transmit) at offset
//! `0x00` and S2MM (stream to memory, receive) at offset `0x30`. Both channels
//! share the same control/status bit layout.

use super::{clear_bits, read_reg, set_bits, write_reg};
use crate::driver::config::Direction;

// =============================================================================
// Register Offsets
// =============================================================================

/// MM2S channel register offset
pub const MM2S_OFFSET: usize = 0x00;
/// S2MM channel register offset
pub const S2MM_OFFSET: usize = 0x30;

/// Control register offset (relative to channel)
pub const DMACR_OFFSET: usize = 0x00;
/// Status register offset (relative to channel)
pub const DMASR_OFFSET: usize = 0x04;
/// Source/destination address, low word (relative to channel)
pub const ADDR_OFFSET: usize = 0x18;
/// Source/destination address, high word (relative to channel)
pub const ADDR_MSB_OFFSET: usize = 0x1C;
/// Buffer length register offset (relative to channel); writing it starts the transfer
pub const LENGTH_OFFSET: usize = 0x28;

/// Size of the register block in bytes
pub const BLOCK_SIZE: usize = 0x60;

// =============================================================================
// DMACR Bits
// =============================================================================

/// Run/stop
pub const DMACR_RS: u32 = 1 << 0;
/// Soft reset (self-clearing, resets both channels)
pub const DMACR_RESET: u32 = 1 << 2;
/// Interrupt on complete enable
pub const DMACR_IOC_IRQ_EN: u32 = 1 << 12;
/// Delay interrupt enable
pub const DMACR_DLY_IRQ_EN: u32 = 1 << 13;
/// Error interrupt enable
pub const DMACR_ERR_IRQ_EN: u32 = 1 << 14;
/// All interrupt enables
pub const DMACR_IRQ_EN_ALL: u32 = DMACR_IOC_IRQ_EN | DMACR_DLY_IRQ_EN | DMACR_ERR_IRQ_EN;

// =============================================================================
// DMASR Bits
// =============================================================================

/// Channel halted
pub const DMASR_HALTED: u32 = 1 << 0;
/// Channel idle
pub const DMASR_IDLE: u32 = 1 << 1;
/// DMA internal error
pub const DMASR_INT_ERR: u32 = 1 << 4;
/// DMA slave error
pub const DMASR_SLV_ERR: u32 = 1 << 5;
/// DMA decode error
pub const DMASR_DEC_ERR: u32 = 1 << 6;

// =============================================================================
// Interrupt Bits (same position in DMACR and DMASR)
// =============================================================================

/// Interrupt on complete
pub const IRQ_IOC: u32 = 1 << 12;
/// Interrupt on delay timer
pub const IRQ_DELAY: u32 = 1 << 13;
/// Interrupt on error
pub const IRQ_ERROR: u32 = 1 << 14;
/// All interrupt sources
pub const IRQ_ALL: u32 = IRQ_IOC | IRQ_DELAY | IRQ_ERROR;

// =============================================================================
// Register Accessors
// =============================================================================

/// Volatile accessors for one AXI DMA register block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxiDmaRegs {
    base: usize,
}

impl AxiDmaRegs {
    /// Create accessors for the block at `base`.
    ///
    /// # Safety
    /// `base` must be the address of an AXI DMA register block (or memory of at
    /// least [`BLOCK_SIZE`] bytes standing in for one), aligned to 4 bytes and
    /// valid for the lifetime of the accessor.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the block
    pub const fn base(&self) -> usize {
        self.base
    }

    #[inline(always)]
    const fn channel(direction: Direction) -> usize {
        match direction {
            Direction::Transmit => MM2S_OFFSET,
            Direction::Receive => S2MM_OFFSET,
        }
    }

    #[inline(always)]
    fn addr(&self, direction: Direction, offset: usize) -> usize {
        self.base + Self::channel(direction) + offset
    }

    /// Read the control register
    #[inline(always)]
    pub fn control(&self, direction: Direction) -> u32 {
        // SAFETY: base validity is guaranteed by the constructor contract
        unsafe { read_reg(self.addr(direction, DMACR_OFFSET)) }
    }

    /// Write the control register
    #[inline(always)]
    pub fn set_control(&self, direction: Direction, value: u32) {
        // SAFETY: base validity is guaranteed by the constructor contract
        unsafe { write_reg(self.addr(direction, DMACR_OFFSET), value) }
    }

    /// Set bits in the control register
    #[inline(always)]
    pub fn set_control_bits(&self, direction: Direction, bits: u32) {
        // SAFETY: base validity is guaranteed by the constructor contract
        unsafe { set_bits(self.addr(direction, DMACR_OFFSET), bits) }
    }

    /// Clear bits in the control register
    #[inline(always)]
    pub fn clear_control_bits(&self, direction: Direction, bits: u32) {
        // SAFETY: base validity is guaranteed by the constructor contract
        unsafe { clear_bits(self.addr(direction, DMACR_OFFSET), bits) }
    }

    /// Read the status register
    #[inline(always)]
    pub fn status(&self, direction: Direction) -> u32 {
        // SAFETY: base validity is guaranteed by the constructor contract
        unsafe { read_reg(self.addr(direction, DMASR_OFFSET)) }
    }

    /// Write the status register (interrupt bits are write-1-to-clear)
    #[inline(always)]
    pub fn set_status(&self, direction: Direction, value: u32) {
        // SAFETY: base validity is guaranteed by the constructor contract
        unsafe { write_reg(self.addr(direction, DMASR_OFFSET), value) }
    }

    /// Write the low address word
    #[inline(always)]
    pub fn set_address(&self, direction: Direction, value: u32) {
        // SAFETY: base validity is guaranteed by the constructor contract
        unsafe { write_reg(self.addr(direction, ADDR_OFFSET), value) }
    }

    /// Write the high address word (64-bit address instances only)
    #[inline(always)]
    pub fn set_address_msb(&self, direction: Direction, value: u32) {
        // SAFETY: base validity is guaranteed by the constructor contract
        unsafe { write_reg(self.addr(direction, ADDR_MSB_OFFSET), value) }
    }

    /// Write the buffer length register, starting the transfer
    #[inline(always)]
    pub fn set_length(&self, direction: Direction, value: u32) {
        // SAFETY: base validity is guaranteed by the constructor contract
        unsafe { write_reg(self.addr(direction, LENGTH_OFFSET), value) }
    }

    /// Check whether the channel is running and has not gone idle
    #[inline(always)]
    pub fn is_busy(&self, direction: Direction) -> bool {
        let status = self.status(direction);
        (status & DMASR_HALTED) == 0 && (status & DMASR_IDLE) == 0
    }
}
