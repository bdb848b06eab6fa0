//! Interrupt status handling for the AXI DMA channels.
//!
//! This module provides the [`IrqStatus`] structure for parsing the
//! interrupt bits of a channel's status register.

use crate::internal::register::axi_dma::{IRQ_DELAY, IRQ_ERROR, IRQ_IOC};

// =============================================================================
// Interrupt Status
// =============================================================================

/// Interrupt flags parsed from one channel's status register.
///
/// # Example
///
/// ```ignore
/// let status = IrqStatus::from_raw(raw);
/// if status.has_error() {
///     // Engine must be reset
/// } else if status.is_done() {
///     // Transfer finished
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqStatus {
    /// Interrupt on complete - the transfer finished
    pub complete: bool,
    /// Delay timer interrupt - treated as completion
    pub delay: bool,
    /// Error interrupt - the engine halted and needs a reset
    pub error: bool,
}

impl IrqStatus {
    /// Create from a raw status register value. Bits outside the interrupt
    /// field are ignored.
    #[inline]
    pub const fn from_raw(status: u32) -> Self {
        Self {
            complete: (status & IRQ_IOC) != 0,
            delay: (status & IRQ_DELAY) != 0,
            error: (status & IRQ_ERROR) != 0,
        }
    }

    /// Check if any interrupt of interest is set
    #[inline]
    pub const fn any(&self) -> bool {
        self.complete || self.delay || self.error
    }

    /// Check if the error interrupt is set
    #[inline]
    pub const fn has_error(&self) -> bool {
        self.error
    }

    /// Check if a completion interrupt (IOC or delay) is set
    #[inline]
    pub const fn is_done(&self) -> bool {
        self.complete || self.delay
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn irq_status_from_raw_zero() {
        let status = IrqStatus::from_raw(0);
        assert!(!status.any());
        assert!(!status.has_error());
        assert!(!status.is_done());
    }

    #[test]
    fn irq_status_from_raw_complete() {
        let status = IrqStatus::from_raw(IRQ_IOC);
        assert!(status.complete);
        assert!(status.is_done());
        assert!(!status.has_error());
    }

    #[test]
    fn irq_status_delay_counts_as_done() {
        let status = IrqStatus::from_raw(IRQ_DELAY);
        assert!(status.delay);
        assert!(status.is_done());
    }

    #[test]
    fn irq_status_error_with_complete() {
        let status = IrqStatus::from_raw(IRQ_ERROR | IRQ_IOC);
        assert!(status.has_error());
        assert!(status.is_done());
    }

    #[test]
    fn irq_status_ignores_non_interrupt_bits() {
        // Halted, idle and the error cause bits are not interrupt sources
        let status = IrqStatus::from_raw(0x0000_0073);
        assert!(!status.any());
        assert_eq!(status, IrqStatus::default());
    }
}
