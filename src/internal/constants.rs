//! Centralized Constants
//!
//! This module provides a single source of truth for the limits, defaults and
//! timing values used throughout the DMA driver.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Transfer limits**: buffer length register widths
//! - **Default configuration**: device id and interrupt vector ids
//! - **Timing**: bounded-wait polling interval
//!
//! # Note
//!
//! Hardware register offsets and bit definitions remain in their respective
//! modules (`register/axi_dma.rs`, `register/intc.rs`) as they are specific to
//! those hardware blocks.

// =============================================================================
// Transfer Limits
// =============================================================================

/// Buffer length register width used before a hardware configuration is applied
///
/// 14 bits is the AXI DMA IP default (`c_sg_length_width`), giving 16 KiB - 1.
pub const DEFAULT_LENGTH_WIDTH: u8 = 14;

/// Narrowest buffer length register the AXI DMA IP can be built with
pub const MIN_LENGTH_WIDTH: u8 = 8;

/// Widest buffer length register the AXI DMA IP can be built with
pub const MAX_LENGTH_WIDTH: u8 = 26;

/// Address width of a 32-bit AXI DMA instance
pub const DEFAULT_ADDRESS_WIDTH: u8 = 32;

// =============================================================================
// Default Configuration
// =============================================================================

/// Default DMA device id (first engine in the hardware design)
pub const DEFAULT_DEVICE_ID: u16 = 0;

/// Default interrupt controller vector for the MM2S (transmit) interrupt line
pub const DEFAULT_TX_VECTOR: u8 = 0;

/// Default interrupt controller vector for the S2MM (receive) interrupt line
pub const DEFAULT_RX_VECTOR: u8 = 1;

// =============================================================================
// Timing Constants
// =============================================================================

/// Poll interval for bounded waits in microseconds
pub const WAIT_POLL_INTERVAL_US: u32 = 10;
