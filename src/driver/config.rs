//! Configuration types for the AXI DMA driver

use crate::hal::intc::IsrFn;
use crate::internal::constants::{
    DEFAULT_ADDRESS_WIDTH, DEFAULT_DEVICE_ID, DEFAULT_LENGTH_WIDTH, DEFAULT_RX_VECTOR,
    DEFAULT_TX_VECTOR, MAX_LENGTH_WIDTH, MIN_LENGTH_WIDTH,
};

/// Data path of a DMA channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Memory to device (MM2S)
    Transmit,
    /// Device to memory (S2MM)
    Receive,
}

impl Direction {
    /// Both directions, transmit first
    pub const ALL: [Direction; 2] = [Direction::Transmit, Direction::Receive];

    /// Index of this direction's channel slot
    #[inline(always)]
    pub const fn index(self) -> usize {
        match self {
            Direction::Transmit => 0,
            Direction::Receive => 1,
        }
    }

    /// Short name for diagnostics
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Transmit => "tx",
            Direction::Receive => "rx",
        }
    }
}

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Constructed, `initialize` has not succeeded yet
    #[default]
    Uninitialized,
    /// Hardware configured and interrupt vectors bound
    Ready,
}

// =============================================================================
// Hardware Configuration
// =============================================================================

/// Build-time parameters of one AXI DMA instance
///
/// This mirrors what the hardware design exports for each engine: where it
/// lives, which channels were synthesized and how wide its length register is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HwConfig {
    /// Device id used for lookup
    pub device_id: u16,
    /// Register block base address
    pub base_address: usize,
    /// Scatter-gather engine included
    pub has_scatter_gather: bool,
    /// MM2S (transmit) channel present
    pub has_mm2s: bool,
    /// S2MM (receive) channel present
    pub has_s2mm: bool,
    /// Width of the buffer length register in bits
    pub length_width: u8,
    /// Address width in bits (32 or 64)
    pub address_width: u8,
}

impl HwConfig {
    /// Create a configuration for a simple-mode engine with both channels
    #[must_use]
    pub const fn new(device_id: u16, base_address: usize) -> Self {
        Self {
            device_id,
            base_address,
            has_scatter_gather: false,
            has_mm2s: true,
            has_s2mm: true,
            length_width: DEFAULT_LENGTH_WIDTH,
            address_width: DEFAULT_ADDRESS_WIDTH,
        }
    }

    /// Mark the scatter-gather engine as present
    #[must_use]
    pub const fn with_scatter_gather(mut self, enabled: bool) -> Self {
        self.has_scatter_gather = enabled;
        self
    }

    /// Select which channels were synthesized
    #[must_use]
    pub const fn with_channels(mut self, mm2s: bool, s2mm: bool) -> Self {
        self.has_mm2s = mm2s;
        self.has_s2mm = s2mm;
        self
    }

    /// Set the buffer length register width, clamped to the range the IP supports
    #[must_use]
    pub const fn with_length_width(mut self, bits: u8) -> Self {
        self.length_width = clamp_length_width(bits);
        self
    }

    /// Set the address width in bits
    #[must_use]
    pub const fn with_address_width(mut self, bits: u8) -> Self {
        self.address_width = bits;
        self
    }

    /// Largest transfer the length register can describe
    #[must_use]
    pub const fn max_transfer_len(&self) -> usize {
        max_transfer_len(self.length_width)
    }

    /// Check whether the channel for `direction` was synthesized
    #[must_use]
    pub const fn has_channel(&self, direction: Direction) -> bool {
        match direction {
            Direction::Transmit => self.has_mm2s,
            Direction::Receive => self.has_s2mm,
        }
    }
}

/// Largest transfer a length register of `width` bits can describe.
///
/// `width` is clamped first, since table entries built with struct literal
/// syntax bypass [`HwConfig::with_length_width`].
pub(crate) const fn max_transfer_len(width: u8) -> usize {
    (1usize << clamp_length_width(width)) - 1
}

const fn clamp_length_width(bits: u8) -> u8 {
    if bits < MIN_LENGTH_WIDTH {
        MIN_LENGTH_WIDTH
    } else if bits > MAX_LENGTH_WIDTH {
        MAX_LENGTH_WIDTH
    } else {
        bits
    }
}

// =============================================================================
// Engine Configuration
// =============================================================================

/// Engine configuration
///
/// Selects which hardware instance to drive and how its two interrupt lines
/// are wired into the interrupt controller.
///
/// # Example
///
/// ```ignore
/// ph_axi_dma::dma_isr!(dma_tx_isr, DMA, Direction::Transmit);
/// ph_axi_dma::dma_isr!(dma_rx_isr, DMA, Direction::Receive);
///
/// let config = EngineConfig::new()
///     .with_device_id(0)
///     .with_vectors(2, 3)
///     .with_isrs(dma_tx_isr, dma_rx_isr);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Device id passed to the backend lookup
    pub device_id: u16,
    /// Interrupt controller vector of the MM2S interrupt line
    pub tx_vector: u8,
    /// Interrupt controller vector of the S2MM interrupt line
    pub rx_vector: u8,
    /// Dispatch routine bound to `tx_vector`
    pub tx_isr: Option<IsrFn>,
    /// Dispatch routine bound to `rx_vector`
    pub rx_isr: Option<IsrFn>,
}

impl EngineConfig {
    /// Create a configuration with default device id and vectors and no
    /// dispatch routines
    #[must_use]
    pub const fn new() -> Self {
        Self {
            device_id: DEFAULT_DEVICE_ID,
            tx_vector: DEFAULT_TX_VECTOR,
            rx_vector: DEFAULT_RX_VECTOR,
            tx_isr: None,
            rx_isr: None,
        }
    }

    /// Set the device id
    #[must_use]
    pub const fn with_device_id(mut self, device_id: u16) -> Self {
        self.device_id = device_id;
        self
    }

    /// Set the TX and RX interrupt vectors
    #[must_use]
    pub const fn with_vectors(mut self, tx: u8, rx: u8) -> Self {
        self.tx_vector = tx;
        self.rx_vector = rx;
        self
    }

    /// Set the TX and RX dispatch routines
    #[must_use]
    pub const fn with_isrs(mut self, tx: IsrFn, rx: IsrFn) -> Self {
        self.tx_isr = Some(tx);
        self.rx_isr = Some(rx);
        self
    }

    /// Vector wired to `direction`
    #[must_use]
    pub const fn vector(&self, direction: Direction) -> u8 {
        match direction {
            Direction::Transmit => self.tx_vector,
            Direction::Receive => self.rx_vector,
        }
    }

    /// Dispatch routine for `direction`
    #[must_use]
    pub const fn isr(&self, direction: Direction) -> Option<IsrFn> {
        match direction {
            Direction::Transmit => self.tx_isr,
            Direction::Receive => self.rx_isr,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
