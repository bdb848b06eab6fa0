//! DMA register backend abstraction
//!
//! The engine drives hardware only through [`DmaBackend`]. The crate ships
//! [`AxiDma`](super::axi_dma::AxiDma) for real hardware; tests substitute a
//! mock.

use crate::driver::config::{Direction, HwConfig};

/// Reasons the backend refuses to start a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartError {
    /// Length is zero or does not fit the length register
    InvalidLength,
    /// The channel for this direction was not synthesized
    NoChannel,
    /// The channel is running and has not gone idle
    ChannelBusy,
    /// Buffer address does not fit the engine's address width
    InvalidAddress,
}

impl StartError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            StartError::InvalidLength => "invalid length",
            StartError::NoChannel => "no such channel",
            StartError::ChannelBusy => "channel busy",
            StartError::InvalidAddress => "address out of range",
        }
    }
}

impl core::fmt::Display for StartError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Register-level control of one simple-mode DMA engine
///
/// Interrupt masks passed to and returned from these methods use the status
/// register layout (see [`IrqStatus`](crate::IrqStatus)).
pub trait DmaBackend {
    /// Look up the configuration for `device_id` and apply it.
    ///
    /// Returns the applied configuration, or `None` if the device is absent.
    fn configure(&mut self, device_id: u16) -> Option<HwConfig>;

    /// Check whether the configured engine includes scatter-gather
    fn supports_scatter_gather(&self) -> bool;

    /// Program and start a single transfer
    ///
    /// # Errors
    /// See [`StartError`].
    fn start_transfer(
        &mut self,
        address: usize,
        length: u32,
        direction: Direction,
    ) -> Result<(), StartError>;

    /// Read the pending interrupt bits for `direction`
    fn read_pending(&self, direction: Direction) -> u32;

    /// Acknowledge (clear) `mask` for `direction`
    fn acknowledge(&mut self, mask: u32, direction: Direction);

    /// Enable all interrupt sources of `direction`
    fn enable_interrupts(&mut self, direction: Direction);

    /// Disable all interrupt sources of `direction`
    fn disable_interrupts(&mut self, direction: Direction);

    /// Start a hardware reset of the engine (both channels)
    fn hard_reset(&mut self);

    /// Check whether the last reset has finished
    fn reset_is_complete(&self) -> bool;
}
