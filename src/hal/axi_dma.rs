//! AXI DMA register backend (direct register mode)
//!
//! [`AxiDma`] implements [`DmaBackend`] on top of the AXI DMA register block.
//! The hardware design exports one [`HwConfig`] per engine; `AxiDma` holds
//! that table and applies the matching entry on `configure`.

use super::backend::{DmaBackend, StartError};
use crate::driver::config::{Direction, HwConfig};
use crate::internal::register::axi_dma::{
    AxiDmaRegs, DMACR_IRQ_EN_ALL, DMACR_RESET, DMACR_RS, DMASR_DEC_ERR, DMASR_INT_ERR,
    DMASR_SLV_ERR, IRQ_ALL,
};

/// Register-level driver for one AXI DMA engine
pub struct AxiDma {
    table: &'static [HwConfig],
    config: Option<HwConfig>,
    regs: Option<AxiDmaRegs>,
}

impl AxiDma {
    /// Create a backend over the hardware configuration table.
    ///
    /// No register is touched until [`DmaBackend::configure`] selects an entry.
    ///
    /// # Safety
    /// Every `base_address` in `table` must be the address of an AXI DMA
    /// register block, and no other driver may access a block once it has
    /// been configured here.
    pub const unsafe fn new(table: &'static [HwConfig]) -> Self {
        Self {
            table,
            config: None,
            regs: None,
        }
    }

    /// Applied configuration, if any
    pub fn config(&self) -> Option<&HwConfig> {
        self.config.as_ref()
    }

    /// Error cause bits (internal, slave, decode) latched in a channel's status
    pub fn error_flags(&self, direction: Direction) -> u32 {
        self.regs.map_or(0, |regs| {
            regs.status(direction) & (DMASR_INT_ERR | DMASR_SLV_ERR | DMASR_DEC_ERR)
        })
    }

    fn present(&self, direction: Direction) -> Option<AxiDmaRegs> {
        match (self.regs, self.config) {
            (Some(regs), Some(config)) if config.has_channel(direction) => Some(regs),
            _ => None,
        }
    }
}

impl DmaBackend for AxiDma {
    fn configure(&mut self, device_id: u16) -> Option<HwConfig> {
        let config = *self.table.iter().find(|cfg| cfg.device_id == device_id)?;
        // SAFETY: table addresses are valid per the constructor contract
        self.regs = Some(unsafe { AxiDmaRegs::new(config.base_address) });
        self.config = Some(config);
        Some(config)
    }

    fn supports_scatter_gather(&self) -> bool {
        self.config.is_some_and(|cfg| cfg.has_scatter_gather)
    }

    fn start_transfer(
        &mut self,
        address: usize,
        length: u32,
        direction: Direction,
    ) -> Result<(), StartError> {
        let regs = self.present(direction).ok_or(StartError::NoChannel)?;
        let config = self.config.ok_or(StartError::NoChannel)?;
        if length == 0 || length as usize > config.max_transfer_len() {
            return Err(StartError::InvalidLength);
        }
        // Bits above the address width would be dropped by the hardware
        if (address as u64)
            .checked_shr(u32::from(config.address_width))
            .is_some_and(|high| high != 0)
        {
            return Err(StartError::InvalidAddress);
        }
        if regs.is_busy(direction) {
            return Err(StartError::ChannelBusy);
        }

        regs.set_address(direction, address as u32);
        if config.address_width > 32 {
            regs.set_address_msb(direction, ((address as u64) >> 32) as u32);
        }
        regs.set_control_bits(direction, DMACR_RS);
        // Writing the length register starts the transfer
        regs.set_length(direction, length);
        Ok(())
    }

    fn read_pending(&self, direction: Direction) -> u32 {
        self.present(direction)
            .map_or(0, |regs| regs.status(direction) & IRQ_ALL)
    }

    fn acknowledge(&mut self, mask: u32, direction: Direction) {
        if let Some(regs) = self.present(direction) {
            regs.set_status(direction, mask & IRQ_ALL);
        }
    }

    fn enable_interrupts(&mut self, direction: Direction) {
        if let Some(regs) = self.present(direction) {
            regs.set_control_bits(direction, DMACR_IRQ_EN_ALL);
        }
    }

    fn disable_interrupts(&mut self, direction: Direction) {
        if let Some(regs) = self.present(direction) {
            regs.clear_control_bits(direction, DMACR_IRQ_EN_ALL);
        }
    }

    fn hard_reset(&mut self) {
        for direction in Direction::ALL {
            if let Some(regs) = self.present(direction) {
                regs.set_control(direction, DMACR_RESET);
            }
        }
    }

    fn reset_is_complete(&self) -> bool {
        Direction::ALL.iter().all(|&direction| {
            self.present(direction)
                .is_none_or(|regs| regs.control(direction) & DMACR_RESET == 0)
        })
    }
}
