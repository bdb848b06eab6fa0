//! Hardware Abstraction Layer
//!
//! The engine reaches hardware through two traits: [`DmaBackend`] for the
//! DMA register block and [`InterruptController`] for vector binding. This
//! module defines both, ships register-level implementations for the AXI DMA
//! and the AXI interrupt controller, and holds the polling primitives.
//!
//! # Modules
//!
//! - [`backend`]: DMA backend trait
//! - [`axi_dma`]: AXI DMA backend (direct register mode)
//! - [`intc`]: Interrupt controller trait and AXI INTC driver
//! - [`poll`]: Spin and bounded-poll primitives
//!
//! # Delay Integration
//!
//! Bounded waits take `embedded_hal::delay::DelayNs` directly. Pass any
//! delay implementation from your HAL.

pub mod axi_dma;
pub mod backend;
pub mod intc;
pub mod poll;

// Re-export commonly used types
pub use axi_dma::AxiDma;
pub use backend::{DmaBackend, StartError};
pub use intc::{BindError, Intc, InterruptController, IsrFn};
pub use poll::{spin_until, spin_until_timeout};
