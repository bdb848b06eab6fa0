//! Core driver components for the AXI DMA engine.
//!
//! - [`config`] - Directions, hardware and engine configuration
//! - [`error`] - Error types and result aliases
//! - [`interrupt`] - Interrupt status parsing
//! - [`channel`] - Per-direction transfer slot and completion handlers
//! - [`engine`] - The engine: admission, interrupt servicing, recovery
//!
//! # Example
//!
//! ```ignore
//! use ph_axi_dma::driver::{Direction, EngineConfig, TransferError};
//!
//! let config = EngineConfig::new()
//!     .with_device_id(0)
//!     .with_vectors(2, 3);
//! ```

// Submodules
pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod interrupt;

// Re-exports for convenience
pub use channel::{CompletionHandler, Handler, TransferOutcome};
pub use config::{Direction, EngineConfig, HwConfig, State};
pub use engine::{Dispatch, Engine, EngineStats, InterruptOutcome};
pub use error::{
    Error, InitError, InitResult, IoError, IoResult, Result, TransferError, TransferResult,
};
pub use interrupt::IrqStatus;
