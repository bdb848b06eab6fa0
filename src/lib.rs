//! AXI DMA Driver
//!
//! A `no_std`, `no_alloc`, interrupt-driven driver for the Xilinx AXI DMA
//! engine in simple (direct register, non-scatter-gather) mode.
//!
//! Each direction (transmit/MM2S, receive/S2MM) carries at most one transfer
//! at a time. A transfer is admitted by `submit`, completes through its
//! direction's interrupt, and reports back through an optional completion
//! handler. An error interrupt on either direction resets the engine and
//! abandons both in-flight transfers.
//!
//! # Architecture
//!
//! The driver is organized into three layers:
//!
//! 1. **Driver Layer** ([`driver`]): [`Engine`] with admission, interrupt
//!    servicing and recovery
//! 2. **Sync Layer** ([`sync`]): [`SharedEngine`] for sharing one engine
//!    between foreground code and interrupt context
//! 3. **HAL Layer** ([`hal`]): [`DmaBackend`] and [`InterruptController`]
//!    traits plus register-level AXI DMA and AXI INTC implementations
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting for public types and diagnostic logging
//! - `async`: Enable `SharedEngine::wait_async` with per-direction wakers
//!
//! # Example
//!
//! ```ignore
//! use ph_axi_dma::hal::{AxiDma, Intc};
//! use ph_axi_dma::{Direction, Engine, EngineConfig, HwConfig, SharedEngine};
//!
//! static HW_CONFIG: [HwConfig; 1] = [HwConfig::new(0, 0x4040_0000).with_length_width(23)];
//! static INTC: Intc<32> = unsafe { Intc::new(0x4120_0000) };
//!
//! static DMA: SharedEngine<AxiDma, &Intc<32>> = SharedEngine::new(Engine::new(
//!     unsafe { AxiDma::new(&HW_CONFIG) },
//!     &INTC,
//!     EngineConfig::new()
//!         .with_vectors(2, 3)
//!         .with_isrs(dma_tx_isr, dma_rx_isr),
//! ));
//!
//! ph_axi_dma::dma_isr!(dma_tx_isr, DMA, Direction::Transmit);
//! ph_axi_dma::dma_isr!(dma_rx_isr, DMA, Direction::Receive);
//!
//! static FRAME: [u8; 64] = [0x55; 64];
//!
//! fn on_sent(_: Direction) {}
//! static ON_SENT: fn(Direction) = on_sent;
//!
//! DMA.initialize().unwrap();
//! INTC.start();
//!
//! DMA.transmit(&FRAME, Some(&ON_SENT)).unwrap();
//! DMA.wait(Direction::Transmit);
//! ```
//!
//! # Recovery
//!
//! A transfer abandoned by a reset never calls its handler. Callers that need
//! to notice use [`SharedEngine::wait_timeout`], which reports
//! [`TransferError::Abandoned`], or check [`Engine::last_outcome`].

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels mirror the [lints] table in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements,
    clippy::let_underscore_future
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;
pub mod sync;

// Internal implementation details (pub(crate) only)
mod internal;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::channel::{CompletionHandler, Handler, TransferOutcome};
pub use driver::config::{Direction, EngineConfig, HwConfig, State};
pub use driver::engine::{Dispatch, Engine, EngineStats, InterruptOutcome};
pub use driver::error::{
    Error, InitError, InitResult, IoError, IoResult, Result, TransferError, TransferResult,
};
pub use driver::interrupt::IrqStatus;
pub use hal::backend::{DmaBackend, StartError};
pub use hal::intc::{BindError, InterruptController, IsrFn};
pub use sync::SharedEngine;

// Re-export async types when async feature is enabled
#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub use sync::TransferFuture;

/// Low-level register accessors for advanced use.
///
/// These are intentionally separated from the primary facade. Most users should
/// prefer the driver APIs instead of touching registers directly.
///
/// # Safety
///
/// Direct register access bypasses driver invariants. Use only if you fully
/// understand the AXI DMA and interrupt controller hardware and accept
/// responsibility for correct sequencing and synchronization.
pub mod unsafe_registers {
    pub use crate::internal::register::axi_dma::{self, AxiDmaRegs};
    pub use crate::internal::register::intc::{self, IntcRegs};
}

/// Shared driver constants.
///
/// Defaults and limits used by the configuration builders.
pub mod constants {
    pub use crate::internal::constants::{
        DEFAULT_ADDRESS_WIDTH, DEFAULT_DEVICE_ID, DEFAULT_LENGTH_WIDTH, DEFAULT_RX_VECTOR,
        DEFAULT_TX_VECTOR, MAX_LENGTH_WIDTH, MIN_LENGTH_WIDTH, WAIT_POLL_INTERVAL_US,
    };
}

// =============================================================================
// Macro Helpers
// =============================================================================

/// Define a dispatch routine that forwards one direction's interrupt to a
/// static [`SharedEngine`].
///
/// The generated `fn()` is what [`EngineConfig::with_isrs`] expects.
///
/// # Examples
///
/// ```ignore
/// static DMA: SharedEngine<AxiDma, &Intc<32>> = /* ... */;
///
/// ph_axi_dma::dma_isr!(dma_tx_isr, DMA, Direction::Transmit);
/// ph_axi_dma::dma_isr!(dma_rx_isr, DMA, Direction::Receive);
///
/// let config = EngineConfig::new().with_isrs(dma_tx_isr, dma_rx_isr);
/// ```
#[macro_export]
macro_rules! dma_isr {
    ($name:ident, $engine:expr, $direction:expr) => {
        fn $name() {
            $engine.on_interrupt($direction);
        }
    };
}
