//! Synchronization and Concurrency Support
//!
//! - **Primitives** (`primitives`): Low-level synchronization types
//!   - [`CriticalSectionCell`] - ISR-safe interior mutability
//!   - [`AtomicWaker`] - Async waker storage for interrupts
//!
//! - **Shared Wrapper** (`shared`): [`SharedEngine`], the engine behind a
//!   critical section, with blocking and bounded waits and the interrupt entry
//!
//! - **Async Support** (`asynch`): [`TransferFuture`] returned by
//!   `SharedEngine::wait_async`
//!
//! # Feature Flags
//!
//! - `async`: Enables `asynch` and the per-direction wakers
//!
//! # Example
//!
//! ```ignore
//! use ph_axi_dma::{Direction, SharedEngine};
//!
//! ph_axi_dma::dma_isr!(dma_tx_isr, DMA, Direction::Transmit);
//!
//! fn send(frame: &'static [u8]) {
//!     DMA.transmit(frame, None).unwrap();
//!     DMA.wait(Direction::Transmit);
//! }
//! ```

mod primitives;

#[cfg(feature = "async")]
pub use primitives::AtomicWaker;
pub use primitives::CriticalSectionCell;

mod shared;

pub use shared::SharedEngine;

#[cfg(feature = "async")]
pub mod asynch;

#[cfg(feature = "async")]
pub use asynch::TransferFuture;
