//! Testing utilities and mock implementations
//!
//! Mocks for running the DMA driver on the host without hardware access.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::{Cell, RefCell, UnsafeCell};
use core::sync::atomic::{AtomicUsize, Ordering};
use std::vec::Vec;

use crate::driver::channel::CompletionHandler;
use crate::driver::config::{Direction, HwConfig};
use crate::hal::backend::{DmaBackend, StartError};
use crate::hal::intc::{BindError, InterruptController, IsrFn};

// =============================================================================
// Mock DMA Backend
// =============================================================================

/// Backend-level operations recorded in call order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendOp {
    EnableInterrupts(Direction),
    DisableInterrupts(Direction),
    HardReset,
}

/// A recorded `start_transfer` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartCall {
    pub direction: Direction,
    pub address: usize,
    pub length: u32,
}

/// Mock DMA backend for testing the engine without hardware
///
/// Pending interrupt bits are raised with [`raise`](Self::raise) and behave
/// write-1-to-clear on `acknowledge`, like the status register.
///
/// # Example
///
/// ```ignore
/// let mut engine = Engine::new(MockBackend::new(), MockInterruptController::new(), config);
/// engine.initialize().unwrap();
/// engine.backend_mut().raise(Direction::Transmit, IRQ_IOC);
/// engine.on_interrupt(Direction::Transmit);
/// ```
#[derive(Debug)]
pub struct MockBackend {
    config: Option<HwConfig>,
    configured: Option<u16>,
    pending: [u32; 2],
    acks: Vec<(Direction, u32)>,
    starts: Vec<StartCall>,
    ops: Vec<BackendOp>,
    start_error: Option<StartError>,
    reset_latency: usize,
    reset_polls_left: Cell<usize>,
}

impl MockBackend {
    /// Backend for device 0, simple mode, both channels present
    pub const fn new() -> Self {
        Self::with_config(Some(HwConfig::new(0, 0)))
    }

    /// Backend whose `configure` returns `config` for its device id and
    /// `None` otherwise
    pub const fn with_config(config: Option<HwConfig>) -> Self {
        Self {
            config,
            configured: None,
            pending: [0; 2],
            acks: Vec::new(),
            starts: Vec::new(),
            ops: Vec::new(),
            start_error: None,
            reset_latency: 0,
            reset_polls_left: Cell::new(0),
        }
    }

    /// Backend whose engine includes scatter-gather
    pub const fn with_scatter_gather() -> Self {
        Self::with_config(Some(HwConfig::new(0, 0).with_scatter_gather(true)))
    }

    /// Number of `reset_is_complete` polls that report false after each reset
    pub fn set_reset_latency(&mut self, polls: usize) {
        self.reset_latency = polls;
    }

    /// Latch interrupt bits for `direction`
    pub fn raise(&mut self, direction: Direction, bits: u32) {
        self.pending[direction.index()] |= bits;
    }

    /// Currently latched bits for `direction`
    pub fn pending(&self, direction: Direction) -> u32 {
        self.pending[direction.index()]
    }

    /// Make the next `start_transfer` fail with `error`
    pub fn fail_next_start(&mut self, error: StartError) {
        self.start_error = Some(error);
    }

    pub fn configured(&self) -> Option<u16> {
        self.configured
    }

    pub fn acks(&self) -> &[(Direction, u32)] {
        &self.acks
    }

    pub fn starts(&self) -> &[StartCall] {
        &self.starts
    }

    pub fn ops(&self) -> &[BackendOp] {
        &self.ops
    }

    pub fn reset_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| **op == BackendOp::HardReset)
            .count()
    }

    /// Forget recorded calls, keeping configuration and pending bits
    pub fn clear_log(&mut self) {
        self.acks.clear();
        self.starts.clear();
        self.ops.clear();
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DmaBackend for MockBackend {
    fn configure(&mut self, device_id: u16) -> Option<HwConfig> {
        let config = self.config.filter(|cfg| cfg.device_id == device_id)?;
        self.configured = Some(device_id);
        Some(config)
    }

    fn supports_scatter_gather(&self) -> bool {
        self.configured.is_some() && self.config.is_some_and(|cfg| cfg.has_scatter_gather)
    }

    fn start_transfer(
        &mut self,
        address: usize,
        length: u32,
        direction: Direction,
    ) -> Result<(), StartError> {
        if let Some(error) = self.start_error.take() {
            return Err(error);
        }
        self.starts.push(StartCall {
            direction,
            address,
            length,
        });
        Ok(())
    }

    fn read_pending(&self, direction: Direction) -> u32 {
        self.pending[direction.index()]
    }

    fn acknowledge(&mut self, mask: u32, direction: Direction) {
        self.acks.push((direction, mask));
        self.pending[direction.index()] &= !mask;
    }

    fn enable_interrupts(&mut self, direction: Direction) {
        self.ops.push(BackendOp::EnableInterrupts(direction));
    }

    fn disable_interrupts(&mut self, direction: Direction) {
        self.ops.push(BackendOp::DisableInterrupts(direction));
    }

    fn hard_reset(&mut self) {
        self.ops.push(BackendOp::HardReset);
        self.reset_polls_left.set(self.reset_latency);
    }

    fn reset_is_complete(&self) -> bool {
        let left = self.reset_polls_left.get();
        if left == 0 {
            true
        } else {
            self.reset_polls_left.set(left - 1);
            false
        }
    }
}

// =============================================================================
// Mock Interrupt Controller
// =============================================================================

/// Mock interrupt controller recording bindings and unmasks
#[derive(Debug, Default)]
pub struct MockInterruptController {
    bindings: Vec<(u8, IsrFn)>,
    unmasked: Vec<u8>,
    fail_vector: Option<u8>,
}

impl MockInterruptController {
    pub const fn new() -> Self {
        Self {
            bindings: Vec::new(),
            unmasked: Vec::new(),
            fail_vector: None,
        }
    }

    /// Make binding `vector` fail
    pub fn fail_bind(&mut self, vector: u8) {
        self.fail_vector = Some(vector);
    }

    /// Vectors bound so far, in call order
    pub fn bound_vectors(&self) -> Vec<u8> {
        self.bindings.iter().map(|(vector, _)| *vector).collect()
    }

    /// Routine bound to `vector`, if any
    pub fn isr(&self, vector: u8) -> Option<IsrFn> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| *bound == vector)
            .map(|(_, isr)| *isr)
    }

    pub fn unmasked(&self) -> &[u8] {
        &self.unmasked
    }
}

impl InterruptController for MockInterruptController {
    fn bind_vector(&mut self, vector: u8, isr: IsrFn) -> Result<(), BindError> {
        if self.fail_vector == Some(vector) {
            return Err(BindError::InvalidVector);
        }
        self.bindings.push((vector, isr));
        Ok(())
    }

    fn unmask(&mut self, vector: u8) {
        self.unmasked.push(vector);
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay provider that accumulates requested delay instead of sleeping
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: RefCell<u64>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += ns as u64;
    }
}

// =============================================================================
// Counting Completion Handler
// =============================================================================

const NO_DIRECTION: usize = usize::MAX;

/// Completion handler that counts invocations
///
/// Meant to be a `static` so it can be registered as a `&'static` handler.
pub struct CountingHandler {
    calls: AtomicUsize,
    last: AtomicUsize,
}

impl CountingHandler {
    pub const fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            last: AtomicUsize::new(NO_DIRECTION),
        }
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Direction of the most recent invocation
    pub fn last_direction(&self) -> Option<Direction> {
        match self.last.load(Ordering::SeqCst) {
            0 => Some(Direction::Transmit),
            1 => Some(Direction::Receive),
            _ => None,
        }
    }
}

impl Default for CountingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionHandler for CountingHandler {
    fn on_complete(&self, direction: Direction) {
        self.last.store(direction.index(), Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Mock Register Block
// =============================================================================

/// Host memory standing in for an MMIO register block of `N` words
///
/// The register accessors take the block's base address, so the words live
/// in an `UnsafeCell` and are only touched through volatile accesses.
pub struct MockRegisters<const N: usize> {
    words: UnsafeCell<[u32; N]>,
}

impl<const N: usize> MockRegisters<N> {
    pub fn new() -> Self {
        Self {
            words: UnsafeCell::new([0; N]),
        }
    }

    /// Address to hand to the register accessors
    pub fn base(&self) -> usize {
        self.words.get() as usize
    }

    /// Read the register at byte `offset`
    pub fn read(&self, offset: usize) -> u32 {
        assert!(offset / 4 < N, "offset out of range");
        // SAFETY: in bounds and aligned; the block outlives the call
        unsafe { core::ptr::read_volatile((self.base() + offset) as *const u32) }
    }

    /// Write the register at byte `offset`, as the hardware would
    pub fn write(&self, offset: usize, value: u32) {
        assert!(offset / 4 < N, "offset out of range");
        // SAFETY: in bounds and aligned; the block outlives the call
        unsafe { core::ptr::write_volatile((self.base() + offset) as *mut u32, value) }
    }
}

impl<const N: usize> Default for MockRegisters<N> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests for the mocks themselves
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::register::axi_dma::{IRQ_ERROR, IRQ_IOC};

    #[test]
    fn mock_backend_acknowledge_clears_bits() {
        let mut backend = MockBackend::new();
        backend.raise(Direction::Receive, IRQ_IOC | IRQ_ERROR);

        backend.acknowledge(IRQ_IOC, Direction::Receive);

        assert_eq!(backend.read_pending(Direction::Receive), IRQ_ERROR);
        assert_eq!(backend.acks(), &[(Direction::Receive, IRQ_IOC)]);
    }

    #[test]
    fn mock_backend_fail_next_start_is_one_shot() {
        let mut backend = MockBackend::new();
        backend.fail_next_start(StartError::ChannelBusy);

        assert_eq!(
            backend.start_transfer(0x100, 4, Direction::Transmit),
            Err(StartError::ChannelBusy)
        );
        assert_eq!(
            backend.start_transfer(0x100, 4, Direction::Transmit),
            Ok(())
        );
        assert_eq!(backend.starts().len(), 1);
    }

    #[test]
    fn mock_backend_reset_latency() {
        let mut backend = MockBackend::new();
        backend.set_reset_latency(2);
        backend.hard_reset();

        assert!(!backend.reset_is_complete());
        assert!(!backend.reset_is_complete());
        assert!(backend.reset_is_complete());
        assert_eq!(backend.reset_count(), 1);
    }

    #[test]
    fn mock_backend_configure_matches_device_id() {
        let mut backend = MockBackend::new();
        assert!(backend.configure(1).is_none());
        assert!(backend.configure(0).is_some());
        assert_eq!(backend.configured(), Some(0));
    }

    #[test]
    fn mock_intc_records_and_fails() {
        fn isr() {}

        let mut intc = MockInterruptController::new();
        intc.fail_bind(3);

        assert_eq!(intc.bind_vector(2, isr), Ok(()));
        assert_eq!(intc.bind_vector(3, isr), Err(BindError::InvalidVector));
        intc.unmask(2);

        assert_eq!(intc.bound_vectors(), std::vec![2]);
        assert!(intc.isr(2).is_some());
        assert_eq!(intc.unmasked(), &[2]);
    }

    #[test]
    fn mock_delay_accumulates() {
        let mut delay = MockDelay::new();

        embedded_hal::delay::DelayNs::delay_ns(&mut delay, 1000);
        embedded_hal::delay::DelayNs::delay_us(&mut delay, 2);

        assert_eq!(delay.total_ns(), 3000);
    }

    #[test]
    fn counting_handler_tracks_last_direction() {
        let handler = CountingHandler::new();
        assert_eq!(handler.last_direction(), None);

        handler.on_complete(Direction::Receive);
        handler.on_complete(Direction::Transmit);

        assert_eq!(handler.count(), 2);
        assert_eq!(handler.last_direction(), Some(Direction::Transmit));
    }

    #[test]
    fn mock_registers_read_back_writes() {
        let regs = MockRegisters::<4>::new();
        regs.write(8, 0xA5A5_0000);
        assert_eq!(regs.read(8), 0xA5A5_0000);
        assert_eq!(regs.read(0), 0);
    }
}
