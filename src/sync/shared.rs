//! ISR-safe engine wrapper using critical sections.
//!
//! [`SharedEngine`] lets foreground code and the per-direction interrupt
//! routines use one [`Engine`] placed in a `static`.

use embedded_hal::delay::DelayNs;

#[cfg(feature = "async")]
use super::primitives::AtomicWaker;
use super::primitives::CriticalSectionCell;
use crate::driver::channel::{Handler, TransferOutcome};
use crate::driver::config::{Direction, State};
use crate::driver::engine::{Engine, EngineStats, InterruptOutcome};
use crate::driver::error::{InitResult, Result, TransferError, TransferResult};
use crate::hal::backend::DmaBackend;
use crate::hal::intc::InterruptController;
use crate::hal::poll::{spin_until, spin_until_timeout};
use crate::internal::constants::WAIT_POLL_INTERVAL_US;

/// ISR-safe engine wrapper using critical sections.
///
/// Every channel update happens inside `critical_section::with()`. Completion
/// handlers run after the critical section is left, so a handler may submit
/// the next transfer through the same `SharedEngine`.
///
/// # Example
///
/// ```ignore
/// static DMA: SharedEngine<AxiDma, &Intc<32>> = SharedEngine::new(Engine::new(
///     unsafe { AxiDma::new(&HW_CONFIG) },
///     &INTC,
///     EngineConfig::new().with_vectors(2, 3).with_isrs(dma_tx_isr, dma_rx_isr),
/// ));
///
/// ph_axi_dma::dma_isr!(dma_tx_isr, DMA, Direction::Transmit);
/// ph_axi_dma::dma_isr!(dma_rx_isr, DMA, Direction::Receive);
///
/// DMA.initialize()?;
/// DMA.transmit(&FRAME, None)?;
/// DMA.wait(Direction::Transmit);
/// ```
pub struct SharedEngine<B, C> {
    inner: CriticalSectionCell<Engine<B, C>>,
    #[cfg(feature = "async")]
    wakers: [AtomicWaker; 2],
}

impl<B: DmaBackend, C: InterruptController> SharedEngine<B, C> {
    /// Wrap an engine (const, suitable for static initialization).
    pub const fn new(engine: Engine<B, C>) -> Self {
        Self {
            inner: CriticalSectionCell::new(engine),
            #[cfg(feature = "async")]
            wakers: [AtomicWaker::new(), AtomicWaker::new()],
        }
    }

    /// Execute a closure with exclusive access to the engine.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Engine<B, C>) -> R,
    {
        self.inner.with(f)
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Engine<B, C>) -> R,
    {
        self.inner.try_with(f)
    }

    /// Initialize the engine. See [`Engine::initialize`].
    ///
    /// # Errors
    /// See [`Engine::initialize`].
    pub fn initialize(&self) -> InitResult<()> {
        self.inner.with(Engine::initialize)
    }

    /// Start a transfer. See [`Engine::submit`].
    ///
    /// # Errors
    /// See [`Engine::submit`].
    ///
    /// # Safety
    /// Same contract as [`Engine::submit`].
    pub unsafe fn submit(
        &self,
        direction: Direction,
        buffer: *const u8,
        length: usize,
        on_complete: Option<Handler>,
    ) -> TransferResult<()> {
        self.inner.with(|engine| {
            // SAFETY: forwarded from the caller
            unsafe { engine.submit(direction, buffer, length, on_complete) }
        })
    }

    /// Transmit a statically allocated buffer
    ///
    /// # Errors
    /// See [`Engine::submit`].
    pub fn transmit(
        &self,
        buffer: &'static [u8],
        on_complete: Option<Handler>,
    ) -> TransferResult<()> {
        self.inner
            .with(|engine| engine.transmit(buffer, on_complete))
    }

    /// Receive into a statically allocated buffer
    ///
    /// # Errors
    /// See [`Engine::submit`].
    pub fn receive(
        &self,
        buffer: &'static mut [u8],
        on_complete: Option<Handler>,
    ) -> TransferResult<()> {
        self.inner
            .with(|engine| engine.receive(buffer, on_complete))
    }

    /// Check whether a transfer is in flight on `direction`
    #[inline]
    pub fn is_busy(&self, direction: Direction) -> bool {
        self.inner.with(|engine| engine.is_busy(direction))
    }

    /// How the most recent transfer on `direction` finished
    pub fn last_outcome(&self, direction: Direction) -> Option<TransferOutcome> {
        self.inner.with(|engine| engine.last_outcome(direction))
    }

    /// Get the engine state
    pub fn state(&self) -> State {
        self.inner.with(|engine| engine.state())
    }

    /// Get the event counters
    pub fn stats(&self) -> EngineStats {
        self.inner.with(|engine| engine.stats())
    }

    /// Spin until `direction` is idle.
    ///
    /// Each check takes the critical section briefly, so the interrupt can
    /// run between checks. Never returns if no interrupt arrives; use
    /// [`wait_timeout`](Self::wait_timeout) to bound the wait.
    pub fn wait(&self, direction: Direction) {
        spin_until(|| !self.is_busy(direction));
    }

    /// Wait for `direction` to go idle, for at most `timeout_us`.
    ///
    /// # Errors
    /// - `Io(Timeout)` - still busy; the channel may be stuck and need a `reset`
    /// - `Transfer(Abandoned)` - a reset discarded the transfer
    pub fn wait_timeout<D: DelayNs>(
        &self,
        direction: Direction,
        delay: &mut D,
        timeout_us: u32,
    ) -> Result<()> {
        spin_until_timeout(
            || !self.is_busy(direction),
            delay,
            timeout_us,
            WAIT_POLL_INTERVAL_US,
        )?;

        match self.last_outcome(direction) {
            Some(TransferOutcome::Abandoned) => Err(TransferError::Abandoned.into()),
            _ => Ok(()),
        }
    }

    /// Reset the engine. See [`Engine::reset`].
    ///
    /// Async waiters on both directions are woken and resolve as abandoned.
    pub fn reset(&self) {
        self.inner.with(Engine::reset);
        #[cfg(feature = "async")]
        self.wake_all();
    }

    /// Interrupt entry for `direction`.
    ///
    /// Services the interrupt inside a critical section, then runs the
    /// completion handler outside it. Bind this (through
    /// [`dma_isr!`](crate::dma_isr)) as the direction's dispatch routine.
    pub fn on_interrupt(&self, direction: Direction) -> InterruptOutcome {
        let dispatch = self
            .inner
            .with(|engine| engine.service_interrupt(direction));

        #[cfg(feature = "async")]
        match dispatch.outcome() {
            InterruptOutcome::Completed => self.wakers[direction.index()].wake(),
            InterruptOutcome::Recovered => self.wake_all(),
            InterruptOutcome::Spurious => {}
        }

        dispatch.run()
    }

    #[cfg(feature = "async")]
    pub(super) fn waker(&self, direction: Direction) -> &AtomicWaker {
        &self.wakers[direction.index()]
    }

    #[cfg(feature = "async")]
    fn wake_all(&self) {
        for waker in &self.wakers {
            waker.wake();
        }
    }
}

#[cfg(test)]
#[allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]
mod tests {
    extern crate std;

    use core::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::driver::config::EngineConfig;
    use crate::driver::error::{Error, IoError};
    use crate::internal::register::axi_dma::{IRQ_ERROR, IRQ_IOC};
    use crate::testing::{CountingHandler, MockBackend, MockDelay, MockInterruptController};

    type TestShared = SharedEngine<MockBackend, MockInterruptController>;

    static TX_BUF: [u8; 32] = [0x5A; 32];

    fn tx_isr() {}
    fn rx_isr() {}

    const fn shared() -> TestShared {
        SharedEngine::new(Engine::new(
            MockBackend::new(),
            MockInterruptController::new(),
            EngineConfig::new()
                .with_vectors(2, 3)
                .with_isrs(tx_isr, rx_isr),
        ))
    }

    fn raise(dma: &TestShared, direction: Direction, bits: u32) {
        dma.with(|engine| {
            engine.backend_mut().raise(direction, bits);
        });
    }

    #[test]
    fn static_shared_engine_initializes() {
        static DMA: TestShared = shared();

        assert_eq!(DMA.state(), State::Uninitialized);
        assert_eq!(DMA.initialize(), Ok(()));
        assert_eq!(DMA.state(), State::Ready);
    }

    #[test]
    fn try_with_fails_inside_with() {
        static DMA: TestShared = shared();

        let nested = DMA.with(|_| DMA.try_with(|engine| engine.state()));

        assert_eq!(nested, None);
        assert_eq!(
            DMA.try_with(|engine| engine.state()),
            Some(State::Uninitialized)
        );
    }

    #[test]
    fn on_interrupt_completes_and_runs_handler() {
        static DMA: TestShared = shared();
        static HANDLER: CountingHandler = CountingHandler::new();
        DMA.initialize().unwrap();
        DMA.transmit(&TX_BUF, Some(&HANDLER)).unwrap();
        assert_eq!(DMA.transmit(&TX_BUF, None), Err(TransferError::Busy));

        raise(&DMA, Direction::Transmit, IRQ_IOC);
        let outcome = DMA.on_interrupt(Direction::Transmit);

        assert_eq!(outcome, InterruptOutcome::Completed);
        assert!(!DMA.is_busy(Direction::Transmit));
        assert_eq!(HANDLER.count(), 1);
        assert_eq!(DMA.stats().tx_completed, 1);
        assert_eq!(DMA.stats().busy_rejections, 1);
    }

    #[test]
    fn handler_sees_idle_channel_and_can_resubmit() {
        static DMA: TestShared = shared();
        static SEEN_BUSY: AtomicUsize = AtomicUsize::new(0);
        static RESUBMITTED: AtomicUsize = AtomicUsize::new(0);

        fn resubmit(direction: Direction) {
            if DMA.is_busy(direction) {
                SEEN_BUSY.fetch_add(1, Ordering::SeqCst);
            }
            // Resubmit only once, without a handler
            if RESUBMITTED.fetch_add(1, Ordering::SeqCst) == 0 {
                DMA.transmit(&TX_BUF, None).unwrap();
            }
        }
        static RESUBMIT: fn(Direction) = resubmit;

        DMA.initialize().unwrap();
        DMA.transmit(&TX_BUF, Some(&RESUBMIT)).unwrap();
        raise(&DMA, Direction::Transmit, IRQ_IOC);

        DMA.on_interrupt(Direction::Transmit);

        assert_eq!(SEEN_BUSY.load(Ordering::SeqCst), 0);
        assert_eq!(RESUBMITTED.load(Ordering::SeqCst), 1);
        assert!(DMA.is_busy(Direction::Transmit));
        assert_eq!(DMA.with(|engine| engine.backend().starts().len()), 2);
    }

    #[test]
    fn error_interrupt_abandons_both_directions() {
        static DMA: TestShared = shared();
        static TX_DONE: CountingHandler = CountingHandler::new();
        static RX_DONE: CountingHandler = CountingHandler::new();
        DMA.initialize().unwrap();
        DMA.transmit(&TX_BUF, Some(&TX_DONE)).unwrap();
        let rx_buf = std::boxed::Box::leak(std::boxed::Box::new([0u8; 16]));
        DMA.receive(rx_buf, Some(&RX_DONE)).unwrap();

        raise(&DMA, Direction::Receive, IRQ_ERROR);
        assert_eq!(
            DMA.on_interrupt(Direction::Receive),
            InterruptOutcome::Recovered
        );

        assert!(!DMA.is_busy(Direction::Transmit));
        assert!(!DMA.is_busy(Direction::Receive));
        assert_eq!(TX_DONE.count() + RX_DONE.count(), 0);
        assert_eq!(DMA.with(|engine| engine.backend().reset_count()), 1);
    }

    #[test]
    fn dma_isr_routes_to_on_interrupt() {
        static DMA: TestShared = shared();
        static HANDLER: CountingHandler = CountingHandler::new();
        crate::dma_isr!(rx_routine, DMA, Direction::Receive);

        DMA.initialize().unwrap();
        let rx_buf = std::boxed::Box::leak(std::boxed::Box::new([0u8; 8]));
        DMA.receive(rx_buf, Some(&HANDLER)).unwrap();
        raise(&DMA, Direction::Receive, IRQ_IOC);

        rx_routine();

        assert!(!DMA.is_busy(Direction::Receive));
        assert_eq!(HANDLER.last_direction(), Some(Direction::Receive));
    }

    #[test]
    fn wait_returns_once_interrupt_releases_channel() {
        static DMA: TestShared = shared();
        DMA.initialize().unwrap();
        DMA.transmit(&TX_BUF, None).unwrap();

        let isr = std::thread::spawn(|| {
            raise(&DMA, Direction::Transmit, IRQ_IOC);
            DMA.on_interrupt(Direction::Transmit);
        });
        DMA.wait(Direction::Transmit);
        isr.join().unwrap();

        assert!(!DMA.is_busy(Direction::Transmit));
        assert_eq!(
            DMA.last_outcome(Direction::Transmit),
            Some(TransferOutcome::Completed)
        );
    }

    #[test]
    fn wait_timeout_expires_on_stuck_channel() {
        static DMA: TestShared = shared();
        DMA.initialize().unwrap();
        DMA.transmit(&TX_BUF, None).unwrap();
        let mut delay = MockDelay::new();

        let result = DMA.wait_timeout(Direction::Transmit, &mut delay, 500);

        assert_eq!(result, Err(Error::Io(IoError::Timeout)));
        assert_eq!(delay.total_ns(), 500_000);
        assert!(DMA.is_busy(Direction::Transmit));
    }

    #[test]
    fn wait_timeout_reports_abandoned_transfer() {
        static DMA: TestShared = shared();
        DMA.initialize().unwrap();
        DMA.transmit(&TX_BUF, None).unwrap();

        DMA.reset();
        let result = DMA.wait_timeout(Direction::Transmit, &mut MockDelay::new(), 100);

        assert_eq!(result, Err(Error::Transfer(TransferError::Abandoned)));
    }

    #[test]
    fn wait_timeout_succeeds_after_completion() {
        static DMA: TestShared = shared();
        DMA.initialize().unwrap();
        DMA.transmit(&TX_BUF, None).unwrap();
        raise(&DMA, Direction::Transmit, IRQ_IOC);
        DMA.on_interrupt(Direction::Transmit);

        let mut delay = MockDelay::new();
        assert_eq!(
            DMA.wait_timeout(Direction::Transmit, &mut delay, 100),
            Ok(())
        );
        assert_eq!(delay.total_ns(), 0);
    }

    #[test]
    fn reset_twice_leaves_engine_idle() {
        static DMA: TestShared = shared();
        DMA.initialize().unwrap();
        DMA.transmit(&TX_BUF, None).unwrap();

        DMA.reset();
        DMA.reset();

        assert!(!DMA.is_busy(Direction::Transmit));
        assert_eq!(DMA.state(), State::Ready);
        assert_eq!(DMA.stats().resets, 2);
        assert_eq!(DMA.transmit(&TX_BUF, None), Ok(()));
    }
}
