//! DMA engine: admission, interrupt servicing and recovery
//!
//! [`Engine`] owns both channel slots together with the register backend and
//! the interrupt controller. It is a plain value; share it between foreground
//! code and interrupt context through [`SharedEngine`](crate::SharedEngine).

use super::channel::{Channel, Handler, TransferOutcome};
use super::config::{Direction, EngineConfig, State, max_transfer_len};
use super::error::{InitError, InitResult, TransferError, TransferResult};
use super::interrupt::IrqStatus;
use crate::hal::backend::DmaBackend;
use crate::hal::intc::InterruptController;
use crate::hal::poll::spin_until;
use crate::internal::constants::DEFAULT_LENGTH_WIDTH;

// =============================================================================
// Statistics
// =============================================================================

/// Event counters kept by the engine
///
/// Counters wrap on overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineStats {
    /// Completed transmit transfers
    pub tx_completed: u32,
    /// Completed receive transfers
    pub rx_completed: u32,
    /// Error interrupts received
    pub hardware_errors: u32,
    /// Engine resets, whether triggered by an error or requested
    pub resets: u32,
    /// Interrupts with no status bit of interest
    pub spurious: u32,
    /// Submissions rejected because the channel was busy
    pub busy_rejections: u32,
}

impl EngineStats {
    /// All counters zero
    pub const fn new() -> Self {
        Self {
            tx_completed: 0,
            rx_completed: 0,
            hardware_errors: 0,
            resets: 0,
            spurious: 0,
            busy_rejections: 0,
        }
    }

    /// Completed transfers for `direction`
    pub const fn completed(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Transmit => self.tx_completed,
            Direction::Receive => self.rx_completed,
        }
    }

    fn record_completion(&mut self, direction: Direction) {
        match direction {
            Direction::Transmit => self.tx_completed = self.tx_completed.wrapping_add(1),
            Direction::Receive => self.rx_completed = self.rx_completed.wrapping_add(1),
        }
    }
}

// =============================================================================
// Interrupt Dispatch
// =============================================================================

/// What one interrupt service did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptOutcome {
    /// No interrupt of interest was pending
    Spurious,
    /// A completion was observed and the channel released
    Completed,
    /// An error was observed and the engine was reset
    Recovered,
}

/// Pending completion handler invocation
///
/// Returned by [`Engine::service_interrupt`] after the channel has already
/// been released. Calling [`run`](Self::run) invokes the captured handler, so
/// the caller decides which locks are held while it runs.
#[must_use = "the completion handler only runs when `run` is called"]
pub struct Dispatch {
    direction: Direction,
    outcome: InterruptOutcome,
    handler: Option<Handler>,
}

impl Dispatch {
    const fn new(direction: Direction, outcome: InterruptOutcome) -> Self {
        Self {
            direction,
            outcome,
            handler: None,
        }
    }

    /// Direction that was serviced
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// What the service did
    pub fn outcome(&self) -> InterruptOutcome {
        self.outcome
    }

    /// Check whether a handler is waiting to run
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Invoke the captured handler, if any
    pub fn run(self) -> InterruptOutcome {
        if let Some(handler) = self.handler {
            handler.on_complete(self.direction);
        }
        self.outcome
    }
}

impl core::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dispatch")
            .field("direction", &self.direction)
            .field("outcome", &self.outcome)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Interrupt-driven simple-mode DMA engine
///
/// At most one transfer is in flight per direction. Completion is observed
/// through the direction's interrupt, which releases the channel and then
/// calls the handler given at submission. An error interrupt on either
/// direction resets the whole engine and abandons both transfers.
///
/// # Type Parameters
/// * `B` - Register backend ([`AxiDma`](crate::hal::axi_dma::AxiDma) on hardware)
/// * `C` - Interrupt controller ([`&Intc<N>`](crate::hal::intc::Intc) on hardware)
///
/// # Example
/// ```ignore
/// static HW: [HwConfig; 1] = [HwConfig::new(0, 0x4040_0000)];
/// static INTC: Intc<32> = unsafe { Intc::new(0x4120_0000) };
/// static DMA: SharedEngine<AxiDma, &Intc<32>> = SharedEngine::new(Engine::new(
///     unsafe { AxiDma::new(&HW) },
///     &INTC,
///     EngineConfig::new().with_vectors(2, 3).with_isrs(dma_tx_isr, dma_rx_isr),
/// ));
///
/// dma_isr!(dma_tx_isr, DMA, Direction::Transmit);
/// dma_isr!(dma_rx_isr, DMA, Direction::Receive);
///
/// DMA.initialize()?;
/// INTC.start();
/// ```
pub struct Engine<B, C> {
    backend: B,
    intc: C,
    config: EngineConfig,
    state: State,
    channels: [Channel; 2],
    max_transfer_len: usize,
    stats: EngineStats,
}

impl<B: DmaBackend, C: InterruptController> Engine<B, C> {
    /// Create an engine in the `Uninitialized` state.
    ///
    /// This is a const function suitable for static initialization. No
    /// hardware is touched until [`initialize`](Self::initialize).
    pub const fn new(backend: B, intc: C, config: EngineConfig) -> Self {
        Self {
            backend,
            intc,
            config,
            state: State::Uninitialized,
            channels: [Channel::idle(), Channel::idle()],
            max_transfer_len: max_transfer_len(DEFAULT_LENGTH_WIDTH),
            stats: EngineStats::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the current state
    #[inline(always)]
    pub fn state(&self) -> State {
        self.state
    }

    /// Get the engine configuration
    #[inline(always)]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the event counters
    #[inline(always)]
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Largest length `submit` accepts
    ///
    /// Taken from the hardware configuration on `initialize`.
    #[inline(always)]
    pub fn max_transfer_len(&self) -> usize {
        self.max_transfer_len
    }

    /// Borrow the register backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutably borrow the register backend
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Borrow the interrupt controller
    pub fn intc(&self) -> &C {
        &self.intc
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Bring the engine up.
    ///
    /// Steps:
    /// 1. Clear both channels
    /// 2. Look up and apply the hardware configuration
    /// 3. Reject scatter-gather hardware
    /// 4. Bind and unmask both interrupt vectors
    /// 5. Disable, then enable, every interrupt source of both channels
    ///
    /// On success the engine is `Ready`. A failed initialization leaves the
    /// hardware partially set up; call [`reset`](Self::reset) before retrying.
    ///
    /// # Errors
    /// - `ConfigNotFound` - no hardware configuration for the device id
    /// - `UnsupportedMode` - the engine includes scatter-gather
    /// - `InterruptSetupFailed` - a vector failed to bind or has no routine
    pub fn initialize(&mut self) -> InitResult<()> {
        for channel in &mut self.channels {
            channel.clear();
        }

        let hw = self
            .backend
            .configure(self.config.device_id)
            .ok_or(InitError::ConfigNotFound)?;

        if self.backend.supports_scatter_gather() {
            #[cfg(feature = "defmt")]
            defmt::error!(
                "DMA {} built with scatter-gather, not supported",
                hw.device_id
            );
            return Err(InitError::UnsupportedMode);
        }
        self.max_transfer_len = hw.max_transfer_len();

        for direction in Direction::ALL {
            let vector = self.config.vector(direction);
            let isr = self
                .config
                .isr(direction)
                .ok_or(InitError::InterruptSetupFailed)?;
            self.intc
                .bind_vector(vector, isr)
                .map_err(|_| InitError::InterruptSetupFailed)?;
        }
        for direction in Direction::ALL {
            self.intc.unmask(self.config.vector(direction));
        }

        #[cfg(feature = "defmt")]
        defmt::info!(
            "DMA {} at {:#010x}: vectors tx={} rx={}",
            hw.device_id,
            hw.base_address,
            self.config.tx_vector,
            self.config.rx_vector
        );

        self.cycle_interrupts();
        self.state = State::Ready;
        Ok(())
    }

    // =========================================================================
    // Transfer Admission
    // =========================================================================

    /// Start a transfer of `length` bytes at `buffer` on `direction`.
    ///
    /// `on_complete` is invoked once, from the direction's interrupt, after
    /// the channel has been released. It is never invoked if the transfer is
    /// abandoned by a reset.
    ///
    /// # Errors
    /// - `Busy` - a transfer is already in flight; nothing was started
    /// - `InvalidLength` - `length` is zero or above [`max_transfer_len`](Self::max_transfer_len)
    /// - `StartFailed` - the hardware refused the start; the channel is idle again
    ///
    /// # Safety
    /// `buffer` must be valid for `length` bytes (readable for transmit,
    /// writable for receive) until the transfer completes or the engine is
    /// reset, and must not be accessed by the CPU meanwhile. Cache maintenance
    /// is the caller's responsibility.
    pub unsafe fn submit(
        &mut self,
        direction: Direction,
        buffer: *const u8,
        length: usize,
        on_complete: Option<Handler>,
    ) -> TransferResult<()> {
        let index = direction.index();
        if self.channels[index].is_busy() {
            self.stats.busy_rejections = self.stats.busy_rejections.wrapping_add(1);
            #[cfg(feature = "defmt")]
            defmt::warn!("DMA {} busy, transfer rejected", direction.as_str());
            return Err(TransferError::Busy);
        }

        if length == 0 || length > self.max_transfer_len {
            return Err(TransferError::InvalidLength);
        }
        let Ok(length) = u32::try_from(length) else {
            return Err(TransferError::InvalidLength);
        };

        // The pair is written before the start, so a completion interrupt
        // always finds it complete
        self.channels[index].claim(on_complete);

        if let Err(_error) = self
            .backend
            .start_transfer(buffer as usize, length, direction)
        {
            self.channels[index].rollback();
            #[cfg(feature = "defmt")]
            defmt::warn!("DMA {} start failed: {}", direction.as_str(), _error);
            return Err(TransferError::StartFailed);
        }

        Ok(())
    }

    /// Transmit a statically allocated buffer
    ///
    /// # Errors
    /// See [`submit`](Self::submit).
    pub fn transmit(
        &mut self,
        buffer: &'static [u8],
        on_complete: Option<Handler>,
    ) -> TransferResult<()> {
        // SAFETY: the buffer lives forever and is only read
        unsafe {
            self.submit(
                Direction::Transmit,
                buffer.as_ptr(),
                buffer.len(),
                on_complete,
            )
        }
    }

    /// Receive into a statically allocated buffer
    ///
    /// The exclusive borrow is consumed, so the CPU cannot observe the buffer
    /// while the engine writes it.
    ///
    /// # Errors
    /// See [`submit`](Self::submit).
    pub fn receive(
        &mut self,
        buffer: &'static mut [u8],
        on_complete: Option<Handler>,
    ) -> TransferResult<()> {
        let length = buffer.len();
        // SAFETY: the buffer lives forever and the borrow is given up
        unsafe {
            self.submit(
                Direction::Receive,
                buffer.as_mut_ptr().cast_const(),
                length,
                on_complete,
            )
        }
    }

    /// Check whether a transfer is in flight on `direction`
    #[inline]
    pub fn is_busy(&self, direction: Direction) -> bool {
        self.channels[direction.index()].is_busy()
    }

    /// How the most recent transfer on `direction` finished
    ///
    /// `None` while a transfer is in flight, before the first transfer, and
    /// after a failed start.
    pub fn last_outcome(&self, direction: Direction) -> Option<TransferOutcome> {
        self.channels[direction.index()].last_outcome()
    }

    /// Spin until `direction` is idle, calling `poll` between checks.
    ///
    /// The exclusive borrow keeps interrupt context out, so `poll` is what
    /// moves the engine forward (typically by servicing the interrupt
    /// directly). Use [`SharedEngine::wait`](crate::SharedEngine::wait) when
    /// a real interrupt releases the channel.
    pub fn wait_with<F>(&mut self, direction: Direction, mut poll: F)
    where
        F: FnMut(&mut Self),
    {
        while self.is_busy(direction) {
            poll(self);
            core::hint::spin_loop();
        }
    }

    // =========================================================================
    // Interrupt Handling
    // =========================================================================

    /// Service the interrupt of `direction` without invoking the handler.
    ///
    /// 1. Read the pending bits and acknowledge exactly those
    /// 2. Nothing of interest: spurious
    /// 3. Error: reset the engine (error wins over completion)
    /// 4. Complete or delay: release the channel and capture its handler
    pub fn service_interrupt(&mut self, direction: Direction) -> Dispatch {
        let pending = self.backend.read_pending(direction);
        self.backend.acknowledge(pending, direction);

        let status = IrqStatus::from_raw(pending);
        if !status.any() {
            self.stats.spurious = self.stats.spurious.wrapping_add(1);
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "DMA {} spurious interrupt, status {:#010x}",
                direction.as_str(),
                pending
            );
            return Dispatch::new(direction, InterruptOutcome::Spurious);
        }

        if status.has_error() {
            self.stats.hardware_errors = self.stats.hardware_errors.wrapping_add(1);
            #[cfg(feature = "defmt")]
            defmt::error!("DMA {} error interrupt, resetting", direction.as_str());
            self.reset();
            return Dispatch::new(direction, InterruptOutcome::Recovered);
        }

        let channel = &mut self.channels[direction.index()];
        let was_busy = channel.is_busy();
        let handler = channel.release();
        if was_busy {
            self.stats.record_completion(direction);
        }

        Dispatch {
            handler,
            ..Dispatch::new(direction, InterruptOutcome::Completed)
        }
    }

    /// Service the interrupt of `direction` and invoke the handler.
    ///
    /// The handler runs while `self` is still borrowed, so it cannot submit
    /// through this engine. Bind [`SharedEngine::on_interrupt`](crate::SharedEngine::on_interrupt)
    /// when handlers resubmit.
    pub fn on_interrupt(&mut self, direction: Direction) -> InterruptOutcome {
        self.service_interrupt(direction).run()
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    /// Reset engine and channels to a known idle state.
    ///
    /// In-flight transfers on both directions are abandoned and their handlers
    /// are not invoked. Spins until the hardware reports the reset finished,
    /// then cycles every interrupt source. Interrupt bindings and the engine
    /// state are kept. Calling it again repeats only the hardware sequence.
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.abandon();
        }

        self.backend.hard_reset();
        spin_until(|| self.backend.reset_is_complete());
        self.cycle_interrupts();

        self.stats.resets = self.stats.resets.wrapping_add(1);
        #[cfg(feature = "defmt")]
        defmt::info!("DMA reset complete");
    }

    /// Disable, then re-enable, all interrupt sources on both channels so no
    /// latched interrupt survives into the new state
    fn cycle_interrupts(&mut self) {
        for direction in Direction::ALL {
            self.backend.disable_interrupts(direction);
        }
        for direction in Direction::ALL {
            self.backend.enable_interrupts(direction);
        }
    }
}

impl<B, C> core::fmt::Debug for Engine<B, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("channels", &self.channels)
            .field("max_transfer_len", &self.max_transfer_len)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
