//! Interrupt controller abstraction and AXI INTC driver
//!
//! The engine binds one dispatch routine per direction through
//! [`InterruptController`]. [`Intc`] implements it for the AXI interrupt
//! controller with a software vector table, the way the platform's
//! top-level interrupt entry expects: read the pending register, call the
//! bound routine, acknowledge.

use crate::internal::register::intc::{IntcRegs, MER_HIE, MER_ME};
use crate::sync::CriticalSectionCell;

/// Interrupt dispatch routine
pub type IsrFn = fn();

/// Vector binding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BindError {
    /// Vector id is outside the controller's range
    InvalidVector,
}

impl BindError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            BindError::InvalidVector => "invalid interrupt vector",
        }
    }
}

impl core::fmt::Display for BindError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vector registration and unmasking at an interrupt controller
pub trait InterruptController {
    /// Route `vector` to `isr`. Rebinding a vector replaces its routine.
    ///
    /// # Errors
    /// - `InvalidVector` - the controller has no such vector
    fn bind_vector(&mut self, vector: u8, isr: IsrFn) -> Result<(), BindError>;

    /// Unmask `vector` at the controller
    fn unmask(&mut self, vector: u8);
}

impl<T: InterruptController + ?Sized> InterruptController for &mut T {
    fn bind_vector(&mut self, vector: u8, isr: IsrFn) -> Result<(), BindError> {
        (**self).bind_vector(vector, isr)
    }

    fn unmask(&mut self, vector: u8) {
        (**self).unmask(vector);
    }
}

// =============================================================================
// AXI Interrupt Controller
// =============================================================================

/// AXI interrupt controller with `N` vectors
///
/// The vector table is shared between foreground binding and the interrupt
/// entry, so it lives in a critical-section cell and `Intc` is meant to be a
/// `static`. The engine borrows it as `&Intc<N>`.
///
/// # Example
///
/// ```ignore
/// static INTC: Intc<32> = unsafe { Intc::new(0x4120_0000) };
///
/// // Platform interrupt entry
/// fn external_interrupt() {
///     INTC.dispatch();
/// }
///
/// let engine = Engine::new(dma_backend, &INTC, config);
/// ```
pub struct Intc<const N: usize> {
    regs: IntcRegs,
    table: CriticalSectionCell<[Option<IsrFn>; N]>,
}

impl<const N: usize> Intc<N> {
    /// Create a driver for the controller at `base`.
    ///
    /// # Safety
    /// `base` must be the address of an AXI interrupt controller register
    /// block, and only one `Intc` may exist per controller.
    pub const unsafe fn new(base: usize) -> Self {
        Self {
            // SAFETY: forwarded from the caller
            regs: unsafe { IntcRegs::new(base) },
            table: CriticalSectionCell::new([None; N]),
        }
    }

    /// Enable the controller outputs (master enable plus hardware interrupts)
    pub fn start(&self) {
        self.regs.set_master_enable(MER_ME | MER_HIE);
    }

    /// Check whether `vector` has a routine bound
    pub fn is_bound(&self, vector: u8) -> bool {
        let index = vector as usize;
        index < N && self.table.with(|table| table[index].is_some())
    }

    /// Service every pending vector once.
    ///
    /// Bound routines run outside the critical section so they can take their
    /// own locks. Each vector is acknowledged after its routine returns.
    /// Returns the number of vectors serviced.
    pub fn dispatch(&self) -> usize {
        let pending = self.regs.pending();
        let mut serviced = 0;

        for index in 0..N.min(32) {
            let bit = 1u32 << index;
            if pending & bit == 0 {
                continue;
            }

            let isr = self.table.with(|table| table[index]);
            if let Some(isr) = isr {
                isr();
            }
            self.regs.acknowledge(bit);
            serviced += 1;
        }

        serviced
    }

    fn bind(&self, vector: u8, isr: IsrFn) -> Result<(), BindError> {
        let index = vector as usize;
        if index >= N || index >= 32 {
            return Err(BindError::InvalidVector);
        }
        self.table.with(|table| table[index] = Some(isr));
        Ok(())
    }
}

impl<const N: usize> InterruptController for &Intc<N> {
    fn bind_vector(&mut self, vector: u8, isr: IsrFn) -> Result<(), BindError> {
        self.bind(vector, isr)
    }

    fn unmask(&mut self, vector: u8) {
        if (vector as usize) < N.min(32) {
            self.regs.enable(1 << vector);
        }
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::internal::register::intc::{IAR_OFFSET, IER_OFFSET, IPR_OFFSET, MER_OFFSET};
    use crate::testing::MockRegisters;

    static VECTOR_2_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn vector_2_isr() {
        VECTOR_2_CALLS.fetch_add(1, Ordering::SeqCst);
    }

    fn noop() {}

    #[test]
    fn bind_rejects_out_of_range_vector() {
        let regs = MockRegisters::<8>::new();
        let intc: Intc<4> = unsafe { Intc::new(regs.base()) };
        let mut handle = &intc;

        assert_eq!(handle.bind_vector(4, noop), Err(BindError::InvalidVector));
        assert_eq!(handle.bind_vector(3, noop), Ok(()));
        assert!(intc.is_bound(3));
        assert!(!intc.is_bound(0));
        assert!(!intc.is_bound(9));
    }

    #[test]
    fn unmask_preserves_enabled_vectors() {
        let regs = MockRegisters::<8>::new();
        regs.write(IER_OFFSET, 0b0001);
        let intc: Intc<8> = unsafe { Intc::new(regs.base()) };
        let mut handle = &intc;

        handle.unmask(2);
        handle.unmask(3);

        assert_eq!(regs.read(IER_OFFSET), 0b1101);
    }

    #[test]
    fn start_sets_master_and_hardware_enable() {
        let regs = MockRegisters::<8>::new();
        let intc: Intc<8> = unsafe { Intc::new(regs.base()) };

        intc.start();

        assert_eq!(regs.read(MER_OFFSET), 0b11);
    }

    #[test]
    fn dispatch_calls_bound_routine_and_acknowledges() {
        let regs = MockRegisters::<8>::new();
        let intc: Intc<8> = unsafe { Intc::new(regs.base()) };
        let mut handle = &intc;
        handle.bind_vector(2, vector_2_isr).unwrap();

        // Vector 2 bound, vector 5 pending but unbound
        regs.write(IPR_OFFSET, (1 << 2) | (1 << 5));
        let before = VECTOR_2_CALLS.load(Ordering::SeqCst);

        let serviced = intc.dispatch();

        assert_eq!(serviced, 2);
        assert_eq!(VECTOR_2_CALLS.load(Ordering::SeqCst), before + 1);
        // Last acknowledge written is vector 5
        assert_eq!(regs.read(IAR_OFFSET), 1 << 5);
    }

    #[test]
    fn dispatch_with_nothing_pending_is_a_no_op() {
        let regs = MockRegisters::<8>::new();
        let intc: Intc<8> = unsafe { Intc::new(regs.base()) };

        assert_eq!(intc.dispatch(), 0);
        assert_eq!(regs.read(IAR_OFFSET), 0);
    }
}
