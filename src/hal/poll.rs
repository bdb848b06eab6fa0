//! Spin and bounded-poll primitives
//!
//! The driver never sleeps: there is no scheduler to yield to. Waits are spin
//! loops over an injectable predicate so tests can decide when a condition
//! flips. Production code that cannot afford an unbounded spin layers
//! [`spin_until_timeout`] on top.

use embedded_hal::delay::DelayNs;

use crate::driver::error::{IoError, IoResult};

/// Spin until `done` returns true.
///
/// Never returns if the predicate never becomes true.
#[inline]
pub fn spin_until<F>(mut done: F)
where
    F: FnMut() -> bool,
{
    while !done() {
        core::hint::spin_loop();
    }
}

/// Poll `done` every `interval_us` until it returns true or `timeout_us` elapses.
///
/// The predicate is checked once more after the last delay, so a condition
/// that becomes true right at the deadline still succeeds.
///
/// # Errors
/// - `Timeout` - the predicate stayed false for `timeout_us`
pub fn spin_until_timeout<F, D>(
    mut done: F,
    delay: &mut D,
    timeout_us: u32,
    interval_us: u32,
) -> IoResult<()>
where
    F: FnMut() -> bool,
    D: DelayNs,
{
    let interval_us = interval_us.max(1);
    let max_iterations = timeout_us / interval_us;
    for _ in 0..max_iterations {
        if done() {
            return Ok(());
        }
        delay.delay_us(interval_us);
    }

    if done() {
        Ok(())
    } else {
        Err(IoError::Timeout)
    }
}
