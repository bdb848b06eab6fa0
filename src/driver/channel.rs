//! Per-direction transfer slot
//!
//! A [`Channel`] holds the busy flag and the completion handler of one
//! direction. The pair only changes together: admission sets both,
//! completion and recovery clear both.

use super::config::Direction;

/// Completion callback invoked once per finished transfer
///
/// Runs in interrupt context after the channel has been released, so it may
/// submit the next transfer on the same direction. It must not block.
///
/// Any `Fn(Direction) + Sync` closure or function implements this trait.
pub trait CompletionHandler: Sync {
    /// Called with the direction whose transfer completed
    fn on_complete(&self, direction: Direction);
}

impl<F> CompletionHandler for F
where
    F: Fn(Direction) + Sync,
{
    fn on_complete(&self, direction: Direction) {
        self(direction)
    }
}

/// Registered completion handler
pub type Handler = &'static dyn CompletionHandler;

/// How the most recent transfer on a channel finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferOutcome {
    /// Completion interrupt received; the handler was invoked
    Completed,
    /// Discarded by an engine reset; the handler was not invoked
    Abandoned,
}

/// Transfer slot of one direction
pub(crate) struct Channel {
    busy: bool,
    handler: Option<Handler>,
    outcome: Option<TransferOutcome>,
}

impl Channel {
    pub(crate) const fn idle() -> Self {
        Self {
            busy: false,
            handler: None,
            outcome: None,
        }
    }

    #[inline]
    pub(crate) fn is_busy(&self) -> bool {
        self.busy
    }

    pub(crate) fn last_outcome(&self) -> Option<TransferOutcome> {
        self.outcome
    }

    /// Mark the channel in flight. The caller has checked `is_busy`.
    pub(crate) fn claim(&mut self, handler: Option<Handler>) {
        debug_assert!(!self.busy);
        self.busy = true;
        self.handler = handler;
        self.outcome = None;
    }

    /// Undo a claim whose hardware start failed
    pub(crate) fn rollback(&mut self) {
        self.busy = false;
        self.handler = None;
    }

    /// Release after a completion interrupt.
    ///
    /// Returns the handler to invoke, or `None` if the channel was idle or had
    /// no handler. The channel is idle again when this returns.
    pub(crate) fn release(&mut self) -> Option<Handler> {
        if self.busy {
            self.outcome = Some(TransferOutcome::Completed);
        }
        self.busy = false;
        self.handler.take()
    }

    /// Drop any in-flight transfer without invoking its handler.
    ///
    /// Returns true if a transfer was in flight.
    pub(crate) fn abandon(&mut self) -> bool {
        let was_busy = self.busy;
        if was_busy {
            self.outcome = Some(TransferOutcome::Abandoned);
        }
        self.busy = false;
        self.handler = None;
        was_busy
    }

    /// Forget everything, including the last outcome
    pub(crate) fn clear(&mut self) {
        *self = Self::idle();
    }
}

impl core::fmt::Debug for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Channel")
            .field("busy", &self.busy)
            .field("has_handler", &self.handler.is_some())
            .field("outcome", &self.outcome)
            .finish()
    }
}
