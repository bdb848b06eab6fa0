//! Async/await support for transfer completion.
//!
//! [`SharedEngine::wait_async`] returns a [`TransferFuture`] that resolves
//! when the direction goes idle. The engine's interrupt entry wakes it.

use core::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use super::shared::SharedEngine;
use crate::driver::channel::TransferOutcome;
use crate::driver::config::Direction;
use crate::driver::error::{TransferError, TransferResult};
use crate::hal::backend::DmaBackend;
use crate::hal::intc::InterruptController;

impl<B: DmaBackend, C: InterruptController> SharedEngine<B, C> {
    /// Wait asynchronously for the transfer on `direction` to finish.
    ///
    /// Resolves immediately if the direction is idle.
    ///
    /// # Errors
    /// - `Abandoned` - a reset discarded the transfer
    pub fn wait_async(&self, direction: Direction) -> TransferFuture<'_, B, C> {
        TransferFuture {
            engine: self,
            direction,
        }
    }
}

/// Future returned by [`SharedEngine::wait_async`].
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct TransferFuture<'a, B, C> {
    engine: &'a SharedEngine<B, C>,
    direction: Direction,
}

impl<B: DmaBackend, C: InterruptController> TransferFuture<'_, B, C> {
    fn finished(&self) -> Option<TransferResult<()>> {
        self.engine.with(|engine| {
            if engine.is_busy(self.direction) {
                None
            } else if engine.last_outcome(self.direction) == Some(TransferOutcome::Abandoned) {
                Some(Err(TransferError::Abandoned))
            } else {
                Some(Ok(()))
            }
        })
    }
}

impl<B: DmaBackend, C: InterruptController> Future for TransferFuture<'_, B, C> {
    type Output = TransferResult<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(result) = self.finished() {
            return Poll::Ready(result);
        }

        // Register first, then re-check, so a completion between the two
        // checks is not lost
        self.engine.waker(self.direction).register(cx.waker());
        match self.finished() {
            Some(result) => Poll::Ready(result),
            None => Poll::Pending,
        }
    }
}
