//! Single-shot cancellable timer
//!
//! The expiry scheduler owns exactly one of these. Arming replaces (and
//! cancels) whatever wait was pending, so at most one callback is ever
//! outstanding per timer.

use std::sync::Mutex;
use std::time::Duration;

use tokio::runtime::{Handle, TryCurrentError};
use tokio::task::JoinHandle;

/// Callback run when an armed timer elapses. Carries no payload.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

pub trait Timer: Send + Sync {
    /// Start a wait of `delay`, cancelling any pending one.
    fn arm(&self, delay: Duration, callback: TimerCallback);

    /// Drop the pending wait, if any. Its callback never runs.
    fn cancel(&self);
}

#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    #[error("no Tokio runtime available for the expiry timer: {0}")]
    NoRuntime(#[from] TryCurrentError),
}

/// Timer backed by a task sleeping on a Tokio runtime.
#[derive(Debug)]
pub struct TokioTimer {
    runtime: Handle,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl TokioTimer {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            pending: Mutex::new(None),
        }
    }

    /// Timer on the runtime the caller is running in.
    pub fn current() -> Result<Self, TimerError> {
        Ok(Self::new(Handle::try_current()?))
    }

    fn take_pending(&self) -> Option<JoinHandle<()>> {
        self.pending
            .lock()
            .unwrap_or_else(|e| {
                tracing::warn!("expiry timer lock poisoned, recovering");
                e.into_inner()
            })
            .take()
    }
}

impl Timer for TokioTimer {
    fn arm(&self, delay: Duration, callback: TimerCallback) {
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(|e| {
                tracing::warn!("expiry timer lock poisoned, recovering");
                e.into_inner()
            })
            .replace(task);

        // Aborting the task that is currently running our callback is a no-op:
        // it has no await point left.
        if let Some(previous) = previous {
            previous.abort();
        }
        tracing::trace!(delay_ms = delay.as_millis() as u64, "expiry timer armed");
    }

    fn cancel(&self) {
        if let Some(pending) = self.take_pending() {
            pending.abort();
            tracing::trace!("expiry timer cancelled");
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
