//! Fixed-delay debouncer.
//!
//! Each [`Debouncer::schedule`] call replaces the pending task: the timer
//! restarts and the previous task is cancelled before it runs. A task
//! that already started is never interrupted.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct Pending {
    seq: u64,
    token: Option<CancellationToken>,
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Arc<Mutex<Pending>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `task` once `delay` has elapsed without another call.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let seq = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(previous) = pending.token.replace(token.clone()) {
                previous.cancel();
                tracing::debug!("Debounce timer reset");
            }
            pending.seq += 1;
            pending.seq
        };

        let delay = self.delay;
        let slot = Arc::clone(&self.pending);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    {
                        let mut pending = slot.lock().unwrap_or_else(PoisonError::into_inner);
                        if pending.seq == seq {
                            pending.token = None;
                        }
                    }
                    task.await;
                }
            }
        });
    }

    /// Drop the pending task, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        match pending.token.take() {
            Some(token) => {
                token.cancel();
                tracing::debug!("Pending debounced task cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .is_some()
    }
}
