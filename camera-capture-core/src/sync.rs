//! Completion signalling shared between the coordinator and backends.
//!
//! Native camera APIs report photo capture and recording finalization through
//! one-shot callbacks. `CompletionSignal` models those callbacks as a
//! single-fire result channel: the first `complete` wins, later calls are
//! ignored, and exactly one waiter consumes the value.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::models::error::CameraError;

/// Cooperative cancellation flag.
///
/// Cancelling aborts logical waits on this side of the native boundary; it
/// does not guarantee prompt cancellation of the underlying native operation.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Errors with `Cancelled` when the token has been triggered.
    pub fn check(&self) -> Result<(), CameraError> {
        if self.is_cancelled() {
            Err(CameraError::Cancelled)
        } else {
            Ok(())
        }
    }
}

struct SignalState<T> {
    value: Option<T>,
    completed: bool,
}

/// Single-fire completion signal.
///
/// Set exactly once; a duplicate native finalize event is dropped with a
/// warning instead of overwriting the observed result.
pub struct CompletionSignal<T> {
    state: Mutex<SignalState<T>>,
    condvar: Condvar,
}

impl<T> CompletionSignal<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SignalState {
                value: None,
                completed: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Fire the signal. Returns false (and discards `value`) if the signal
    /// already fired.
    pub fn complete(&self, value: T) -> bool {
        let mut state = self.state.lock();
        if state.completed {
            log::warn!("completion signal fired more than once; ignoring duplicate");
            return false;
        }
        state.value = Some(value);
        state.completed = true;
        self.condvar.notify_all();
        true
    }

    /// Block until the signal fires or the token cancels.
    ///
    /// Cancellation is polled between condvar wakeups, so the wait aborts
    /// within one poll interval of `cancel()`.
    pub fn wait(&self, token: &CancellationToken) -> Result<T, CameraError> {
        let mut state = self.state.lock();
        loop {
            if let Some(value) = state.value.take() {
                return Ok(value);
            }
            // A completed-but-consumed signal means a second waiter; treat as
            // a wait on something that will never fire again.
            if state.completed {
                return Err(CameraError::CaptureFailed(
                    "completion signal already consumed".into(),
                ));
            }
            token.check()?;
            self.condvar
                .wait_for(&mut state, Duration::from_millis(50));
        }
    }
}

impl<T> Default for CompletionSignal<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn first_completion_wins() {
        let signal = CompletionSignal::new();
        assert!(signal.complete(1));
        assert!(!signal.complete(2));

        let token = CancellationToken::new();
        assert_eq!(signal.wait(&token).unwrap(), 1);
    }

    #[test]
    fn wait_observes_completion_from_another_thread() {
        let signal = Arc::new(CompletionSignal::new());
        let token = CancellationToken::new();

        let firing = Arc::clone(&signal);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            firing.complete("done");
        });

        assert_eq!(signal.wait(&token).unwrap(), "done");
        handle.join().unwrap();
    }

    #[test]
    fn cancelled_wait_aborts() {
        let signal: CompletionSignal<()> = CompletionSignal::new();
        let token = CancellationToken::new();
        token.cancel();

        assert_eq!(signal.wait(&token), Err(CameraError::Cancelled));
    }

    #[test]
    fn second_wait_after_consumption_fails() {
        let signal = CompletionSignal::new();
        signal.complete(7);

        let token = CancellationToken::new();
        assert_eq!(signal.wait(&token).unwrap(), 7);
        assert!(matches!(
            signal.wait(&token),
            Err(CameraError::CaptureFailed(_))
        ));
    }
}
