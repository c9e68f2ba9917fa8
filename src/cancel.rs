//! Cooperative cancellation and single-flight guarding.
//!
//! Long-running enumerations and exports poll a [`CancelToken`] at every
//! work unit so a caller on another thread can stop them mid-range. The
//! [`SingleFlight`] guard rejects a second overlapping export on the same
//! session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A clonable stop flag shared between a worker and its controller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    stop: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    /// Request cancellation. Idempotent; safe from any thread.
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

/// Iterator adapter that stops yielding once its token is cancelled.
///
/// The token is checked before every element, so cancellation takes effect
/// within one work unit even on ranges with 2^64 elements. Elements already
/// yielded stand.
pub struct Cancellable<I> {
    inner: I,
    token: CancelToken,
}

impl<I> Cancellable<I> {
    pub fn new(inner: I, token: CancelToken) -> Cancellable<I> {
        Cancellable { inner, token }
    }
}

impl<I: Iterator> Iterator for Cancellable<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        if self.token.is_cancelled() {
            None
        } else {
            self.inner.next()
        }
    }
}

/// Busy flag ensuring at most one export runs per session.
#[derive(Debug, Default)]
pub struct SingleFlight {
    busy: AtomicBool,
}

impl SingleFlight {
    pub fn new() -> SingleFlight {
        SingleFlight::default()
    }

    /// Try to claim the slot. Returns `None` while another holder is live;
    /// the slot frees itself when the returned guard drops.
    pub fn try_acquire(&self) -> Option<SingleFlightGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(SingleFlightGuard { flag: &self.busy })
        } else {
            None
        }
    }
}

/// RAII handle releasing a [`SingleFlight`] slot on drop.
pub struct SingleFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for SingleFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
