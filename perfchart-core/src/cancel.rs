//! Cancellation for in-flight refreshes.
//!
//! A [`CancelToken`] is shared by every fetch of one refresh. The
//! [`InFlightSlot`] holds the token of the current refresh; starting a new one
//! swaps in a fresh token and cancels the old one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Cheaply clonable cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// True if both handles refer to the same underlying flag.
    pub fn same_as(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.flag, &other.flag)
    }
}

/// Single-slot register of the current in-flight request.
#[derive(Debug, Default)]
pub struct InFlightSlot {
    current: Mutex<Option<CancelToken>>,
}

impl InFlightSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh token, cancelling whichever request held the slot.
    pub fn begin(&self) -> CancelToken {
        let token = CancelToken::new();
        let mut current = self.lock();
        if let Some(previous) = current.replace(token.clone()) {
            previous.cancel();
        }
        token
    }

    /// Cancel the current request, leaving the slot empty.
    pub fn cancel_current(&self) -> bool {
        match self.lock().take() {
            Some(previous) => {
                previous.cancel();
                true
            }
            None => false,
        }
    }

    /// Release the slot if `token` still owns it.
    pub fn finish(&self, token: &CancelToken) {
        let mut current = self.lock();
        if current.as_ref().is_some_and(|t| t.same_as(token)) {
            current.take();
        }
    }

    /// Run `commit` only while `token` is the live, uncancelled request.
    ///
    /// The slot lock is held for the duration of `commit`, so a concurrent
    /// [`begin`](Self::begin) either lands before (and the commit is skipped)
    /// or after (and supersedes an already-committed result).
    pub fn commit_if_current<F: FnOnce()>(&self, token: &CancelToken, commit: F) -> bool {
        let current = self.lock();
        let live = current.as_ref().is_some_and(|t| t.same_as(token)) && !token.is_cancelled();
        if live {
            commit();
        }
        live
    }

    fn lock(&self) -> MutexGuard<'_, Option<CancelToken>> {
        // The guarded value is a plain Option; a panic elsewhere cannot leave it torn.
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
