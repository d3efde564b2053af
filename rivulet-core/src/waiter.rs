use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

use crate::error::{Error, Result};

/// Shared slot behind a [`Waiter`].
#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    resolved: bool,
    waited: bool,
    waker: Option<Waker>,
}

/// A single-use suspension/resumption token.
///
/// One task parks itself on the waiter via [`wait`](Waiter::wait);
/// another resumes it exactly once via [`resolve`](Waiter::resolve).
/// Resolving twice, or waiting twice, is a [`ProtocolViolation`] — the
/// waiter is not a broadcast primitive and never will be.
///
/// There is no built-in deadline: a waiter that is never resolved
/// suspends its task forever. Callers that need a timeout must wrap
/// the wait externally and resolve the waiter with a marker value the
/// consumer checks for.
///
/// [`ProtocolViolation`]: crate::error::Error::ProtocolViolation
#[derive(Debug)]
pub struct Waiter<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Waiter<T> {
    /// Creates a fresh, unresolved waiter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                value: None,
                resolved: false,
                waited: false,
                waker: None,
            })),
        }
    }

    /// Stores `value`, marks the waiter resolved, and wakes the waiting
    /// task if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolViolation`] if the waiter has already
    /// been resolved.
    pub fn resolve(&self, value: T) -> Result<()> {
        let mut slot = self.slot.lock().expect("waiter lock poisoned");
        if slot.resolved {
            return Err(Error::violation("waiter resolved twice"));
        }
        slot.resolved = true;
        slot.value = Some(value);
        if let Some(waker) = slot.waker.take() {
            waker.wake();
        }
        Ok(())
    }

    /// Returns a future that suspends the calling task until the waiter
    /// is resolved, then yields the resolved value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolViolation`] if the waiter has already
    /// been waited on, or was resolved before anyone waited.
    pub fn wait(&self) -> Result<Wait<T>> {
        let mut slot = self.slot.lock().expect("waiter lock poisoned");
        if slot.waited {
            return Err(Error::violation("waiter already waited on"));
        }
        if slot.resolved {
            return Err(Error::violation("wait on an already-resolved waiter"));
        }
        slot.waited = true;
        Ok(Wait {
            slot: Arc::clone(&self.slot),
        })
    }

    /// Returns true once [`resolve`](Waiter::resolve) has been called.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.slot.lock().expect("waiter lock poisoned").resolved
    }
}

impl<T> Clone for Waiter<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for Waiter<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Future returned by [`Waiter::wait`].
#[derive(Debug)]
pub struct Wait<T> {
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Future for Wait<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let mut slot = self.slot.lock().expect("waiter lock poisoned");
        if let Some(value) = slot.value.take() {
            Poll::Ready(value)
        } else {
            slot.waker = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}
