//! Cross-thread mailbox
//!
//! The only state allowed to cross from background jobs into the
//! simulation thread. Any number of producers `push`; the single consumer
//! `drain`s once per frame. Both sides take the same lock, and the lock is
//! held only long enough to append or to swap the pending buffer out.

use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
pub struct Mailbox<T> {
    pending: Mutex<Vec<T>>,
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Append a message. Never drops, never applies backpressure.
    pub fn push(&self, message: T) {
        self.lock().push(message);
    }

    /// Take every pending message in push order and leave the mailbox
    /// empty, atomically with respect to `push`.
    pub fn drain(&self) -> Vec<T> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A producer that panicked mid-push cannot leave a Vec half-written,
    // so a poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}
