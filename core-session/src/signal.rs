//! Blocking wait primitives used by the load helpers.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// A one-shot signal set when an asynchronous native request completes.
///
/// Once set it stays set; waiters arriving late return immediately.
#[derive(Debug, Default)]
pub struct CompletionSignal {
    done: Mutex<bool>,
    cond: Condvar,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        let mut done = self.done.lock();
        *done = true;
        self.cond.notify_all();
    }

    pub fn is_set(&self) -> bool {
        *self.done.lock()
    }

    /// Block until the signal is set or `timeout` elapses. Returns whether it was set.
    pub fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut done = self.done.lock();
        while !*done {
            if self.cond.wait_until(&mut done, deadline).timed_out() {
                break;
            }
        }
        *done
    }
}

/// Generation counter bumped on every upcall, so loaders can sleep until
/// the native side has had something to say instead of spinning.
#[derive(Debug, Default)]
pub(crate) struct ActivityNotifier {
    generation: Mutex<u64>,
    cond: Condvar,
}

impl ActivityNotifier {
    pub(crate) fn pulse(&self) {
        let mut generation = self.generation.lock();
        *generation = generation.wrapping_add(1);
        self.cond.notify_all();
    }

    pub(crate) fn generation(&self) -> u64 {
        *self.generation.lock()
    }

    /// Wait until the generation moves past `seen` or `timeout` elapses.
    pub(crate) fn wait_for_change(&self, seen: u64, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        let mut generation = self.generation.lock();
        while *generation == seen {
            if self.cond.wait_until(&mut generation, deadline).timed_out() {
                break;
            }
        }
    }
}
