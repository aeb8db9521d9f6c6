//! Upcall delivery thread.
//!
//! The real SDK reports completions and events from a thread it owns. The
//! simulator does the same: every upcall is queued as a job and executed in
//! order on a single worker thread.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use tracing::{error, warn};

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

enum Message {
    Run(Job),
    Barrier(Sender<()>),
}

pub(crate) struct Worker {
    tx: Option<Sender<Message>>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub(crate) fn spawn() -> Self {
        let (tx, rx) = unbounded();
        match thread::Builder::new()
            .name("sim-sdk-worker".to_string())
            .spawn(move || worker_loop(rx))
        {
            Ok(handle) => Self {
                tx: Some(tx),
                handle: Some(handle),
            },
            Err(e) => {
                warn!(error = %e, "Failed to spawn worker thread, upcalls run inline");
                Self {
                    tx: None,
                    handle: None,
                }
            }
        }
    }

    pub(crate) fn submit(&self, job: Job) {
        match &self.tx {
            Some(tx) => {
                if let Err(e) = tx.send(Message::Run(job)) {
                    warn!("Worker queue closed, running upcall inline");
                    if let Message::Run(job) = e.into_inner() {
                        run(job);
                    }
                }
            }
            None => run(job),
        }
    }

    /// Block until every job queued so far has run.
    pub(crate) fn wait_idle(&self) {
        if self.is_worker_thread() {
            return;
        }
        let Some(tx) = &self.tx else {
            return;
        };
        let (ack_tx, ack_rx) = bounded(1);
        if tx.send(Message::Barrier(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    fn is_worker_thread(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| handle.thread().id() == thread::current().id())
            .unwrap_or(false)
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.tx.take();
        if self.is_worker_thread() {
            // Dropped from inside an upcall; the loop ends once the queue drains.
            return;
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Worker thread panicked");
            }
        }
    }
}

fn worker_loop(rx: Receiver<Message>) {
    for message in rx.iter() {
        match message {
            Message::Run(job) => run(job),
            Message::Barrier(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

fn run(job: Job) {
    if catch_unwind(AssertUnwindSafe(job)).is_err() {
        error!("Upcall panicked");
    }
}
