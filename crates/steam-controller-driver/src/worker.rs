//! Per-session deferred work.
//!
//! One named thread consumes a bounded queue in submission order, so jobs of
//! a session never overlap. Submission never blocks: a full queue rejects the
//! job and the caller logs and counts it.

use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use thiserror::Error;
use tracing::{debug, error, trace};

use crate::error::{DriverError, DriverResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("job queue is full")]
    Full,
    #[error("worker has shut down")]
    Closed,
}

enum Message<J> {
    Job(J),
    Barrier(Sender<()>),
}

/// Single worker thread bound to one session.
pub struct SessionWorker<J: Send + 'static> {
    name: String,
    tx: Option<Sender<Message<J>>>,
    handle: Option<JoinHandle<()>>,
}

impl<J: Send + 'static> SessionWorker<J> {
    /// Start the worker. `handler` runs every job on the worker thread.
    ///
    /// # Errors
    ///
    /// `Resource` when the thread cannot be spawned.
    pub fn spawn<F>(name: impl Into<String>, depth: usize, handler: F) -> DriverResult<Self>
    where
        F: FnMut(J) + Send + 'static,
    {
        let name = name.into();
        let (tx, rx) = channel::bounded(depth);
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || Self::run(rx, handler))
            .map_err(|e| DriverError::resource(format!("Failed to spawn worker {name}: {e}")))?;
        debug!("Worker {} started (queue depth {})", name, depth);
        Ok(Self {
            name,
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    fn run<F: FnMut(J)>(rx: Receiver<Message<J>>, mut handler: F) {
        // Ends once every sender is gone and the queue is drained.
        for message in rx.iter() {
            match message {
                Message::Job(job) => handler(job),
                Message::Barrier(ack) => {
                    if ack.send(()).is_err() {
                        trace!("barrier waiter went away");
                    }
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue `job` without blocking.
    pub fn submit(&self, job: J) -> Result<(), SubmitError> {
        let Some(tx) = &self.tx else {
            return Err(SubmitError::Closed);
        };
        tx.try_send(Message::Job(job)).map_err(|e| match e {
            TrySendError::Full(_) => SubmitError::Full,
            TrySendError::Disconnected(_) => SubmitError::Closed,
        })
    }

    /// Block until every job queued before this call has run.
    /// Returns `false` if the worker is gone.
    pub fn wait_idle(&self) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        let (ack_tx, ack_rx) = channel::bounded(1);
        if tx.send(Message::Barrier(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv().is_ok()
    }

    /// Run the remaining jobs, then stop the thread. Idempotent.
    pub fn shutdown(&mut self) {
        drop(self.tx.take());
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(()) => debug!("Worker {} stopped", self.name),
                Err(_) => error!("Worker {} panicked", self.name),
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.tx.is_some()
    }
}

impl<J: Send + 'static> Drop for SessionWorker<J> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
