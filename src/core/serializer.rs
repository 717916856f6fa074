// src/core/serializer.rs

//! # Serializer
//!
//! A single-worker FIFO queue. Every mutating action of the tray runs on one of
//! two serializers: the background action worker (slow, externally delegated
//! work) and the UI-affine worker (structural edits of the view lists). Both
//! share one [`BusyGate`], so "idle" means nothing is in flight on either queue.
//!
//! Submitting from the queue's own worker thread runs the operation inline.
//! Without that rule an operation that chains another one onto its own queue
//! would wait for itself forever.

use crate::core::busy::BusyGate;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SerializerError {
    #[error("Queue '{0}' is shut down and no longer accepts operations.")]
    Closed(String),
    #[error("Could not start the worker thread for queue '{queue}': {source}")]
    WorkerSpawn {
        queue: String,
        #[source]
        source: std::io::Error,
    },
}

/// Identifies a physical worker. Compared against the thread-local token to
/// detect re-entrant submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueId(u64);

static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_QUEUE: Cell<Option<QueueId>> = const { Cell::new(None) };
}

/// The body of an operation. Errors are logged at the queue boundary.
pub type Operation = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;

/// One enqueued mutation. Owned by the serializer from submit until it has run.
pub struct OperationTicket {
    id: Uuid,
    label: String,
    operation: Operation,
}

impl fmt::Debug for OperationTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationTicket")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl OperationTicket {
    fn new(label: String, operation: Operation) -> Self {
        Self {
            id: Uuid::new_v4(),
            label,
            operation,
        }
    }

    /// Runs the operation. The caller has already entered `gate`; the matching
    /// exit happens here whatever the outcome, panics included.
    fn run(self, queue: &str, gate: &BusyGate) {
        let _exit = scopeguard::guard((), |_| gate.exit());
        let Self {
            id,
            label,
            operation,
        } = self;
        log::debug!("[{}] start '{}' ({})", queue, label, id);

        match panic::catch_unwind(AssertUnwindSafe(operation)) {
            Ok(Ok(())) => log::debug!("[{}] done '{}' ({})", queue, label, id),
            Ok(Err(e)) => log::error!("[{}] '{}' failed: {:#}", queue, label, e),
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic payload".to_string());
                log::error!("[{}] '{}' panicked: {}", queue, label, message);
            }
        }
    }
}

/// A single dedicated worker executing operations one at a time, in FIFO order.
#[derive(Debug)]
pub struct Serializer {
    name: String,
    id: QueueId,
    gate: Arc<BusyGate>,
    sender: Option<Sender<OperationTicket>>,
    worker: Option<JoinHandle<()>>,
}

impl Serializer {
    /// Starts a worker thread named `name` that reports to `gate`.
    pub fn spawn(name: &str, gate: Arc<BusyGate>) -> Result<Self, SerializerError> {
        let id = QueueId(NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = unbounded::<OperationTicket>();

        let worker_gate = Arc::clone(&gate);
        let worker_name = name.to_string();
        let worker = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(id, &worker_name, receiver, &worker_gate))
            .map_err(|source| SerializerError::WorkerSpawn {
                queue: name.to_string(),
                source,
            })?;

        log::debug!("Queue '{}' started.", name);
        Ok(Self {
            name: name.to_string(),
            id,
            gate,
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> QueueId {
        self.id
    }

    pub fn gate(&self) -> &Arc<BusyGate> {
        &self.gate
    }

    /// `true` when called from this serializer's worker thread.
    pub fn is_current(&self) -> bool {
        CURRENT_QUEUE.with(|current| current.get() == Some(self.id))
    }

    /// Runs `operation` on the worker, after everything submitted before it.
    /// From the worker itself the operation runs inline, before `submit` returns.
    ///
    /// The busy counter is incremented here, not when the worker picks the
    /// ticket up, so an `await_idle` issued right after `submit` cannot see a
    /// false idle.
    pub fn submit<F>(&self, label: impl Into<String>, operation: F) -> Result<(), SerializerError>
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        let ticket = OperationTicket::new(label.into(), Box::new(operation));
        self.gate.enter();

        if self.is_current() {
            log::trace!("[{}] inline '{}' ({})", self.name, ticket.label, ticket.id);
            ticket.run(&self.name, &self.gate);
            return Ok(());
        }

        let Some(sender) = &self.sender else {
            self.gate.exit();
            return Err(SerializerError::Closed(self.name.clone()));
        };
        log::trace!("[{}] queued '{}' ({})", self.name, ticket.label, ticket.id);
        sender.send(ticket).map_err(|rejected| {
            // The worker is gone; the ticket will never run.
            drop(rejected);
            self.gate.exit();
            SerializerError::Closed(self.name.clone())
        })
    }
}

fn worker_loop(id: QueueId, name: &str, receiver: Receiver<OperationTicket>, gate: &BusyGate) {
    CURRENT_QUEUE.with(|current| current.set(Some(id)));
    for ticket in receiver {
        ticket.run(name, gate);
    }
    log::debug!("Queue '{}' drained and stopped.", name);
}

impl Drop for Serializer {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish what is queued and exit.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if self.is_current() {
                // Dropped from its own worker; the loop ends on its own.
                return;
            }
            if worker.join().is_err() {
                log::warn!("Worker of queue '{}' terminated abnormally.", self.name);
            }
        }
    }
}
