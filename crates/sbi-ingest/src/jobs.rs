//! Background job dispatch.
//!
//! Packet intake enqueues work instead of blocking the caller: registering an
//! archive dispatches [`Job::ImportPacket`], and scheduled maintenance
//! dispatches [`Job::SweepPackets`]. The [`JobDispatcher`] seam keeps the
//! pipeline testable; production wires a [`QueueDispatcher`] to a
//! [`JobWorker`] thread.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use chrono::Utc;
use sbi_store::DocumentStore;

use crate::packet::{IntakeConfig, import_packet};
use crate::sweep::sweep;

/// A unit of deferred work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Decode and reconcile one registered packet.
    ImportPacket {
        /// Packet document name (the archive file name).
        packet: String,
    },
    /// Prune packets older than the retention window.
    SweepPackets,
}

/// Hands jobs off for asynchronous execution. Dispatch is fire-and-forget;
/// failures are logged by the executor, never surfaced to the caller.
pub trait JobDispatcher: Send + Sync {
    fn dispatch(&self, job: Job);
}

/// Discards every job. For callers that run the pipeline synchronously.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDispatcher;

impl JobDispatcher for NullDispatcher {
    fn dispatch(&self, job: Job) {
        tracing::debug!(?job, "job discarded, no worker attached");
    }
}

/// Sends jobs over a channel to a [`JobWorker`].
#[derive(Debug, Clone)]
pub struct QueueDispatcher {
    sender: Sender<Job>,
}

impl QueueDispatcher {
    /// Build a dispatcher plus the receiving end for [`JobWorker::spawn`].
    pub fn new() -> (Self, Receiver<Job>) {
        let (sender, receiver) = channel();
        (Self { sender }, receiver)
    }
}

impl JobDispatcher for QueueDispatcher {
    fn dispatch(&self, job: Job) {
        if let Err(e) = self.sender.send(job) {
            tracing::warn!(job = ?e.0, "job dropped, worker has shut down");
        }
    }
}

/// Records dispatched jobs for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    jobs: Mutex<Vec<Job>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs dispatched so far, in order.
    pub fn jobs(&self) -> Vec<Job> {
        match self.jobs.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl JobDispatcher for RecordingDispatcher {
    fn dispatch(&self, job: Job) {
        match self.jobs.lock() {
            Ok(mut guard) => guard.push(job),
            Err(poisoned) => poisoned.into_inner().push(job),
        }
    }
}

/// A background thread that drains a job channel until every sender has
/// been dropped.
#[derive(Debug)]
pub struct JobWorker {
    handle: JoinHandle<()>,
}

impl JobWorker {
    /// Start the worker thread. It owns a handle to the store and runs jobs
    /// one at a time; a failed job is logged and the worker moves on.
    pub fn spawn(
        store: Arc<dyn DocumentStore>,
        config: IntakeConfig,
        receiver: Receiver<Job>,
    ) -> Self {
        let handle = std::thread::spawn(move || {
            for job in receiver {
                run_job(store.as_ref(), &config, job);
            }
            tracing::debug!("job worker shutting down");
        });
        Self { handle }
    }

    /// Wait for the worker to drain the queue and exit. Returns once every
    /// dispatcher clone has been dropped.
    pub fn join(self) {
        if self.handle.join().is_err() {
            tracing::error!("job worker thread panicked");
        }
    }
}

fn run_job(store: &dyn DocumentStore, config: &IntakeConfig, job: Job) {
    match job {
        Job::ImportPacket { packet } => match import_packet(store, config, &packet) {
            Ok(report) if report.already_processed => {
                tracing::debug!(%packet, "packet already imported");
            }
            Ok(_) => {
                tracing::info!(%packet, "packet import finished");
            }
            Err(e) => {
                tracing::error!(%packet, error = %e, "packet import failed");
            }
        },
        Job::SweepPackets => match sweep(store, config, Utc::now()) {
            Ok(report) => {
                tracing::info!(
                    packets = report.packets_removed,
                    files = report.files_removed,
                    "retention sweep finished"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "retention sweep failed");
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sbi_model::{DataPacket, PACKET_KIND};
    use sbi_store::MemoryStore;

    #[test]
    fn recording_dispatcher_keeps_order() {
        let dispatcher = RecordingDispatcher::new();
        dispatcher.dispatch(Job::ImportPacket { packet: "a.zip".into() });
        dispatcher.dispatch(Job::SweepPackets);
        assert_eq!(
            dispatcher.jobs(),
            vec![Job::ImportPacket { packet: "a.zip".into() }, Job::SweepPackets]
        );
    }

    #[test]
    fn worker_runs_sweep_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let old = DataPacket::new("old.zip", Utc::now() - Duration::days(90));
        store
            .insert(PACKET_KIND, "old.zip", serde_json::to_value(&old).unwrap())
            .unwrap();

        let (dispatcher, receiver) = QueueDispatcher::new();
        let worker = JobWorker::spawn(Arc::clone(&store), IntakeConfig::new(dir.path()), receiver);
        dispatcher.dispatch(Job::SweepPackets);
        drop(dispatcher);
        worker.join();

        assert!(!store.exists(PACKET_KIND, "old.zip").unwrap());
    }

    #[test]
    fn dispatch_after_worker_exit_is_a_noop() {
        let (dispatcher, receiver) = QueueDispatcher::new();
        drop(receiver);
        dispatcher.dispatch(Job::SweepPackets);
    }
}
