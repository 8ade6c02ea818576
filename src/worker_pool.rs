//! Spawns and fans work out to a fixed pool of hashing workers.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::hash_context::SharedHashContext;
use crate::job::{MiningJob, Solution};
use crate::worker::Worker;

pub struct WorkerPool {
    workers: Vec<Worker>,
    handles: Vec<JoinHandle<()>>,
    running: Arc<AtomicBool>,
    pub solutions: Receiver<Solution>,
}

impl WorkerPool {
    /// Spawn `thread_count` workers, all sharing `hash_ctx`.
    pub fn spawn(thread_count: usize, hash_ctx: SharedHashContext) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let (tx, rx): (Sender<Solution>, Receiver<Solution>) = channel();

        let mut workers = Vec::with_capacity(thread_count);
        let mut handles = Vec::with_capacity(thread_count);
        for id in 0..thread_count {
            let (worker, handle) =
                Worker::spawn(id, hash_ctx.clone(), tx.clone(), running.clone());
            workers.push(worker);
            handles.push(handle);
        }

        WorkerPool {
            workers,
            handles,
            running,
            solutions: rx,
        }
    }

    /// Push the same job to every worker. Each worker resets its nonce to
    /// zero on receipt, per `MiningJob` semantics.
    pub fn dispatch(&self, job: MiningJob) {
        for worker in &self.workers {
            worker.post_job(job.clone());
        }
    }

    /// Sum of hashes computed across all workers since startup.
    pub fn total_hashes(&self) -> u64 {
        self.workers.iter().map(Worker::hash_count).sum()
    }

    /// Per-worker hash counters, cloneable out of the pool so a telemetry
    /// task can keep polling them after the pool itself is handed off to
    /// the coordinator.
    pub fn hash_counters(&self) -> Vec<Arc<AtomicU64>> {
        self.workers.iter().map(|w| w.hashes.clone()).collect()
    }

    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Signal all workers to stop and wait for their threads to exit.
    pub fn shutdown(self) {
        self.running.store(false, Ordering::Relaxed);
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}
