//! Wires the Stratum session to the worker pool: job pushes fan out to
//! every worker, qualifying hashes are submitted back to the pool.
//!
//! Mirrors `main.cpp`'s wiring of `job_callback`/`solution_callback`
//! between the `StratumClient` and the `MinerWorker`s, re-expressed around
//! channels instead of `std::function` callbacks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{error, info, warn};

use crate::console;
use crate::hash_context::SharedHashContext;
use crate::stratum::{Command, StratumHandle, StratumEvent};
use crate::worker_pool::WorkerPool;

pub struct Coordinator {
    pub pool: WorkerPool,
    pub stratum: StratumHandle,
    pub hash_ctx: SharedHashContext,
}

impl Coordinator {
    pub fn new(pool: WorkerPool, stratum: StratumHandle, hash_ctx: SharedHashContext) -> Self {
        Coordinator {
            pool,
            stratum,
            hash_ctx,
        }
    }

    /// Drive the coordinator until `shutdown` is set. Forwards jobs from
    /// the pool to every worker and forwards workers' solutions back to
    /// the pool as submissions.
    pub async fn run(mut self, shutdown: Arc<AtomicBool>) {
        loop {
            if shutdown.load(Ordering::Relaxed) {
                let _ = self.stratum.commands.send(Command::Shutdown);
                self.pool.shutdown();
                return;
            }

            while let Ok(solution) = self.pool.solutions.try_recv() {
                if self
                    .stratum
                    .commands
                    .send(Command::Submit(solution))
                    .is_err()
                {
                    warn!("stratum session gone, cannot submit solution");
                }
            }

            match tokio::time::timeout(
                std::time::Duration::from_millis(100),
                self.stratum.events.recv(),
            )
            .await
            {
                Ok(Some(StratumEvent::Job(job))) => {
                    info!("new job {} (seed ...{})", job.job_id, hex_tail(&job.seed_hash));
                    let hash_ctx = self.hash_ctx.clone();
                    let seed = job.seed_hash;
                    let is_first_seed = hash_ctx.current_seed().is_none();
                    let update = tokio::task::spawn_blocking(move || hash_ctx.update_seed(&seed))
                        .await;
                    match update {
                        Ok(Ok(_)) => {
                            self.pool.dispatch(job);
                        }
                        Ok(Err(e)) if is_first_seed => {
                            error!("fatal: initial dataset build failed: {e}");
                            shutdown.store(true, Ordering::Relaxed);
                        }
                        Ok(Err(e)) => {
                            warn!("dataset rebuild for job {} failed, keeping previous seed: {e}", job.job_id);
                        }
                        Err(e) => {
                            error!("dataset rebuild task panicked: {e}");
                            shutdown.store(true, Ordering::Relaxed);
                        }
                    }
                }
                Ok(Some(StratumEvent::ShareAccepted)) => {
                    console::print_line("share accepted");
                }
                Ok(Some(StratumEvent::ShareRejected(reason))) => {
                    warn!("share rejected: {reason}");
                }
                Ok(Some(StratumEvent::PoolError(reason))) => {
                    warn!("pool error: {reason}");
                }
                Ok(Some(StratumEvent::Disconnected)) => {
                    warn!("disconnected from pool");
                    shutdown.store(true, Ordering::Relaxed);
                }
                Ok(None) => {
                    warn!("stratum session ended");
                    shutdown.store(true, Ordering::Relaxed);
                }
                Err(_) => {
                    // No event within the poll window; loop back to check
                    // shutdown and drain any pending solutions.
                }
            }
        }
    }
}

fn hex_tail(seed: &[u8; 32]) -> String {
    crate::hex_util::bytes_to_hex(&seed[29..32])
}
