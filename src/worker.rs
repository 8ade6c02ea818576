//! A single hashing worker thread.
//!
//! Mirrors `MinerWorker::run`: take the newest posted job, rebuild the VM
//! when the seed changes, hash nonces in sequence, and report any
//! qualifying hash. Re-expressed around a shared [`HashContext`] (so the
//! 2 GiB dataset is built once, not once per thread, and only the
//! coordinator ever triggers a rebuild) and a [`Mailbox`] instead of a job
//! mutex.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{error, warn};
use rand::Rng;
use randomx_rs::RandomXVM;

use crate::hash_context::SharedHashContext;
use crate::job::{MiningJob, Solution};
use crate::mailbox::Mailbox;

/// How many stop-flag-free nonces a worker hashes before re-checking for
/// shutdown. The original checks every 256 iterations; this miner checks
/// every 1024, trading a slightly slower shutdown for less branching in the
/// hot loop.
const STOP_CHECK_INTERVAL: u32 = 1024;

const IDLE_POLL: Duration = Duration::from_millis(100);
const SEED_UNREADY_POLL: Duration = Duration::from_millis(500);

pub struct Worker {
    pub id: usize,
    pub mailbox: Arc<Mailbox<MiningJob>>,
    pub hashes: Arc<AtomicU64>,
}

impl Worker {
    /// Spawn the worker's OS thread. Returns immediately; the thread runs
    /// until `running` is cleared.
    pub fn spawn(
        id: usize,
        hash_ctx: SharedHashContext,
        solutions: Sender<Solution>,
        running: Arc<AtomicBool>,
    ) -> (Self, thread::JoinHandle<()>) {
        let mailbox = Arc::new(Mailbox::new());
        let hashes = Arc::new(AtomicU64::new(0));

        let worker_mailbox = mailbox.clone();
        let worker_hashes = hashes.clone();
        let handle = thread::spawn(move || {
            run(id, worker_mailbox, hash_ctx, solutions, worker_hashes, running);
        });

        (
            Worker {
                id,
                mailbox,
                hashes,
            },
            handle,
        )
    }

    pub fn post_job(&self, job: MiningJob) {
        self.mailbox.post(job);
    }

    pub fn hash_count(&self) -> u64 {
        self.hashes.load(Ordering::Relaxed)
    }
}

fn run(
    id: usize,
    mailbox: Arc<Mailbox<MiningJob>>,
    hash_ctx: SharedHashContext,
    solutions: Sender<Solution>,
    hashes: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
) {
    let mut nonce: u32 = rand::thread_rng().gen_range(0..10_000) * id as u32;
    let mut local_job: Option<MiningJob> = None;
    let mut my_seed: Option<[u8; 32]> = None;
    let mut vm: Option<RandomXVM> = None;

    while running.load(Ordering::Relaxed) {
        // Step 1: consume the mailbox; a new job resets the nonce cursor.
        if let Some(job) = mailbox.take() {
            local_job = Some(job);
            nonce = 0;
        }

        // Step 2: nothing to do yet.
        let Some(job) = local_job.as_ref().filter(|j| j.is_hashable()) else {
            thread::sleep(IDLE_POLL);
            continue;
        };

        // Step 3: rebind to the current seed if it changed. The worker
        // never triggers a rebuild itself; only the coordinator calls
        // `HashContext::update_seed`, ahead of dispatch.
        if my_seed.as_ref() != Some(&job.seed_hash) {
            if hash_ctx.current_seed().as_ref() != Some(&job.seed_hash) {
                warn!("worker {id}: dataset not ready for this job's seed, dropping it");
                local_job = None;
                thread::sleep(SEED_UNREADY_POLL);
                continue;
            }
            match hash_ctx.new_vm() {
                Some(new_vm) => {
                    vm = Some(new_vm);
                    my_seed = Some(job.seed_hash);
                }
                None => {
                    warn!("worker {id}: dataset not ready for this job's seed, dropping it");
                    local_job = None;
                    thread::sleep(SEED_UNREADY_POLL);
                    continue;
                }
            }
        }

        let Some(vm_ref) = vm.as_mut() else {
            thread::sleep(SEED_UNREADY_POLL);
            continue;
        };

        // Step 4: hash this nonce.
        let input = job.hash_input(nonce);
        let hash = match vm_ref.calculate_hash(&input) {
            Ok(h) => h,
            Err(e) => {
                error!("worker {id}: hash calculation failed: {e}");
                break;
            }
        };

        // Step 5: count the hash, check the target.
        hashes.fetch_add(1, Ordering::Relaxed);
        if hash.len() >= 32 {
            let mut result_hash = [0u8; 32];
            result_hash.copy_from_slice(&hash[..32]);
            if job.qualifies(&result_hash) {
                let solution = Solution {
                    job_id: job.job_id.clone(),
                    nonce,
                    result_hash,
                };
                if solutions.send(solution).is_err() {
                    break;
                }
                // Await a fresh job so the same nonce is never resubmitted.
                local_job = None;
                continue;
            }
        }

        // Step 6: advance and periodically check for shutdown.
        nonce = nonce.wrapping_add(1);
        if nonce % STOP_CHECK_INTERVAL == 0 && !running.load(Ordering::Relaxed) {
            break;
        }
    }
}
