use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use tokio::sync::Notify;

use randomx_miner::config::{Args, Config};
use randomx_miner::console;
use randomx_miner::control::{spawn_hotkey_reader, spawn_signal_watcher, Hotkey};
use randomx_miner::coordinator::Coordinator;
use randomx_miner::hash_context;
use randomx_miner::stratum;
use randomx_miner::telemetry::{format_hashrate, HashrateTracker, SAMPLE_INTERVAL_SECS};
use randomx_miner::worker_pool::WorkerPool;

fn main() -> ExitCode {
    let config = match init() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("fatal error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init() -> Result<Config, randomx_miner::error::ConfigError> {
    let args = Args::parse();
    let config = Config::from_args(args)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    Ok(config)
}

async fn run(config: Config) -> Result<(), randomx_miner::error::MinerError> {
    info!(
        "starting miner: pool {}:{}, {} threads",
        config.host, config.port, config.threads
    );

    let stratum_handle = stratum::connect(&config.host, config.port, config.wallet.clone())
        .await
        .map_err(|e| randomx_miner::error::MinerError::Network(e.to_string()))?;

    let hash_ctx = hash_context::new_shared();
    let pool = WorkerPool::spawn(config.threads, hash_ctx.clone());
    let hash_counters = pool.hash_counters();

    let shutdown = Arc::new(AtomicBool::new(false));
    spawn_signal_watcher(shutdown.clone());

    let status_requested = Arc::new(Notify::new());

    let hotkey_shutdown = shutdown.clone();
    let hotkey_status = status_requested.clone();
    let hotkey_handle = spawn_hotkey_reader(shutdown.clone(), move |key| match key {
        Hotkey::Quit => hotkey_shutdown.store(true, Ordering::Relaxed),
        Hotkey::StatusDump => hotkey_status.notify_one(),
    });

    let telemetry_shutdown = shutdown.clone();
    let telemetry_handle = tokio::spawn(run_telemetry(
        telemetry_shutdown,
        hash_counters,
        status_requested,
    ));

    let coordinator = Coordinator::new(pool, stratum_handle, hash_ctx);
    coordinator.run(shutdown).await;

    let _ = telemetry_handle.await;
    let _ = hotkey_handle.join();

    info!("miner stopped");
    Ok(())
}

async fn run_telemetry(
    shutdown: Arc<AtomicBool>,
    hash_counters: Vec<Arc<AtomicU64>>,
    status_requested: Arc<Notify>,
) {
    let mut tracker = HashrateTracker::new();
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(SAMPLE_INTERVAL_SECS));

    while !shutdown.load(Ordering::Relaxed) {
        tokio::select! {
            _ = interval.tick() => {
                let total: u64 = hash_counters.iter().map(|c| c.load(Ordering::Relaxed)).sum();
                tracker.record(total);
                print_rates(&tracker);
            }
            _ = status_requested.notified() => {
                print_rates(&tracker);
            }
        }
    }
}

fn print_rates(tracker: &HashrateTracker) {
    let rates = tracker.hashrates();
    console::print_line(&format!(
        "hashrate 1m={} 15m={} 1h={}",
        format_hashrate(rates.avg_1m),
        format_hashrate(rates.avg_15m),
        format_hashrate(rates.avg_1h)
    ));
}
