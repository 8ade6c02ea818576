//! Async Stratum session: owns the pool connection, re-expressing the
//! original's callback-driven `StratumClient` as a task that exchanges
//! typed events and commands with the rest of the miner over channels.

pub mod messages;

use std::collections::HashMap;

use log::{debug, error, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::error::{PoolReject, ProtocolError};
use crate::hex_util::hex_to_bytes;
use crate::job::{build_job, MiningJob, Solution};
use crate::stratum::messages::{JobParams, LoginRequest, PoolMessage, SubmitRequest};

/// Commands accepted by a running session, sent from the rest of the miner.
#[derive(Debug)]
pub enum Command {
    Submit(Solution),
    Shutdown,
}

/// Events emitted by a running session, consumed by the rest of the miner.
#[derive(Debug, Clone)]
pub enum StratumEvent {
    Job(MiningJob),
    ShareAccepted,
    ShareRejected(String),
    PoolError(String),
    Disconnected,
}

/// A handle to a spawned session task. Dropping it does not stop the task;
/// send [`Command::Shutdown`] for a clean stop.
pub struct StratumHandle {
    pub commands: mpsc::UnboundedSender<Command>,
    pub events: mpsc::UnboundedReceiver<StratumEvent>,
}

/// Connect to `host:port`, log in as `login`, and spawn the session task.
pub async fn connect(host: &str, port: u16, login: String) -> std::io::Result<StratumHandle> {
    let stream = TcpStream::connect((host, port)).await?;
    info!("connected to {host}:{port}");

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    tokio::spawn(run_session(stream, login, cmd_rx, event_tx));

    Ok(StratumHandle {
        commands: cmd_tx,
        events: event_rx,
    })
}

fn job_from_params(params: &JobParams) -> Option<MiningJob> {
    let blob = hex_to_bytes(&params.blob).ok()?;
    let target = hex_to_bytes(&params.target).ok()?;
    let seed = hex_to_bytes(&params.seed_hash).ok()?;
    build_job(params.job_id.clone(), blob, &target, &seed)
}

async fn run_session(
    stream: TcpStream,
    login: String,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<StratumEvent>,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let mut request_id: u64 = 1;
    let mut login_id: Option<String> = None;
    // request id -> job id, for correlating submit responses.
    let mut pending_submits: HashMap<u64, String> = HashMap::new();

    let login_req = LoginRequest::new(request_id, login);
    request_id += 1;
    if write_line(&mut write_half, &login_req).await.is_err() {
        let _ = events.send(StratumEvent::Disconnected);
        return;
    }

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        let line = line.trim_end_matches('\r');
                        if line.is_empty() {
                            continue;
                        }
                        handle_line(line, &mut login_id, &mut pending_submits, &events);
                    }
                    Ok(None) => {
                        info!("pool closed connection");
                        let _ = events.send(StratumEvent::Disconnected);
                        return;
                    }
                    Err(e) => {
                        error!("read error: {e}");
                        let _ = events.send(StratumEvent::Disconnected);
                        return;
                    }
                }
            }
            cmd = commands.recv() => {
                match cmd {
                    Some(Command::Submit(solution)) => {
                        let Some(ref id) = login_id else {
                            warn!("dropping submit before login completed");
                            continue;
                        };
                        let req_id = request_id;
                        request_id += 1;
                        pending_submits.insert(req_id, solution.job_id.clone());
                        let req = SubmitRequest::new(
                            req_id,
                            id.clone(),
                            solution.job_id.clone(),
                            solution.nonce,
                            crate::hex_util::bytes_to_hex(&solution.result_hash),
                        );
                        debug!("submitting share for job {}", solution.job_id);
                        if let Err(e) = write_line(&mut write_half, &req).await {
                            warn!("write error submitting share for job {}: {e}", solution.job_id);
                        }
                    }
                    Some(Command::Shutdown) | None => {
                        return;
                    }
                }
            }
        }
    }
}

fn handle_line(
    line: &str,
    login_id: &mut Option<String>,
    pending_submits: &mut HashMap<u64, String>,
    events: &mpsc::UnboundedSender<StratumEvent>,
) {
    let msg: PoolMessage = match serde_json::from_str(line) {
        Ok(msg) => msg,
        Err(e) => {
            let err = ProtocolError::MalformedJson(e.to_string());
            warn!("{err} ({line})");
            return;
        }
    };

    if let Some(id) = msg.numeric_id() {
        if let Some(job_id) = pending_submits.remove(&id) {
            match &msg.error {
                Some(err) if !err.is_null() => {
                    let reject = PoolReject(err.to_string());
                    warn!("{reject} (job {job_id})");
                    let _ = events.send(StratumEvent::ShareRejected(reject.0));
                }
                _ => {
                    let _ = events.send(StratumEvent::ShareAccepted);
                }
            }
            return;
        }
    }

    if let Some(err) = &msg.error {
        if !err.is_null() {
            let _ = events.send(StratumEvent::PoolError(err.to_string()));
        }
    }

    if msg.is_job_push() {
        if let Some(params) = &msg.params {
            if let Some(job) = job_from_params(params) {
                let _ = events.send(StratumEvent::Job(job));
            } else {
                warn!("job push with unparseable fields: {line}");
            }
        }
        return;
    }

    if let Some(id) = msg.login_id() {
        *login_id = Some(id.clone());
        info!("logged in, subscription id {id}");
        if let Some(params) = msg.login_job() {
            if let Some(job) = job_from_params(&params) {
                let _ = events.send(StratumEvent::Job(job));
            }
        }
    }
}

async fn write_line<T: serde::Serialize>(
    write_half: &mut tokio::net::tcp::OwnedWriteHalf,
    value: &T,
) -> std::io::Result<()> {
    let mut line = serde_json::to_string(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    line.push('\n');
    write_half.write_all(line.as_bytes()).await
}
