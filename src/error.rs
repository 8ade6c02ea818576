//! Miner error types.

use thiserror::Error;

/// Configuration problems, detected before any mining starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("wallet address is required and must not be the placeholder value")]
    PlaceholderWallet,

    #[error("pool host must not be empty")]
    EmptyHost,

    #[error("worker count must be at least 1")]
    ZeroWorkers,
}

/// RandomX cache/dataset allocation or initialisation failures.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("seed hash must decode to exactly 32 bytes, got {0}")]
    InvalidSeedLength(usize),

    #[error("failed to allocate or initialise RandomX cache: {0}")]
    CacheInit(String),

    #[error("failed to allocate or initialise RandomX dataset: {0}")]
    DatasetInit(String),
}

/// Stratum wire-protocol problems, always recoverable: logged, the
/// offending line is discarded, the session continues.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed JSON from pool: {0}")]
    MalformedJson(String),

    #[error("message missing expected field {0:?}")]
    MissingField(&'static str),
}

/// The pool rejected a submitted share.
#[derive(Debug, Error)]
#[error("share rejected by pool: {0}")]
pub struct PoolReject(pub String);

/// Top-level miner error, returned from fatal startup paths.
#[derive(Debug, Error)]
pub enum MinerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("network error: {0}")]
    Network(String),

    #[error("hashing error: {0}")]
    Hashing(String),
}
