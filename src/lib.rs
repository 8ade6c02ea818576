pub mod config;
pub mod console;
pub mod control;
pub mod coordinator;
pub mod error;
pub mod hash_context;
pub mod hex_util;
pub mod job;
pub mod mailbox;
pub mod stratum;
pub mod target;
pub mod telemetry;
pub mod worker;
pub mod worker_pool;
