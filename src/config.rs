//! CLI argument parsing and validated runtime configuration.

use clap::Parser;

use crate::error::ConfigError;

/// A placeholder wallet address rejected at startup, matching the value
/// shipped in example configs — accepting it would silently mine for
/// whoever hard-coded it.
const PLACEHOLDER_WALLET: &str = "YOUR_WALLET_ADDRESS_HERE";

#[derive(Debug, Parser)]
#[command(name = "randomx-miner", about = "RandomX CPU miner for Stratum pools")]
pub struct Args {
    /// Pool hostname or IP address.
    #[arg(long)]
    pub host: String,

    /// Pool port.
    #[arg(long, default_value_t = 3333)]
    pub port: u16,

    /// Wallet address or pool login identifier.
    #[arg(long)]
    pub wallet: String,

    /// Number of hashing worker threads. Defaults to the hardware core
    /// count.
    #[arg(long)]
    pub threads: Option<usize>,

    /// Log level: error, warn, info, debug, or trace.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Validated configuration ready to drive the miner.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub wallet: String,
    pub threads: usize,
    pub log_level: String,
}

fn default_threads() -> usize {
    num_cpus::get().max(1)
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        if args.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if args.wallet.trim().is_empty() || args.wallet == PLACEHOLDER_WALLET {
            return Err(ConfigError::PlaceholderWallet);
        }
        let threads = args.threads.unwrap_or_else(default_threads);
        if threads == 0 {
            return Err(ConfigError::ZeroWorkers);
        }

        Ok(Config {
            host: args.host,
            port: args.port,
            wallet: args.wallet,
            threads,
            log_level: args.log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            host: "pool.example.com".to_string(),
            port: 3333,
            wallet: "4Axxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx".to_string(),
            threads: None,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn rejects_empty_host() {
        let mut args = base_args();
        args.host = "  ".to_string();
        assert!(matches!(
            Config::from_args(args),
            Err(ConfigError::EmptyHost)
        ));
    }

    #[test]
    fn rejects_placeholder_wallet() {
        let mut args = base_args();
        args.wallet = PLACEHOLDER_WALLET.to_string();
        assert!(matches!(
            Config::from_args(args),
            Err(ConfigError::PlaceholderWallet)
        ));
    }

    #[test]
    fn rejects_zero_threads() {
        let mut args = base_args();
        args.threads = Some(0);
        assert!(matches!(
            Config::from_args(args),
            Err(ConfigError::ZeroWorkers)
        ));
    }

    #[test]
    fn accepts_valid_args() {
        let args = base_args();
        let config = Config::from_args(args).expect("should be valid");
        assert_eq!(config.host, "pool.example.com");
        assert!(config.threads >= 1);
    }
}
