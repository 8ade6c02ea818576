//! Hashrate tracking: a fixed-size ring of per-interval hash-count deltas,
//! reduced into 1-minute, 15-minute and 1-hour moving averages.
//!
//! One sample is taken every 10 seconds, so 6 samples span a minute, 90
//! span 15 minutes, and the full 360-sample ring spans an hour.

use std::collections::VecDeque;

pub const SAMPLE_INTERVAL_SECS: u64 = 10;
const SAMPLES_1M: usize = 6;
const SAMPLES_15M: usize = 90;
const SAMPLES_1H: usize = 360;

#[derive(Debug, Clone, Copy, Default)]
pub struct Hashrates {
    pub avg_1m: f64,
    pub avg_15m: f64,
    pub avg_1h: f64,
}

/// Tracks hash-count deltas sampled at a fixed interval, and reduces them
/// into the three moving averages above.
pub struct HashrateTracker {
    samples: VecDeque<u64>,
    last_total: u64,
}

impl HashrateTracker {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(SAMPLES_1H),
            last_total: 0,
        }
    }

    /// Record the current cumulative hash count. The delta since the last
    /// call becomes the newest sample; once the ring holds `SAMPLES_1H`
    /// entries, the oldest is dropped.
    pub fn record(&mut self, total_hashes: u64) {
        let delta = total_hashes.saturating_sub(self.last_total);
        self.last_total = total_hashes;
        if self.samples.len() == SAMPLES_1H {
            self.samples.pop_front();
        }
        self.samples.push_back(delta);
    }

    pub fn hashrates(&self) -> Hashrates {
        Hashrates {
            avg_1m: self.average_over(SAMPLES_1M),
            avg_15m: self.average_over(SAMPLES_15M),
            avg_1h: self.average_over(SAMPLES_1H),
        }
    }

    fn average_over(&self, window: usize) -> f64 {
        let take = window.min(self.samples.len());
        if take == 0 {
            return 0.0;
        }
        let sum: u64 = self.samples.iter().rev().take(take).sum();
        sum as f64 / (take as f64 * SAMPLE_INTERVAL_SECS as f64)
    }
}

impl Default for HashrateTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a hashrate in H/s, kH/s, or MH/s as appropriate, matching the
/// operator-facing formatting style of the original miner's status line.
pub fn format_hashrate(hashes_per_sec: f64) -> String {
    if hashes_per_sec >= 1_000_000.0 {
        format!("{:.2} MH/s", hashes_per_sec / 1_000_000.0)
    } else if hashes_per_sec >= 1_000.0 {
        format!("{:.2} kH/s", hashes_per_sec / 1_000.0)
    } else {
        format!("{:.2} H/s", hashes_per_sec)
    }
}
